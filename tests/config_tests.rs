// Settings loading, range validation, and platform resolution

use zai_vision::config::{
    detect_platform, Platform, PlatformMode, RawSettings, Settings, Transport,
};

fn raw_with_key(key: &str) -> RawSettings {
    RawSettings {
        api_key: Some(key.to_string()),
        ..RawSettings::default()
    }
}

#[test]
fn defaults_match_the_documented_values() {
    let raw = RawSettings::default();
    assert_eq!(raw.server_name, "zai-mcp-server");
    assert_eq!(raw.server_version, "2.0.0");
    assert_eq!(raw.transport, Transport::Stdio);
    assert_eq!(raw.host, "0.0.0.0");
    assert_eq!(raw.port, 8000);
    assert!(!raw.debug);
    assert_eq!(raw.log_level, "INFO");
    assert_eq!(raw.log_format, "pretty");
    assert_eq!(raw.api_key, None);
    assert_eq!(raw.base_url, "https://open.bigmodel.cn/api/paas/v4/");
    assert_eq!(raw.platform_mode, PlatformMode::Auto);
    assert_eq!(raw.vision_model, "glm-4.5v");
    assert_eq!(raw.temperature, 0.8);
    assert_eq!(raw.top_p, 0.6);
    assert_eq!(raw.max_tokens, 16_384);
    assert_eq!(raw.timeout_seconds, 300);
    assert_eq!(raw.retry_count, 2);
    assert_eq!(raw.retry_delay_seconds, 1.0);
    assert_eq!(raw.max_image_size_mb, 5);
    assert_eq!(raw.max_video_size_mb, 8);
    assert_eq!(raw.rate_limit, 50);
}

#[test]
fn auto_mode_routes_plain_keys_to_zai() {
    let settings = Settings::resolve(raw_with_key("sk-abcdef123456")).unwrap();
    assert_eq!(settings.platform, Platform::Zai);
    assert_eq!(settings.base_url, "https://api.z.ai/api/paas/v4/");
}

#[test]
fn auto_mode_routes_zhipu_and_glm_keys_to_zhipu() {
    let settings = Settings::resolve(raw_with_key("glm-key-123456")).unwrap();
    assert_eq!(settings.platform, Platform::Zhipu);
    assert_eq!(settings.base_url, "https://open.bigmodel.cn/api/paas/v4/");

    let settings = Settings::resolve(raw_with_key("MY-ZHIPU-KEY-1")).unwrap();
    assert_eq!(settings.platform, Platform::Zhipu);
}

#[test]
fn explicit_mode_overrides_detection_and_any_configured_base_url() {
    let raw = RawSettings {
        platform_mode: PlatformMode::Zhipu,
        base_url: "https://proxy.internal/api/".to_string(),
        ..raw_with_key("sk-plain-key")
    };
    let settings = Settings::resolve(raw).unwrap();
    assert_eq!(settings.platform, Platform::Zhipu);
    assert_eq!(settings.base_url, "https://open.bigmodel.cn/api/paas/v4/");

    let raw = RawSettings {
        platform_mode: PlatformMode::Zai,
        ..raw_with_key("glm-looks-like-zhipu")
    };
    let settings = Settings::resolve(raw).unwrap();
    assert_eq!(settings.platform, Platform::Zai);
    assert_eq!(settings.base_url, "https://api.z.ai/api/paas/v4/");
}

#[test]
fn detect_platform_handles_absent_and_empty_keys() {
    assert_eq!(detect_platform(None), Platform::Zhipu);
    assert_eq!(detect_platform(Some("")), Platform::Zhipu);
    assert_eq!(detect_platform(Some("sk-ordinary-key")), Platform::Zai);
    assert_eq!(detect_platform(Some("contains-GLM-inside")), Platform::Zhipu);
    assert_eq!(detect_platform(Some("Zhipu-Enterprise")), Platform::Zhipu);
}

#[test]
fn missing_or_empty_key_fails_resolution() {
    let err = Settings::resolve(RawSettings::default()).unwrap_err();
    assert_eq!(err.code(), "CONFIGURATION_ERROR");
    assert!(err.to_string().contains("API key is required"));
    assert_eq!(err.details()["config_key"], "Z_AI_API_KEY");

    let err = Settings::resolve(raw_with_key("")).unwrap_err();
    assert_eq!(err.code(), "CONFIGURATION_ERROR");
}

fn assert_rejected(raw: RawSettings, config_key: &str) {
    let err = Settings::resolve(raw).unwrap_err();
    assert_eq!(err.code(), "CONFIGURATION_ERROR", "for {config_key}");
    assert_eq!(err.details()["config_key"], config_key);
}

#[test]
fn out_of_range_fields_fail_resolution() {
    let base = || raw_with_key("sk-test-key-1");
    assert_rejected(RawSettings { temperature: 2.5, ..base() }, "TEMPERATURE");
    assert_rejected(RawSettings { temperature: -0.1, ..base() }, "TEMPERATURE");
    assert_rejected(RawSettings { top_p: 1.1, ..base() }, "TOP_P");
    assert_rejected(RawSettings { max_tokens: 0, ..base() }, "MAX_TOKENS");
    assert_rejected(RawSettings { max_tokens: 32_769, ..base() }, "MAX_TOKENS");
    assert_rejected(RawSettings { timeout_seconds: 0, ..base() }, "TIMEOUT_SECONDS");
    assert_rejected(RawSettings { timeout_seconds: 3_601, ..base() }, "TIMEOUT_SECONDS");
    assert_rejected(RawSettings { retry_count: 6, ..base() }, "RETRY_COUNT");
    assert_rejected(
        RawSettings { retry_delay_seconds: 0.05, ..base() },
        "RETRY_DELAY_SECONDS",
    );
    assert_rejected(RawSettings { max_image_size_mb: 0, ..base() }, "MAX_IMAGE_SIZE_MB");
    assert_rejected(RawSettings { max_image_size_mb: 101, ..base() }, "MAX_IMAGE_SIZE_MB");
    assert_rejected(RawSettings { max_video_size_mb: 501, ..base() }, "MAX_VIDEO_SIZE_MB");
    assert_rejected(RawSettings { rate_limit: 0, ..base() }, "RATE_LIMIT");
    assert_rejected(RawSettings { rate_limit: 1_001, ..base() }, "RATE_LIMIT");
}

#[test]
fn range_bounds_are_inclusive() {
    let raw = RawSettings {
        temperature: 0.0,
        top_p: 1.0,
        max_tokens: 32_768,
        timeout_seconds: 3_600,
        retry_count: 0,
        retry_delay_seconds: 0.1,
        max_image_size_mb: 100,
        max_video_size_mb: 500,
        rate_limit: 1_000,
        ..raw_with_key("sk-test-key-1")
    };
    assert!(Settings::resolve(raw).is_ok());
}

#[test]
fn nan_temperature_is_rejected() {
    let raw = RawSettings {
        temperature: f64::NAN,
        ..raw_with_key("sk-test-key-1")
    };
    assert_rejected(raw, "TEMPERATURE");
}

#[test]
fn api_endpoint_joins_base_url_and_route() {
    let settings = Settings::resolve(raw_with_key("sk-endpoint-key")).unwrap();
    assert_eq!(
        settings.api_endpoint(),
        "https://api.z.ai/api/paas/v4/chat/completions"
    );

    let settings = Settings::resolve(raw_with_key("glm-endpoint-key")).unwrap();
    assert_eq!(
        settings.api_endpoint(),
        "https://open.bigmodel.cn/api/paas/v4/chat/completions"
    );
}

#[test]
fn serving_settings_is_a_pure_projection() {
    let raw = RawSettings {
        log_level: "DEBUG".to_string(),
        timeout_seconds: 120,
        rate_limit: 10,
        ..raw_with_key("sk-serving-key")
    };
    let serving = Settings::resolve(raw).unwrap().serving_settings();
    assert_eq!(serving.log_level, "DEBUG");
    assert_eq!(serving.timeout, 120);
    assert_eq!(serving.max_concurrent_requests, 10);
}

#[test]
fn debug_output_masks_the_api_key() {
    let settings = Settings::resolve(raw_with_key("sk-1234567890abcdef")).unwrap();
    assert_eq!(settings.api_key.as_str(), "sk-1234567890abcdef");

    let debug = format!("{settings:?}");
    assert!(debug.contains("sk-1...cdef"));
    assert!(!debug.contains("sk-1234567890abcdef"));
}

// The one test that touches the process environment; the others stay on
// hand-built RawSettings so they can run in parallel with it.
#[test]
fn from_env_reads_environment_overrides() {
    std::env::set_var("Z_AI_API_KEY", "env-key-abcdef");
    std::env::set_var("VISION_MODEL", "glm-4v-plus");
    std::env::set_var("MAX_TOKENS", "2048");
    std::env::set_var("TRANSPORT", "http");
    std::env::set_var("PLATFORM_MODE", "ZHIPU");

    let raw = RawSettings::from_env().unwrap();
    assert_eq!(raw.api_key.as_deref(), Some("env-key-abcdef"));
    assert_eq!(raw.vision_model, "glm-4v-plus");
    assert_eq!(raw.max_tokens, 2048);
    assert_eq!(raw.transport, Transport::Http);
    assert_eq!(raw.platform_mode, PlatformMode::Zhipu);
    // Untouched fields keep their defaults.
    assert_eq!(raw.retry_count, 2);

    std::env::remove_var("Z_AI_API_KEY");
    std::env::remove_var("VISION_MODEL");
    std::env::remove_var("MAX_TOKENS");
    std::env::remove_var("TRANSPORT");
    std::env::remove_var("PLATFORM_MODE");
}
