// Configuration loading and resolution

mod models;

pub use models::*;

use std::fmt;
use std::path::PathBuf;

use config::{Config, Environment, File};
use serde_json::Value;

use crate::error::{Result, VisionError};

impl RawSettings {
    /// Load raw settings from multiple sources with precedence:
    /// 1. Environment variables (highest)
    /// 2. Config file, if present
    /// 3. Defaults (lowest)
    ///
    /// Environment variable names are matched case-insensitively.
    pub fn from_env() -> Result<Self> {
        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default()).map_err(config_error)?)
            // Load from config file if it exists
            .add_source(File::with_name(&default_config_path()).required(false))
            // Override with environment variables
            .add_source(Environment::default())
            .build()
            .map_err(config_error)?;

        config.try_deserialize().map_err(config_error)
    }

    /// Range-check every bounded numeric field.
    ///
    /// Violations surface as [`VisionError::Configuration`] keyed by the
    /// offending environment variable name.
    pub fn validate(&self) -> Result<()> {
        check_range("TEMPERATURE", self.temperature, 0.0, 2.0)?;
        check_range("TOP_P", self.top_p, 0.0, 1.0)?;
        check_range("MAX_TOKENS", self.max_tokens, 1, 32_768)?;
        check_range("TIMEOUT_SECONDS", self.timeout_seconds, 1, 3_600)?;
        check_range("RETRY_COUNT", self.retry_count, 0, 5)?;
        check_range("RETRY_DELAY_SECONDS", self.retry_delay_seconds, 0.1, 60.0)?;
        check_range("MAX_IMAGE_SIZE_MB", self.max_image_size_mb, 1, 100)?;
        check_range("MAX_VIDEO_SIZE_MB", self.max_video_size_mb, 1, 500)?;
        check_range("RATE_LIMIT", self.rate_limit, 1, 1_000)?;
        Ok(())
    }
}

impl Settings {
    /// Turn raw settings into the resolved record.
    ///
    /// Runs the range checks, resolves `AUTO` platform selection against the
    /// API key, pins the base URL to the resolved platform, and requires a
    /// non-empty key. Pure apart from the input; call sites own when and how
    /// often this runs.
    pub fn resolve(raw: RawSettings) -> Result<Self> {
        raw.validate()?;

        let platform = match raw.platform_mode {
            PlatformMode::Auto => detect_platform(raw.api_key.as_deref()),
            PlatformMode::Zai => Platform::Zai,
            PlatformMode::Zhipu => Platform::Zhipu,
        };
        // The platform pins the base URL, even over an explicit Z_AI_BASE_URL.
        let base_url = platform.base_url().to_string();

        let api_key = ApiKey::new(raw.api_key.unwrap_or_default())?;

        Ok(Settings {
            server_name: raw.server_name,
            server_version: raw.server_version,
            transport: raw.transport,
            host: raw.host,
            port: raw.port,
            debug: raw.debug,
            log_level: raw.log_level,
            log_format: raw.log_format,
            api_key,
            base_url,
            platform,
            vision_model: raw.vision_model,
            temperature: raw.temperature,
            top_p: raw.top_p,
            max_tokens: raw.max_tokens,
            timeout_seconds: raw.timeout_seconds,
            retry_count: raw.retry_count,
            retry_delay_seconds: raw.retry_delay_seconds,
            max_image_size_mb: raw.max_image_size_mb,
            max_video_size_mb: raw.max_video_size_mb,
            rate_limit: raw.rate_limit,
        })
    }

    /// Load and resolve settings from the process environment.
    ///
    /// Reads a local `.env` file first when one exists, then goes through
    /// [`RawSettings::from_env`] and [`Settings::resolve`].
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Settings::resolve(RawSettings::from_env()?)
    }
}

/// Pick the platform for an `AUTO` configuration.
///
/// Best-effort heuristic on the key contents: keys mentioning `zhipu` or
/// `glm` (case-insensitive) route to ZHIPU, anything else to ZAI. Absent or
/// empty keys fall back to ZHIPU.
pub fn detect_platform(api_key: Option<&str>) -> Platform {
    let key = match api_key {
        Some(key) if !key.is_empty() => key.to_lowercase(),
        _ => return Platform::Zhipu,
    };
    if key.contains("zhipu") || key.contains("glm") {
        Platform::Zhipu
    } else {
        Platform::Zai
    }
}

fn default_config_path() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".zai-vision")
        .join("config.toml")
        .to_string_lossy()
        .to_string()
}

fn config_error(e: config::ConfigError) -> VisionError {
    VisionError::Configuration {
        message: format!("Failed to load configuration: {e}"),
        config_key: None,
        config_value: None,
    }
}

// `contains` rejects NaN, so a NaN value can never pass a range check.
fn check_range<T>(name: &str, value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + Copy + fmt::Display,
    Value: From<T>,
{
    if (min..=max).contains(&value) {
        return Ok(());
    }
    Err(VisionError::Configuration {
        message: format!("{name} must be between {min} and {max}, got {value}"),
        config_key: Some(name.to_string()),
        config_value: Some(Value::from(value)),
    })
}
