//! Configuration data structures for the zai-vision core.
//!
//! Loading is split into two pure stages: [`RawSettings`] is the defaulted,
//! deserialized view of the environment, and [`Settings`] is the resolved
//! record with the platform, endpoint, and API key derived and checked (see
//! the module root for the loader and the derivation step).

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, VisionError};
use crate::utils::logging::mask_key;

/// Transport the embedding server speaks to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

/// Requested API platform, as configured. `Auto` is resolved against the API
/// key during [`Settings::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlatformMode {
    #[default]
    Auto,
    Zai,
    Zhipu,
}

/// Resolved API platform; pins the upstream base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    Zai,
    Zhipu,
}

impl Platform {
    /// Fixed upstream base URL for this platform.
    pub const fn base_url(self) -> &'static str {
        match self {
            Platform::Zai => "https://api.z.ai/api/paas/v4/",
            Platform::Zhipu => "https://open.bigmodel.cn/api/paas/v4/",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Zai => f.write_str("ZAI"),
            Platform::Zhipu => f.write_str("ZHIPU"),
        }
    }
}

/// API key for the upstream platform.
///
/// Guaranteed non-empty by construction. `Debug` output is masked and the
/// backing memory is wiped on drop, so the key does not leak through logs or
/// released allocations.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting the empty string.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(VisionError::configuration(
                "API key is required (set Z_AI_API_KEY)",
                "Z_AI_API_KEY",
            ));
        }
        Ok(ApiKey(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&mask_key(&self.0)).finish()
    }
}

/// Deserialized view of the environment before derivation.
///
/// Field names match the (lowercased) environment variable names consumed by
/// the loader; every field has the upstream default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSettings {
    // Server Configuration

    /// Name the embedding server announces. Default: `zai-mcp-server`
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// Version the embedding server announces. Default: `2.0.0`
    #[serde(default = "default_server_version")]
    pub server_version: String,

    /// Transport used by the embedding server. Default: `stdio`
    #[serde(default)]
    pub transport: Transport,

    /// Bind address for the http transport. Default: `0.0.0.0`
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the http transport. Default: `8000`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Verbose diagnostics toggle. Default: `false`
    #[serde(default)]
    pub debug: bool,

    /// Minimum log level when `RUST_LOG` is unset. Default: `INFO`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format (`pretty` or `json`). Default: `pretty`
    #[serde(default = "default_log_format")]
    pub log_format: String,

    // API Configuration

    /// Upstream API key (`Z_AI_API_KEY`). Required; checked at resolution.
    #[serde(default, rename = "z_ai_api_key")]
    pub api_key: Option<String>,

    /// Upstream base URL (`Z_AI_BASE_URL`). Replaced by the resolved
    /// platform's fixed URL during resolution.
    #[serde(default = "default_base_url", rename = "z_ai_base_url")]
    pub base_url: String,

    /// Platform selection. Default: `AUTO`
    #[serde(default)]
    pub platform_mode: PlatformMode,

    // Model Configuration

    /// Vision model requested from the upstream. Default: `glm-4.5v`
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Sampling temperature, 0 to 2. Default: `0.8`
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Nucleus sampling cutoff, 0 to 1. Default: `0.6`
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Completion token ceiling, 1 to 32768. Default: `16384`
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    // Request Configuration

    /// Completion request timeout in seconds, 1 to 3600. Default: `300`
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retries allowed to the outer caller, 0 to 5. Default: `2`
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Delay between outer-caller retries in seconds, 0.1 to 60. Default: `1.0`
    #[serde(default = "default_retry_delay_seconds")]
    pub retry_delay_seconds: f64,

    // File Size Limits

    /// Largest accepted local image in MB, 1 to 100. Default: `5`
    #[serde(default = "default_max_image_size_mb")]
    pub max_image_size_mb: u32,

    /// Largest accepted local video in MB, 1 to 500. Default: `8`
    #[serde(default = "default_max_video_size_mb")]
    pub max_video_size_mb: u32,

    // Rate Limiting

    /// Concurrent request ceiling for the serving layer, 1 to 1000. Default: `50`
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            server_version: default_server_version(),
            transport: Transport::default(),
            host: default_host(),
            port: default_port(),
            debug: false,
            log_level: default_log_level(),
            log_format: default_log_format(),
            api_key: None,
            base_url: default_base_url(),
            platform_mode: PlatformMode::default(),
            vision_model: default_vision_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
            retry_count: default_retry_count(),
            retry_delay_seconds: default_retry_delay_seconds(),
            max_image_size_mb: default_max_image_size_mb(),
            max_video_size_mb: default_max_video_size_mb(),
            rate_limit: default_rate_limit(),
        }
    }
}

/// Resolved application settings.
///
/// Built once via [`Settings::resolve`] (or [`Settings::load`]) at process
/// entry and passed explicitly to consumers; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_name: String,
    pub server_version: String,
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub log_level: String,
    pub log_format: String,
    pub api_key: ApiKey,
    /// Always the resolved platform's fixed URL.
    pub base_url: String,
    pub platform: Platform,
    pub vision_model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub retry_count: u32,
    pub retry_delay_seconds: f64,
    pub max_image_size_mb: u32,
    pub max_video_size_mb: u32,
    pub rate_limit: u32,
}

impl Settings {
    /// Full chat-completions endpoint for the resolved platform.
    pub fn api_endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Projection handed to the serving layer; carries no state of its own.
    pub fn serving_settings(&self) -> ServingSettings {
        ServingSettings {
            log_level: self.log_level.clone(),
            timeout: self.timeout_seconds,
            max_concurrent_requests: self.rate_limit,
        }
    }
}

/// The slice of the settings the serving layer needs.
#[derive(Debug, Clone, Serialize)]
pub struct ServingSettings {
    pub log_level: String,
    pub timeout: u64,
    pub max_concurrent_requests: u32,
}

// Helper functions for serde defaults and shared constants

fn default_server_name() -> String {
    "zai-mcp-server".to_string()
}

fn default_server_version() -> String {
    "2.0.0".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_base_url() -> String {
    Platform::Zhipu.base_url().to_string()
}

fn default_vision_model() -> String {
    "glm-4.5v".to_string()
}

fn default_temperature() -> f64 {
    0.8
}

fn default_top_p() -> f64 {
    0.6
}

fn default_max_tokens() -> u32 {
    16_384
}

fn default_timeout_seconds() -> u64 {
    300
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_delay_seconds() -> f64 {
    1.0
}

fn default_max_image_size_mb() -> u32 {
    5
}

fn default_max_video_size_mb() -> u32 {
    8
}

fn default_rate_limit() -> u32 {
    50
}
