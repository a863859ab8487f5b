// Error types for the zai-vision core

use serde_json::{json, Map, Value};
use thiserror::Error;

/// Failure categories shared across the crate and its embedding layer.
///
/// Every variant carries a human-readable message plus the contextual fields
/// for that kind. [`code`](VisionError::code) and
/// [`details`](VisionError::details) expose the machine-readable side, so
/// callers match on the variant instead of parsing strings.
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("{message}")]
    FileNotFound {
        message: String,
        file_path: Option<String>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
        value: Option<Value>,
    },

    #[error("{message}")]
    Network {
        message: String,
        url: Option<String>,
        status_code: Option<u16>,
    },

    /// Upstream API failure. Not produced by this crate itself; the embedding
    /// layer raises it when the completion endpoint rejects a request.
    #[error("{message}")]
    Api {
        message: String,
        api_response: Option<Value>,
        status_code: Option<u16>,
    },

    #[error("{message}")]
    Configuration {
        message: String,
        config_key: Option<String>,
        config_value: Option<Value>,
    },
}

impl VisionError {
    pub fn file_not_found(message: impl Into<String>, file_path: impl Into<String>) -> Self {
        VisionError::FileNotFound {
            message: message.into(),
            file_path: Some(file_path.into()),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        VisionError::Validation {
            message: message.into(),
            field: None,
            value: None,
        }
    }

    pub fn network(
        message: impl Into<String>,
        url: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        VisionError::Network {
            message: message.into(),
            url: Some(url.into()),
            status_code,
        }
    }

    pub fn api(message: impl Into<String>, status_code: Option<u16>) -> Self {
        VisionError::Api {
            message: message.into(),
            api_response: None,
            status_code,
        }
    }

    pub fn configuration(message: impl Into<String>, config_key: impl Into<String>) -> Self {
        VisionError::Configuration {
            message: message.into(),
            config_key: Some(config_key.into()),
            config_value: None,
        }
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            VisionError::FileNotFound { .. } => "FILE_NOT_FOUND",
            VisionError::Validation { .. } => "VALIDATION_ERROR",
            VisionError::Network { .. } => "NETWORK_ERROR",
            VisionError::Api { .. } => "API_ERROR",
            VisionError::Configuration { .. } => "CONFIGURATION_ERROR",
        }
    }

    /// Contextual detail fields for this error.
    ///
    /// Keys are fixed per kind; fields without a value are kept as null so the
    /// shape stays stable for consumers.
    pub fn details(&self) -> Map<String, Value> {
        let mut details = Map::new();
        match self {
            VisionError::FileNotFound { file_path, .. } => {
                details.insert("file_path".to_string(), opt_str(file_path));
            }
            VisionError::Validation { field, value, .. } => {
                details.insert("field".to_string(), opt_str(field));
                details.insert("value".to_string(), opt_value(value));
            }
            VisionError::Network {
                url, status_code, ..
            } => {
                details.insert("url".to_string(), opt_str(url));
                details.insert("status_code".to_string(), opt_status(status_code));
            }
            VisionError::Api {
                api_response,
                status_code,
                ..
            } => {
                details.insert("api_response".to_string(), opt_value(api_response));
                details.insert("status_code".to_string(), opt_status(status_code));
            }
            VisionError::Configuration {
                config_key,
                config_value,
                ..
            } => {
                details.insert("config_key".to_string(), opt_str(config_key));
                details.insert("config_value".to_string(), opt_value(config_value));
            }
        }
        details
    }

    /// JSON body for error responses produced by the embedding layer.
    pub fn to_value(&self) -> Value {
        json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "details": self.details(),
            }
        })
    }
}

fn opt_str(value: &Option<String>) -> Value {
    match value {
        Some(v) => Value::String(v.clone()),
        None => Value::Null,
    }
}

fn opt_value(value: &Option<Value>) -> Value {
    value.clone().unwrap_or(Value::Null)
}

fn opt_status(value: &Option<u16>) -> Value {
    match value {
        Some(v) => Value::Number((*v).into()),
        None => Value::Null,
    }
}

pub type Result<T> = std::result::Result<T, VisionError>;
