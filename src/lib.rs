// zai-vision - Configuration, error, and media-handling core for GLM vision tooling

pub mod config;
pub mod error;
pub mod files;
pub mod utils;
