// Media source validation, base64 encoding, and metadata probes

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tokio::fs;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::{Result, VisionError};

use super::models::{FileInfo, MediaType, SourceKind};

/// Timeout for every validation/metadata probe, independent of the configured
/// request timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Classify a source string: true iff it is an absolute `http` or `https`
/// URL with a host, written in the explicit `scheme://` authority form.
/// Anything else, including parse failures, is treated as a local path.
pub fn is_url(source: &str) -> bool {
    // WHATWG parsing alone would also accept scheme-relative forms like
    // "http:example.com"; the explicit authority marker keeps those
    // classified as local paths.
    if !has_authority_prefix(source, "http://") && !has_authority_prefix(source, "https://") {
        return false;
    }
    match Url::parse(source) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

fn has_authority_prefix(source: &str, prefix: &str) -> bool {
    source.len() >= prefix.len()
        && source.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Validates, encodes, and inspects image and video sources.
///
/// Stateless apart from the injected settings and a reusable probe client;
/// cloning is cheap and every operation is safe to run concurrently. The
/// probe client never follows redirects, so a 3xx reply counts as a failed
/// probe rather than being resolved to its target.
#[derive(Debug, Clone)]
pub struct FileService {
    settings: Arc<Settings>,
    probe: Client,
}

impl FileService {
    pub fn new(settings: Arc<Settings>) -> Result<Self> {
        let probe = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .use_rustls_tls()
            .build()
            .map_err(|e| VisionError::Configuration {
                message: format!("Failed to create HTTP client: {e}"),
                config_key: None,
                config_value: None,
            })?;
        Ok(FileService { settings, probe })
    }

    /// Validate an image source, dispatching on URL vs local path.
    pub async fn validate_image_source(&self, source: &str) -> Result<()> {
        if is_url(source) {
            self.validate_url(source, MediaType::Image).await
        } else {
            self.validate_file(source, MediaType::Image).await
        }
    }

    /// Validate a video source, dispatching on URL vs local path.
    pub async fn validate_video_source(&self, source: &str) -> Result<()> {
        if is_url(source) {
            self.validate_url(source, MediaType::Video).await
        } else {
            self.validate_file(source, MediaType::Video).await
        }
    }

    /// Encode an image source for a completion payload.
    ///
    /// URLs pass through unchanged since the upstream API fetches them
    /// itself; local files are validated, read whole, and wrapped in a
    /// `data:<mime>;base64,<payload>` URI.
    pub async fn encode_image_to_base64(&self, source: &str) -> Result<String> {
        self.encode(source, MediaType::Image).await
    }

    /// Encode a video source for a completion payload. Same contract as
    /// [`encode_image_to_base64`](Self::encode_image_to_base64).
    pub async fn encode_video_to_base64(&self, source: &str) -> Result<String> {
        self.encode(source, MediaType::Video).await
    }

    /// Inspect a source and report what is known about it.
    ///
    /// Advisory only: probe and stat failures are folded into the record as
    /// `accessible: false` with an `error` message, never returned as errors.
    pub async fn file_info(&self, source: &str) -> FileInfo {
        if is_url(source) {
            self.url_info(source).await
        } else {
            self.local_info(source).await
        }
    }

    /// Check a local path: existence, regular file, size ceiling, extension.
    async fn validate_file(&self, file_path: &str, media: MediaType) -> Result<()> {
        let path = Path::new(file_path);

        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = %file_path, error = %e, "stat failed during validation");
                return Err(VisionError::file_not_found(
                    format!("{} file not found: {file_path}", media.title()),
                    file_path,
                ));
            }
        };

        if !metadata.is_file() {
            return Err(VisionError::validation(format!(
                "Path is not a file: {file_path}"
            )));
        }

        let size_mb = metadata.len() as f64 / BYTES_PER_MB;
        let limit = self.size_limit_mb(media);
        if size_mb > f64::from(limit) {
            return Err(VisionError::validation(format!(
                "{} file too large: {size_mb:.2}MB. Maximum allowed: {limit}MB",
                media.title()
            )));
        }

        let suffix = file_suffix(path);
        if !media.supports_extension(&suffix) {
            return Err(VisionError::validation(format!(
                "Unsupported {} format: {suffix}. Supported formats: {}",
                media.label(),
                media.supported_extensions().join(", ")
            )));
        }

        Ok(())
    }

    /// Probe a URL with HEAD and check that it serves the expected media.
    async fn validate_url(&self, url: &str, media: MediaType) -> Result<()> {
        let response = self.probe.head(url).send().await.map_err(|e| {
            VisionError::network(format!("Cannot access {} URL: {e}", media.label()), url, None)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(VisionError::network(
                format!("Cannot access {} URL: HTTP {status}", media.label()),
                url,
                Some(status.as_u16()),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        if !content_type.starts_with(media.mime_prefix()) {
            let target = match media {
                MediaType::Image => "an image",
                MediaType::Video => "a video",
            };
            return Err(VisionError::validation(format!(
                "URL does not point to {target}: {content_type}"
            )));
        }

        Ok(())
    }

    async fn encode(&self, source: &str, media: MediaType) -> Result<String> {
        if is_url(source) {
            return Ok(source.to_string());
        }

        // Validation runs again here even when the caller already did it, so
        // encoding alone never ships an oversized or mistyped file.
        self.validate_file(source, media).await?;

        let path = Path::new(source);
        let data = match fs::read(path).await {
            Ok(data) => data,
            Err(e) => {
                debug!(path = %source, error = %e, "read failed after validation");
                return Err(VisionError::file_not_found(
                    format!("{} file not found: {source}", media.title()),
                    source,
                ));
            }
        };

        let mime_type = media.mime_for_extension(&file_suffix(path));
        debug!(path = %source, bytes = data.len(), mime = mime_type, "encoded local file");
        Ok(format!("data:{mime_type};base64,{}", STANDARD.encode(&data)))
    }

    async fn url_info(&self, source: &str) -> FileInfo {
        let response = match self.probe.head(source).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %source, error = %e, "URL probe failed");
                return inaccessible_url(source, e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %source, status = %status, "URL probe failed");
            return inaccessible_url(source, format!("HTTP {status}"));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        FileInfo {
            source: source.to_string(),
            kind: SourceKind::Url,
            // HEAD responses do not carry a usable size
            size: None,
            size_mb: None,
            content_type,
            accessible: true,
            extension: None,
            error: None,
        }
    }

    async fn local_info(&self, source: &str) -> FileInfo {
        let path = Path::new(source);
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %source, error = %e, "stat failed during probe");
                return FileInfo {
                    source: source.to_string(),
                    kind: SourceKind::File,
                    size: None,
                    size_mb: None,
                    content_type: None,
                    accessible: false,
                    extension: None,
                    error: Some("File not found".to_string()),
                };
            }
        };

        let suffix = file_suffix(path);
        let media = if MediaType::Video.supports_extension(&suffix) {
            MediaType::Video
        } else {
            MediaType::Image
        };
        let size = metadata.len();

        FileInfo {
            source: source.to_string(),
            kind: SourceKind::File,
            size: Some(size),
            size_mb: Some(size as f64 / BYTES_PER_MB),
            content_type: Some(media.mime_for_extension(&suffix).to_string()),
            accessible: true,
            extension: Some(suffix),
            error: None,
        }
    }

    fn size_limit_mb(&self, media: MediaType) -> u32 {
        match media {
            MediaType::Image => self.settings.max_image_size_mb,
            MediaType::Video => self.settings.max_video_size_mb,
        }
    }
}

fn inaccessible_url(source: &str, error: String) -> FileInfo {
    FileInfo {
        source: source.to_string(),
        kind: SourceKind::Url,
        size: None,
        size_mb: None,
        content_type: None,
        accessible: false,
        extension: None,
        error: Some(error),
    }
}

/// Extension with its leading dot and original case, or empty when the path
/// has none. Dotfiles like `.png` count as extensionless.
fn file_suffix(path: &Path) -> String {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!(".{ext}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_url_accepts_http_and_https() {
        assert!(is_url("http://example.com/image.png"));
        assert!(is_url("https://example.com/clip.mp4?query=1"));
        assert!(is_url("HTTPS://EXAMPLE.COM/IMG.PNG"));
    }

    #[test]
    fn is_url_rejects_other_schemes_and_paths() {
        assert!(!is_url("ftp://example.com/image.png"));
        assert!(!is_url("file:///tmp/image.png"));
        assert!(!is_url("/tmp/image.png"));
        assert!(!is_url("image.png"));
        assert!(!is_url("not a url"));
        assert!(!is_url(""));
        assert!(!is_url("http://"));
    }

    #[test]
    fn is_url_requires_the_explicit_authority_form() {
        assert!(!is_url("http:example.com"));
        assert!(!is_url("https:/x/y.png"));
        assert!(!is_url("http:tmp/image.png"));
        assert!(is_url("http://example.com/image.png"));
    }

    #[test]
    fn file_suffix_keeps_dot_and_case() {
        assert_eq!(file_suffix(Path::new("/tmp/photo.PNG")), ".PNG");
        assert_eq!(file_suffix(Path::new("clip.tar.mp4")), ".mp4");
        assert_eq!(file_suffix(Path::new("/tmp/noext")), "");
        assert_eq!(file_suffix(Path::new("/tmp/.png")), "");
    }
}
