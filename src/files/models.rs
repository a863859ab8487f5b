//! Media classification types and the extension/MIME lookup tables.

use phf::phf_map;
use serde::Serialize;

/// Compile-time MIME tables, keyed by lowercased extension with leading dot.
static IMAGE_MIME_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    ".png" => "image/png",
    ".jpg" => "image/jpeg",
    ".jpeg" => "image/jpeg",
};

static VIDEO_MIME_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    ".mp4" => "video/mp4",
    ".avi" => "video/x-msvideo",
    ".mov" => "video/quicktime",
    ".webm" => "video/webm",
    ".m4v" => "video/x-m4v",
};

const IMAGE_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];
const VIDEO_EXTENSIONS: [&str; 5] = [".mp4", ".mov", ".avi", ".webm", ".m4v"];

/// Media category a source is validated and encoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Lowercase noun for error messages.
    pub const fn label(self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// Capitalized noun for error messages.
    pub const fn title(self) -> &'static str {
        match self {
            MediaType::Image => "Image",
            MediaType::Video => "Video",
        }
    }

    /// Prefix a probe response's content-type must carry.
    pub const fn mime_prefix(self) -> &'static str {
        match self {
            MediaType::Image => "image/",
            MediaType::Video => "video/",
        }
    }

    /// MIME type used when the extension is not in the table.
    pub const fn fallback_mime(self) -> &'static str {
        match self {
            MediaType::Image => "image/png",
            MediaType::Video => "video/mp4",
        }
    }

    /// Extensions accepted by local-file validation, with leading dot.
    pub const fn supported_extensions(self) -> &'static [&'static str] {
        match self {
            MediaType::Image => &IMAGE_EXTENSIONS,
            MediaType::Video => &VIDEO_EXTENSIONS,
        }
    }

    /// Whether local-file validation accepts this extension, case-insensitive.
    pub fn supports_extension(self, extension: &str) -> bool {
        let extension = extension.to_lowercase();
        self.supported_extensions().contains(&extension.as_str())
    }

    /// MIME type for an extension, falling back to
    /// [`fallback_mime`](Self::fallback_mime) when it is unknown.
    pub fn mime_for_extension(self, extension: &str) -> &'static str {
        let extension = extension.to_lowercase();
        let table = match self {
            MediaType::Image => &IMAGE_MIME_TYPES,
            MediaType::Video => &VIDEO_MIME_TYPES,
        };
        table
            .get(extension.as_str())
            .copied()
            .unwrap_or(self.fallback_mime())
    }
}

/// How a source string was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Url,
    File,
}

/// Metadata record returned by [`FileService::file_info`](super::FileService::file_info).
///
/// Shape varies with the outcome: optional fields that do not apply are
/// omitted from the serialized form, while `size` and `content_type` stay
/// present as null where unknown.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_mb: Option<f64>,
    pub content_type: Option<String>,
    pub accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
