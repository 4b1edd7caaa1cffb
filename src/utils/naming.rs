//! # Naming Strategy
//!
//! Deterministic rules that map an operation, a source name and its parameters
//! to the name a file is stored under. Every rule is a pure function of its
//! inputs, so a derived name can always be recomputed without consulting storage.
//!
//! Download names produced by [`DownloadKind::download_name`] are cosmetic and
//! never used for storage lookups.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

/// Purpose of an upload, which decides the storage name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPurpose {
    /// Shared upload route used by the flip and thumbnail tools.
    Generic,
    Crop,
    BackgroundRemoval,
}

impl UploadPurpose {
    /// Storage prefix placed in front of the unique token.
    pub fn prefix(self) -> &'static str {
        match self {
            UploadPurpose::Generic => "",
            UploadPurpose::Crop => "crop_",
            UploadPurpose::BackgroundRemoval => "bg_remove_",
        }
    }
}

/// A random per-upload identifier.
///
/// 128-bit v4 UUIDs make collisions between concurrent uploads negligible;
/// collisions are not otherwise detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniqueToken(Uuid);

impl UniqueToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for UniqueToken {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for UniqueToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Storage name for a freshly uploaded file: `{prefix}{token}.{ext}`.
pub fn upload_filename(purpose: UploadPurpose, token: UniqueToken, extension: &str) -> String {
    format!("{}{token}.{extension}", purpose.prefix())
}

/// Splits a stored name into `(stem, extension)` at the last dot.
///
/// Names without a dot yield an empty extension.
pub fn split_name(filename: &str) -> (&str, &str) {
    filename.rsplit_once('.').unwrap_or((filename, ""))
}

/// `{stem}_cropped.{ext}`
pub fn cropped_filename(source: &str) -> String {
    let (stem, ext) = split_name(source);
    format!("{stem}_cropped.{ext}")
}

/// `{stem}_flipped.{ext}`
pub fn flipped_filename(source: &str) -> String {
    let (stem, ext) = split_name(source);
    format!("{stem}_flipped.{ext}")
}

/// `{stem}_thumbnail_{width}x{height}.{ext}`
pub fn thumbnail_filename(source: &str, width: u32, height: u32) -> String {
    let (stem, ext) = split_name(source);
    format!("{stem}_thumbnail_{width}x{height}.{ext}")
}

/// `{stem}_no_bg.png`, whatever the source extension was.
pub fn background_removed_filename(source: &str) -> String {
    let (stem, _) = split_name(source);
    format!("{stem}_no_bg.png")
}

/// Lowercased extension of a client-supplied name, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex is valid"));

/// Reduces a client-supplied file name to a safe, ASCII-only form.
///
/// Path separators become spaces, whitespace runs become a single `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.` and `_` are trimmed.
/// The result may be empty.
pub fn sanitize_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    UNSAFE_CHARS
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Which tool a download request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    Cropped,
    Flipped,
    Thumbnail,
    BackgroundRemoved,
}

impl DownloadKind {
    /// Human-friendly name suggested to the client for a stored file.
    pub fn download_name(self, stored: &str) -> String {
        match self {
            DownloadKind::Cropped => {
                if stored.contains("_cropped.") {
                    stored.replacen("_cropped.", "_final.", 1)
                } else {
                    format!("cropped_{stored}")
                }
            }
            DownloadKind::Flipped => stored.replace("_flipped", "_final"),
            DownloadKind::Thumbnail => match stored.split_once("_thumbnail_") {
                Some((_, dimensions)) => format!("thumbnail_{dimensions}"),
                None => stored.to_string(),
            },
            DownloadKind::BackgroundRemoved => match stored.split_once("_no_bg.") {
                Some((stem, _)) if stem.contains(UploadPurpose::BackgroundRemoval.prefix()) => {
                    "background_removed.png".to_string()
                }
                Some((stem, _)) => format!("{stem}_background_removed.png"),
                None => format!("background_removed_{stored}"),
            },
        }
    }

    /// Content type forced on the download, if the tool has one.
    pub fn forced_content_type(self) -> Option<&'static str> {
        match self {
            DownloadKind::BackgroundRemoved => Some("image/png"),
            _ => None,
        }
    }
}

/// Content type for a stored name, from a fixed extension table.
pub fn content_type_for(filename: &str) -> &'static str {
    match split_name(filename).1.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
