//! Image content validation.
//!
//! Inspects raw upload bytes against the declared MIME type using
//! magic-byte signatures. Pure functions, no I/O.

/// Maximum accepted size of a decoded upload, in bytes (10 MiB).
///
/// Enforced on the decoded payload, not on the base64 envelope length.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Minimum number of bytes required before any signature check can pass.
const MIN_SIGNATURE_BYTES: usize = 12;

const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];
const PNG_PREFIX: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];
const RIFF_TAG: [u8; 4] = [0x52, 0x49, 0x46, 0x46];
const WEBP_TAG: [u8; 4] = [0x57, 0x45, 0x42, 0x50];

/// The closed set of image types accepted for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Jpeg,
    Png,
    Webp,
}

impl ImageType {
    /// Parse a declared MIME type into an accepted image type.
    ///
    /// The input must already be trimmed and lowercased; anything outside
    /// the allow-list returns `None`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(ImageType::Jpeg),
            "image/png" => Some(ImageType::Png),
            "image/webp" => Some(ImageType::Webp),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
            ImageType::Webp => "image/webp",
        }
    }

    /// File extension used for generated storage keys.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Jpeg => ".jpg",
            ImageType::Png => ".png",
            ImageType::Webp => ".webp",
        }
    }
}

/// Check raw bytes against the magic-byte signature of the declared type.
///
/// Inputs shorter than 12 bytes always fail, regardless of type. WEBP
/// requires both the RIFF container tag and the WEBP form tag.
pub fn matches_signature(data: &[u8], image_type: ImageType) -> bool {
    if data.len() < MIN_SIGNATURE_BYTES {
        return false;
    }
    match image_type {
        ImageType::Jpeg => data.starts_with(&JPEG_SOI),
        ImageType::Png => data.starts_with(&PNG_PREFIX),
        ImageType::Webp => data.starts_with(&RIFF_TAG) && data[8..12] == WEBP_TAG,
    }
}
