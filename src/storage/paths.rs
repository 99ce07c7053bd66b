//! Storage key generation.
//!
//! Uploaded originals land under `images/`, watermarked derivatives under a
//! `watermarked/` sibling directory next to their source object.

use crate::validation::ImageType;
use rand::rngs::OsRng;
use rand::RngCore;
use std::time::{SystemTime, UNIX_EPOCH};

/// Directory prefix for uploaded originals.
const UPLOAD_DIR: &str = "images";

/// Directory name for watermarked derivatives, created as a sibling of the
/// source object.
const WATERMARK_DIR: &str = "watermarked";

/// Generate the storage key for an uploaded image.
///
/// When the caller supplies a filename the key is `images/<filename>`
/// verbatim; the caller controls the final segment and there is no
/// collision protection. Otherwise the key is `images/<32-hex>.<ext>` from
/// a 128-bit random identifier.
pub fn upload_path(filename: Option<&str>, image_type: ImageType) -> String {
    match filename {
        Some(name) if !name.is_empty() => format!("{}/{}", UPLOAD_DIR, name),
        _ => format!(
            "{}/{}{}",
            UPLOAD_DIR,
            random_identifier(),
            image_type.extension()
        ),
    }
}

/// Derive the output key for a watermarked image.
///
/// `dirname(path)/watermarked/basename(path)` - deterministic, so repeated
/// watermarking of the same source overwrites the same derivative.
pub fn watermarked_path(image_path: &str) -> String {
    match image_path.rsplit_once('/') {
        Some((dir, name)) => format!("{}/{}/{}", dir, WATERMARK_DIR, name),
        None => format!("{}/{}", WATERMARK_DIR, image_path),
    }
}

/// Generate a fresh download token for object metadata and public URLs.
///
/// Tokens grant read access to otherwise unauthenticated URLs, so they come
/// from the OS CSPRNG. One token per upload, never reused.
pub fn download_token() -> String {
    random_identifier()
}

/// 128 random bits, hex-encoded.
///
/// If the OS random source is unavailable this degrades to a nanosecond
/// timestamp: monotonic but not collision-resistant under concurrent
/// requests in the same nanosecond.
fn random_identifier() -> String {
    let mut buf = [0u8; 16];
    match OsRng.try_fill_bytes(&mut buf) {
        Ok(()) => hex::encode(buf),
        Err(err) => {
            tracing::warn!(error = %err, "OS random source unavailable, falling back to timestamp identifier");
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos();
            format!("{:x}", nanos)
        }
    }
}
