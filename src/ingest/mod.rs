//! Image ingestion pipeline.
//!
//! Decodes the JSON/base64 upload envelope, validates it, and stores the
//! image. Every validation step runs before any network I/O, ordered so the
//! cheap checks reject first: type allow-list before base64 decode, size
//! before the signature check. Exactly one store attempt per request.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::config::LimitsConfig;
use crate::error::{ServiceError, Stage};
use crate::storage::{paths, ObjectStore};
use crate::validation::{matches_signature, ImageType};

#[derive(Debug, Clone, Deserialize)]
pub struct UploadRequest {
    /// Base64-encoded image bytes.
    #[serde(default)]
    pub content: String,
    /// Declared MIME type; only jpeg, png, and webp are accepted.
    #[serde(rename = "type", default)]
    pub content_type: String,
    /// Optional caller-chosen filename; used verbatim as the final path
    /// segment.
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub path: String,
    pub public_url: String,
    pub success: bool,
}

/// Run the ingestion pipeline for one request.
pub async fn process_upload(
    store: Arc<dyn ObjectStore>,
    limits: &LimitsConfig,
    req: UploadRequest,
) -> Result<UploadResponse, ServiceError> {
    if req.content.is_empty() {
        return Err(ServiceError::BadRequest(
            "Base64 content required".to_string(),
        ));
    }

    let declared = req.content_type.trim().to_ascii_lowercase();
    let image_type = ImageType::from_mime(&declared)
        .ok_or_else(|| ServiceError::BadRequest("Unsupported image type".to_string()))?;

    let data = BASE64
        .decode(req.content.as_bytes())
        .map_err(|_| ServiceError::BadRequest("Invalid base64".to_string()))?;

    // The ceiling applies to decoded bytes, not the envelope length
    if data.len() > limits.max_upload_bytes {
        return Err(ServiceError::BadRequest("Image too large".to_string()));
    }

    if !matches_signature(&data, image_type) {
        return Err(ServiceError::BadRequest(
            "Invalid image content".to_string(),
        ));
    }

    let path = paths::upload_path(req.filename.as_deref(), image_type);
    let public_url = store
        .put(&path, data, image_type.mime())
        .await
        .map_err(|e| ServiceError::upstream(Stage::Store, e.to_string()))?;

    info!(path = %path, content_type = image_type.mime(), "image stored");

    Ok(UploadResponse {
        path,
        public_url,
        success: true,
    })
}
