//! End-to-end ingestion pipeline tests against the in-memory store.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::sync::Arc;

use sukashi::config::LimitsConfig;
use sukashi::error::ServiceError;
use sukashi::ingest::{process_upload, UploadRequest};
use sukashi::storage::{MemoryObjectStore, ObjectStore};

/// A real ~50-pixel JPEG produced by the image crate.
fn sample_jpeg() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        10,
        5,
        image::Rgb([180, 90, 30]),
    ));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

fn upload_request(bytes: &[u8], mime: &str, filename: Option<&str>) -> UploadRequest {
    UploadRequest {
        content: BASE64.encode(bytes),
        content_type: mime.to_string(),
        filename: filename.map(str::to_string),
    }
}

#[tokio::test]
async fn upload_without_filename_generates_hex_key() {
    let store = Arc::new(MemoryObjectStore::new("photos"));
    let jpeg = sample_jpeg();

    let response = process_upload(
        store.clone(),
        &LimitsConfig::default(),
        upload_request(&jpeg, "image/jpeg", None),
    )
    .await
    .unwrap();

    assert!(response.success);
    let name = response.path.strip_prefix("images/").unwrap();
    let stem = name.strip_suffix(".jpg").unwrap();
    assert_eq!(stem.len(), 32);
    assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn upload_round_trips_byte_identical() {
    let store = Arc::new(MemoryObjectStore::new("photos"));
    let jpeg = sample_jpeg();

    let response = process_upload(
        store.clone(),
        &LimitsConfig::default(),
        upload_request(&jpeg, "image/jpeg", None),
    )
    .await
    .unwrap();

    let stored = store.get(&response.path).await.unwrap();
    assert_eq!(stored, jpeg);
    assert_eq!(
        store.content_type_of(&response.path).as_deref(),
        Some("image/jpeg")
    );
}

#[tokio::test]
async fn upload_public_url_embeds_stored_token() {
    let store = Arc::new(MemoryObjectStore::new("photos"));
    let jpeg = sample_jpeg();

    let response = process_upload(
        store.clone(),
        &LimitsConfig::default(),
        upload_request(&jpeg, "image/jpeg", None),
    )
    .await
    .unwrap();

    let token = store.token_of(&response.path).unwrap();
    assert!(response.public_url.contains("alt=media"));
    assert!(response.public_url.ends_with(&format!("token={}", token)));
    // Object path is escaped as a single URL segment
    assert!(response.public_url.contains("images%2F"));
}

#[tokio::test]
async fn upload_short_png_prefixed_file_is_rejected() {
    let store = Arc::new(MemoryObjectStore::new("photos"));
    // 10 bytes starting with the PNG signature: shorter than the 12-byte
    // minimum, so validation must fail despite the valid prefix
    let bytes = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];

    let err = process_upload(
        store,
        &LimitsConfig::default(),
        upload_request(&bytes, "image/png", None),
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "Invalid image content");
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn upload_respects_size_ceiling_on_decoded_bytes() {
    let store = Arc::new(MemoryObjectStore::new("photos"));
    let limits = LimitsConfig {
        max_upload_bytes: 100,
        ..Default::default()
    };
    let mut bytes = vec![0xFF, 0xD8, 0xFF];
    bytes.resize(101, 0);

    let err = process_upload(store, &limits, upload_request(&bytes, "image/jpeg", None))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Image too large");
}

#[tokio::test]
async fn upload_with_filename_stores_verbatim() {
    let store = Arc::new(MemoryObjectStore::new("photos"));
    let jpeg = sample_jpeg();

    let response = process_upload(
        store.clone(),
        &LimitsConfig::default(),
        upload_request(&jpeg, "image/jpeg", Some("holiday.jpg")),
    )
    .await
    .unwrap();

    assert_eq!(response.path, "images/holiday.jpg");
    assert!(store.contains("images/holiday.jpg"));
}

#[tokio::test]
async fn upload_error_taxonomy_statuses() {
    let store = Arc::new(MemoryObjectStore::new("photos"));

    let err = process_upload(
        store.clone(),
        &LimitsConfig::default(),
        upload_request(&sample_jpeg(), "image/tiff", None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
    assert_eq!(err.status(), 400);

    let err = process_upload(
        store,
        &LimitsConfig::default(),
        UploadRequest {
            content: "%%%".to_string(),
            content_type: "image/png".to_string(),
            filename: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Invalid base64");
}
