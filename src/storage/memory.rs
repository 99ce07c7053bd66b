//! In-memory object store for tests and local development.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{paths, public_object_url, ObjectStore, StorageError};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
    token: String,
}

/// Map-backed [`ObjectStore`] with the same put/get contract as the S3
/// backend, including per-put download tokens and public URLs.
pub struct MemoryObjectStore {
    bucket: String,
    public_host: String,
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            public_host: "storage.local".to_string(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Whether an object exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().contains_key(path)
    }

    /// Content type recorded for the object at `path`, if present.
    pub fn content_type_of(&self, path: &str) -> Option<String> {
        self.objects
            .lock()
            .get(path)
            .map(|o| o.content_type.clone())
    }

    /// Download token recorded for the object at `path`, if present.
    pub fn token_of(&self, path: &str) -> Option<String> {
        self.objects.lock().get(path).map(|o| o.token.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .lock()
            .get(path)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_string(),
            })
    }

    async fn put(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let token = paths::download_token();
        self.objects.lock().insert(
            path.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                token: token.clone(),
            },
        );
        Ok(public_object_url(
            &self.public_host,
            &self.bucket,
            path,
            &token,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let store = MemoryObjectStore::new("test-bucket");
        let data = vec![1u8, 2, 3, 4];

        store
            .put("images/a.bin", data.clone(), "application/octet-stream")
            .await
            .unwrap();

        let fetched = store.get("images/a.bin").await.unwrap();
        assert_eq!(fetched, data);
        assert_eq!(
            store.content_type_of("images/a.bin").as_deref(),
            Some("application/octet-stream")
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryObjectStore::new("test-bucket");
        let err = store.get("images/missing.png").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_put_url_embeds_fresh_token() {
        let store = MemoryObjectStore::new("test-bucket");

        let url = store.put("images/a.png", vec![0u8], "image/png").await.unwrap();
        let token = store.token_of("images/a.png").unwrap();
        assert_eq!(
            url,
            format!(
                "https://storage.local/v0/b/test-bucket/o/images%2Fa.png?alt=media&token={}",
                token
            )
        );

        // Overwriting mints a new token
        store.put("images/a.png", vec![1u8], "image/png").await.unwrap();
        assert_ne!(store.token_of("images/a.png").unwrap(), token);
    }
}
