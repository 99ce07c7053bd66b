// Configuration module

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::validation::MAX_UPLOAD_BYTES;

/// Top-level service configuration, loaded once at startup and passed by
/// handle into each component. No ambient mutable globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (e.g., "0.0.0.0")
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding originals and derivatives
    pub bucket: String,

    /// Host used when building public download URLs
    #[serde(default = "default_public_host")]
    pub public_host: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Endpoint override for S3-compatible stores (MinIO, localstack)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub force_path_style: bool,

    /// Static credentials; when absent the SDK default provider chain is used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Ceiling on decoded upload size in bytes (default: 10 MiB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Ceiling on raw HTTP body size in bytes (default: 32 MiB, sized to
    /// hold the base64 envelope of a maximum upload)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Upload request deadline (default: 30s)
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,

    /// Watermark request deadline (default: 120s; fetch of two objects plus
    /// CPU-bound compositing scales with image dimensions)
    #[serde(default = "default_watermark_timeout_secs")]
    pub watermark_timeout_secs: u64,
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_host() -> String {
    "firebasestorage.googleapis.com".to_string()
}

fn default_max_upload_bytes() -> usize {
    MAX_UPLOAD_BYTES
}

fn default_max_body_bytes() -> usize {
    32 * 1024 * 1024
}

fn default_upload_timeout_secs() -> u64 {
    30
}

fn default_watermark_timeout_secs() -> u64 {
    120
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            max_body_bytes: default_max_body_bytes(),
            upload_timeout_secs: default_upload_timeout_secs(),
            watermark_timeout_secs: default_watermark_timeout_secs(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(contents: &str) -> Result<Self, String> {
        let config: Config =
            serde_yaml::from_str(contents).map_err(|e| format!("invalid YAML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.storage.bucket.is_empty() {
            return Err("storage.bucket cannot be empty".to_string());
        }
        if self.storage.public_host.is_empty() {
            return Err("storage.public_host cannot be empty".to_string());
        }
        if self.server.port == 0 {
            return Err("server.port cannot be 0".to_string());
        }
        if self.limits.max_upload_bytes == 0 {
            return Err("limits.max_upload_bytes cannot be 0".to_string());
        }
        if self.limits.max_body_bytes < self.limits.max_upload_bytes {
            return Err("limits.max_body_bytes must be at least limits.max_upload_bytes".to_string());
        }
        Ok(())
    }
}
