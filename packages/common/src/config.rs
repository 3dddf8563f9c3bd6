use serde::Deserialize;

/// Object-store backend that uploaded photos are written to.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Google Cloud Storage JSON API, authenticated with a service-account key.
    #[default]
    Gcs,
    /// Any S3-compatible endpoint (GCS interoperability mode, MinIO, AWS).
    S3,
    /// In-process map. Blobs are lost on restart.
    Memory,
}

/// Connection settings for the `s3` backend.
#[derive(Debug, Deserialize, Clone)]
pub struct S3AppConfig {
    /// Endpoint URL, e.g. "https://storage.googleapis.com" or "http://localhost:9000".
    pub endpoint: String,
    #[serde(default = "default_s3_region")]
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Address buckets as `{endpoint}/{bucket}` instead of `{bucket}.{endpoint}`.
    #[serde(default = "default_path_style")]
    pub path_style: bool,
}

/// App-level object storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Bucket that receives every upload. Default: "rewaste-bucket-capstone".
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Base of the public object URLs handed back to clients.
    /// Default: "https://storage.googleapis.com".
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Base of the GCS JSON API. Only overridden for emulators.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// JSON-encoded service-account key. Required by the `gcs` backend.
    #[serde(default)]
    pub service_account_key: Option<String>,
    #[serde(default)]
    pub s3: Option<S3AppConfig>,
}

fn default_s3_region() -> String {
    "auto".into()
}
fn default_path_style() -> bool {
    true
}
fn default_bucket() -> String {
    "rewaste-bucket-capstone".into()
}
fn default_public_base_url() -> String {
    "https://storage.googleapis.com".into()
}
fn default_api_base_url() -> String {
    "https://storage.googleapis.com".into()
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: default_bucket(),
            public_base_url: default_public_base_url(),
            api_base_url: default_api_base_url(),
            service_account_key: None,
            s3: None,
        }
    }
}
