pub mod config;
pub mod storage;

pub use config::{S3AppConfig, StorageAppConfig, StorageBackend};
