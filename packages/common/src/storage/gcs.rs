//! Google Cloud Storage backend over the JSON API.
//!
//! Authenticates with a service-account key using the OAuth 2.0 JWT-bearer
//! grant. Access tokens are cached until shortly before they expire.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::error::StorageError;
use super::traits::ObjectStore;

const SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// The fields of a service-account key file this backend needs.
#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

#[derive(Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

pub struct GcsObjectStore {
    client: reqwest::Client,
    bucket: String,
    api_base_url: String,
    public_base_url: String,
    client_email: String,
    token_uri: String,
    signing_key: EncodingKey,
    token: Mutex<Option<CachedToken>>,
}

impl GcsObjectStore {
    /// Build the backend from a JSON-encoded service-account key.
    ///
    /// Fails if the JSON or the embedded RSA key cannot be parsed.
    pub fn from_service_account_json(
        json: &str,
        bucket: &str,
        api_base_url: &str,
        public_base_url: &str,
    ) -> Result<Self, StorageError> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| StorageError::Config(format!("invalid service account key: {e}")))?;
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| StorageError::Config(format!("invalid service account private key: {e}")))?;

        Ok(Self {
            client: reqwest::Client::new(),
            bucket: bucket.to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            public_base_url: public_base_url.to_string(),
            client_email: key.client_email,
            token_uri: key.token_uri,
            signing_key,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, StorageError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }

        let fresh = self.fetch_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<CachedToken, StorageError> {
        let iat = Utc::now().timestamp();
        let claims = GrantClaims {
            iss: &self.client_email,
            scope: SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| StorageError::Auth(format!("failed to sign grant: {e}")))?;

        let res = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(StorageError::Auth(format!("token endpoint returned {status}: {body}")));
        }

        let token: TokenResponse = res.json().await?;
        debug!(expires_in = token.expires_in, "Obtained object store access token");

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        Ok(CachedToken {
            value: token.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}

async fn rejected(operation: &'static str, key: &str, res: reqwest::Response) -> StorageError {
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    StorageError::Rejected {
        operation,
        key: key.to_string(),
        status,
        body,
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let token = self.access_token().await?;
        let url = format!("{}/upload/storage/v1/b/{}/o", self.api_base_url, self.bucket);

        let res = self
            .client
            .post(url)
            .bearer_auth(token)
            .query(&[("uploadType", "media"), ("name", key)])
            .header(CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(rejected("upload", key, res).await);
        }
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<bool, StorageError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.api_base_url, self.bucket, key
        );

        let res = self.client.delete(url).bearer_auth(token).send().await?;

        match res.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(rejected("delete", key, res).await),
        }
    }
}
