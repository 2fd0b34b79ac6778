// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-limited download URLs for artifacts in Google Cloud Storage.
//!
//! URLs are V4 signed with an HMAC key (`GOOG4-HMAC-SHA256`). Raw contents
//! are fetched through a freshly signed URL. Compressed archives are not
//! unpacked; artifacts read for their contents must be stored uncompressed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_STORAGE_HOST: &str = "storage.googleapis.com";

/// How long a generated URL stays valid
pub const SIGNED_URL_LIFETIME: Duration = Duration::from_secs(10 * 60);

const ALGORITHM: &str = "GOOG4-HMAC-SHA256";

/// Errors from artifact storage operations
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("artifact storage is not configured")]
    Disabled,
    #[error("invalid signing key: {0}")]
    Key(String),
    #[error("artifact request failed: {0}")]
    Request(String),
    #[error("artifact gs://{bucket}/{key} is a compressed archive")]
    Compressed { bucket: String, key: String },
}

/// Adapter for artifact downloads
#[async_trait]
pub trait UrlSigner: Send + Sync + 'static {
    /// Signed GET URL for the object
    fn generate(&self, bucket: &str, key: &str) -> Result<String, SignerError>;

    /// Raw contents of the object
    async fn contents(&self, bucket: &str, key: &str) -> Result<Vec<u8>, SignerError>;
}

/// V4 HMAC signer for Cloud Storage
#[derive(Clone)]
pub struct GcsSigner {
    access_id: String,
    secret: String,
    host: String,
    http: reqwest::Client,
}

impl GcsSigner {
    pub fn new(
        access_id: &str,
        secret: &str,
        host: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, SignerError> {
        if access_id.is_empty() || secret.is_empty() {
            return Err(SignerError::Key("access id and secret must both be set".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SignerError::Request(e.to_string()))?;
        Ok(Self {
            access_id: access_id.to_string(),
            secret: secret.to_string(),
            host: host.filter(|host| !host.is_empty()).unwrap_or(DEFAULT_STORAGE_HOST).to_string(),
            http,
        })
    }

    /// Sign a GET of `bucket/key` as of `now`.
    pub fn sign_at(
        &self,
        bucket: &str,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<String, SignerError> {
        let datetime = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{date}/auto/storage/goog4_request");
        let path = canonical_path(bucket, key);

        // Already sorted by name
        let query = [
            ("X-Goog-Algorithm", ALGORITHM.to_string()),
            ("X-Goog-Credential", format!("{}/{}", self.access_id, scope)),
            ("X-Goog-Date", datetime.clone()),
            ("X-Goog-Expires", SIGNED_URL_LIFETIME.as_secs().to_string()),
            ("X-Goog-SignedHeaders", "host".to_string()),
        ]
        .iter()
        .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

        let canonical_request =
            format!("GET\n{path}\n{query}\nhost:{}\n\nhost\nUNSIGNED-PAYLOAD", self.host);
        let string_to_sign = format!(
            "{ALGORITHM}\n{datetime}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let mut signing_key = format!("GOOG4{}", self.secret).into_bytes();
        for part in [date.as_str(), "auto", "storage", "goog4_request"] {
            signing_key = hmac_sha256(&signing_key, part.as_bytes())?;
        }
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        Ok(format!("https://{}{path}?{query}&X-Goog-Signature={signature}", self.host))
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SignerError> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).map_err(|e| SignerError::Key(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// `/bucket/key` with each key segment percent-encoded
fn canonical_path(bucket: &str, key: &str) -> String {
    let key = key.split('/').map(urlencoding::encode).collect::<Vec<_>>();
    format!("/{}/{}", urlencoding::encode(bucket), key.join("/"))
}

#[async_trait]
impl UrlSigner for GcsSigner {
    fn generate(&self, bucket: &str, key: &str) -> Result<String, SignerError> {
        self.sign_at(bucket, key, Utc::now())
    }

    async fn contents(&self, bucket: &str, key: &str) -> Result<Vec<u8>, SignerError> {
        let url = self.generate(bucket, key)?;
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| SignerError::Request(e.to_string()))?;

        let compressed = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|content_type| content_type.contains("gzip"));
        if compressed {
            let (bucket, key) = (bucket.to_string(), key.to_string());
            return Err(SignerError::Compressed { bucket, key });
        }

        let body = response.bytes().await.map_err(|e| SignerError::Request(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// Signer used when no storage credentials are configured
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledSigner;

#[async_trait]
impl UrlSigner for DisabledSigner {
    fn generate(&self, _bucket: &str, _key: &str) -> Result<String, SignerError> {
        Err(SignerError::Disabled)
    }

    async fn contents(&self, _bucket: &str, _key: &str) -> Result<Vec<u8>, SignerError> {
        Err(SignerError::Disabled)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{SignerError, UrlSigner};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeSignerState {
        objects: HashMap<(String, String), Vec<u8>>,
        signed: Vec<(String, String)>,
        fail: bool,
    }

    /// Fake signer serving objects from memory
    #[derive(Clone, Default)]
    pub struct FakeSigner {
        inner: Arc<Mutex<FakeSignerState>>,
    }

    impl FakeSigner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn put(&self, bucket: &str, key: &str, contents: &str) {
            self.inner
                .lock()
                .objects
                .insert((bucket.to_string(), key.to_string()), contents.as_bytes().to_vec());
        }

        pub fn fail(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }

        /// `(bucket, key)` pairs a URL was generated for
        pub fn signed(&self) -> Vec<(String, String)> {
            self.inner.lock().signed.clone()
        }
    }

    #[async_trait]
    impl UrlSigner for FakeSigner {
        fn generate(&self, bucket: &str, key: &str) -> Result<String, SignerError> {
            let mut state = self.inner.lock();
            if state.fail {
                return Err(SignerError::Request("injected signing failure".to_string()));
            }
            state.signed.push((bucket.to_string(), key.to_string()));
            Ok(format!("https://storage.test/{bucket}/{key}?signature=fake"))
        }

        async fn contents(&self, bucket: &str, key: &str) -> Result<Vec<u8>, SignerError> {
            let state = self.inner.lock();
            if state.fail {
                return Err(SignerError::Request("injected read failure".to_string()));
            }
            state
                .objects
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
                .ok_or_else(|| SignerError::Request(format!("gs://{bucket}/{key}: 404 Not Found")))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSigner;

#[cfg(test)]
#[path = "signer_tests.rs"]
mod tests;
