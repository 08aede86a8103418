//! Hosted media store client
//!
//! One synchronous hand-off per operation: a single multipart upload
//! request, and a best-effort destroy. No retry, no chunking, no
//! resumability; callers surface failures and the operator tries again.

use quietcast_common::config::MediaConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const USER_AGENT: &str = "quietcast/0.1.0";
const UPLOAD_FOLDER: &str = "quietcast/audio";
const UPLOAD_TIMEOUT_SECS: u64 = 300;

/// Maximum accepted audio payload (200 MB)
pub const MAX_AUDIO_BYTES: usize = 200 * 1024 * 1024;

/// Accepted audio content types
const AUDIO_CONTENT_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/aac",
    "audio/ogg",
    "audio/flac",
];

/// Media store client errors
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media store is not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Media store error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("File size too large. Maximum size is {}MB", MAX_AUDIO_BYTES / (1024 * 1024))]
    TooLarge(usize),

    #[error("Invalid file type '{0}'. Upload MP3, WAV, AAC, OGG, or FLAC files.")]
    UnsupportedType(String),
}

/// Reference to a stored media object, attached to the episode document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    pub url: String,
    pub public_id: String,
    pub file_name: String,
    pub size: i64,
    pub duration: Option<f64>,
    pub format: Option<String>,
}

/// Upload response from the media host
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    bytes: i64,
    duration: Option<f64>,
    format: Option<String>,
}

/// Destroy response from the media host
#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Media store HTTP client
pub struct MediaClient {
    http_client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    configured: bool,
}

impl MediaClient {
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| MediaError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            configured: config.is_configured(),
        })
    }

    /// Upload an audio file, returning the media reference to attach
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<MediaRef, MediaError> {
        if !self.configured {
            return Err(MediaError::NotConfigured);
        }
        if bytes.len() > MAX_AUDIO_BYTES {
            return Err(MediaError::TooLarge(bytes.len()));
        }
        if !AUDIO_CONTENT_TYPES.contains(&content_type) {
            return Err(MediaError::UnsupportedType(content_type.to_string()));
        }

        info!(
            "Uploading audio: {} ({:.2} MB)",
            file_name,
            bytes.len() as f64 / 1024.0 / 1024.0
        );

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", UPLOAD_FOLDER), ("timestamp", &timestamp)]);

        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| MediaError::Parse(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", UPLOAD_FOLDER)
            .text("signature", signature);

        let url = format!("{}/{}/audio/upload", self.base_url, self.cloud_name);
        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Api(status.as_u16(), body));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(e.to_string()))?;

        Ok(MediaRef {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            file_name: file_name.to_string(),
            size: uploaded.bytes,
            duration: uploaded.duration,
            format: uploaded.format,
        })
    }

    /// Delete a remote media object. "not found" counts as deleted.
    pub async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        if !self.configured {
            return Err(MediaError::NotConfigured);
        }

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);

        let params = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.api_key.as_str()),
            ("signature", signature.as_str()),
        ];

        let url = format!("{}/{}/audio/destroy", self.base_url, self.cloud_name);
        let response = self
            .http_client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| MediaError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Api(status.as_u16(), body));
        }

        let destroyed: DestroyResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(e.to_string()))?;

        match destroyed.result.as_str() {
            "ok" | "not found" => {
                info!("Media object deleted: {}", public_id);
                Ok(())
            }
            other => Err(MediaError::Api(status.as_u16(), other.to_string())),
        }
    }

    /// Request signature: parameters sorted by key, joined `k=v&`, secret
    /// appended, SHA-256 hex encoded.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by_key(|(k, _)| *k);

        let joined: Vec<String> = sorted.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        let to_sign = format!("{}{}", joined.join("&"), self.api_secret);

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
