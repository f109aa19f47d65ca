use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::models::{RecognitionResult, StatusResponse, UploadRequest};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Filename sent with every upload, whatever the local file is called
pub const UPLOAD_FILENAME: &str = "test_image.jpg";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout(e)
        } else {
            ClientError::Network(e)
        }
    }
}

/// One-shot uploader for `/api/recognize`. No retries.
pub struct RecognitionClient {
    http: reqwest::Client,
    base_url: String,
}

impl RecognitionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn submit(&self, image_path: &Path) -> Result<RecognitionResult, ClientError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|source| ClientError::Io {
                path: image_path.to_path_buf(),
                source,
            })?;

        let payload = UploadRequest {
            filename: UPLOAD_FILENAME.to_string(),
            image: STANDARD.encode(&bytes),
        };

        tracing::debug!(
            "Uploading {} ({} bytes, {} base64 chars)",
            image_path.display(),
            bytes.len(),
            payload.image.len()
        );

        let response = self
            .http
            .post(format!("{}/api/recognize", self.base_url))
            .json(&payload)
            .send()
            .await?;

        Self::parse(response).await
    }

    pub async fn status(&self) -> Result<StatusResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/status", self.base_url))
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await?;
            return Err(ClientError::Status { status, body });
        }
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(e)
            } else {
                ClientError::Decode(e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = RecognitionClient::new("http://localhost:5000/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn test_submit_missing_file() {
        let client = RecognitionClient::new(DEFAULT_SERVER_URL, DEFAULT_TIMEOUT).unwrap();
        let err = client
            .submit(Path::new("/definitely/not/here.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Io { .. }));
    }
}
