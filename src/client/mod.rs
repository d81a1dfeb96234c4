// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP client for a running OCR service
//!
//! Used by applications that hand images to the service and by the
//! `ocr-client` binary.

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::api::{ErrorResponse, HealthResponse, RecognitionResponse};

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";

/// Upper bound on a single recognition round trip
pub const RECOGNIZE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR service returned {status}: {message}")]
    Service { status: u16, message: String },
}

#[derive(Debug, Clone)]
pub struct OcrServiceClient {
    base_url: String,
    http: reqwest::Client,
}

impl OcrServiceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(RECOGNIZE_TIMEOUT)
            .user_agent(crate::version::user_agent())
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Upload a file from disk under its own filename
    pub async fn recognize_file(&self, path: &Path) -> Result<RecognitionResponse, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        self.recognize_bytes(&filename, bytes).await
    }

    /// POST /recognize with `bytes` as the `image` field
    pub async fn recognize_bytes(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<RecognitionResponse, ClientError> {
        debug!("Uploading '{}' ({} bytes) to {}", filename, bytes.len(), self.base_url);
        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("image", part);

        let response = self
            .http
            .post(format!("{}/recognize", self.base_url))
            .multipart(form)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await?;
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(ClientError::Service {
            status: status.as_u16(),
            message,
        })
    }
}
