//! Parser client — the only place that talks to the résumé parsing API.
//!
//! Uploads go out as multipart with a single `file` part. The body is streamed
//! in chunks so the caller can observe upload progress.

use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::AppError;
use crate::models::cv::ParsedCv;
use crate::models::file::SelectedFile;

const UPLOAD_CHUNK_SIZE: usize = 16 * 1024;

/// Body of a 2xx reply from `POST /parse-cv`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParseCvResponse {
    #[serde(default)]
    pub success: bool,
    pub data: Option<ParsedCv>,
    /// Which extraction path the backend used ("cohere" or "regex").
    pub method: Option<String>,
    pub error: Option<String>,
}

impl ParseCvResponse {
    /// The parsed résumé, only when the backend reported success.
    pub fn parsed(&self) -> Option<&ParsedCv> {
        if self.success {
            self.data.as_ref()
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub cohere_available: bool,
}

/// `GET /config`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub cohere_configured: bool,
    #[serde(default)]
    pub cohere_available: bool,
}

#[derive(Clone)]
pub struct ParserClient {
    client: Client,
    api_base: String,
}

impl ParserClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    /// Uploads `file` for parsing. `on_progress(sent, total)` is called as each
    /// chunk of the body is handed to the transport.
    ///
    /// Non-2xx replies become `AppError::Api` carrying the body's `error` field.
    /// A 2xx reply is returned as-is, whatever its `success` flag says.
    pub async fn parse_cv<F>(
        &self,
        file: &SelectedFile,
        on_progress: F,
    ) -> Result<ParseCvResponse, AppError>
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        info!(file = %file.name, bytes = file.len(), "Uploading résumé for parsing");

        let body = progress_body(file.bytes.clone(), on_progress);
        let part = Part::stream_with_length(body, file.len())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("parse-cv"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error);
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ParseCvResponse = serde_json::from_slice(&body)?;
        debug!(
            success = parsed.success,
            method = parsed.method.as_deref().unwrap_or("unknown"),
            "Parser responded"
        );
        Ok(parsed)
    }

    pub async fn health(&self) -> Result<HealthStatus, AppError> {
        self.get_json("health").await
    }

    pub async fn backend_config(&self) -> Result<BackendConfig, AppError> {
        self.get_json("config").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error);
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Wraps the file bytes in a chunked stream that reports cumulative bytes sent.
fn progress_body<F>(bytes: Bytes, on_progress: F) -> Body
where
    F: Fn(u64, u64) + Send + Sync + 'static,
{
    let total = bytes.len() as u64;
    let chunks: Vec<Bytes> = (0..bytes.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| bytes.slice(start..(start + UPLOAD_CHUNK_SIZE).min(bytes.len())))
        .collect();

    let mut sent = 0u64;
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        on_progress(sent, total);
        Ok::<Bytes, std::io::Error>(chunk)
    });
    Body::wrap_stream(stream)
}
