//! # Enclave Client
//!
//! Thin async wrapper over the enclave HTTP API.
//!
//! ## Endpoints
//!
//! | Operation           | Method | Path                      |
//! |---------------------|--------|---------------------------|
//! | `list_files`        | GET    | `api/v1/data/files`       |
//! | `download_file`     | GET    | `api/v1/data/file`        |
//! | `post_log`          | POST   | `api/v1/log`              |
//! | `post_report`       | POST   | `api/v1/report`           |
//! | `validate_report`   | POST   | `api/v1/report/validate`  |
//!
//! Paths are joined onto the configured base URL, so an enclave mounted under a
//! prefix (`https://host/enclave/`) works unchanged.
//!
//! ## SAS URL
//!
//! Inside the sandbox the data endpoints need a shared-access-signature URL.
//! It is passed in plain text and sent base64-encoded as the `sas_url` query
//! parameter.

use base64::{engine::general_purpose, Engine as _};
use log::debug;
use reqwest::{Response, Url};
use std::time::Duration;

use super::models::{ApiMessage, FileList, LogData, Report, ValidationOutcome};
use crate::common::config::EnclaveConfig;
use crate::common::error::EnclaveError;

pub const FILES_PATH: &str = "api/v1/data/files";
pub const FILE_PATH: &str = "api/v1/data/file";
pub const LOG_PATH: &str = "api/v1/log";
pub const REPORT_PATH: &str = "api/v1/report";
pub const VALIDATE_PATH: &str = "api/v1/report/validate";

/// Client for one enclave.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct EnclaveClient {
    base_url: Url,
    http: reqwest::Client,
}

impl EnclaveClient {
    /// Build a client from the enclave section of the configuration.
    ///
    /// # Errors
    /// - The URL does not parse or cannot serve as a base
    /// - The TLS backend fails to initialize
    pub fn new(config: &EnclaveConfig) -> Result<Self, EnclaveError> {
        let base_url = parse_base_url(&config.url)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(EnclaveError::Client)?;

        Ok(Self { base_url, http })
    }

    /// Base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List the files in the data container.
    pub async fn list_files(&self, sas_url: Option<&str>) -> Result<FileList, EnclaveError> {
        let url = self.endpoint(FILES_PATH)?;
        let request = self.http.get(url).query(&sas_query(sas_url));

        let response = send(FILES_PATH, request).await?;
        response.json().await.map_err(|source| EnclaveError::Transport {
            endpoint: FILES_PATH.to_string(),
            source,
        })
    }

    /// Download and decrypt one file, given the `name` from [`list_files`](Self::list_files).
    pub async fn download_file(
        &self,
        file_name: &str,
        sas_url: Option<&str>,
    ) -> Result<Vec<u8>, EnclaveError> {
        let url = self.endpoint(FILE_PATH)?;
        let mut query = vec![("file_name", file_name.to_string())];
        query.extend(sas_query(sas_url));
        let request = self.http.get(url).query(&query);

        let response = send(FILE_PATH, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| EnclaveError::Transport {
                endpoint: FILE_PATH.to_string(),
                source,
            })?;

        debug!("Downloaded {} ({} bytes)", file_name, bytes.len());
        Ok(bytes.to_vec())
    }

    /// Post a progress message to the enclave log.
    pub async fn post_log(&self, log: &LogData) -> Result<ApiMessage, EnclaveError> {
        let url = self.endpoint(LOG_PATH)?;
        let response = send(LOG_PATH, self.http.post(url).json(log)).await?;
        read_message(LOG_PATH, response).await
    }

    /// Post a final report. The enclave validates it against the attached schema.
    pub async fn post_report(&self, report: &Report) -> Result<ApiMessage, EnclaveError> {
        let url = self.endpoint(REPORT_PATH)?;
        let response = send(REPORT_PATH, self.http.post(url).json(report)).await?;
        read_message(REPORT_PATH, response).await
    }

    /// Ask the enclave whether `report` would be accepted, without posting it.
    pub async fn validate_report(&self, report: &Report) -> Result<ValidationOutcome, EnclaveError> {
        let url = self.endpoint(VALIDATE_PATH)?;
        let response = send(VALIDATE_PATH, self.http.post(url).json(report)).await?;
        response.json().await.map_err(|source| EnclaveError::Transport {
            endpoint: VALIDATE_PATH.to_string(),
            source,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, EnclaveError> {
        self.base_url
            .join(path)
            .map_err(|e| EnclaveError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                reason: e.to_string(),
            })
    }
}

/// Parse the configured URL, forcing a trailing slash so `join` appends
/// instead of replacing the last path segment.
fn parse_base_url(raw: &str) -> Result<Url, EnclaveError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    let url = Url::parse(&normalized).map_err(|e| EnclaveError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(EnclaveError::InvalidUrl {
            url: raw.to_string(),
            reason: "not a base url".to_string(),
        });
    }

    Ok(url)
}

/// Base64-encode a SAS URL for the `sas_url` query parameter.
pub fn encode_sas_url(sas_url: &str) -> String {
    general_purpose::STANDARD.encode(sas_url.as_bytes())
}

fn sas_query(sas_url: Option<&str>) -> Vec<(&'static str, String)> {
    sas_url
        .map(|sas| vec![("sas_url", encode_sas_url(sas))])
        .unwrap_or_default()
}

async fn send(endpoint: &str, request: reqwest::RequestBuilder) -> Result<Response, EnclaveError> {
    let response = request
        .send()
        .await
        .map_err(|source| EnclaveError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(EnclaveError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}

/// Acknowledgement bodies vary between enclave versions: JSON, plain text or
/// nothing at all.
async fn read_message(endpoint: &str, response: Response) -> Result<ApiMessage, EnclaveError> {
    let text = response
        .text()
        .await
        .map_err(|source| EnclaveError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

    Ok(parse_message(&text))
}

fn parse_message(text: &str) -> ApiMessage {
    if text.trim().is_empty() {
        return ApiMessage::default();
    }
    serde_json::from_str(text).unwrap_or_else(|_| ApiMessage {
        message: Some(text.to_string()),
        status: None,
    })
}
