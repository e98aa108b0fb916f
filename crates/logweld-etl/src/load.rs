//! Artifact output: local JSON files and best-effort object-storage upload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use logweld_core::config::{Destination, UploadConfig};

use crate::EtlError;

/// Writes artifacts as pretty-printed JSON under an output directory.
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    /// # Errors
    ///
    /// Returns [`EtlError::ArtifactIo`] if the output directory cannot be
    /// created.
    pub fn new(output_dir: &Path) -> Result<Self, EtlError> {
        std::fs::create_dir_all(output_dir).map_err(|e| EtlError::ArtifactIo {
            path: output_dir.display().to_string(),
            source: e,
        })?;
        Ok(ArtifactWriter {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Writes `{name}.json` and returns its path.
    ///
    /// # Errors
    ///
    /// [`EtlError::ArtifactSerialize`] or [`EtlError::ArtifactIo`] — output
    /// failures are fatal, unlike uploads.
    pub fn write<T: Serialize>(&self, name: &str, data: &T) -> Result<PathBuf, EtlError> {
        let body = serialize_artifact(name, data)?;
        self.write_raw(name, &body)
    }

    /// Writes an already-serialized body as `{name}.json`.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::ArtifactIo`] on write failure.
    pub fn write_raw(&self, name: &str, body: &str) -> Result<PathBuf, EtlError> {
        let path = self.output_dir.join(format!("{name}.json"));
        std::fs::write(&path, body).map_err(|e| EtlError::ArtifactIo {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "artifact written");
        Ok(path)
    }
}

/// Renders one artifact as pretty JSON.
///
/// # Errors
///
/// Returns [`EtlError::ArtifactSerialize`] if the value cannot be rendered.
pub fn serialize_artifact<T: Serialize>(name: &str, data: &T) -> Result<String, EtlError> {
    serde_json::to_string_pretty(data).map_err(|e| EtlError::ArtifactSerialize {
        name: name.to_owned(),
        source: e,
    })
}

/// Best-effort uploader to an object-storage bucket over HTTP PUT.
///
/// Upload failures are logged and swallowed — the local artifacts are the
/// source of truth and a storage outage must not fail the run.
pub struct Uploader {
    client: reqwest::Client,
    endpoint: String,
    destination: Destination,
}

impl Uploader {
    /// # Errors
    ///
    /// Returns [`EtlError::ApiSetup`] if the HTTP client cannot be built.
    pub fn from_config(config: &UploadConfig) -> Result<Self, EtlError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("logweld/0.1 (batch-etl)")
            .build()
            .map_err(logweld_api::ApiError::Http)?;
        let endpoint = config.endpoint.clone().unwrap_or_else(|| {
            format!("https://{}.s3.{}.amazonaws.com", config.bucket, config.region)
        });
        Ok(Uploader {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            destination: config.destination,
        })
    }

    #[must_use]
    pub fn writes_locally(&self) -> bool {
        matches!(self.destination, Destination::Local | Destination::Both)
    }

    #[must_use]
    pub fn uploads_remotely(&self) -> bool {
        matches!(self.destination, Destination::Remote | Destination::Both)
    }

    /// PUTs one artifact body to `{endpoint}/{key}`. Never fails the run.
    pub async fn upload(&self, key: &str, body: String) {
        let url = format!("{}/{key}", self.endpoint);
        let result = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(key, url, "artifact uploaded");
            }
            Ok(response) => {
                tracing::error!(
                    key,
                    url,
                    status = response.status().as_u16(),
                    "artifact upload rejected"
                );
            }
            Err(e) => {
                tracing::error!(key, url, error = %e, "artifact upload failed");
            }
        }
    }
}
