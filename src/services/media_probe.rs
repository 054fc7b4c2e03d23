use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};
use url::Url;

use crate::config::IntegrationConfig;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Invalid download URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to download file: {0}")]
    Download(#[from] reqwest::Error),

    #[error("Failed to stage file: {0}")]
    Io(#[from] std::io::Error),

    #[error("ffprobe failed: {0}")]
    Probe(String),

    #[error("Unreadable ffprobe output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Downloads a Drive file to a temporary location and reads its container metadata with ffprobe.
///
/// The staged file is removed when the call returns, whatever the outcome.
#[derive(Clone)]
pub struct MediaProbe {
    client: reqwest::Client,
    download_url: String,
    ffprobe_path: String,
    temp_dir: PathBuf,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    tags: Option<ProbeTags>,
}

#[derive(Debug, Deserialize)]
struct ProbeTags {
    creation_time: Option<String>,
}

impl MediaProbe {
    pub fn new(
        download_url: impl Into<String>,
        ffprobe_path: impl Into<String>,
        temp_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            download_url: download_url.into(),
            ffprobe_path: ffprobe_path.into(),
            temp_dir: temp_dir.into(),
            timeout,
        })
    }

    pub fn from_config(config: &IntegrationConfig) -> Result<Self, MediaError> {
        Self::new(
            config.drive_download_url.clone(),
            config.ffprobe_path.clone(),
            config.media_temp_dir.clone(),
            Duration::from_secs(config.outbound_timeout_secs),
        )
    }

    /// Creation timestamp recorded in the container, if any
    pub async fn creation_time(&self, file_id: &str, access_token: &str) -> Result<Option<String>, MediaError> {
        let staged = tempfile::Builder::new()
            .prefix("probe-")
            .suffix(".tmp")
            .tempfile_in(&self.temp_dir)?;

        self.download(file_id, access_token, &staged).await?;
        let creation_time = self.probe(staged.path()).await?;

        debug!("Probed file {}: creation_time={:?}", file_id, creation_time);
        Ok(creation_time)
    }

    fn file_url(&self, file_id: &str) -> Result<Url, MediaError> {
        let mut url = Url::parse(&self.download_url).map_err(|e| MediaError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| MediaError::InvalidUrl(self.download_url.clone()))?
            .pop_if_empty()
            .push(file_id);
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }

    async fn download(&self, file_id: &str, access_token: &str, staged: &NamedTempFile) -> Result<(), MediaError> {
        let url = self.file_url(file_id)?;
        let mut response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?;

        let mut file = tokio::fs::File::from_std(staged.reopen()?);
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;

        debug!("Downloaded {} bytes for file {}", written, file_id);
        Ok(())
    }

    /// Run ffprobe on `path`. A run longer than the configured timeout is killed.
    async fn probe(&self, path: &Path) -> Result<Option<String>, MediaError> {
        let run = Command::new(&self.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| {
                warn!("ffprobe did not finish within {:?}", self.timeout);
                MediaError::Probe(format!("timed out after {}s", self.timeout.as_secs()))
            })?
            .map_err(|e| MediaError::Probe(format!("could not run {}: {}", self.ffprobe_path, e)))?;

        if !output.status.success() {
            warn!("ffprobe exited with {}", output.status);
            return Err(MediaError::Probe(format!("exited with {}", output.status)));
        }

        parse_creation_time(&output.stdout)
    }
}

/// Extract `format.tags.creation_time` from ffprobe JSON output
pub fn parse_creation_time(stdout: &[u8]) -> Result<Option<String>, MediaError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)?;
    Ok(output
        .format
        .and_then(|format| format.tags)
        .and_then(|tags| tags.creation_time))
}
