//! Download orchestration
//!
//! One call to [`Downloader::fetch`] handles one request end to end:
//! - [`tools`] - locate yt-dlp and ffmpeg
//! - [`workspace`] - allocate, inspect and release the per-request directory
//! - [`invocation`] - build the yt-dlp argument list
//! - [`runner`] - run the child process under a timeout

pub mod invocation;
pub mod runner;
pub mod tools;
pub mod workspace;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(all(test, unix))]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(all(test, unix))]
mod tests;

pub use invocation::ToolInvocation;
pub use tools::Toolchain;
pub use workspace::{Workspace, WorkspaceBound};

use crate::config::Config;
use crate::error::{DownloadError, Error, Result};
use crate::types::DownloadRequest;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// A produced media file, still owned by its workspace
///
/// Dropping the artifact (or its `workspace` field) deletes the file.
#[derive(Debug)]
pub struct Artifact {
    /// Full path of the file inside the workspace
    pub path: PathBuf,
    /// File name as produced by the downloader
    pub file_name: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Guard that removes the workspace when dropped
    pub workspace: Workspace,
}

/// Stateless request orchestrator (cheap to clone)
#[derive(Clone, Debug)]
pub struct Downloader {
    config: Arc<Config>,
}

impl Downloader {
    /// Create a downloader over a shared configuration
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create the scratch root and, if enabled, sweep leftovers from earlier runs
    pub async fn prepare_scratch_dir(&self) -> Result<()> {
        let root = &self.config.download.scratch_dir;
        if self.config.download.purge_stale_workspaces {
            let removed = workspace::purge_stale(root).await?;
            if removed > 0 {
                info!(removed, ?root, "purged stale workspaces");
            }
        }
        tokio::fs::create_dir_all(root).await?;
        Ok(())
    }

    /// Download `request` and return the produced file
    ///
    /// On every error path the workspace has already been removed when this
    /// returns. On success the returned [`Artifact`] owns it.
    pub async fn fetch(&self, request: &DownloadRequest) -> Result<Artifact> {
        let tools = Toolchain::resolve(&self.config.tools)?;
        let url = validate_url(&request.url)?;

        let workspace = Workspace::create(&self.config.download.scratch_dir).await?;
        info!(
            workspace = %workspace.id(),
            format = %request.format,
            url = %url,
            "starting download"
        );

        match self.run_in(&workspace, request, &url, &tools).await {
            Ok((path, size_bytes)) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "download".to_string());
                info!(
                    workspace = %workspace.id(),
                    file = %file_name,
                    size_bytes,
                    "download ready"
                );
                Ok(Artifact {
                    path,
                    file_name,
                    size_bytes,
                    workspace,
                })
            }
            Err(e) => {
                warn!(workspace = %workspace.id(), error = %e, "download failed");
                workspace.remove().await;
                Err(e)
            }
        }
    }

    async fn run_in(
        &self,
        workspace: &Workspace,
        request: &DownloadRequest,
        url: &str,
        tools: &Toolchain,
    ) -> Result<(PathBuf, u64)> {
        let invocation = ToolInvocation::build(
            request,
            url,
            tools,
            &workspace.output_template(),
            self.config.tools.cookies_file.as_deref(),
        );

        runner::run(&invocation, workspace.path(), self.config.download.timeout)
            .await?
            .check()?;

        let path = workspace
            .find_artifact()
            .await?
            .ok_or_else(|| DownloadError::NoArtifact {
                workspace: workspace.path().to_path_buf(),
            })?;
        let size_bytes = tokio::fs::metadata(&path).await?.len();
        Ok((path, size_bytes))
    }
}

/// Trim `raw` and accept it only as an absolute http(s) URL
pub fn validate_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed).map_err(|_| Error::Validation("invalid URL".into()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        _ => Err(Error::Validation("invalid URL".into())),
    }
}
