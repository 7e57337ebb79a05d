//! Per-request scratch directories
//!
//! A [`Workspace`] owns one directory under the scratch root. Dropping it
//! removes the directory, so it can ride along inside a response body and be
//! released only after the last byte is sent. Early-return paths call
//! [`Workspace::remove`] to clean up asynchronously instead.

use crate::error::Result;
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::SystemTime;
use tracing::{debug, warn};
use uuid::Uuid;

/// yt-dlp output template, relative to the workspace
pub const OUTPUT_TEMPLATE: &str = "%(title).80s-%(id)s.%(ext)s";

/// Extensions yt-dlp uses for in-progress and bookkeeping files
const PARTIAL_EXTENSIONS: &[&str] = &["part", "ytdl"];

/// Exclusively owned scratch directory for one download request
#[derive(Debug)]
pub struct Workspace {
    id: Uuid,
    path: PathBuf,
    armed: bool,
}

impl Workspace {
    /// Create a fresh, uniquely named directory under `root`
    pub async fn create(root: &Path) -> Result<Self> {
        let id = Uuid::new_v4();
        let path = root.join(id.to_string());
        tokio::fs::create_dir_all(&path).await?;
        debug!(workspace = %id, ?path, "created workspace");
        Ok(Self {
            id,
            path,
            armed: true,
        })
    }

    /// Workspace identifier (also the directory name)
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Output template that keeps every produced file inside this workspace
    pub fn output_template(&self) -> PathBuf {
        self.path.join(OUTPUT_TEMPLATE)
    }

    /// Most recently modified finished file, ignoring partial downloads
    pub async fn find_artifact(&self) -> Result<Option<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.path).await?;
        let mut newest: Option<(PathBuf, SystemTime)> = None;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            if is_partial(&path) {
                continue;
            }
            let modified = entry.metadata().await?.modified()?;
            match &newest {
                Some((_, best)) if *best >= modified => {}
                _ => newest = Some((path, modified)),
            }
        }

        Ok(newest.map(|(path, _)| path))
    }

    /// Remove the directory now; failures are logged, never returned
    pub async fn remove(mut self) {
        self.armed = false;
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => debug!(workspace = %self.id, "removed workspace"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(workspace = %self.id, path = ?self.path, error = %e, "failed to remove workspace")
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let id = self.id;
        let path = std::mem::take(&mut self.path);
        // Large artifacts make removal slow; keep it off the async workers
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || release(id, &path));
            }
            Err(_) => release(id, &path),
        }
    }
}

fn release(id: Uuid, path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => debug!(workspace = %id, "released workspace"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(workspace = %id, ?path, error = %e, "failed to release workspace")
        }
    }
}

/// Poll until `path` is gone, for releases that happen off-thread
#[cfg(test)]
pub(crate) async fn wait_until_removed(path: &Path) -> bool {
    for _ in 0..100 {
        if !path.exists() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    false
}

/// Stream adapter that keeps a [`Workspace`] alive until the stream is dropped
///
/// Used for response bodies: the directory disappears once the body has been
/// fully sent or the client disconnects.
pub struct WorkspaceBound<S> {
    inner: S,
    _workspace: Workspace,
}

impl<S> WorkspaceBound<S> {
    /// Tie `workspace` to the lifetime of `inner`
    pub fn new(inner: S, workspace: Workspace) -> Self {
        Self {
            inner,
            _workspace: workspace,
        }
    }
}

impl<S: Stream + Unpin> Stream for WorkspaceBound<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

fn is_workspace_name(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|name| Uuid::parse_str(name).is_ok())
}

fn is_partial(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| PARTIAL_EXTENSIONS.contains(&ext))
}

/// Remove every workspace directory left under `root` by an earlier process
///
/// Only directories named like a workspace (a UUID) are touched, so a scratch
/// root shared with other data is safe. Only call this before the server
/// starts accepting requests; live workspaces are not distinguished from
/// stale ones.
pub async fn purge_stale(root: &Path) -> Result<usize> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() || !is_workspace_name(&entry.file_name()) {
            continue;
        }
        let path = entry.path();
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => removed += 1,
            Err(e) => warn!(?path, error = %e, "failed to purge stale workspace"),
        }
    }

    Ok(removed)
}
