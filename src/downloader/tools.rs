//! Location of the external downloader (yt-dlp) and transcoder (ffmpeg)

use crate::config::ToolsConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Resolved paths to both required executables
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toolchain {
    /// yt-dlp executable
    pub ytdlp: PathBuf,
    /// ffmpeg executable
    pub ffmpeg: PathBuf,
}

impl Toolchain {
    /// Resolve both tools, failing on the first one that cannot be found
    ///
    /// Each tool is looked up as: explicit path, then `<bin_dir>/<name>`, then
    /// PATH (when `search_path` is enabled). An explicit path that does not
    /// exist is an error on its own; it never falls through to the other
    /// locations.
    pub fn resolve(config: &ToolsConfig) -> Result<Self> {
        Ok(Self {
            ytdlp: locate("yt-dlp", config.ytdlp_path.as_deref(), config)?,
            ffmpeg: locate("ffmpeg", config.ffmpeg_path.as_deref(), config)?,
        })
    }
}

fn locate(tool: &'static str, explicit: Option<&Path>, config: &ToolsConfig) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::MissingTool {
            tool,
            searched: path.display().to_string(),
        });
    }

    let bundled = config.bin_dir.join(executable_name(tool));
    if bundled.is_file() {
        return Ok(bundled);
    }

    if config.search_path
        && let Ok(found) = which::which(tool)
    {
        tracing::debug!(tool, path = ?found, "using tool from PATH");
        return Ok(found);
    }

    let mut searched = bundled.display().to_string();
    if config.search_path {
        searched.push_str(", PATH");
    }
    Err(Error::MissingTool { tool, searched })
}

fn executable_name(base: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", base)
    } else {
        base.to_string()
    }
}
