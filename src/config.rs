//! Configuration types for media-dl
//!
//! The configuration is built once at startup (usually with
//! [`Config::from_env`]) and shared read-only behind an `Arc`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// External toolchain locations (yt-dlp and ffmpeg)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Directory holding the bundled executables (default: "./bin")
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,

    /// Explicit path to the yt-dlp executable (overrides `bin_dir`)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Explicit path to the ffmpeg executable (overrides `bin_dir`)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Netscape-format cookies file handed to yt-dlp
    #[serde(default)]
    pub cookies_file: Option<PathBuf>,

    /// Whether to search PATH when a tool is missing from `bin_dir` (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            bin_dir: default_bin_dir(),
            ytdlp_path: None,
            ffmpeg_path: None,
            cookies_file: None,
            search_path: true,
        }
    }
}

/// Per-request download behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Root under which per-request workspaces are created (default: "./tmp_downloads")
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Wall-clock limit for one downloader run, in seconds (default: 600)
    #[serde(default = "default_download_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Remove workspaces left behind by a previous process on startup (default: true)
    #[serde(default = "default_true")]
    pub purge_stale_workspaces: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            timeout: default_download_timeout(),
            purge_stale_workspaces: true,
        }
    }
}

/// Optional status store location
///
/// The store is considered configured only when both fields are present.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Directory holding the database file
    #[serde(default)]
    pub database_url: Option<PathBuf>,

    /// Database name (file stem)
    #[serde(default)]
    pub database_name: Option<String>,
}

impl PersistenceConfig {
    /// Full path of the SQLite file, or `None` when the store is unconfigured
    pub fn database_path(&self) -> Option<PathBuf> {
        match (&self.database_url, &self.database_name) {
            (Some(dir), Some(name)) if !name.trim().is_empty() => {
                Some(dir.join(format!("{}.db", name.trim())))
            }
            _ => None,
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:8000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
        }
    }
}

/// Main configuration for the media-dl service
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// External executables
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Workspace and timeout settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Optional status store
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ApiConfig,
}

impl Config {
    /// Build the configuration from process environment variables
    ///
    /// Recognized variables: `BIND_ADDRESS`, `PORT`, `CORS_ORIGINS`, `CORS_ORIGIN`,
    /// `BIN_DIR`, `YTDLP_PATH`, `FFMPEG_PATH`, `YTDLP_COOKIES_FILE`, `SCRATCH_DIR`,
    /// `DOWNLOAD_TIMEOUT_SECS`, `DATABASE_URL`, `DB_NAME`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(addr) = get("BIND_ADDRESS") {
            config.server.bind_address = addr.trim().parse().map_err(|e| Error::Config {
                message: format!("invalid bind address '{}': {}", addr, e),
                key: Some("BIND_ADDRESS".into()),
            })?;
        }
        if let Some(port) = get("PORT") {
            let port: u16 = port.trim().parse().map_err(|e| Error::Config {
                message: format!("invalid port '{}': {}", port, e),
                key: Some("PORT".into()),
            })?;
            config.server.bind_address.set_port(port);
        }
        if let Some(origins) = get("CORS_ORIGINS").or_else(|| get("CORS_ORIGIN")) {
            config.server.cors_origins = split_origins(&origins);
        }

        if let Some(dir) = get("BIN_DIR") {
            config.tools.bin_dir = PathBuf::from(dir);
        }
        config.tools.ytdlp_path = get("YTDLP_PATH").map(PathBuf::from);
        config.tools.ffmpeg_path = get("FFMPEG_PATH").map(PathBuf::from);
        config.tools.cookies_file = get("YTDLP_COOKIES_FILE").map(PathBuf::from);

        if let Some(dir) = get("SCRATCH_DIR") {
            config.download.scratch_dir = PathBuf::from(dir);
        }
        if let Some(secs) = get("DOWNLOAD_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| Error::Config {
                message: format!("invalid timeout '{}': {}", secs, e),
                key: Some("DOWNLOAD_TIMEOUT_SECS".into()),
            })?;
            if secs == 0 {
                return Err(Error::Config {
                    message: "timeout must be greater than zero".into(),
                    key: Some("DOWNLOAD_TIMEOUT_SECS".into()),
                });
            }
            config.download.timeout = Duration::from_secs(secs);
        }

        config.persistence.database_url = get("DATABASE_URL").map(PathBuf::from);
        config.persistence.database_name = get("DB_NAME");

        Ok(config)
    }
}

/// Split a comma/whitespace separated origin list; empty input means "any"
fn split_origins(value: &str) -> Vec<String> {
    let origins: Vec<String> = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() {
        default_cors_origins()
    } else {
        origins
    }
}

fn default_true() -> bool {
    true
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from("bin")
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("tmp_downloads")
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
