//! Common test utilities for media-dl integration tests
//!
//! Builds a fake yt-dlp/ffmpeg pair out of shell scripts, serves the real
//! router on an ephemeral port and talks to it with reqwest.

use media_dl::api::{AppState, create_router};
use media_dl::{Config, Downloader, StatusLog};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// yt-dlp stand-in that writes its output where `-o` points
///
/// The template's `%(title).80s-%(id)s.%(ext)s` part is replaced by a fixed name.
pub const WRITES_TO_TEMPLATE: &str = r#"
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
dir=$(dirname "$out")
printf 'media-payload' > "$dir/Some Title-abc123.mp4"
"#;

/// A temporary toolchain plus the config pointing at it
pub struct TestEnv {
    pub dir: TempDir,
    pub config: Config,
}

impl TestEnv {
    pub fn new(ytdlp_script: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bin_dir = dir.path().join("bin");
        std::fs::create_dir_all(&bin_dir).unwrap();
        write_executable(
            &bin_dir.join("yt-dlp"),
            &format!("#!/bin/sh\n{ytdlp_script}"),
        );
        write_executable(&bin_dir.join("ffmpeg"), "#!/bin/sh\nexit 0\n");

        let mut config = Config::default();
        config.tools.bin_dir = bin_dir;
        config.tools.search_path = false;
        config.download.scratch_dir = dir.path().join("scratch");
        config.download.timeout = Duration::from_secs(30);

        Self { dir, config }
    }

    /// Point the status store at a database inside the temp dir
    pub fn with_status_store(mut self) -> Self {
        self.config.persistence.database_url = Some(self.dir.path().join("db"));
        self.config.persistence.database_name = Some("status".into());
        self
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.config.download.scratch_dir.clone()
    }

    /// Serve the router in the background and return its address
    pub async fn spawn_server(&self) -> SocketAddr {
        let config = Arc::new(self.config.clone());
        let downloader = Downloader::new(config.clone());
        downloader.prepare_scratch_dir().await.unwrap();
        let status_log = Arc::new(StatusLog::open(&config.persistence).await.unwrap());
        let app = create_router(AppState::new(downloader, status_log, config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }
}

/// Base URL of a server started with [`TestEnv::spawn_server`]
pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

/// Client that ignores any proxy configured in the environment
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// POST a JSON body given as text
pub async fn post_json(addr: SocketAddr, path: &str, body: &str) -> reqwest::Response {
    client()
        .post(format!("{}{}", base_url(addr), path))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .send()
        .await
        .unwrap()
}

/// GET `path`
pub async fn get(addr: SocketAddr, path: &str) -> reqwest::Response {
    client()
        .get(format!("{}{}", base_url(addr), path))
        .send()
        .await
        .unwrap()
}

/// Wait until `dir` has no entries, giving the server a moment to drop the body
pub async fn wait_until_empty(dir: &Path) -> bool {
    for _ in 0..50 {
        let empty = std::fs::read_dir(dir)
            .map(|mut rd| rd.next().is_none())
            .unwrap_or(true);
        if empty {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

fn write_executable(path: &Path, contents: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, contents).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
