//! Shared test helpers: a fake yt-dlp/ffmpeg toolchain built from shell scripts.

use crate::config::Config;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Script that writes a finished file plus a newer partial file
pub(crate) const PRODUCES_CLIP: &str = r#"
printf 'video-bytes' > clip.mp4
printf 'partial' > clip.mp4.part
"#;

/// Script that fails the way yt-dlp does for an unknown site
pub(crate) const UNSUPPORTED_URL: &str = r#"
echo '[generic] Extracting URL'
echo 'ERROR: Unsupported URL' >&2
exit 1
"#;

/// Script that exits cleanly without producing anything
pub(crate) const PRODUCES_NOTHING: &str = "exit 0\n";

/// Script that never finishes on its own
pub(crate) const HANGS: &str = "exec sleep 30\n";

/// A temporary directory with `bin/yt-dlp`, `bin/ffmpeg` and a scratch root
pub(crate) struct FakeToolchain {
    pub(crate) dir: TempDir,
    pub(crate) config: Config,
}

impl FakeToolchain {
    /// Build a toolchain whose yt-dlp runs `script` (a `/bin/sh` body)
    ///
    /// Every invocation also appends its arguments, one per line, to
    /// [`FakeToolchain::args_log`].
    pub(crate) fn new(script: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bin_dir = dir.path().join("bin");
        std::fs::create_dir_all(&bin_dir).unwrap();

        let args_log = dir.path().join("args.log");
        let ytdlp = format!(
            "#!/bin/sh\nfor a in \"$@\"; do printf '%s\\n' \"$a\" >> '{}'; done\n{}",
            args_log.display(),
            script
        );
        write_executable(&bin_dir.join("yt-dlp"), &ytdlp);
        write_executable(&bin_dir.join("ffmpeg"), "#!/bin/sh\nexit 0\n");

        let mut config = Config::default();
        config.tools.bin_dir = bin_dir;
        config.tools.search_path = false;
        config.download.scratch_dir = dir.path().join("scratch");
        config.download.timeout = Duration::from_secs(30);
        std::fs::create_dir_all(&config.download.scratch_dir).unwrap();

        Self { dir, config }
    }

    /// Toolchain with no executables at all
    pub(crate) fn missing() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.tools.bin_dir = dir.path().join("bin");
        config.tools.search_path = false;
        config.download.scratch_dir = dir.path().join("scratch");
        std::fs::create_dir_all(&config.download.scratch_dir).unwrap();
        Self { dir, config }
    }

    /// Arguments recorded by every yt-dlp run so far
    pub(crate) fn recorded_args(&self) -> Vec<String> {
        std::fs::read_to_string(self.args_log())
            .map(|s| s.lines().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Whether yt-dlp was ever started
    pub(crate) fn was_invoked(&self) -> bool {
        self.args_log().exists()
    }

    /// Entries currently under the scratch root
    pub(crate) fn scratch_entries(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.config.download.scratch_dir)
            .map(|rd| rd.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default()
    }

    /// Wait for off-thread workspace releases to finish
    pub(crate) async fn scratch_settles_empty(&self) -> bool {
        for _ in 0..100 {
            if self.scratch_entries().is_empty() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    fn args_log(&self) -> PathBuf {
        self.dir.path().join("args.log")
    }
}

fn write_executable(path: &Path, contents: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, contents).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
