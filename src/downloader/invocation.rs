//! yt-dlp command-line construction
//!
//! The argument list is a pure function of the request, the resolved
//! toolchain and the workspace, so it can be tested without spawning anything.

use super::tools::Toolchain;
use crate::types::{DownloadRequest, MediaFormat};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static LEADING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)").expect("static regex is valid"));

/// Container used for merged video output
pub const VIDEO_CONTAINER: &str = "mp4";

/// Browser identity sent with every extractor request
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36";

const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

const YOUTUBE_PLAYER_CLIENTS: &str = "youtube:player_client=web,web_creator,tv_embedded";

/// Site family of a target URL, decided from its host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// youtube.com, youtu.be
    YouTube,
    /// instagram.com
    Instagram,
    /// tiktok.com
    TikTok,
    /// twitch.tv
    Twitch,
    /// twitter.com, x.com
    Twitter,
    /// Anything else
    Generic,
}

impl Platform {
    /// Classify `url` by host; unparsable URLs are `Generic`
    pub fn detect(url: &str) -> Self {
        let host = match url::Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => host.to_ascii_lowercase(),
                None => return Self::Generic,
            },
            Err(_) => return Self::Generic,
        };
        let on = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));

        if on("youtube.com") || on("youtu.be") {
            Self::YouTube
        } else if on("instagram.com") {
            Self::Instagram
        } else if on("tiktok.com") {
            Self::TikTok
        } else if on("twitch.tv") {
            Self::Twitch
        } else if on("twitter.com") || on("x.com") {
            Self::Twitter
        } else {
            Self::Generic
        }
    }

    /// Request headers and extractor options for this platform
    pub fn args(self) -> Vec<String> {
        let mut args = vec![
            "--add-header".to_string(),
            format!("User-Agent:{USER_AGENT}"),
            "--add-header".to_string(),
            format!("Accept-Language:{ACCEPT_LANGUAGE}"),
        ];
        if self == Self::YouTube {
            args.push("--extractor-args".into());
            args.push(YOUTUBE_PLAYER_CLIENTS.into());
        }
        args
    }
}

/// A fully built downloader invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolInvocation {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolInvocation {
    /// Build the yt-dlp invocation for one request
    ///
    /// `url` must already be validated and trimmed; it is always the last argument.
    pub fn build(
        request: &DownloadRequest,
        url: &str,
        tools: &Toolchain,
        output_template: &Path,
        cookies_file: Option<&Path>,
    ) -> Self {
        // yt-dlp looks up ffmpeg and ffprobe inside this directory
        let ffmpeg_dir = tools
            .ffmpeg
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(&tools.ffmpeg);

        let mut args: Vec<String> = vec![
            "--no-playlist".into(),
            "--restrict-filenames".into(),
            "--ffmpeg-location".into(),
            ffmpeg_dir.display().to_string(),
            "-o".into(),
            output_template.display().to_string(),
        ];
        args.extend(Platform::detect(url).args());

        if let Some(cookies) = cookies_file {
            args.push("--cookies".into());
            args.push(cookies.display().to_string());
        }

        match request.format {
            MediaFormat::Mp3 => {
                args.extend(
                    ["-f", "bestaudio/best", "-x", "--audio-format", "mp3"].map(String::from),
                );
                if let Some(bitrate) = audio_bitrate(request.audio_quality.as_deref()) {
                    args.push("--postprocessor-args".into());
                    args.push(format!("ffmpeg:-b:a {}k", bitrate));
                }
            }
            MediaFormat::Video => {
                let filter = format_filter(
                    quality_to_height(request.video_quality.as_deref()),
                    fps_cap(request.video_fps.as_deref()),
                );
                args.push("-f".into());
                args.push(format!("bestvideo{filter}+bestaudio/best{filter}"));
                args.push("--merge-output-format".into());
                args.push(VIDEO_CONTAINER.into());
            }
        }

        args.push(url.to_string());

        Self {
            program: tools.ytdlp.clone(),
            args,
        }
    }

    /// Executable to run
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments, in order
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Maximum height encoded in a quality string such as "720p"
///
/// "best", empty strings and strings without leading digits mean no cap.
pub fn quality_to_height(quality: Option<&str>) -> Option<u32> {
    let quality = quality?.trim();
    if quality.is_empty() || quality == "best" {
        return None;
    }
    LEADING_DIGITS
        .captures(quality)
        .and_then(|caps| caps[1].parse().ok())
        .filter(|height| *height > 0)
}

/// Frame-rate cap; only an all-digit value counts ("source" means none)
pub fn fps_cap(fps: Option<&str>) -> Option<u32> {
    fps.filter(|v| is_all_digits(v))
        .and_then(|v| v.parse().ok())
        .filter(|fps| *fps > 0)
}

/// Bitrate for the mp3 post-processor, or `None` for "max"/non-numeric values
pub fn audio_bitrate(quality: Option<&str>) -> Option<&str> {
    quality.filter(|q| *q != "max" && is_all_digits(q))
}

/// yt-dlp format filter combining the optional height and fps constraints
pub fn format_filter(height: Option<u32>, fps: Option<u32>) -> String {
    let mut filter = String::new();
    if let Some(height) = height {
        filter.push_str(&format!("[height<={}]", height));
    }
    if let Some(fps) = fps {
        filter.push_str(&format!("[fps<={}]", fps));
    }
    filter
}

fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
