//! Core request and record types for media-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Output format requested by the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    /// Video with merged audio, remuxed to mp4
    Video,
    /// Audio only, extracted to mp3
    Mp3,
}

impl std::fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaFormat::Video => write!(f, "video"),
            MediaFormat::Mp3 => write!(f, "mp3"),
        }
    }
}

/// Body of `POST /api/download`
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// Media page URL (http or https)
    pub url: String,

    /// Requested output format
    pub format: MediaFormat,

    /// "max" or a numeric bitrate in kbit/s (mp3 only)
    #[serde(default = "default_audio_quality")]
    pub audio_quality: Option<String>,

    /// "best" or a height such as "720p" (video only)
    #[serde(default = "default_video_quality")]
    pub video_quality: Option<String>,

    /// "source" or a numeric frame-rate cap (video only)
    #[serde(default = "default_video_fps")]
    pub video_fps: Option<String>,
}

impl DownloadRequest {
    /// Request with default quality settings
    pub fn new(url: impl Into<String>, format: MediaFormat) -> Self {
        Self {
            url: url.into(),
            format,
            audio_quality: default_audio_quality(),
            video_quality: default_video_quality(),
            video_fps: default_video_fps(),
        }
    }
}

fn default_audio_quality() -> Option<String> {
    Some("max".into())
}

fn default_video_quality() -> Option<String> {
    Some("best".into())
}

fn default_video_fps() -> Option<String> {
    Some("source".into())
}

/// A recorded status check
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusCheck {
    /// Record identifier
    pub id: Uuid,
    /// Name reported by the client
    pub client_name: String,
    /// When the record was created
    pub timestamp: DateTime<Utc>,
}

impl StatusCheck {
    /// Create a fresh record with a generated id and the current time
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_name: client_name.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Body of `POST /api/status`
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusCheckCreate {
    /// Name reported by the client
    pub client_name: String,
}
