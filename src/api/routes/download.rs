//! Download handler.

use crate::api::AppState;
use crate::downloader::{Artifact, WorkspaceBound};
use crate::error::{Error, Result};
use crate::types::DownloadRequest;
use axum::{
    Json,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::Response,
};
use tokio_util::io::ReaderStream;

/// POST /download - Fetch a URL and stream the produced file
///
/// The file's workspace is removed once the body has been sent, or as soon
/// as the client goes away.
#[utoipa::path(
    post,
    path = "/api/download",
    tag = "downloads",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "The produced media file", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid request, or the downloader rejected the URL", body = crate::error::ApiError),
        (status = 404, description = "The downloader produced no file", body = crate::error::ApiError),
        (status = 500, description = "yt-dlp or ffmpeg missing or not runnable", body = crate::error::ApiError),
        (status = 504, description = "The download exceeded the time limit", body = crate::error::ApiError)
    )
)]
pub async fn download(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload.map_err(|e| Error::Validation(e.body_text()))?;

    let artifact = state.downloader.fetch(&request).await?;
    stream_artifact(artifact).await
}

async fn stream_artifact(artifact: Artifact) -> Result<Response> {
    let Artifact {
        path,
        file_name,
        size_bytes,
        workspace,
    } = artifact;

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(workspace = %workspace.id(), ?path, error = %e, "failed to open artifact");
            workspace.remove().await;
            return Err(e.into());
        }
    };
    let body = Body::from_stream(WorkspaceBound::new(ReaderStream::new(file), workspace));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, size_bytes)
        .header(header::CONTENT_DISPOSITION, content_disposition(&file_name))
        .body(body)
        .map_err(|e| Error::ApiServerError(e.to_string()))
}

/// `attachment` disposition with an ASCII fallback and the exact UTF-8 name
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}
