//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the media-dl REST API using utoipa
//! for compile-time spec generation. The version is taken from the crate.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
///
/// Served as JSON from `/api/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        description = "Fetch media through yt-dlp and ffmpeg and stream the produced file back",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        // Downloads
        crate::api::routes::download,

        // Status Log
        crate::api::routes::create_status_check,
        crate::api::routes::list_status_checks,

        // System
        crate::api::routes::root,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::MediaFormat,
        crate::types::DownloadRequest,
        crate::types::StatusCheck,
        crate::types::StatusCheckCreate,

        crate::api::routes::RootResponse,
        crate::api::routes::HealthResponse,

        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "downloads", description = "Fetch a URL and receive the produced media file"),
        (name = "status", description = "Status log - Record and list client status checks"),
        (name = "system", description = "System endpoints - Greeting, health check, OpenAPI spec"),
    )
)]
pub struct ApiDoc;
