//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`download`] - Fetch and stream a media file
//! - [`status`] - Status log
//! - [`system`] - Greeting, health, OpenAPI

mod download;
mod status;
mod system;

pub use download::*;
pub use status::*;
pub use system::*;
