//! Backend API client layer.
//!
//! One [`ApiClient`] is built at startup against a single resolved base URL and
//! shared by every command. Each call carries the caller's [`Session`].

/// Typed client with response normalization and token refresh
pub mod client;
/// Typed wrappers over the backend's resources
pub mod endpoints;
/// Startup probing of candidate base URLs
pub mod resolver;
/// Per-operator session passed to every call
pub mod session;
/// HTTP transport seam
pub mod transport;

pub use client::ApiClient;
pub use session::Session;
pub use transport::{ApiRequest, ApiResponse, HttpMethod, ReqwestTransport, Transport};

use crate::errors::{Error, Result};
use reqwest::Url;

/// Appends `path` to `base`, keeping any path prefix the base already has.
///
/// # Errors
/// Returns [`Error::Config`] if the result is not a valid URL.
pub fn join_path(base: &Url, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| Error::Config {
        message: format!("Cannot build URL from '{base}' and '{path}': {e}"),
    })
}
