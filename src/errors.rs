//! Unified error type for the operations console.
//!
//! Backend failures are classified three ways (unreachable, non-2xx, non-JSON) so the
//! bot layer can show each one distinctly instead of masking an outage as data.

use thiserror::Error;

/// All errors produced by the console.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Local store failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The backend could not be reached (connection refused, DNS, timeout)
    #[error("Backend unreachable at {url}: {message}")]
    Unreachable {
        /// URL that was requested
        url: String,
        /// Transport error description
        message: String,
    },

    /// The backend answered with a non-2xx status
    #[error("Backend returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body, or the raw body
        message: String,
    },

    /// The backend answered 2xx but the body is not JSON
    #[error("Expected JSON from {url}, got {content_type}")]
    NotJson {
        /// URL that was requested
        url: String,
        /// Content type the backend declared
        content_type: String,
    },

    /// JSON body did not match the expected shape
    #[error("Could not decode backend response: {message}")]
    Decode {
        /// Decoder message
        message: String,
    },

    /// Credentials were rejected and could not be refreshed
    #[error("Session expired or rejected; please /login again")]
    Unauthorized,

    /// No candidate base URL produced a usable response
    #[error("No backend available ({attempted} candidate(s) tried)")]
    BackendUnavailable {
        /// Number of candidates that were attempted
        attempted: usize,
    },

    /// A form field is missing or malformed
    #[error("Invalid value for '{field}': {message}")]
    Validation {
        /// Field key
        field: String,
        /// Why it was rejected
        message: String,
    },

    /// A record was not found
    #[error("{entity} '{key}' not found")]
    NotFound {
        /// Kind of record (e.g. "Complaint")
        entity: &'static str,
        /// Identifier used for the lookup
        key: String,
    },

    /// The Discord user has no stored session
    #[error("You are not logged in. Use /login first")]
    NotLoggedIn,

    /// The session's role does not grant the component
    #[error("Access denied to '{component}'")]
    AccessDenied {
        /// Component id that was requested
        component: String,
    },

    /// A stock-correction draft was used out of order
    #[error("Invalid stock correction: {message}")]
    InvalidCorrection {
        /// Why it was rejected
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Shorthand for a [`Error::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for errors that mean "the backend is not there", as opposed to a rejected request.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::BackendUnavailable { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
