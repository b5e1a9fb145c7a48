//! Three-state result of loading something from the backend.
//!
//! A screen is either waiting, showing an error, or showing real data. An
//! unreachable backend is a visible error, never a set of sample records.

use crate::errors::{Error, Result};

/// Why a load failed, reduced to what an operator needs to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The backend could not be reached at all
    Unavailable(String),
    /// Credentials were rejected or missing
    Unauthorized(String),
    /// The backend answered but the request failed
    Failed(String),
}

impl LoadError {
    /// Message suitable for showing to the operator.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unavailable(message) | Self::Unauthorized(message) | Self::Failed(message) => {
                message
            }
        }
    }
}

impl From<&Error> for LoadError {
    fn from(error: &Error) -> Self {
        match error {
            e if e.is_unavailable() => Self::Unavailable(e.to_string()),
            e @ (Error::Unauthorized | Error::NotLoggedIn | Error::AccessDenied { .. }) => {
                Self::Unauthorized(e.to_string())
            }
            e => Self::Failed(e.to_string()),
        }
    }
}

/// Loading / error / data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    /// Request in flight
    Loading,
    /// Request failed
    Failed(LoadError),
    /// Data arrived
    Ready(T),
}

impl<T> LoadState<T> {
    /// Builds the state from the outcome of a fetch, logging failures.
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(error) => {
                tracing::warn!("Load failed: {}", error);
                Self::Failed(LoadError::from(&error))
            }
        }
    }

    /// Maps the data, keeping the other states.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            Self::Loading => LoadState::Loading,
            Self::Failed(error) => LoadState::Failed(error),
            Self::Ready(value) => LoadState::Ready(f(value)),
        }
    }

    /// Borrows the data if it is ready.
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the request is still in flight.
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> From<Result<T>> for LoadState<T> {
    fn from(result: Result<T>) -> Self {
        Self::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_is_distinct_from_empty_data() {
        let failed: LoadState<Vec<u32>> = LoadState::from_result(Err(Error::Unreachable {
            url: "http://localhost:5000/api/complaints".to_string(),
            message: "connection refused".to_string(),
        }));
        assert!(matches!(failed, LoadState::Failed(LoadError::Unavailable(_))));
        assert!(failed.ready().is_none());

        let empty: LoadState<Vec<u32>> = LoadState::from_result(Ok(Vec::new()));
        assert_eq!(empty.ready().map(Vec::len), Some(0));
    }

    #[test]
    fn test_error_classification() {
        let unauthorized: LoadState<()> = Error::Unauthorized.into_state();
        assert!(matches!(unauthorized, LoadState::Failed(LoadError::Unauthorized(_))));

        let unavailable: LoadState<()> = Error::BackendUnavailable { attempted: 3 }.into_state();
        assert!(matches!(unavailable, LoadState::Failed(LoadError::Unavailable(_))));

        let api: LoadState<()> = Error::Api {
            status: 500,
            message: "boom".to_string(),
        }
        .into_state();
        match api {
            LoadState::Failed(LoadError::Failed(message)) => assert!(message.contains("500")),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_default_is_loading_and_map_keeps_state() {
        let state: LoadState<u32> = LoadState::default();
        assert!(state.is_loading());
        assert!(state.map(|n| n + 1).is_loading());

        let ready = LoadState::Ready(2).map(|n| n * 10);
        assert_eq!(ready, LoadState::Ready(20));
    }

    trait IntoState {
        fn into_state(self) -> LoadState<()>;
    }

    impl IntoState for Error {
        fn into_state(self) -> LoadState<()> {
            LoadState::from_result(Err(self))
        }
    }
}
