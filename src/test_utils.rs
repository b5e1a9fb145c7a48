//! Shared test utilities for the operations console.
//!
//! Provides an in-memory local store, a scripted [`Transport`] that replays
//! canned responses and records every request, and session/record builders
//! with sensible defaults.

use crate::{
    api::{ApiClient, ApiRequest, ApiResponse, Session, Transport},
    core::access::AccessProfile,
    errors::{Error, Result},
    models::{Product, TokenPair},
};
use async_trait::async_trait;
use reqwest::Url;
use sea_orm::DatabaseConnection;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Transport that returns scripted responses in order and records requests.
///
/// Once the script runs out every request fails as unreachable.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<ApiResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    /// Creates a transport that will answer with `script`, one entry per request.
    pub fn new(script: Vec<Result<ApiResponse>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = request.url.to_string();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(Error::Unreachable {
                    url,
                    message: "script exhausted".to_string(),
                })
            })
    }
}

/// A response with a JSON content type.
pub fn json_response(status: u16, body: &str) -> ApiResponse {
    ApiResponse {
        status,
        content_type: Some("application/json; charset=utf-8".to_string()),
        body: body.to_string(),
    }
}

/// A response with an HTML content type.
pub fn text_response(status: u16, body: &str) -> ApiResponse {
    ApiResponse {
        status,
        content_type: Some("text/html".to_string()),
        body: body.to_string(),
    }
}

/// A session for Discord user `"1001"` with tokens `access-1` / `refresh-1`.
pub fn test_session(role: &str, components: &[&str]) -> Session {
    Session::new(
        "1001".to_string(),
        "tester".to_string(),
        AccessProfile {
            role: role.to_string(),
            components: components.iter().map(|c| (*c).to_string()).collect(),
        },
        TokenPair {
            access_token: "access-1".to_string(),
            refresh_token: Some("refresh-1".to_string()),
        },
    )
}

/// A client against `http://localhost:5000` that replays `script`.
pub fn scripted_client(script: Vec<Result<ApiResponse>>) -> (ApiClient, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new(script));
    let dyn_transport: Arc<dyn Transport> = transport.clone();
    let base = Url::parse("http://localhost:5000").unwrap_or_else(|e| panic!("bad test URL: {e}"));
    (ApiClient::new(dyn_transport, base), transport)
}

/// A product with the given stock and no discount.
pub fn test_product(id: i64, name: &str, stock: i64) -> Product {
    Product {
        id,
        name: name.to_string(),
        sku: None,
        stock,
        price: 10.0,
        discount: None,
    }
}
