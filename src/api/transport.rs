//! HTTP transport seam.
//!
//! The client talks to the backend through [`Transport`] so the resolver and the
//! session interceptor can be exercised against a scripted transport in tests.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

/// HTTP verbs the console uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// A fully resolved request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Verb
    pub method: HttpMethod,
    /// Absolute URL
    pub url: Url,
    /// Bearer token, if the request is authenticated
    pub bearer: Option<String>,
    /// JSON body
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Unauthenticated GET.
    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            bearer: None,
            body: None,
        }
    }
}

/// A raw response; normalization happens in the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Declared `Content-Type`
    pub content_type: Option<String>,
    /// Body text
    pub body: String,
}

impl ApiResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Whether the declared content type is JSON (`application/json`, `application/problem+json`, ...).
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type.as_deref().is_some_and(|value| {
            value
                .split(';')
                .next()
                .is_some_and(|mime| {
                    let mime = mime.trim().to_ascii_lowercase();
                    mime == "application/json" || mime.ends_with("+json")
                })
        })
    }

    /// Whether the backend rejected the credentials.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Sends requests to the backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes one request. Only transport failures are errors; any HTTP status is a response.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// [`Transport`] backed by `reqwest`, with a per-request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport whose requests give up after `timeout`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = request.url.to_string();
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(request.url),
            HttpMethod::Post => self.client.post(request.url),
            HttpMethod::Put => self.client.put(request.url),
            HttpMethod::Delete => self.client.delete(request.url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| Error::Unreachable {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| Error::Unreachable {
            url,
            message: e.to_string(),
        })?;

        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: Option<&str>) -> ApiResponse {
        ApiResponse {
            status,
            content_type: content_type.map(str::to_string),
            body: String::new(),
        }
    }

    #[test]
    fn test_json_detection() {
        assert!(response(200, Some("application/json")).is_json());
        assert!(response(200, Some("application/json; charset=utf-8")).is_json());
        assert!(response(400, Some("application/problem+json")).is_json());
        assert!(!response(200, Some("text/html")).is_json());
        assert!(!response(200, None).is_json());
    }

    #[test]
    fn test_status_classes() {
        assert!(response(204, None).is_success());
        assert!(!response(302, None).is_success());
        assert!(response(401, None).is_auth_failure());
        assert!(response(403, None).is_auth_failure());
        assert!(!response(404, None).is_auth_failure());
    }
}
