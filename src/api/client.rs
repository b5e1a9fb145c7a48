//! Typed backend client.
//!
//! Every response goes through one normalization path: transport failures,
//! non-2xx statuses and non-JSON bodies each become their own error. Requests
//! rejected with 401/403 trigger exactly one token refresh and one retry.

use super::{
    join_path,
    session::Session,
    transport::{ApiRequest, ApiResponse, HttpMethod, Transport},
};
use crate::{
    errors::{Error, Result},
    models::{LoginResponse, TokenPair, user::LoginRequest, user::RefreshRequest},
};
use reqwest::Url;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{sync::Arc, time::Instant};
use tracing::{debug, info, warn};

const LOGIN_PATH: &str = "/api/auth/login";
const REFRESH_PATH: &str = "/api/auth/refresh";

/// Client bound to one backend base URL.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client for `base_url`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, base_url: Url) -> Self {
        Self {
            transport,
            base_url,
        }
    }

    /// Base URL every path is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchanges credentials for tokens and the user's profile.
    ///
    /// # Errors
    /// Returns [`Error::Unauthorized`] for rejected credentials, otherwise the normalized error.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let body = serde_json::to_value(LoginRequest { username, password })?;
        let url = join_path(&self.base_url, LOGIN_PATH)?;
        let response = self.send(HttpMethod::Post, url.clone(), None, Some(body)).await?;
        if response.is_auth_failure() {
            return Err(Error::Unauthorized);
        }
        decode(&url, &response)
    }

    /// `GET path`
    pub async fn get<T: DeserializeOwned>(&self, session: &mut Session, path: &str) -> Result<T> {
        let url = join_path(&self.base_url, path)?;
        let response = self
            .send_authorized(session, HttpMethod::Get, &url, None)
            .await?;
        decode(&url, &response)
    }

    /// `POST path` with a JSON body
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        session: &mut Session,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let url = join_path(&self.base_url, path)?;
        let response = self
            .send_authorized(session, HttpMethod::Post, &url, Some(body))
            .await?;
        decode(&url, &response)
    }

    /// `PUT path` with a JSON body
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        session: &mut Session,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let url = join_path(&self.base_url, path)?;
        let response = self
            .send_authorized(session, HttpMethod::Put, &url, Some(body))
            .await?;
        decode(&url, &response)
    }

    /// `DELETE path`. Accepts an empty body or any JSON body.
    pub async fn delete(&self, session: &mut Session, path: &str) -> Result<()> {
        let url = join_path(&self.base_url, path)?;
        let response = self
            .send_authorized(session, HttpMethod::Delete, &url, None)
            .await?;
        check_status(&response)?;
        if response.body.trim().is_empty() || response.is_json() {
            Ok(())
        } else {
            Err(not_json(&url, &response))
        }
    }

    /// Sends with the session's bearer token; on 401/403 refreshes once and retries once.
    async fn send_authorized(
        &self,
        session: &mut Session,
        method: HttpMethod,
        url: &Url,
        body: Option<Value>,
    ) -> Result<ApiResponse> {
        let bearer = Some(session.tokens().access_token.clone());
        let response = self.send(method, url.clone(), bearer, body.clone()).await?;
        if !response.is_auth_failure() {
            return Ok(response);
        }

        info!(
            "{} {} rejected with {}; refreshing session for {}",
            method.as_str(),
            url.path(),
            response.status,
            session.username
        );
        self.refresh(session).await?;

        let bearer = Some(session.tokens().access_token.clone());
        let retried = self.send(method, url.clone(), bearer, body).await?;
        if retried.is_auth_failure() {
            warn!("{} {} still rejected after refresh", method.as_str(), url.path());
            return Err(Error::Unauthorized);
        }
        Ok(retried)
    }

    async fn refresh(&self, session: &mut Session) -> Result<()> {
        let Some(refresh_token) = session.tokens().refresh_token.clone() else {
            return Err(Error::Unauthorized);
        };
        let url = join_path(&self.base_url, REFRESH_PATH)?;
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: &refresh_token,
        })?;

        let response = self.send(HttpMethod::Post, url.clone(), None, Some(body)).await?;
        if !response.is_success() {
            warn!("Token refresh failed with {}", response.status);
            return Err(Error::Unauthorized);
        }
        let tokens: TokenPair = decode(&url, &response).map_err(|e| {
            warn!("Token refresh returned an unusable body: {}", e);
            Error::Unauthorized
        })?;
        session.replace_tokens(tokens);
        Ok(())
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: Url,
        bearer: Option<String>,
        body: Option<Value>,
    ) -> Result<ApiResponse> {
        let path = url.path().to_string();
        let started = Instant::now();
        let result = self
            .transport
            .execute(ApiRequest {
                method,
                url,
                bearer,
                body,
            })
            .await;

        match &result {
            Ok(response) => debug!(
                "{} {} -> {} in {:?}",
                method.as_str(),
                path,
                response.status,
                started.elapsed()
            ),
            Err(e) => warn!("{} {} failed: {}", method.as_str(), path, e),
        }
        result
    }
}

fn check_status(response: &ApiResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(Error::Api {
        status: response.status,
        message: error_message(response),
    })
}

fn not_json(url: &Url, response: &ApiResponse) -> Error {
    Error::NotJson {
        url: url.to_string(),
        content_type: response
            .content_type
            .clone()
            .unwrap_or_else(|| "no content type".to_string()),
    }
}

/// Turns a raw response into `T`, or the matching error.
fn decode<T: DeserializeOwned>(url: &Url, response: &ApiResponse) -> Result<T> {
    check_status(response)?;
    if !response.is_json() {
        return Err(not_json(url, response));
    }
    serde_json::from_str(&response.body).map_err(|e| Error::Decode {
        message: format!("{} ({})", e, url.path()),
    })
}

/// Pulls `message` or `error` out of a JSON error body, falling back to the raw text.
fn error_message(response: &ApiResponse) -> String {
    if response.is_json() {
        if let Ok(value) = serde_json::from_str::<Value>(&response.body) {
            if let Some(message) = ["message", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(Value::as_str))
            {
                return message.to_string();
            }
        }
    }
    let text = response.body.trim();
    if text.is_empty() {
        "no details".to_string()
    } else {
        text.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        models::{Complaint, ComplaintStatus},
        test_utils::{ScriptedTransport, json_response, test_session, text_response},
    };

    fn client(transport: &Arc<ScriptedTransport>) -> ApiClient {
        let transport: Arc<dyn Transport> = transport.clone();
        ApiClient::new(transport, Url::parse("http://localhost:5000").unwrap())
    }

    const COMPLAINT: &str = r#"{
        "id": 1, "orderReference": "ORD-1", "status": "pending",
        "description": "late", "createdAt": "2026-10-01T09:30:00Z"
    }"#;

    #[tokio::test]
    async fn test_get_decodes_and_sends_bearer() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json_response(
            200,
            &format!("[{COMPLAINT}]"),
        ))]));
        let mut session = test_session("support", &["complaints"]);

        let complaints: Vec<Complaint> = client(&transport)
            .get(&mut session, "/api/complaints")
            .await
            .unwrap();

        assert_eq!(complaints.len(), 1);
        assert_eq!(complaints[0].status, ComplaintStatus::Pending);
        let requests = transport.requests();
        assert_eq!(requests[0].bearer.as_deref(), Some("access-1"));
        assert_eq!(requests[0].url.as_str(), "http://localhost:5000/api/complaints");
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn test_error_classes_are_distinct() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(json_response(422, r#"{"message": "name is taken"}"#)),
            Ok(text_response(200, "<html>maintenance</html>")),
            Ok(json_response(200, r#"{"unexpected": true}"#)),
            Err(Error::Unreachable {
                url: "http://localhost:5000/api/complaints".to_string(),
                message: "timed out".to_string(),
            }),
        ]));
        let api = client(&transport);
        let mut session = test_session("support", &[]);

        let err = api.get::<Complaint>(&mut session, "/api/complaints/1").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 422, ref message } if message == "name is taken"));

        let err = api.get::<Complaint>(&mut session, "/api/complaints/1").await.unwrap_err();
        assert!(matches!(err, Error::NotJson { .. }));

        let err = api.get::<Complaint>(&mut session, "/api/complaints/1").await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));

        let err = api.get::<Complaint>(&mut session, "/api/complaints/1").await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_refresh_once_then_retry() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(json_response(401, r#"{"message": "jwt expired"}"#)),
            Ok(json_response(200, r#"{"accessToken": "access-2"}"#)),
            Ok(json_response(200, COMPLAINT)),
        ]));
        let mut session = test_session("support", &[]);

        let complaint: Complaint = client(&transport)
            .get(&mut session, "/api/complaints/1")
            .await
            .unwrap();

        assert_eq!(complaint.id, 1);
        assert!(session.is_dirty());
        assert_eq!(session.tokens().access_token, "access-2");
        assert_eq!(session.tokens().refresh_token.as_deref(), Some("refresh-1"));

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].url.path(), "/api/auth/refresh");
        assert_eq!(
            requests[1].body,
            Some(serde_json::json!({ "refreshToken": "refresh-1" }))
        );
        assert!(requests[1].bearer.is_none());
        assert_eq!(requests[2].bearer.as_deref(), Some("access-2"));
    }

    #[tokio::test]
    async fn test_second_rejection_is_unauthorized() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(json_response(403, "{}")),
            Ok(json_response(200, r#"{"accessToken": "access-2", "refreshToken": "refresh-2"}"#)),
            Ok(json_response(403, "{}")),
        ]));
        let mut session = test_session("support", &[]);

        let err = client(&transport)
            .get::<Complaint>(&mut session, "/api/complaints/1")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Unauthorized));
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_refresh_is_unauthorized_without_retry() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(json_response(401, "{}")),
            Ok(json_response(401, r#"{"message": "refresh token revoked"}"#)),
        ]));
        let mut session = test_session("support", &[]);

        let err = client(&transport)
            .get::<Complaint>(&mut session, "/api/complaints/1")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Unauthorized));
        assert_eq!(transport.requests().len(), 2);
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn test_unreadable_refresh_response_is_unauthorized() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(json_response(401, "{}")),
            Ok(text_response(200, "<html>login</html>")),
        ]));
        let mut session = test_session("support", &[]);

        let err = client(&transport)
            .get::<Complaint>(&mut session, "/api/complaints/1")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Unauthorized));
        assert_eq!(transport.requests().len(), 2);
        assert!(!session.is_dirty());

        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(json_response(403, "{}")),
            Ok(json_response(200, r#"{"unexpected": true}"#)),
        ]));
        let err = client(&transport)
            .get::<Complaint>(&mut session, "/api/complaints/1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_204() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(ApiResponse {
            status: 204,
            content_type: None,
            body: String::new(),
        })]));
        let mut session = test_session("super_admin", &[]);

        client(&transport)
            .delete(&mut session, "/api/areas/3")
            .await
            .unwrap();

        assert_eq!(transport.requests()[0].method, HttpMethod::Delete);
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json_response(
            401,
            r#"{"message": "bad credentials"}"#,
        ))]));

        let err = client(&transport).login("ada", "wrong").await.unwrap_err();

        assert!(matches!(err, Error::Unauthorized));
        assert_eq!(
            transport.requests()[0].body,
            Some(serde_json::json!({ "username": "ada", "password": "wrong" }))
        );
    }
}
