//! Admin users, roles and authentication payloads.

use crate::core::{
    access::AccessProfile,
    reconcile::Keyed,
    schema::{CellValue, FieldDescriptor, FieldKind, TableRecord},
};
use serde::{Deserialize, Serialize};

/// A dashboard user as returned by `/api/user-admin/users` and `/api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    /// Backend id
    pub id: i64,
    /// Login name
    pub username: String,
    /// Role reference
    pub role: String,
    /// Granted component ids
    #[serde(default)]
    pub components: Vec<String>,
    /// Whether the account may log in
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl AdminUser {
    /// Access-relevant part of the user.
    #[must_use]
    pub fn profile(&self) -> AccessProfile {
        AccessProfile {
            role: self.role.clone(),
            components: self.components.clone(),
        }
    }
}

impl Keyed for AdminUser {
    fn key(&self) -> i64 {
        self.id
    }
}

impl TableRecord for AdminUser {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("username", "User", FieldKind::Text),
        FieldDescriptor::required("role", "Role", FieldKind::Text),
        FieldDescriptor::optional("components", "Sections", FieldKind::Text),
        FieldDescriptor::optional("isActive", "Active", FieldKind::Flag),
    ];

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "username" => CellValue::Text(format!("#{} {}", self.id, self.username)),
            "role" => CellValue::Text(self.role.clone()),
            "components" if self.components.is_empty() => CellValue::Empty,
            "components" => CellValue::Text(self.components.join(", ")),
            "isActive" => CellValue::Flag(self.is_active),
            _ => CellValue::Empty,
        }
    }
}

/// Body of a role / component change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccessUpdate {
    /// Role reference
    pub role: String,
    /// Complete component list after the change
    pub components: Vec<String>,
}

/// Bearer access token plus the token used to renew it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Bearer token sent with every request
    pub access_token: String,
    /// Token exchanged for a new access token on 401/403
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Login name
    pub username: &'a str,
    /// Password
    pub password: &'a str,
}

/// Response of `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Issued tokens
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// The logged-in user
    pub user: AdminUser,
}

/// Body of `POST /api/auth/refresh`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    /// Current refresh token
    pub refresh_token: &'a str,
}
