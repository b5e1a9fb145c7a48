//! Operator session entity - Stores backend credentials per Discord user.
//!
//! A row is written on `/login` and removed on `/logout`. Tokens are rewritten
//! whenever the API client refreshes them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operator session database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operator_sessions")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID that owns this session
    #[sea_orm(unique)]
    pub discord_user_id: String,
    /// Backend username
    pub username: String,
    /// Backend role reference (e.g. `super_admin`, `support`)
    pub role: String,
    /// JSON array of component ids granted to the user
    pub components: String,
    /// Current bearer token
    pub access_token: String,
    /// Token used to obtain a new access token
    pub refresh_token: Option<String>,
    /// When the operator logged in
    pub created_at: DateTime,
    /// When the tokens were last written
    pub updated_at: DateTime,
}

/// Sessions have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
