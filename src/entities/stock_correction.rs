//! Stock correction entity - Unsaved stock counts proposed by an operator.
//!
//! Drafts live locally until they are saved to the backend. The `status` column
//! holds `pending`, `correct` or `corrected`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stock correction draft database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_corrections")]
pub struct Model {
    /// Unique identifier for the draft
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Backend product id
    pub product_id: i64,
    /// Product name at the time the draft was opened
    pub product_name: String,
    /// Stock count reported by the backend when the draft was opened
    pub current_stock: i64,
    /// Proposed replacement count, if any
    pub corrected_stock: Option<i64>,
    /// Required when the correction is a loss
    pub reason: Option<String>,
    /// `pending`, `correct` or `corrected`
    pub status: String,
    /// Discord user ID of the operator who opened the draft
    pub author_id: String,
    /// When the draft was opened
    pub created_at: DateTime,
    /// When the draft was last modified
    pub updated_at: DateTime,
    /// When the correction was accepted by the backend
    pub saved_at: Option<DateTime>,
}

/// Drafts have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
