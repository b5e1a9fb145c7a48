//! Stock correction business logic - Draft lifecycle for product stock counts.
//!
//! An operator opens a draft against a product, then either confirms the
//! current count is accurate or proposes a replacement. Proposed counts stay in
//! the local database until they are saved to the backend. A draft moves
//! `pending → correct` or `pending → corrected` and never back.

use crate::{
    api::{ApiClient, Session, endpoints},
    core::{
        reconcile::Keyed,
        schema::{CellValue, FieldDescriptor, FieldKind, TableRecord},
    },
    entities::{StockCorrection, stock_correction},
    errors::{Error, Result},
    models::{Product, StockUpdate},
};
use sea_orm::{QueryOrder, Set, SqlErr, prelude::*};
use std::fmt;

/// Lifecycle state of a stock correction draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftStatus {
    /// Opened; awaiting a decision
    Pending,
    /// The backend's count was confirmed accurate
    Correct,
    /// A replacement count was saved to the backend
    Corrected,
}

impl DraftStatus {
    /// Value stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Correct => "correct",
            Self::Corrected => "corrected",
        }
    }

    /// Parses a stored status value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "correct" => Some(Self::Correct),
            "corrected" => Some(Self::Corrected),
            _ => None,
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a draft row; unknown values are treated as pending.
#[must_use]
pub fn draft_status(draft: &stock_correction::Model) -> DraftStatus {
    DraftStatus::parse(&draft.status).unwrap_or(DraftStatus::Pending)
}

/// Whether the proposed count is lower than the recorded one.
#[must_use]
pub fn is_loss(draft: &stock_correction::Model) -> bool {
    draft
        .corrected_stock
        .is_some_and(|corrected| corrected < draft.current_stock)
}

impl Keyed for stock_correction::Model {
    fn key(&self) -> i64 {
        self.id
    }
}

impl TableRecord for stock_correction::Model {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("productName", "Draft", FieldKind::Text),
        FieldDescriptor::required("status", "Status", FieldKind::Text),
        FieldDescriptor::required("currentStock", "Recorded", FieldKind::Integer),
        FieldDescriptor::optional("correctedStock", "Proposed", FieldKind::Integer),
        FieldDescriptor::optional("reason", "Reason", FieldKind::Text),
        FieldDescriptor::required("createdAt", "Opened", FieldKind::Date),
    ];

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "productName" => CellValue::Text(format!(
                "#{} {} (product #{})",
                self.id, self.product_name, self.product_id
            )),
            "status" if is_loss(self) => CellValue::Text(format!("{} (loss)", self.status)),
            "status" => CellValue::Text(self.status.clone()),
            "currentStock" => CellValue::Integer(self.current_stock),
            "correctedStock" => self.corrected_stock.map_or(CellValue::Empty, CellValue::Integer),
            "reason" => CellValue::from(self.reason.clone()),
            "createdAt" => CellValue::Date(self.created_at.and_utc()),
            _ => CellValue::Empty,
        }
    }
}

/// Retrieves a draft by id.
///
/// # Errors
/// Returns [`Error::NotFound`] if no such draft exists.
pub async fn get_draft(db: &DatabaseConnection, id: i64) -> Result<stock_correction::Model> {
    StockCorrection::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "Stock draft",
            key: id.to_string(),
        })
}

async fn get_pending(db: &DatabaseConnection, id: i64) -> Result<stock_correction::Model> {
    let draft = get_draft(db, id).await?;
    let status = draft_status(&draft);
    if status != DraftStatus::Pending {
        return Err(Error::InvalidCorrection {
            message: format!("draft #{id} is already {status}"),
        });
    }
    Ok(draft)
}

/// Open drafts, oldest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_open(db: &DatabaseConnection) -> Result<Vec<stock_correction::Model>> {
    StockCorrection::find()
        .filter(stock_correction::Column::Status.eq(DraftStatus::Pending.as_str()))
        .order_by_asc(stock_correction::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Opens a pending draft for a product, or returns the one already open.
///
/// # Errors
/// Returns an error if the database operation fails.
pub async fn open_draft(
    db: &DatabaseConnection,
    product: &Product,
    author_id: &str,
) -> Result<stock_correction::Model> {
    if let Some(draft) = find_pending_for(db, product.id).await? {
        return Ok(draft);
    }

    let now = chrono::Utc::now().naive_utc();
    let draft = stock_correction::ActiveModel {
        product_id: Set(product.id),
        product_name: Set(product.name.clone()),
        current_stock: Set(product.stock),
        corrected_stock: Set(None),
        reason: Set(None),
        status: Set(DraftStatus::Pending.as_str().to_string()),
        author_id: Set(author_id.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        saved_at: Set(None),
        ..Default::default()
    };
    let draft = match draft.insert(db).await {
        Ok(draft) => draft,
        // Another operator opened one between the lookup and the insert
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return find_pending_for(db, product.id).await?.ok_or_else(|| Error::from(e));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::debug!(
        "Opened stock draft #{} for product #{} ({})",
        draft.id,
        draft.product_id,
        draft.product_name
    );
    Ok(draft)
}

async fn find_pending_for(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<stock_correction::Model>> {
    StockCorrection::find()
        .filter(stock_correction::Column::ProductId.eq(product_id))
        .filter(stock_correction::Column::Status.eq(DraftStatus::Pending.as_str()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Marks the recorded count as accurate. Nothing is sent to the backend.
///
/// # Errors
/// - [`Error::NotFound`] if the draft does not exist
/// - [`Error::InvalidCorrection`] if the draft is no longer pending
pub async fn confirm_correct(db: &DatabaseConnection, id: i64) -> Result<stock_correction::Model> {
    let draft = get_pending(db, id).await?;
    let mut active: stock_correction::ActiveModel = draft.into();
    active.status = Set(DraftStatus::Correct.as_str().to_string());
    active.corrected_stock = Set(None);
    active.reason = Set(None);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

/// Records a proposed replacement count on a pending draft.
///
/// A count below the recorded one is a loss and needs a reason.
///
/// # Errors
/// - [`Error::NotFound`] if the draft does not exist
/// - [`Error::InvalidCorrection`] if the draft is not pending, the count is
///   negative, or a loss has no reason
pub async fn propose(
    db: &DatabaseConnection,
    id: i64,
    corrected: i64,
    reason: Option<String>,
) -> Result<stock_correction::Model> {
    let draft = get_pending(db, id).await?;
    if corrected < 0 {
        return Err(Error::InvalidCorrection {
            message: format!("stock cannot be negative (got {corrected})"),
        });
    }

    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    if corrected < draft.current_stock && reason.is_none() {
        return Err(Error::InvalidCorrection {
            message: format!(
                "a loss of {} units needs a reason",
                draft.current_stock - corrected
            ),
        });
    }

    let mut active: stock_correction::ActiveModel = draft.into();
    active.corrected_stock = Set(Some(corrected));
    active.reason = Set(reason);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

/// Sends a proposed correction to the backend.
///
/// The draft becomes `corrected` only after the backend accepts the new count;
/// on any failure it is left exactly as it was.
///
/// # Errors
/// - [`Error::NotFound`] if the draft does not exist
/// - [`Error::InvalidCorrection`] if the draft is not pending or has no proposal
/// - any API error from the stock update
pub async fn save(
    db: &DatabaseConnection,
    api: &ApiClient,
    session: &mut Session,
    id: i64,
) -> Result<(stock_correction::Model, Product)> {
    let draft = get_pending(db, id).await?;
    let Some(corrected) = draft.corrected_stock else {
        return Err(Error::InvalidCorrection {
            message: format!("draft #{id} has no proposed count to save"),
        });
    };

    let update = StockUpdate {
        stock: corrected,
        reason: draft.reason.clone(),
    };
    let product = endpoints::update_stock(api, session, draft.product_id, &update).await?;

    let now = chrono::Utc::now().naive_utc();
    let mut active: stock_correction::ActiveModel = draft.into();
    active.status = Set(DraftStatus::Corrected.as_str().to_string());
    active.corrected_stock = Set(Some(product.stock));
    active.saved_at = Set(Some(now));
    active.updated_at = Set(now);
    let saved = active.update(db).await?;

    tracing::info!(
        "Stock for product #{} set to {} by {}",
        saved.product_id,
        product.stock,
        session.username
    );
    Ok((saved, product))
}

/// Deletes a pending draft.
///
/// # Errors
/// - [`Error::NotFound`] if the draft does not exist
/// - [`Error::InvalidCorrection`] if the draft is no longer pending
pub async fn discard(db: &DatabaseConnection, id: i64) -> Result<stock_correction::Model> {
    let draft = get_pending(db, id).await?;
    StockCorrection::delete_by_id(id).exec(db).await?;
    Ok(draft)
}
