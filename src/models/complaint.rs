//! Driver complaints.

use crate::core::{
    reconcile::Keyed,
    schema::{CellValue, FieldDescriptor, FieldKind, TableRecord},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complaint lifecycle. The backend creates complaints as `pending`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, poise::ChoiceParameter,
)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    /// Waiting for an operator
    #[name = "pending"]
    Pending,
    /// Closed by an operator
    #[name = "resolved"]
    Resolved,
}

impl ComplaintStatus {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complaint submitted by a driver about an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    /// Backend id
    pub id: i64,
    /// Order the complaint is about
    #[serde(alias = "orderId")]
    pub order_reference: String,
    /// Current status
    pub status: ComplaintStatus,
    /// Reporting driver's id
    #[serde(default)]
    pub driver_id: Option<String>,
    /// Reporting driver's name
    #[serde(default)]
    pub driver_name: Option<String>,
    /// Short subject line
    #[serde(default)]
    pub subject: Option<String>,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Submission time
    pub created_at: DateTime<Utc>,
}

impl Complaint {
    /// Name to show for the reporter, falling back to the driver id.
    #[must_use]
    pub fn reporter(&self) -> String {
        self.driver_name
            .clone()
            .or_else(|| self.driver_id.clone())
            .unwrap_or_else(|| "unknown driver".to_string())
    }
}

impl Keyed for Complaint {
    fn key(&self) -> i64 {
        self.id
    }
}

impl TableRecord for Complaint {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("orderReference", "Order", FieldKind::Text),
        FieldDescriptor::required("status", "Status", FieldKind::Choice(&["pending", "resolved"])),
        FieldDescriptor::optional("reporter", "Reporter", FieldKind::Text),
        FieldDescriptor::optional("description", "Description", FieldKind::Text),
        FieldDescriptor::required("createdAt", "Submitted", FieldKind::Date),
    ];

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "orderReference" => CellValue::Text(format!("#{} {}", self.id, self.order_reference)),
            "status" => CellValue::Text(self.status.to_string()),
            "reporter" => CellValue::Text(self.reporter()),
            "description" => match self.subject.as_deref() {
                Some(subject) if !subject.is_empty() => {
                    CellValue::Text(format!("{subject}: {}", self.description))
                }
                _ => CellValue::Text(self.description.clone()),
            },
            "createdAt" => CellValue::Date(self.created_at),
            _ => CellValue::Empty,
        }
    }
}

/// Body of a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintStatusUpdate {
    /// New status
    pub status: ComplaintStatus,
}
