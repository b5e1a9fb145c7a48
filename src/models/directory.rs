//! Read-only directory records: employees, foreman customers, referrals and support.

use crate::core::{
    reconcile::Keyed,
    schema::{CellValue, FieldDescriptor, FieldKind, TableRecord},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A platform employee (drivers, foremen, office staff).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Backend id
    pub id: i64,
    /// Full name
    pub name: String,
    /// Job role
    #[serde(default)]
    pub role: Option<String>,
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Whether the employee is currently active
    #[serde(default)]
    pub is_active: bool,
}

impl Keyed for Employee {
    fn key(&self) -> i64 {
        self.id
    }
}

impl TableRecord for Employee {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("name", "Employee", FieldKind::Text),
        FieldDescriptor::optional("role", "Role", FieldKind::Text),
        FieldDescriptor::optional("phone", "Phone", FieldKind::Text),
        FieldDescriptor::optional("isActive", "Active", FieldKind::Flag),
    ];

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::Text(format!("#{} {}", self.id, self.name)),
            "role" => CellValue::from(self.role.clone()),
            "phone" => CellValue::from(self.phone.clone()),
            "isActive" => CellValue::Flag(self.is_active),
            _ => CellValue::Empty,
        }
    }
}

/// A customer managed by a foreman.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForemanCustomer {
    /// Backend id
    pub id: i64,
    /// Customer name
    pub name: String,
    /// Company, if any
    #[serde(default)]
    pub company: Option<String>,
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Foreman responsible for the customer
    #[serde(default)]
    pub foreman_name: Option<String>,
    /// Orders placed so far
    #[serde(default)]
    pub orders_count: i64,
}

impl ForemanCustomer {
    /// Case-insensitive match against name, company, phone and email.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        std::iter::once(Some(&self.name))
            .chain([
                self.company.as_ref(),
                self.phone.as_ref(),
                self.email.as_ref(),
            ])
            .flatten()
            .any(|value| value.to_lowercase().contains(&needle))
    }
}

impl Keyed for ForemanCustomer {
    fn key(&self) -> i64 {
        self.id
    }
}

impl TableRecord for ForemanCustomer {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("name", "Customer", FieldKind::Text),
        FieldDescriptor::optional("company", "Company", FieldKind::Text),
        FieldDescriptor::optional("contact", "Contact", FieldKind::Text),
        FieldDescriptor::optional("foremanName", "Foreman", FieldKind::Text),
        FieldDescriptor::optional("ordersCount", "Orders", FieldKind::Integer),
    ];

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::Text(format!("#{} {}", self.id, self.name)),
            "company" => CellValue::from(self.company.clone()),
            "contact" => CellValue::from(
                [self.phone.as_deref(), self.email.as_deref()]
                    .into_iter()
                    .flatten()
                    .map(str::to_string)
                    .reduce(|a, b| format!("{a} / {b}")),
            ),
            "foremanName" => CellValue::from(self.foreman_name.clone()),
            "ordersCount" => CellValue::Integer(self.orders_count),
            _ => CellValue::Empty,
        }
    }
}

/// A referral code and how it has performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    /// Backend id
    pub id: i64,
    /// Referral code
    pub code: String,
    /// Who owns the code
    #[serde(default)]
    pub referrer_name: Option<String>,
    /// Sign-ups through the code
    #[serde(default)]
    pub referred_count: i64,
    /// Rewards paid out so far
    #[serde(default)]
    pub reward_total: f64,
    /// Whether the code can still be used
    #[serde(default)]
    pub is_active: bool,
}

impl Keyed for Referral {
    fn key(&self) -> i64 {
        self.id
    }
}

impl TableRecord for Referral {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("code", "Code", FieldKind::Text),
        FieldDescriptor::optional("referrerName", "Referrer", FieldKind::Text),
        FieldDescriptor::optional("referredCount", "Sign-ups", FieldKind::Integer),
        FieldDescriptor::optional("rewardTotal", "Rewards", FieldKind::Decimal),
        FieldDescriptor::optional("isActive", "Active", FieldKind::Flag),
    ];

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "code" => CellValue::Text(self.code.clone()),
            "referrerName" => CellValue::from(self.referrer_name.clone()),
            "referredCount" => CellValue::Integer(self.referred_count),
            "rewardTotal" => CellValue::Decimal(self.reward_total),
            "isActive" => CellValue::Flag(self.is_active),
            _ => CellValue::Empty,
        }
    }
}

/// Summary shown on the support dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportDashboard {
    /// Tickets not yet picked up
    #[serde(default)]
    pub open_tickets: i64,
    /// Tickets being worked on
    #[serde(default)]
    pub in_progress_tickets: i64,
    /// Tickets closed today
    #[serde(default)]
    pub resolved_today: i64,
    /// Mean first-response time
    #[serde(default)]
    pub average_response_minutes: Option<f64>,
    /// Most recent tickets
    #[serde(default)]
    pub recent_tickets: Vec<SupportTicket>,
}

/// A customer support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    /// Backend id
    pub id: i64,
    /// Subject line
    pub subject: String,
    /// Ticket status as reported by the backend
    pub status: String,
    /// Customer who raised it
    #[serde(default)]
    pub customer_name: Option<String>,
    /// When it was raised
    pub created_at: DateTime<Utc>,
}

impl Keyed for SupportTicket {
    fn key(&self) -> i64 {
        self.id
    }
}

impl TableRecord for SupportTicket {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("subject", "Ticket", FieldKind::Text),
        FieldDescriptor::required("status", "Status", FieldKind::Text),
        FieldDescriptor::optional("customerName", "Customer", FieldKind::Text),
        FieldDescriptor::required("createdAt", "Opened", FieldKind::Date),
    ];

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "subject" => CellValue::Text(format!("#{} {}", self.id, self.subject)),
            "status" => CellValue::Text(self.status.clone()),
            "customerName" => CellValue::from(self.customer_name.clone()),
            "createdAt" => CellValue::Date(self.created_at),
            _ => CellValue::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_customer_search_covers_contact_fields() {
        let customer = ForemanCustomer {
            id: 1,
            name: "Bola Ade".to_string(),
            company: Some("Ade Builders".to_string()),
            phone: Some("0803 555 0101".to_string()),
            email: None,
            foreman_name: None,
            orders_count: 3,
        };
        assert!(customer.matches("builders"));
        assert!(customer.matches("555"));
        assert!(!customer.matches("example.com"));
        assert_eq!(
            customer.cell("contact"),
            CellValue::Text("0803 555 0101".to_string())
        );
    }

    #[test]
    fn test_dashboard_defaults() {
        let dashboard: SupportDashboard = serde_json::from_str(r#"{"openTickets": 4}"#).unwrap();
        assert_eq!(dashboard.open_tickets, 4);
        assert!(dashboard.recent_tickets.is_empty());
        assert!(dashboard.average_response_minutes.is_none());
    }
}
