//! Products, their stock counts and discount configuration.

use crate::core::{
    reconcile::Keyed,
    schema::{CellValue, FieldDescriptor, FieldKind, TableRecord},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a discount value is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, poise::ChoiceParameter)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `value` is a percentage off
    #[name = "percentage"]
    Percentage,
    /// `value` is an amount off
    #[name = "fixed"]
    Fixed,
}

impl DiscountKind {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }
}

/// Discount settings attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountConfig {
    /// Percentage or fixed amount
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    /// Discount value
    pub value: f64,
    /// When the discount starts applying
    pub start_date: DateTime<Utc>,
    /// When it stops applying; open-ended if absent
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// Manual on/off switch
    pub is_active: bool,
}

impl DiscountConfig {
    /// Form fields accepted when setting a discount.
    pub const FORM: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("type", "Type", FieldKind::Choice(&["percentage", "fixed"])),
        FieldDescriptor::required("value", "Value", FieldKind::Decimal),
        FieldDescriptor::required("startDate", "Starts", FieldKind::Date),
        FieldDescriptor::optional("endDate", "Ends", FieldKind::Date),
        FieldDescriptor::required("isActive", "Enabled", FieldKind::Flag),
    ];

    /// Human description of the amount, e.g. `15%` or `2.50 off`.
    #[must_use]
    pub fn describe_value(&self) -> String {
        match self.kind {
            DiscountKind::Percentage => format!("{}%", self.value),
            DiscountKind::Fixed => format!("{:.2} off", self.value),
        }
    }
}

/// A product as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend id
    pub id: i64,
    /// Product name
    pub name: String,
    /// Stock keeping unit
    #[serde(default)]
    pub sku: Option<String>,
    /// Units in stock
    #[serde(default)]
    pub stock: i64,
    /// Unit price
    #[serde(default)]
    pub price: f64,
    /// Discount configuration, if any
    #[serde(default)]
    pub discount: Option<DiscountConfig>,
}

impl Keyed for Product {
    fn key(&self) -> i64 {
        self.id
    }
}

impl TableRecord for Product {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("name", "Product", FieldKind::Text),
        FieldDescriptor::optional("sku", "SKU", FieldKind::Text),
        FieldDescriptor::required("stock", "Stock", FieldKind::Integer),
        FieldDescriptor::required("price", "Price", FieldKind::Decimal),
        FieldDescriptor::optional("discount", "Discount", FieldKind::Text),
    ];

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::Text(format!("#{} {}", self.id, self.name)),
            "sku" => CellValue::from(self.sku.clone()),
            "stock" => CellValue::Integer(self.stock),
            "price" => CellValue::Decimal(self.price),
            "discount" => self.discount.as_ref().map_or(CellValue::Empty, |discount| {
                let window = discount.end_date.map_or_else(
                    || format!("from {}", discount.start_date.format("%Y-%m-%d")),
                    |end| {
                        format!(
                            "{} to {}",
                            discount.start_date.format("%Y-%m-%d"),
                            end.format("%Y-%m-%d")
                        )
                    },
                );
                CellValue::Text(format!("{} ({window})", discount.describe_value()))
            }),
            _ => CellValue::Empty,
        }
    }
}

/// Body of a stock correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    /// New stock count
    pub stock: i64,
    /// Why the count changed; required by the console for losses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
