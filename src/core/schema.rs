//! Generic table and form descriptions.
//!
//! Every backend record the console shows is described once as a list of
//! [`FieldDescriptor`]s. The same descriptors drive table rendering in the bot
//! layer and validation of create/edit input, so no screen carries its own
//! bespoke markup or required-field checks.

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Kind of value a field holds. Drives both parsing and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// Whole number
    Integer,
    /// Decimal number (prices, weights)
    Decimal,
    /// Boolean flag
    Flag,
    /// Calendar date or timestamp
    Date,
    /// One of a fixed set of lowercase options
    Choice(&'static [&'static str]),
}

/// Describes one column of a table / one input of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// JSON key used by the backend
    pub key: &'static str,
    /// Human-readable label
    pub label: &'static str,
    /// Value kind
    pub kind: FieldKind,
    /// Whether the field must be present on create
    pub required: bool,
}

impl FieldDescriptor {
    /// A field that must be filled in on create.
    #[must_use]
    pub const fn required(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
        }
    }

    /// A field that may be left blank.
    #[must_use]
    pub const fn optional(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
        }
    }
}

/// A single rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// No value
    Empty,
    /// Text value
    Text(String),
    /// Whole number
    Integer(i64),
    /// Decimal number
    Decimal(f64),
    /// Boolean flag
    Flag(bool),
    /// Timestamp
    Date(DateTime<Utc>),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "-"),
            Self::Text(text) => write!(f, "{text}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value:.2}"),
            Self::Flag(true) => write!(f, "yes"),
            Self::Flag(false) => write!(f, "no"),
            Self::Date(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M")),
        }
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Empty, Self::Text)
    }
}

/// A backend record that can be shown as a table row.
pub trait TableRecord {
    /// Columns in display order. The first one is used as the row title.
    const FIELDS: &'static [FieldDescriptor];

    /// Value of the column with the given key.
    fn cell(&self, key: &str) -> CellValue;
}

/// Renders every column of a record as `(label, text)` pairs.
pub fn render_row<T: TableRecord>(record: &T) -> Vec<(&'static str, String)> {
    T::FIELDS
        .iter()
        .map(|field| (field.label, record.cell(field.key).to_string()))
        .collect()
}

/// Renders the title column of a record.
pub fn row_title<T: TableRecord>(record: &T) -> String {
    T::FIELDS
        .first()
        .map_or_else(String::new, |field| record.cell(field.key).to_string())
}

/// Renders a slice of records as `(title, columns)` rows, in order.
pub fn render_rows<T: TableRecord>(records: &[T]) -> Vec<(String, Vec<(&'static str, String)>)> {
    records
        .iter()
        .map(|record| (row_title(record), render_row(record)))
        .collect()
}

/// Whether a form creates a record or patches an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// All required fields must be supplied
    Create,
    /// Only supplied fields are validated; required fields may not be blanked
    Patch,
}

/// Validates raw form input against a schema and converts it to a JSON object.
///
/// Input values are trimmed; an empty value counts as absent. Keys that are not
/// part of the schema are rejected.
///
/// # Errors
/// Returns [`Error::Validation`] naming the first offending field.
pub fn validate_form(
    fields: &[FieldDescriptor],
    input: &[(&str, Option<String>)],
    mode: FormMode,
) -> Result<Map<String, Value>> {
    if let Some((unknown, _)) = input
        .iter()
        .find(|(key, _)| !fields.iter().any(|field| field.key == *key))
    {
        return Err(Error::validation(*unknown, "unknown field"));
    }

    let mut object = Map::new();
    for field in fields {
        let supplied = input.iter().find(|(key, _)| *key == field.key);
        let raw = supplied
            .and_then(|(_, value)| value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match (raw, mode) {
            (Some(raw), _) => {
                object.insert(field.key.to_string(), parse_value(field, raw)?);
            }
            (None, FormMode::Create) if field.required => {
                return Err(Error::validation(field.key, format!("{} is required", field.label)));
            }
            (None, FormMode::Patch) if field.required && supplied.is_some() => {
                return Err(Error::validation(
                    field.key,
                    format!("{} cannot be blank", field.label),
                ));
            }
            (None, _) => {}
        }
    }
    Ok(object)
}

fn parse_value(field: &FieldDescriptor, raw: &str) -> Result<Value> {
    match field.kind {
        FieldKind::Text => Ok(Value::String(raw.to_string())),
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| Error::validation(field.key, format!("'{raw}' is not a whole number"))),
        FieldKind::Decimal => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| Error::validation(field.key, format!("'{raw}' is not a number"))),
        FieldKind::Flag => parse_flag(raw)
            .map(Value::Bool)
            .ok_or_else(|| Error::validation(field.key, format!("'{raw}' is not yes/no"))),
        FieldKind::Date => parse_date(raw)
            .map(|date| Value::String(date.to_rfc3339()))
            .ok_or_else(|| {
                Error::validation(field.key, format!("'{raw}' is not a date (YYYY-MM-DD)"))
            }),
        FieldKind::Choice(options) => {
            let lowered = raw.to_lowercase();
            options
                .iter()
                .find(|option| **option == lowered)
                .map(|option| Value::String((*option).to_string()))
                .ok_or_else(|| {
                    Error::validation(
                        field.key,
                        format!("'{raw}' must be one of: {}", options.join(", ")),
                    )
                })
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Parses `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
