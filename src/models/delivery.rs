//! Delivery areas, vehicle types and delivery periods.

use crate::core::{
    reconcile::Keyed,
    schema::{CellValue, FieldDescriptor, FieldKind, TableRecord},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A region the platform delivers to, priced per vehicle type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryArea {
    /// Backend id
    pub id: i64,
    /// State / region name
    pub state: String,
    /// Display name
    pub name: String,
    /// Price keyed by vehicle type id
    #[serde(default)]
    pub prices: BTreeMap<String, f64>,
    /// Whether orders can currently be placed for this area
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl DeliveryArea {
    /// Form fields accepted when creating or editing an area.
    pub const FORM: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("state", "State / region", FieldKind::Text),
        FieldDescriptor::required("name", "Display name", FieldKind::Text),
        FieldDescriptor::optional("isActive", "Active", FieldKind::Flag),
    ];

    /// Price charged for the given vehicle type, if one is set.
    #[must_use]
    pub fn price_for(&self, vehicle_type_id: i64) -> Option<f64> {
        self.prices.get(&vehicle_type_id.to_string()).copied()
    }

    fn price_summary(&self) -> String {
        if self.prices.is_empty() {
            return "no prices".to_string();
        }
        self.prices
            .iter()
            .map(|(vehicle, price)| format!("vehicle {vehicle}: {price:.2}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Keyed for DeliveryArea {
    fn key(&self) -> i64 {
        self.id
    }
}

impl TableRecord for DeliveryArea {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("name", "Area", FieldKind::Text),
        FieldDescriptor::required("state", "State", FieldKind::Text),
        FieldDescriptor::optional("prices", "Prices", FieldKind::Text),
        FieldDescriptor::optional("isActive", "Active", FieldKind::Flag),
    ];

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::Text(format!("#{} {}", self.id, self.name)),
            "state" => CellValue::Text(self.state.clone()),
            "prices" => CellValue::Text(self.price_summary()),
            "isActive" => CellValue::Flag(self.is_active),
            _ => CellValue::Empty,
        }
    }
}

/// A class of delivery vehicle and its capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleType {
    /// Backend id
    pub id: i64,
    /// Name (e.g. "Van")
    pub name: String,
    /// Maximum load volume in cubic metres
    pub max_volume: f64,
    /// Maximum load weight in kilograms
    pub max_weight: f64,
    /// Maximum number of packages
    pub max_packages: u32,
    /// Base price before area pricing
    #[serde(default)]
    pub base_price: f64,
}

impl VehicleType {
    /// Form fields accepted when creating a vehicle type.
    pub const FORM: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("name", "Name", FieldKind::Text),
        FieldDescriptor::required("maxVolume", "Max volume (m³)", FieldKind::Decimal),
        FieldDescriptor::required("maxWeight", "Max weight (kg)", FieldKind::Decimal),
        FieldDescriptor::required("maxPackages", "Max packages", FieldKind::Integer),
        FieldDescriptor::optional("basePrice", "Base price", FieldKind::Decimal),
    ];
}

impl Keyed for VehicleType {
    fn key(&self) -> i64 {
        self.id
    }
}

impl TableRecord for VehicleType {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("name", "Vehicle", FieldKind::Text),
        FieldDescriptor::required("maxVolume", "Max volume (m³)", FieldKind::Decimal),
        FieldDescriptor::required("maxWeight", "Max weight (kg)", FieldKind::Decimal),
        FieldDescriptor::required("maxPackages", "Max packages", FieldKind::Integer),
        FieldDescriptor::optional("basePrice", "Base price", FieldKind::Decimal),
    ];

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::Text(format!("#{} {}", self.id, self.name)),
            "maxVolume" => CellValue::Decimal(self.max_volume),
            "maxWeight" => CellValue::Decimal(self.max_weight),
            "maxPackages" => CellValue::Integer(i64::from(self.max_packages)),
            "basePrice" => CellValue::Decimal(self.base_price),
            _ => CellValue::Empty,
        }
    }
}

/// When a delivery period applies: a same-day hour window or a range of days ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum PeriodWindow {
    /// Delivery between two hours of the day (`0 ≤ start < end ≤ 24`)
    Hours {
        /// First hour
        start_hour: u8,
        /// Last hour (exclusive)
        end_hour: u8,
    },
    /// Delivery between `min_days` and `max_days` days after ordering
    Days {
        /// Earliest day
        min_days: u16,
        /// Latest day
        max_days: u16,
    },
}

impl PeriodWindow {
    /// Short human description.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Hours {
                start_hour,
                end_hour,
            } => format!("{start_hour:02}:00-{end_hour:02}:00"),
            Self::Days { min_days, max_days } if min_days == max_days => {
                format!("{min_days} day(s)")
            }
            Self::Days { min_days, max_days } => format!("{min_days}-{max_days} days"),
        }
    }
}

/// A priced delivery option for one vehicle type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPeriod {
    /// Backend id; zero for a period that has not been created yet
    #[serde(default)]
    pub id: i64,
    /// Display name (e.g. "Evening")
    pub name: String,
    /// Vehicle type this period applies to
    pub vehicle_type_id: i64,
    /// Price of the option
    pub price: f64,
    /// When it applies
    #[serde(flatten)]
    pub window: PeriodWindow,
}

impl Keyed for DeliveryPeriod {
    fn key(&self) -> i64 {
        self.id
    }
}

impl TableRecord for DeliveryPeriod {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::required("name", "Period", FieldKind::Text),
        FieldDescriptor::required("vehicleTypeId", "Vehicle type", FieldKind::Integer),
        FieldDescriptor::required("window", "Window", FieldKind::Text),
        FieldDescriptor::required("price", "Price", FieldKind::Decimal),
    ];

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::Text(format!("#{} {}", self.id, self.name)),
            "vehicleTypeId" => CellValue::Integer(self.vehicle_type_id),
            "window" => CellValue::Text(self.window.describe()),
            "price" => CellValue::Decimal(self.price),
            _ => CellValue::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_period_window_is_tagged() {
        let json = r#"{
            "id": 3, "name": "Evening", "vehicleTypeId": 2, "price": 7.5,
            "kind": "hours", "startHour": 18, "endHour": 22
        }"#;
        let period: DeliveryPeriod = serde_json::from_str(json).unwrap();
        assert_eq!(
            period.window,
            PeriodWindow::Hours {
                start_hour: 18,
                end_hour: 22
            }
        );
        assert_eq!(period.window.describe(), "18:00-22:00");

        let days = serde_json::to_value(&DeliveryPeriod {
            id: 0,
            name: "Economy".to_string(),
            vehicle_type_id: 1,
            price: 3.0,
            window: PeriodWindow::Days {
                min_days: 2,
                max_days: 4,
            },
        })
        .unwrap();
        assert_eq!(days["kind"], "days");
        assert_eq!(days["minDays"], 2);
        assert_eq!(days["maxDays"], 4);
        assert!(days.get("startHour").is_none());
    }

    #[test]
    fn test_area_prices_by_vehicle() {
        let json = r#"{"id": 1, "state": "Lagos", "name": "Ikeja", "prices": {"1": 1500.0, "2": 2500.0}}"#;
        let area: DeliveryArea = serde_json::from_str(json).unwrap();
        assert!(area.is_active);
        assert_eq!(area.price_for(2), Some(2500.0));
        assert_eq!(area.price_for(7), None);
    }
}
