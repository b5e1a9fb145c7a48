//! Delivery management business logic - areas, vehicle types and delivery periods.
//!
//! Forms are validated against the record schemas before anything is sent, and
//! local collections only change after the backend has stored the change.

use crate::{
    api::{ApiClient, Session, endpoints},
    core::{
        reconcile,
        schema::{FormMode, validate_form},
    },
    errors::{Error, Result},
    models::{DeliveryArea, DeliveryPeriod, PeriodWindow, VehicleType},
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw form input: `(field key, value)` pairs.
pub type FormInput<'a> = [(&'a str, Option<String>)];

/// Rejects a name already used by another area (case-insensitive).
///
/// # Errors
/// Returns [`Error::Validation`] on a duplicate.
pub fn check_area_name_unique(
    areas: &[DeliveryArea],
    state: &str,
    name: &str,
    except: Option<i64>,
) -> Result<()> {
    let duplicate = areas.iter().any(|area| {
        Some(area.id) != except
            && area.name.eq_ignore_ascii_case(name.trim())
            && area.state.eq_ignore_ascii_case(state.trim())
    });
    if duplicate {
        return Err(Error::validation(
            "name",
            format!("an area named '{}' already exists in {}", name.trim(), state.trim()),
        ));
    }
    Ok(())
}

/// Checks that every price is a finite non-negative amount for a known vehicle type.
///
/// # Errors
/// Returns [`Error::Validation`] for the first offending entry.
pub fn validate_prices(prices: &BTreeMap<String, f64>, vehicle_types: &[VehicleType]) -> Result<()> {
    for (vehicle, price) in prices {
        if !vehicle_types.iter().any(|v| v.id.to_string() == *vehicle) {
            return Err(Error::validation(
                "prices",
                format!("vehicle type {vehicle} does not exist"),
            ));
        }
        if !price.is_finite() || *price < 0.0 {
            return Err(Error::validation(
                "prices",
                format!("price for vehicle type {vehicle} must be zero or more"),
            ));
        }
    }
    Ok(())
}

/// Checks an hour window (`0 ≤ start < end ≤ 24`) or a day range (`1 ≤ min ≤ max`).
///
/// # Errors
/// Returns [`Error::Validation`] if the window is empty or out of range.
pub fn validate_window(window: &PeriodWindow) -> Result<()> {
    match *window {
        PeriodWindow::Hours {
            start_hour,
            end_hour,
        } => {
            if end_hour > 24 || start_hour >= end_hour {
                return Err(Error::validation(
                    "window",
                    format!("hours {start_hour}-{end_hour} must satisfy 0 <= start < end <= 24"),
                ));
            }
        }
        PeriodWindow::Days { min_days, max_days } => {
            if min_days == 0 || min_days > max_days {
                return Err(Error::validation(
                    "window",
                    format!("days {min_days}-{max_days} must satisfy 1 <= min <= max"),
                ));
            }
        }
    }
    Ok(())
}

/// Checks a new delivery period, including that its vehicle type exists.
///
/// # Errors
/// Returns [`Error::Validation`] or [`Error::NotFound`].
pub fn validate_period(period: &DeliveryPeriod, vehicle_types: &[VehicleType]) -> Result<()> {
    if period.name.trim().is_empty() {
        return Err(Error::validation("name", "period name cannot be empty"));
    }
    if !period.price.is_finite() || period.price < 0.0 {
        return Err(Error::validation("price", "price must be zero or more"));
    }
    validate_window(&period.window)?;
    if reconcile::find_record(vehicle_types, period.vehicle_type_id).is_none() {
        return Err(Error::NotFound {
            entity: "Vehicle type",
            key: period.vehicle_type_id.to_string(),
        });
    }
    Ok(())
}

fn form_str<'a>(form: &'a serde_json::Map<String, Value>, key: &str) -> &'a str {
    form.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn find_area(areas: &[DeliveryArea], id: i64) -> Result<&DeliveryArea> {
    reconcile::find_record(areas, id).ok_or_else(|| Error::NotFound {
        entity: "Area",
        key: id.to_string(),
    })
}

/// Creates an area from form input and adds the stored copy to `areas`.
pub async fn create_area(
    api: &ApiClient,
    session: &mut Session,
    areas: &mut Vec<DeliveryArea>,
    input: &FormInput<'_>,
) -> Result<DeliveryArea> {
    let form = validate_form(DeliveryArea::FORM, input, FormMode::Create)?;
    check_area_name_unique(areas, form_str(&form, "state"), form_str(&form, "name"), None)?;

    let outcome = endpoints::create_area(api, session, &form).await;
    let stored = reconcile::commit(areas, outcome)?;
    tracing::info!("Area #{} '{}' created by {}", stored.id, stored.name, session.username);
    Ok(stored)
}

/// Applies a partial edit to an area and stores it.
pub async fn edit_area(
    api: &ApiClient,
    session: &mut Session,
    areas: &mut Vec<DeliveryArea>,
    id: i64,
    input: &FormInput<'_>,
) -> Result<DeliveryArea> {
    let patch = validate_form(DeliveryArea::FORM, input, FormMode::Patch)?;
    if patch.is_empty() {
        return Err(Error::validation("form", "nothing to change"));
    }

    let mut merged = serde_json::to_value(find_area(areas, id)?)?;
    if let Value::Object(object) = &mut merged {
        object.extend(patch);
    }
    let edited: DeliveryArea = serde_json::from_value(merged)?;
    check_area_name_unique(areas, &edited.state, &edited.name, Some(id))?;

    let outcome = endpoints::update_area(api, session, &edited).await;
    reconcile::commit(areas, outcome)
}

/// Sets (or with `None`, clears) an area's price for one vehicle type.
pub async fn set_area_price(
    api: &ApiClient,
    session: &mut Session,
    areas: &mut Vec<DeliveryArea>,
    vehicle_types: &[VehicleType],
    area_id: i64,
    vehicle_type_id: i64,
    price: Option<f64>,
) -> Result<DeliveryArea> {
    let mut edited = find_area(areas, area_id)?.clone();
    let key = vehicle_type_id.to_string();
    match price {
        Some(price) => {
            edited.prices.insert(key, price);
        }
        None => {
            edited.prices.remove(&key);
        }
    }
    validate_prices(&edited.prices, vehicle_types)?;

    let outcome = endpoints::update_area(api, session, &edited).await;
    reconcile::commit(areas, outcome)
}

/// Deletes an area; it leaves `areas` only once the backend confirms.
pub async fn delete_area(
    api: &ApiClient,
    session: &mut Session,
    areas: &mut Vec<DeliveryArea>,
    id: i64,
) -> Result<DeliveryArea> {
    let area = find_area(areas, id)?.clone();
    endpoints::delete_area(api, session, id).await?;
    reconcile::remove_record(areas, id);
    tracing::info!("Area #{} '{}' deleted by {}", id, area.name, session.username);
    Ok(area)
}

/// Creates a vehicle type from form input.
pub async fn create_vehicle_type(
    api: &ApiClient,
    session: &mut Session,
    vehicle_types: &mut Vec<VehicleType>,
    input: &FormInput<'_>,
) -> Result<VehicleType> {
    let form = validate_form(VehicleType::FORM, input, FormMode::Create)?;
    for key in ["maxVolume", "maxWeight", "maxPackages"] {
        if form.get(key).and_then(Value::as_f64).is_some_and(|v| v <= 0.0) {
            return Err(Error::validation(key, "capacity must be greater than zero"));
        }
    }
    if form.get("basePrice").and_then(Value::as_f64).is_some_and(|v| v < 0.0) {
        return Err(Error::validation("basePrice", "base price must be zero or more"));
    }
    let name = form_str(&form, "name");
    if vehicle_types.iter().any(|v| v.name.eq_ignore_ascii_case(name)) {
        return Err(Error::validation(
            "name",
            format!("a vehicle type named '{name}' already exists"),
        ));
    }

    let outcome = endpoints::create_vehicle_type(api, session, &form).await;
    reconcile::commit(vehicle_types, outcome)
}

/// Creates a delivery period after checking its window and vehicle type.
pub async fn create_period(
    api: &ApiClient,
    session: &mut Session,
    periods: &mut Vec<DeliveryPeriod>,
    vehicle_types: &[VehicleType],
    period: DeliveryPeriod,
) -> Result<DeliveryPeriod> {
    validate_period(&period, vehicle_types)?;
    let outcome = endpoints::create_delivery_period(api, session, &period).await;
    reconcile::commit(periods, outcome)
}

/// Deletes a delivery period once the backend confirms.
pub async fn delete_period(
    api: &ApiClient,
    session: &mut Session,
    periods: &mut Vec<DeliveryPeriod>,
    id: i64,
) -> Result<()> {
    if reconcile::find_record(periods, id).is_none() {
        return Err(Error::NotFound {
            entity: "Delivery period",
            key: id.to_string(),
        });
    }
    endpoints::delete_delivery_period(api, session, id).await?;
    reconcile::remove_record(periods, id);
    Ok(())
}
