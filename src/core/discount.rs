//! Derived discount status.
//!
//! The backend stores a discount's dates and its on/off switch; whether it is
//! scheduled, running or over is worked out here from the current time.

use crate::{
    api::{ApiClient, Session, endpoints},
    core::{
        reconcile,
        schema::{FormMode, validate_form},
    },
    errors::{Error, Result},
    models::{DiscountConfig, DiscountKind, Product},
};
use chrono::{DateTime, Utc};
use std::fmt;

/// Where a discount is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, poise::ChoiceParameter)]
pub enum DiscountStatus {
    /// Starts in the future
    #[name = "scheduled"]
    Scheduled,
    /// Currently applies
    #[name = "active"]
    Active,
    /// End date has passed
    #[name = "expired"]
    Expired,
    /// Switched off manually
    #[name = "disabled"]
    Disabled,
}

impl DiscountStatus {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Active => "Active",
            Self::Expired => "Expired",
            Self::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for DiscountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status of a discount at `now`.
///
/// The manual switch wins over the dates; then a future start date means
/// scheduled, a past end date means expired, and anything else is active.
#[must_use]
pub fn discount_status(config: &DiscountConfig, now: DateTime<Utc>) -> DiscountStatus {
    if !config.is_active {
        return DiscountStatus::Disabled;
    }
    if now < config.start_date {
        return DiscountStatus::Scheduled;
    }
    match config.end_date {
        Some(end) if now > end => DiscountStatus::Expired,
        _ => DiscountStatus::Active,
    }
}

/// Status of a product's discount, or `None` if it has no discount.
#[must_use]
pub fn product_status(product: &Product, now: DateTime<Utc>) -> Option<DiscountStatus> {
    product
        .discount
        .as_ref()
        .map(|config| discount_status(config, now))
}

/// Products whose discount currently has the given status.
#[must_use]
pub fn filter_by_status(
    products: &[Product],
    status: Option<DiscountStatus>,
    now: DateTime<Utc>,
) -> Vec<Product> {
    products
        .iter()
        .filter(|product| match (status, product_status(product, now)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(wanted), Some(actual)) => wanted == actual,
        })
        .cloned()
        .collect()
}

/// Number of discounted products per status, in display order.
#[must_use]
pub fn status_counts(products: &[Product], now: DateTime<Utc>) -> [(DiscountStatus, usize); 4] {
    [
        DiscountStatus::Active,
        DiscountStatus::Scheduled,
        DiscountStatus::Expired,
        DiscountStatus::Disabled,
    ]
    .map(|status| {
        let count = products
            .iter()
            .filter(|product| product_status(product, now) == Some(status))
            .count();
        (status, count)
    })
}

/// Checks a discount's amount and dates.
///
/// # Errors
/// Returns [`Error::Validation`] for a percentage outside `0 < v ≤ 100`, a
/// negative fixed amount, or an end date before the start date.
pub fn validate_config(config: &DiscountConfig) -> Result<()> {
    let value_ok = match config.kind {
        DiscountKind::Percentage => config.value > 0.0 && config.value <= 100.0,
        DiscountKind::Fixed => config.value >= 0.0,
    };
    if !value_ok || !config.value.is_finite() {
        return Err(Error::validation(
            "value",
            format!("{} is not a valid discount", config.describe_value()),
        ));
    }
    if config.end_date.is_some_and(|end| end < config.start_date) {
        return Err(Error::validation("endDate", "end date is before the start date"));
    }
    Ok(())
}

fn find_product(products: &[Product], id: i64) -> Result<&Product> {
    reconcile::find_record(products, id).ok_or_else(|| Error::NotFound {
        entity: "Product",
        key: id.to_string(),
    })
}

/// Flips a product's discount switch and stores the result.
///
/// # Errors
/// - [`Error::NotFound`] if the product is unknown
/// - [`Error::Validation`] if it has no discount to toggle
/// - any API error; `products` is then left unchanged
pub async fn toggle(
    api: &ApiClient,
    session: &mut Session,
    products: &mut Vec<Product>,
    product_id: i64,
) -> Result<Product> {
    let product = find_product(products, product_id)?;
    let Some(mut config) = product.discount.clone() else {
        return Err(Error::validation(
            "discount",
            format!("{} has no discount configured", product.name),
        ));
    };
    config.is_active = !config.is_active;

    let outcome = endpoints::update_discount(api, session, product_id, &config).await;
    let stored = reconcile::commit(products, outcome)?;
    tracing::info!(
        "Discount on product #{} switched {} by {}",
        product_id,
        if config.is_active { "on" } else { "off" },
        session.username
    );
    Ok(stored)
}

/// Replaces a product's discount from form input.
///
/// # Errors
/// - [`Error::NotFound`] if the product is unknown
/// - [`Error::Validation`] for missing or malformed fields
/// - any API error; `products` is then left unchanged
pub async fn set_discount(
    api: &ApiClient,
    session: &mut Session,
    products: &mut Vec<Product>,
    product_id: i64,
    input: &[(&str, Option<String>)],
) -> Result<Product> {
    find_product(products, product_id)?;
    let form = validate_form(DiscountConfig::FORM, input, FormMode::Create)?;
    let config: DiscountConfig = serde_json::from_value(form.into())?;
    validate_config(&config)?;

    let outcome = endpoints::update_discount(api, session, product_id, &config).await;
    reconcile::commit(products, outcome)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{json_response, scripted_client, test_session, text_response};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn config(
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        is_active: bool,
    ) -> DiscountConfig {
        DiscountConfig {
            kind: DiscountKind::Percentage,
            value: 10.0,
            start_date: start,
            end_date: end,
            is_active,
        }
    }

    fn product(id: i64, discount: Option<DiscountConfig>) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            sku: None,
            stock: 1,
            price: 1.0,
            discount,
        }
    }

    #[test]
    fn test_lifecycle_scenario() {
        let tomorrow = now() + Duration::days(1);
        let yesterday = now() - Duration::days(1);

        assert_eq!(
            discount_status(&config(tomorrow, None, true), now()),
            DiscountStatus::Scheduled
        );
        assert_eq!(
            discount_status(&config(yesterday, None, true), now()),
            DiscountStatus::Active
        );
        assert_eq!(
            discount_status(&config(yesterday - Duration::days(5), Some(yesterday), true), now()),
            DiscountStatus::Expired
        );
        assert_eq!(
            discount_status(&config(tomorrow, Some(yesterday), false), now()),
            DiscountStatus::Disabled
        );
    }

    #[test]
    fn test_disabled_overrides_every_date_combination() {
        let offsets = [-3_i64, 0, 3];
        for start in offsets {
            for end in offsets {
                let cfg = config(
                    now() + Duration::days(start),
                    Some(now() + Duration::days(end)),
                    false,
                );
                assert_eq!(discount_status(&cfg, now()), DiscountStatus::Disabled);
            }
        }
    }

    #[test]
    fn test_boundaries_are_active() {
        // Starting exactly now, or ending exactly now, still applies.
        assert_eq!(
            discount_status(&config(now(), Some(now()), true), now()),
            DiscountStatus::Active
        );
    }

    #[test]
    fn test_status_is_deterministic() {
        let cfg = config(now() - Duration::hours(1), Some(now() + Duration::hours(1)), true);
        let first = discount_status(&cfg, now());
        for _ in 0..5 {
            assert_eq!(discount_status(&cfg, now()), first);
        }
    }

    #[test]
    fn test_filter_and_counts() {
        let products = vec![
            product(1, Some(config(now() - Duration::days(2), None, true))),
            product(2, Some(config(now() + Duration::days(2), None, true))),
            product(3, Some(config(now() - Duration::days(2), None, false))),
            product(4, None),
        ];

        let active = filter_by_status(&products, Some(DiscountStatus::Active), now());
        assert_eq!(active.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);

        let discounted = filter_by_status(&products, None, now());
        assert_eq!(discounted.len(), 3);

        assert_eq!(product_status(&products[3], now()), None);

        let counts = status_counts(&products, now());
        assert_eq!(
            counts,
            [
                (DiscountStatus::Active, 1),
                (DiscountStatus::Scheduled, 1),
                (DiscountStatus::Expired, 0),
                (DiscountStatus::Disabled, 1),
            ]
        );
    }

    #[test]
    fn test_validate_config() {
        let mut cfg = config(now(), None, true);
        assert!(validate_config(&cfg).is_ok());

        cfg.value = 150.0;
        assert!(validate_config(&cfg).is_err());

        cfg.kind = DiscountKind::Fixed;
        assert!(validate_config(&cfg).is_ok());

        cfg.end_date = Some(now() - Duration::days(1));
        assert!(matches!(
            validate_config(&cfg),
            Err(Error::Validation { ref field, .. }) if field == "endDate"
        ));
    }

    #[tokio::test]
    async fn test_toggle_flips_switch() {
        let (api, transport) = scripted_client(vec![Ok(json_response(
            200,
            r#"{"id": 1, "name": "Product 1", "stock": 1, "price": 1.0,
                "discount": {"type": "percentage", "value": 10, "startDate": "2026-10-01T00:00:00Z",
                             "isActive": false}}"#,
        ))]);
        let mut session = test_session("marketing", &["discounts"]);
        let mut products = vec![product(1, Some(config(now(), None, true)))];

        let stored = toggle(&api, &mut session, &mut products, 1).await.unwrap();

        assert_eq!(product_status(&stored, now()), Some(DiscountStatus::Disabled));
        assert!(!products[0].discount.as_ref().unwrap().is_active);
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["isActive"], false);
        assert_eq!(transport.requests()[0].url.path(), "/api/products/1/discount");
    }

    #[tokio::test]
    async fn test_toggle_without_discount_is_rejected() {
        let (api, transport) = scripted_client(Vec::new());
        let mut session = test_session("marketing", &["discounts"]);
        let mut products = vec![product(4, None)];

        let err = toggle(&api, &mut session, &mut products, 4).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_set_keeps_products() {
        let (api, _transport) = scripted_client(vec![Ok(text_response(503, "maintenance"))]);
        let mut session = test_session("marketing", &["discounts"]);
        let mut products = vec![product(4, None)];
        let input = [
            ("type", Some("fixed".to_string())),
            ("value", Some("2.5".to_string())),
            ("startDate", Some("2026-11-01".to_string())),
            ("isActive", Some("yes".to_string())),
        ];

        let err = set_discount(&api, &mut session, &mut products, 4, &input)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api { status: 503, .. }));
        assert!(products[0].discount.is_none());
    }
}
