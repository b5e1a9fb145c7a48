//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions come from the shared caches and are only offered to operators
//! whose role grants the section the command belongs to. An empty cache is
//! filled once using the caller's session; autocomplete never surfaces errors,
//! it just suggests nothing.

use crate::{
    api::{Session, endpoints},
    bot::{BotData, render::truncate_chars},
    core::{
        access::{Component, has_access},
        reconcile::Keyed,
        session,
    },
    errors::{Error, Result},
};

/// Discord autocomplete limit
const MAX_SUGGESTIONS: usize = 25;

/// Discord's limit on an autocomplete choice, in characters
const MAX_CHOICE_LEN: usize = 100;

/// Label shown for a record, e.g. `Ikeja (#4)`.
///
/// Long names are cut so the label fits a choice; the id suffix is always kept.
#[must_use]
pub fn record_label(name: &str, id: i64) -> String {
    let suffix = format!(" (#{id})");
    let room = MAX_CHOICE_LEN.saturating_sub(suffix.chars().count());
    format!("{}{suffix}", truncate_chars(name, room))
}

/// Extracts the id from a [`record_label`], a `#4` or a bare `4`.
#[must_use]
pub fn parse_record_id(label: &str) -> Option<i64> {
    let label = label.trim();
    let raw = label
        .strip_suffix(')')
        .and_then(|rest| rest.rsplit_once("(#"))
        .map_or(label, |(_, id)| id);
    raw.trim_start_matches('#').parse().ok()
}

/// Finds the record a command argument refers to: a label, an id, or an exact name.
///
/// # Errors
/// Returns [`Error::NotFound`] if nothing matches.
pub fn resolve_label<'a, T: Keyed>(
    items: &'a [T],
    label: &str,
    name: impl Fn(&T) -> &str,
    entity: &'static str,
) -> Result<&'a T> {
    let by_id = parse_record_id(label).and_then(|id| items.iter().find(|item| item.key() == id));
    by_id
        .or_else(|| {
            items
                .iter()
                .find(|item| name(item).eq_ignore_ascii_case(label.trim()))
        })
        .ok_or_else(|| Error::NotFound {
            entity,
            key: label.to_string(),
        })
}

/// Labels of cached records whose name contains `partial`, sorted.
fn suggest<T: Keyed>(items: &[T], name: impl Fn(&T) -> &str, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = items
        .iter()
        .filter(|item| name(item).to_lowercase().contains(&partial_lower))
        .map(|item| record_label(name(item), item.key()))
        .take(MAX_SUGGESTIONS)
        .collect();
    matching.sort();
    matching
}

/// The caller's stored session, if they are logged in.
async fn stored_session(ctx: poise::Context<'_, BotData, Error>) -> Option<Session> {
    session::load(&ctx.data().database, &ctx.author().id.to_string())
        .await
        .ok()
        .flatten()
}

/// Keeps the session only if its role grants `component`.
fn permitted(session: Option<Session>, component: Component) -> Option<Session> {
    session.filter(|session| has_access(&session.profile, component))
}

async fn release_session(ctx: poise::Context<'_, BotData, Error>, session: &mut Session) {
    if let Err(e) = session::persist_if_refreshed(&ctx.data().database, session).await {
        tracing::warn!("Could not persist refreshed tokens: {}", e);
    }
}

/// Provides autocomplete suggestions for delivery areas.
pub async fn autocomplete_area(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Some(mut session) = permitted(stored_session(ctx).await, Component::DeliveryManagement)
    else {
        return Vec::new();
    };
    let data = ctx.data();
    let mut areas = data.caches.areas.snapshot().await;
    if areas.is_empty() {
        if let Ok(loaded) = endpoints::list_areas(&data.api, &mut session).await {
            data.caches.areas.replace(loaded.clone()).await;
            areas = loaded;
        }
        release_session(ctx, &mut session).await;
    }
    suggest(&areas, |area| area.name.as_str(), partial)
}

async fn product_suggestions(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
    component: Component,
) -> Vec<String> {
    let Some(mut session) = permitted(stored_session(ctx).await, component) else {
        return Vec::new();
    };
    let data = ctx.data();
    let mut products = data.caches.products.snapshot().await;
    if products.is_empty() {
        if let Ok(loaded) = endpoints::list_products(&data.api, &mut session).await {
            data.caches.products.replace(loaded.clone()).await;
            products = loaded;
        }
        release_session(ctx, &mut session).await;
    }
    suggest(&products, |product| product.name.as_str(), partial)
}

/// Product suggestions for discount commands.
pub async fn autocomplete_discount_product(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    product_suggestions(ctx, partial, Component::Discounts).await
}

/// Product suggestions for stock correction commands.
pub async fn autocomplete_stock_product(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    product_suggestions(ctx, partial, Component::StockCorrection).await
}

/// Provides autocomplete suggestions for vehicle types.
pub async fn autocomplete_vehicle_type(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Some(mut session) = permitted(stored_session(ctx).await, Component::DeliveryManagement)
    else {
        return Vec::new();
    };
    let data = ctx.data();
    let mut vehicle_types = data.caches.vehicle_types.snapshot().await;
    if vehicle_types.is_empty() {
        if let Ok(loaded) = endpoints::list_vehicle_types(&data.api, &mut session).await {
            data.caches.vehicle_types.replace(loaded.clone()).await;
            vehicle_types = loaded;
        }
        release_session(ctx, &mut session).await;
    }
    suggest(&vehicle_types, |vehicle| vehicle.name.as_str(), partial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_product, test_session};

    #[test]
    fn test_parse_record_id() {
        assert_eq!(parse_record_id("Ikeja (#4)"), Some(4));
        assert_eq!(parse_record_id("Name (with) parens (#12)"), Some(12));
        assert_eq!(parse_record_id("#7"), Some(7));
        assert_eq!(parse_record_id(" 9 "), Some(9));
        assert_eq!(parse_record_id("Ikeja"), None);
        assert_eq!(parse_record_id(&record_label("Rice 5kg", 31)), Some(31));
    }

    #[test]
    fn test_resolve_label() {
        let products = vec![test_product(1, "Rice 5kg", 4), test_product(2, "Beans", 4)];
        assert_eq!(
            resolve_label(&products, "Beans (#2)", |p| p.name.as_str(), "Product")
                .map(|p| p.id)
                .ok(),
            Some(2)
        );
        assert_eq!(
            resolve_label(&products, "rice 5KG", |p| p.name.as_str(), "Product")
                .map(|p| p.id)
                .ok(),
            Some(1)
        );
        assert!(matches!(
            resolve_label(&products, "Lentils", |p| p.name.as_str(), "Product"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_suggest_filters_and_sorts() {
        let products = vec![
            test_product(1, "Rice 5kg", 4),
            test_product(2, "Beans", 4),
            test_product(3, "Brown rice", 4),
        ];
        assert_eq!(
            suggest(&products, |p| p.name.as_str(), "RICE"),
            vec!["Brown rice (#3)", "Rice 5kg (#1)"]
        );
        assert_eq!(suggest(&products, |p| p.name.as_str(), "").len(), 3);
    }

    #[test]
    fn test_record_label_fits_a_choice() {
        let label = record_label(&"Very long area name ".repeat(10), 123_456);
        assert_eq!(label.chars().count(), 100);
        assert!(label.ends_with("… (#123456)"));
        assert_eq!(parse_record_id(&label), Some(123_456));
        assert_eq!(record_label("Ikeja", 4), "Ikeja (#4)");
    }

    #[test]
    fn test_permitted_checks_the_section() {
        let support_only = test_session("support", &["support"]);
        assert!(permitted(Some(support_only.clone()), Component::Discounts).is_none());
        assert!(permitted(Some(support_only), Component::Support).is_some());

        let stock = test_session("warehouse", &["stock-correction"]);
        assert!(permitted(Some(stock.clone()), Component::StockCorrection).is_some());
        assert!(permitted(Some(stock), Component::DeliveryManagement).is_none());

        let admin = test_session("super_admin", &[]);
        assert!(permitted(Some(admin), Component::DeliveryManagement).is_some());
        assert!(permitted(None, Component::Support).is_none());
    }
}
