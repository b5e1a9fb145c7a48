//! Discount Discord commands - `discounts list`, `discounts toggle` and `discounts set`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        api::endpoints,
        bot::{
            self, BotData,
            handlers::autocomplete::{self, resolve_label},
            render,
        },
        core::{
            access::Component,
            discount::{self, DiscountStatus, filter_by_status, status_counts},
            load::LoadState,
            pagination::paginate,
        },
        errors::{Error, Result},
        models::DiscountKind,
    };

    const COMPONENT: Option<Component> = Some(Component::Discounts);

    /// Product discounts.
    #[poise::command(
        slash_command,
        subcommands("discounts_list", "discounts_toggle", "discounts_set")
    )]
    pub async fn discounts(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Discount commands:\n\
            `/discounts list` - Lists discounted products by status\n\
            `/discounts toggle` - Switches a discount on or off\n\
            `/discounts set` - Creates or replaces a product's discount",
        )
        .await?;
        Ok(())
    }

    /// Lists discounted products, optionally only those with a given status.
    #[poise::command(slash_command, rename = "list")]
    pub async fn discounts_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only show discounts with this status"] status: Option<DiscountStatus>,
        #[description = "Page number (default 1)"] page: Option<usize>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = endpoints::list_discounted_products(&data.api, &mut session).await;
        bot::close_session(ctx, &mut session, &result).await;

        let now = chrono::Utc::now();
        let per_page = data.per_page();
        let state = LoadState::from_result(result.map(|products| {
            (
                status_counts(&products, now),
                filter_by_status(&products, status, now),
            )
        }));
        let title = status.map_or_else(
            || "Discounts".to_string(),
            |status| format!("{status} discounts"),
        );
        let embed = render::state_embed(&title, &state, |(counts, matching)| {
            let summary = counts
                .iter()
                .map(|(status, count)| format!("{status}: **{count}**"))
                .collect::<Vec<_>>()
                .join(" • ");
            render::page_embed(&title, &paginate(matching, page.unwrap_or(1), per_page))
                .description(summary)
        });
        ctx.send(render::embed_reply(embed)).await?;
        Ok(())
    }

    /// Switches a product's discount on or off.
    #[poise::command(slash_command, rename = "toggle")]
    pub async fn discounts_toggle(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product"]
        #[autocomplete = "autocomplete::autocomplete_discount_product"]
        product: String,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = match endpoints::list_discounted_products(&data.api, &mut session).await {
            Ok(mut products) => {
                match resolve_label(&products, &product, |p| p.name.as_str(), "Product")
                    .map(|p| p.id)
                {
                    Ok(id) => discount::toggle(&data.api, &mut session, &mut products, id).await,
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };
        bot::close_session(ctx, &mut session, &result).await;
        let updated = result?;
        data.caches.products.upsert(updated.clone()).await;

        let status = discount::product_status(&updated, chrono::Utc::now())
            .map_or("No discount", DiscountStatus::label);
        ctx.send(render::embed_reply(render::record_embed(
            &format!("✅ {}: {status}", updated.name),
            &updated,
        )))
        .await?;
        Ok(())
    }

    /// Creates or replaces a product's discount.
    #[poise::command(slash_command, rename = "set")]
    pub async fn discounts_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product"]
        #[autocomplete = "autocomplete::autocomplete_discount_product"]
        product: String,
        #[description = "Percentage or fixed amount"] kind: DiscountKind,
        #[description = "Discount value"] value: f64,
        #[description = "Start date (YYYY-MM-DD)"] start: String,
        #[description = "End date (YYYY-MM-DD); open-ended if empty"] end: Option<String>,
        #[description = "Switch the discount on (default yes)"] enabled: Option<bool>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();
        let input = [
            ("type", Some(kind.as_str().to_string())),
            ("value", Some(value.to_string())),
            ("startDate", Some(start)),
            ("endDate", end),
            ("isActive", Some(enabled.unwrap_or(true).to_string())),
        ];

        let result = match data
            .caches
            .products
            .get_or_load(|| endpoints::list_products(&data.api, &mut session))
            .await
        {
            Ok(mut products) => {
                match resolve_label(&products, &product, |p| p.name.as_str(), "Product")
                    .map(|p| p.id)
                {
                    Ok(id) => {
                        discount::set_discount(&data.api, &mut session, &mut products, id, &input)
                            .await
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };
        bot::close_session(ctx, &mut session, &result).await;
        let updated = result?;
        data.caches.products.upsert(updated.clone()).await;

        ctx.send(render::embed_reply(render::record_embed(
            &format!("✅ Discount saved for {}", updated.name),
            &updated,
        )))
        .await?;
        Ok(())
    }
}

pub use inner::*;
