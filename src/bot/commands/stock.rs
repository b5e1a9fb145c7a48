//! Stock correction Discord commands.
//!
//! Drafts are kept in the local database; only `/stock save` talks to the
//! backend's stock endpoint.

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
        core::{access::Component, pagination::paginate, stock},
        errors::{Error, Result},
    };

    const COMPONENT: Option<Component> = Some(Component::StockCorrection);

    /// Stock correction drafts.
    #[poise::command(
        slash_command,
        subcommands(
            "stock_open",
            "stock_confirm",
            "stock_propose",
            "stock_save",
            "stock_drafts",
            "stock_discard"
        )
    )]
    pub async fn stock(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Stock correction commands:\n\
            `/stock open` - Opens a draft for a product\n\
            `/stock confirm` - Confirms the recorded count is right\n\
            `/stock propose` - Proposes a corrected count\n\
            `/stock save` - Sends a proposed count to the backend\n\
            `/stock drafts` - Lists open drafts\n\
            `/stock discard` - Throws a draft away",
        )
        .await?;
        Ok(())
    }

    /// Opens a correction draft for a product, using its current backend stock.
    #[poise::command(slash_command, rename = "open")]
    pub async fn stock_open(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product"]
        #[autocomplete = "autocomplete::autocomplete_stock_product"]
        product: String,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = endpoints::list_products(&data.api, &mut session).await;
        bot::close_session(ctx, &mut session, &result).await;
        let products = result?;
        data.caches.products.replace(products.clone()).await;

        let product = resolve_label(&products, &product, |p| p.name.as_str(), "Product")?;
        let draft =
            stock::open_draft(&data.database, product, &ctx.author().id.to_string()).await?;

        ctx.send(render::embed_reply(render::record_embed(
            &format!("📝 Stock draft #{}", draft.id),
            &draft,
        )))
        .await?;
        Ok(())
    }

    /// Confirms the recorded stock count is accurate and closes the draft.
    #[poise::command(slash_command, rename = "confirm")]
    pub async fn stock_confirm(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Draft id"] draft: i64,
    ) -> Result<()> {
        bot::open_session(ctx, COMPONENT).await?;
        let confirmed = stock::confirm_correct(&ctx.data().database, draft).await?;

        ctx.say(format!(
            "✅ Stock of {} confirmed at {}.",
            confirmed.product_name, confirmed.current_stock
        ))
        .await?;
        Ok(())
    }

    /// Proposes a corrected stock count; losses need a reason.
    #[poise::command(slash_command, rename = "propose")]
    pub async fn stock_propose(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Draft id"] draft: i64,
        #[description = "Correct stock count"] count: i64,
        #[description = "Why the count changed (required for losses)"] reason: Option<String>,
    ) -> Result<()> {
        bot::open_session(ctx, COMPONENT).await?;
        let proposed = stock::propose(&ctx.data().database, draft, count, reason).await?;

        ctx.send(render::embed_reply(render::record_embed(
            &format!("📝 Stock draft #{} updated; use /stock save to apply", proposed.id),
            &proposed,
        )))
        .await?;
        Ok(())
    }

    /// Sends a proposed count to the backend.
    #[poise::command(slash_command, rename = "save")]
    pub async fn stock_save(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Draft id"] draft: i64,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = stock::save(&data.database, &data.api, &mut session, draft).await;
        bot::close_session(ctx, &mut session, &result).await;
        let (saved, product) = result?;
        data.caches.products.upsert(product.clone()).await;

        ctx.say(format!(
            "✅ Stock of {} changed from {} to {}.",
            saved.product_name, saved.current_stock, product.stock
        ))
        .await?;
        Ok(())
    }

    /// Lists open drafts.
    #[poise::command(slash_command, rename = "drafts")]
    pub async fn stock_drafts(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Page number (default 1)"] page: Option<usize>,
    ) -> Result<()> {
        bot::open_session(ctx, COMPONENT).await?;
        let data = ctx.data();

        let drafts = stock::list_open(&data.database).await?;
        let page = paginate(&drafts, page.unwrap_or(1), data.per_page());
        ctx.send(render::embed_reply(render::page_embed("Open stock drafts", &page)))
            .await?;
        Ok(())
    }

    /// Throws away an open draft.
    #[poise::command(slash_command, rename = "discard")]
    pub async fn stock_discard(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Draft id"] draft: i64,
    ) -> Result<()> {
        bot::open_session(ctx, COMPONENT).await?;
        let discarded = stock::discard(&ctx.data().database, draft).await?;

        ctx.say(format!(
            "🗑️ Draft #{} for {} discarded.",
            discarded.id, discarded.product_name
        ))
        .await?;
        Ok(())
    }
}

pub use inner::*;
