//! Complaint Discord commands - `complaints list` and `complaints resolve`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        api::endpoints,
        bot::{self, BotData, render},
        core::{
            access::Component,
            complaint::{filter_complaints, pending_count, resolve},
            load::LoadState,
            pagination::paginate,
        },
        errors::{Error, Result},
        models::ComplaintStatus,
    };

    /// Driver complaints. Use the `list` and `resolve` subcommands.
    #[poise::command(
        slash_command,
        subcommands("complaints_list", "complaints_resolve")
    )]
    pub async fn complaints(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Complaint commands:\n\
            `/complaints list` - Lists complaints, newest first\n\
            `/complaints resolve` - Marks a complaint resolved",
        )
        .await?;
        Ok(())
    }

    /// Lists complaints, newest first, optionally filtered by status and text.
    #[poise::command(slash_command, rename = "list")]
    pub async fn complaints_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only show complaints with this status"] status: Option<ComplaintStatus>,
        #[description = "Search order reference, driver or description"] search: Option<String>,
        #[description = "Page number (default 1)"] page: Option<usize>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, Some(Component::Complaints)).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = endpoints::list_complaints(&data.api, &mut session).await;
        bot::close_session(ctx, &mut session, &result).await;

        let state = LoadState::from_result(result.map(|all| {
            (
                pending_count(&all),
                filter_complaints(&all, status, search.as_deref()),
            )
        }));
        let per_page = data.per_page();
        let embed = render::state_embed("Complaints", &state, |(pending, matching)| {
            let page = paginate(matching, page.unwrap_or(1), per_page);
            render::page_embed(&format!("Complaints ({pending} pending)"), &page)
        });

        ctx.send(render::embed_reply(embed)).await?;
        Ok(())
    }

    /// Marks a pending complaint as resolved.
    #[poise::command(slash_command, rename = "resolve")]
    pub async fn complaints_resolve(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Complaint id"] id: i64,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, Some(Component::Complaints)).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = match endpoints::list_complaints(&data.api, &mut session).await {
            Ok(mut complaints) => resolve(&data.api, &mut session, &mut complaints, id).await,
            Err(e) => Err(e),
        };
        bot::close_session(ctx, &mut session, &result).await;
        let resolved = result?;

        ctx.send(render::embed_reply(render::record_embed(
            &format!("✅ Complaint #{} resolved", resolved.id),
            &resolved,
        )))
        .await?;
        Ok(())
    }
}

pub use inner::*;
