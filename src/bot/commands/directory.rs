//! Read-only directory commands - support dashboard, customers, employees and referrals.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        api::endpoints,
        bot::{self, BotData, render},
        core::{
            access::Component,
            load::LoadState,
            pagination::{filter_then_paginate, paginate},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Discord's 25 fields minus the four count fields.
    const MAX_TICKET_FIELDS: usize = 21;

    /// Customer support overview.
    #[poise::command(slash_command, subcommands("support_dashboard"))]
    pub async fn support(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Use `/support dashboard` for the ticket overview.")
            .await?;
        Ok(())
    }

    /// Shows ticket counts and the most recent tickets.
    #[poise::command(slash_command, rename = "dashboard")]
    pub async fn support_dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let mut session = bot::open_session(ctx, Some(Component::Support)).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = endpoints::support_dashboard(&data.api, &mut session).await;
        bot::close_session(ctx, &mut session, &result).await;

        let per_page = data.per_page();
        let state = LoadState::from_result(result);
        let embed = render::state_embed("Support", &state, |dashboard| {
            let response = dashboard
                .average_response_minutes
                .map_or_else(|| "-".to_string(), |minutes| format!("{minutes:.0} min"));
            let recent = paginate(&dashboard.recent_tickets, 1, per_page);
            let (tickets, _) = render::fit_fields(
                render::page_fields(&recent),
                render::field_budget("Support dashboard"),
            );
            serenity::CreateEmbed::default()
                .title("Support dashboard")
                .color(render::COLOR_INFO)
                .field("Open", dashboard.open_tickets.to_string(), true)
                .field("In progress", dashboard.in_progress_tickets.to_string(), true)
                .field("Resolved today", dashboard.resolved_today.to_string(), true)
                .field("Avg. first response", response, true)
                .fields(
                    tickets
                        .into_iter()
                        .take(MAX_TICKET_FIELDS)
                        .map(|(name, value)| (name, value, false)),
                )
        });
        ctx.send(render::embed_reply(embed)).await?;
        Ok(())
    }

    /// Customers managed by foremen.
    #[poise::command(slash_command, subcommands("customers_list"))]
    pub async fn customers(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Use `/customers list` to browse foreman customers.")
            .await?;
        Ok(())
    }

    /// Lists foreman customers, optionally filtered by name or contact details.
    #[poise::command(slash_command, rename = "list")]
    pub async fn customers_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Search name, company, phone or email"] search: Option<String>,
        #[description = "Page number (default 1)"] page: Option<usize>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, Some(Component::ForemanCustomers)).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = endpoints::list_foreman_customers(&data.api, &mut session).await;
        bot::close_session(ctx, &mut session, &result).await;

        let needle = search.as_deref().map(str::trim).unwrap_or_default();
        let per_page = data.per_page();
        let state = LoadState::from_result(result);
        let embed = render::state_embed("Foreman customers", &state, |customers| {
            let mut matching = Vec::new();
            let page = filter_then_paginate(
                customers,
                |customer| customer.matches(needle),
                page.unwrap_or(1),
                per_page,
                &mut matching,
            );
            render::page_embed("Foreman customers", &page)
        });
        ctx.send(render::embed_reply(embed)).await?;
        Ok(())
    }

    /// Platform employees.
    #[poise::command(slash_command, subcommands("employees_list"))]
    pub async fn employees(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Use `/employees list` to browse employees.").await?;
        Ok(())
    }

    /// Lists employees.
    #[poise::command(slash_command, rename = "list")]
    pub async fn employees_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Page number (default 1)"] page: Option<usize>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, Some(Component::Employees)).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = endpoints::list_employees(&data.api, &mut session).await;
        bot::close_session(ctx, &mut session, &result).await;

        let per_page = data.per_page();
        let state = LoadState::from_result(result);
        let embed = render::state_embed("Employees", &state, |employees| {
            render::page_embed("Employees", &paginate(employees, page.unwrap_or(1), per_page))
        });
        ctx.send(render::embed_reply(embed)).await?;
        Ok(())
    }

    /// Referral programme.
    #[poise::command(slash_command, subcommands("referrals_list"))]
    pub async fn referrals(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Use `/referrals list` to browse referral codes.")
            .await?;
        Ok(())
    }

    /// Lists referral codes and what they earned.
    #[poise::command(slash_command, rename = "list")]
    pub async fn referrals_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Page number (default 1)"] page: Option<usize>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, Some(Component::Referrals)).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = endpoints::list_referrals(&data.api, &mut session).await;
        bot::close_session(ctx, &mut session, &result).await;

        let per_page = data.per_page();
        let state = LoadState::from_result(result);
        let embed = render::state_embed("Referrals", &state, |referrals| {
            render::page_embed("Referrals", &paginate(referrals, page.unwrap_or(1), per_page))
        });
        ctx.send(render::embed_reply(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
