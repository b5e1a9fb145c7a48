//! User administration Discord commands - `users list`, `users grant` and `users revoke`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        api::endpoints,
        bot::{self, BotData, handlers::autocomplete::resolve_label, render},
        core::{
            access::{Component, change_access},
            load::LoadState,
            pagination::paginate,
        },
        errors::{Error, Result},
    };

    const COMPONENT: Option<Component> = Some(Component::UserAdmin);

    /// Dashboard users and the sections they can open.
    #[poise::command(
        slash_command,
        subcommands("users_list", "users_grant", "users_revoke")
    )]
    pub async fn users(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "User commands:\n\
            `/users list` - Lists dashboard users\n\
            `/users grant` - Grants a section to a user\n\
            `/users revoke` - Revokes a section from a user",
        )
        .await?;
        Ok(())
    }

    /// Lists dashboard users.
    #[poise::command(slash_command, rename = "list")]
    pub async fn users_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Page number (default 1)"] page: Option<usize>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = endpoints::list_users(&data.api, &mut session).await;
        bot::close_session(ctx, &mut session, &result).await;

        let per_page = data.per_page();
        let state = LoadState::from_result(result);
        let embed = render::state_embed("Dashboard users", &state, |users| {
            render::page_embed("Dashboard users", &paginate(users, page.unwrap_or(1), per_page))
        });
        ctx.send(render::embed_reply(embed)).await?;
        Ok(())
    }

    async fn change(
        ctx: poise::Context<'_, BotData, Error>,
        user: &str,
        component: Component,
        allow: bool,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = match endpoints::list_users(&data.api, &mut session).await {
            Ok(mut users) => {
                match resolve_label(&users, user, |u| u.username.as_str(), "User").map(|u| u.id) {
                    Ok(id) => {
                        change_access(&data.api, &mut session, &mut users, id, component, allow)
                            .await
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };
        bot::close_session(ctx, &mut session, &result).await;

        let verb = if allow { "granted" } else { "revoked" };
        match result? {
            Some(updated) => {
                ctx.send(render::embed_reply(render::record_embed(
                    &format!("✅ `{component}` {verb} for {}", updated.username),
                    &updated,
                )))
                .await?;
            }
            None => {
                ctx.say(format!("Nothing to change: `{component}` was already {verb}."))
                    .await?;
            }
        }
        Ok(())
    }

    /// Grants a dashboard section to a user.
    #[poise::command(slash_command, rename = "grant")]
    pub async fn users_grant(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Username or user id"] user: String,
        #[description = "Section to grant"] component: Component,
    ) -> Result<()> {
        change(ctx, &user, component, true).await
    }

    /// Revokes a dashboard section from a user.
    #[poise::command(slash_command, rename = "revoke")]
    pub async fn users_revoke(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Username or user id"] user: String,
        #[description = "Section to revoke"] component: Component,
    ) -> Result<()> {
        change(ctx, &user, component, false).await
    }
}

pub use inner::*;
