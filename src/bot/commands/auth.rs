//! Account commands - `login`, `logout` and `whoami`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{self, BotData},
        core::{access::visible_components, session},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Logs in to the dashboard backend and links the session to your Discord account.
    #[poise::command(slash_command)]
    pub async fn login(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Dashboard username"] username: String,
        #[description = "Dashboard password"] password: String,
    ) -> Result<()> {
        ctx.defer_ephemeral().await?;
        let data = ctx.data();

        let response = match data.api.login(username.trim(), &password).await {
            Ok(response) => response,
            Err(Error::Unauthorized) => {
                ctx.say("❌ Invalid username or password.").await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if !response.user.is_active {
            ctx.say("❌ This dashboard account is disabled.").await?;
            return Ok(());
        }

        let session =
            session::store_login(&data.database, &ctx.author().id.to_string(), response).await?;
        let sections = visible_components(&session.profile);
        ctx.say(format!(
            "✅ Logged in as **{}** ({}). You can open {} section{}.",
            session.username,
            session.profile.role,
            sections.len(),
            if sections.len() == 1 { "" } else { "s" }
        ))
        .await?;
        Ok(())
    }

    /// Forgets your dashboard session.
    #[poise::command(slash_command)]
    pub async fn logout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let removed =
            session::logout(&ctx.data().database, &ctx.author().id.to_string()).await?;
        let message = if removed {
            "👋 Logged out."
        } else {
            "You were not logged in."
        };
        ctx.send(
            poise::CreateReply::default()
                .content(message)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Shows your dashboard role and the sections it grants.
    #[poise::command(slash_command)]
    pub async fn whoami(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let session = bot::open_session(ctx, None).await?;
        let sections = visible_components(&session.profile);

        let mut text = format!(
            "**{}** - role `{}`\n",
            session.username, session.profile.role
        );
        if sections.is_empty() {
            text.push_str("No sections are granted to this account.");
        } else {
            text.push_str("Sections:\n");
            for section in sections {
                let _ = writeln!(text, "• `{section}`");
            }
        }

        ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
            .await?;
        Ok(())
    }
}

pub use inner::*;
