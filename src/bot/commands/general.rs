//! General Discord commands - ping and help.
//! These commands need neither a session nor the backend.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Ops Console Help**\n\
        Log in with your dashboard account first; each section is only available \
        if your role grants it.\n\n\
        **Account**\n\
        • `/login <username> <password>` - Links your Discord account to a dashboard session.\n\
        • `/logout` - Forgets your session.\n\
        • `/whoami` - Shows your role and the sections you can open.\n\n\
        **Operations**\n\
        • `/complaints list|resolve` - Driver complaints.\n\
        • `/areas list|add|edit|price|delete` - Delivery areas and their prices.\n\
        • `/vehicles list|add` - Vehicle types.\n\
        • `/periods list|add_hours|add_days|delete` - Delivery periods.\n\
        • `/discounts list|toggle|set` - Product discounts.\n\
        • `/stock open|confirm|propose|save|drafts|discard` - Stock corrections.\n\n\
        **Directory**\n\
        • `/support dashboard`, `/customers list`, `/employees list`, `/referrals list`\n\n\
        **Administration**\n\
        • `/users list|grant|revoke` - Dashboard users and their sections.\n\n\
        • `/ping` - Checks if the bot is responsive.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
