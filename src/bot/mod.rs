//! Bot layer - Discord-specific interface and command handlers
//!
//! Every command resolves the caller's stored session, checks the component
//! allow-list, talks to the backend through [`ApiClient`] and writes back any
//! tokens the client refreshed along the way.

/// Discord command implementations grouped by dashboard section
pub mod commands;
/// Discord interaction handlers (autocomplete)
pub mod handlers;
/// Embed rendering for tables, records and load failures
pub mod render;

use crate::{
    api::{ApiClient, Session},
    cache::Caches,
    config::Settings,
    core::{
        access::{Component, has_access},
        session,
    },
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::{num::NonZeroUsize, time::Duration};
use tracing::{error, info, instrument, warn};

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Shared data available to all bot commands.
#[derive(Debug)]
pub struct BotData {
    /// Local store for sessions and stock drafts
    pub database: DatabaseConnection,
    /// Client bound to the resolved backend
    pub api: ApiClient,
    /// Loaded settings
    pub settings: Settings,
    /// Snapshots used by autocomplete
    pub caches: Caches,
}

impl BotData {
    /// Creates the shared context; cache TTL comes from `settings`.
    #[must_use]
    pub fn new(database: DatabaseConnection, api: ApiClient, settings: Settings) -> Self {
        let caches = Caches::new(Duration::from_secs(settings.cache.ttl_secs));
        Self {
            database,
            api,
            settings,
            caches,
        }
    }

    /// Rows per page in list commands.
    #[must_use]
    pub fn per_page(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.settings.display.page_size).unwrap_or(NonZeroUsize::MIN)
    }
}

/// Loads the caller's session and checks it may open `component`.
///
/// # Errors
/// Returns [`Error::NotLoggedIn`] or [`Error::AccessDenied`].
pub async fn open_session(ctx: Context<'_>, component: Option<Component>) -> Result<Session> {
    let user_id = ctx.author().id.to_string();
    let session = session::require(&ctx.data().database, &user_id).await?;
    match component {
        Some(component) if !has_access(&session.profile, component) => {
            warn!(
                "{} ({}) denied access to {}",
                session.username, user_id, component
            );
            Err(Error::AccessDenied {
                component: component.to_string(),
            })
        }
        _ => Ok(session),
    }
}

/// Persists tokens the client refreshed during the command.
///
/// A rejected session is dropped so the operator is asked to log in again.
/// Local store failures are logged by [`session::settle`] and never replace the
/// command's own outcome.
pub async fn close_session<T>(ctx: Context<'_>, session: &mut Session, outcome: &Result<T>) {
    session::settle(&ctx.data().database, session, outcome).await;
}

/// One-line, operator-facing description of an error.
#[must_use]
pub fn describe_error(error: &Error) -> String {
    match error {
        Error::Unreachable { .. } | Error::BackendUnavailable { .. } => {
            format!("🔌 Backend unavailable: {error}")
        }
        Error::Unauthorized | Error::NotLoggedIn => format!("🔒 {error}"),
        Error::AccessDenied { component } => {
            format!("⛔ Your role does not include the `{component}` section.")
        }
        Error::Validation { .. } | Error::NotFound { .. } | Error::InvalidCorrection { .. } => {
            format!("⚠️ {error}")
        }
        Error::Api { .. } | Error::NotJson { .. } | Error::Decode { .. } => {
            format!("❌ The backend rejected the request: {error}")
        }
        _ => "❌ Something went wrong. Please try again later.".to_string(),
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            match &error {
                Error::Database(_) | Error::Framework(_) | Error::Io(_) | Error::Serde(_) => {
                    error!("Error in command `{}`: {:?}", ctx.command().name, error);
                }
                _ => warn!("Command `{}` failed: {}", ctx.command().name, error),
            }
            let reply = poise::CreateReply::default()
                .content(describe_error(&error))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Every slash command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::login(),
        commands::logout(),
        commands::whoami(),
        commands::complaints(),
        commands::areas(),
        commands::vehicles(),
        commands::periods(),
        commands::discounts(),
        commands::stock(),
        commands::users(),
        commands::support(),
        commands::customers(),
        commands::employees(),
        commands::referrals(),
    ]
}

/// Builds the poise framework and runs the Discord client until it stops.
///
/// # Errors
/// Returns an error if the client cannot be created or the gateway connection fails.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands", framework.options().commands.len());
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_error_classes() {
        assert!(
            describe_error(&Error::BackendUnavailable { attempted: 2 })
                .starts_with("🔌 Backend unavailable")
        );
        assert!(describe_error(&Error::NotLoggedIn).contains("/login"));
        assert_eq!(
            describe_error(&Error::AccessDenied {
                component: "discounts".to_string()
            }),
            "⛔ Your role does not include the `discounts` section."
        );
        assert!(
            describe_error(&Error::Api {
                status: 500,
                message: "boom".to_string()
            })
            .contains("rejected")
        );
        assert!(!describe_error(&Error::Config {
            message: "secret path".to_string()
        })
        .contains("secret"));
    }

    #[test]
    fn test_every_command_is_registered_once() {
        let commands = all_commands();
        let mut names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(names.len(), before);
        assert!(names.contains(&"stock"));
        assert!(names.contains(&"complaints"));
    }
}
