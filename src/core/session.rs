//! Operator session persistence.
//!
//! Each Discord user logs in to the backend once; the issued tokens and the
//! user's access profile are kept in `operator_sessions` until `/logout`.

use crate::{
    api::Session,
    core::access::AccessProfile,
    entities::{OperatorSession, operator_session},
    errors::{Error, Result},
    models::{LoginResponse, TokenPair},
};
use sea_orm::{Set, prelude::*};

fn to_session(model: operator_session::Model) -> Result<Session> {
    let components: Vec<String> = serde_json::from_str(&model.components)?;
    Ok(Session::new(
        model.discord_user_id,
        model.username,
        AccessProfile {
            role: model.role,
            components,
        },
        TokenPair {
            access_token: model.access_token,
            refresh_token: model.refresh_token,
        },
    ))
}

async fn find_row(
    db: &DatabaseConnection,
    discord_user_id: &str,
) -> Result<Option<operator_session::Model>> {
    OperatorSession::find()
        .filter(operator_session::Column::DiscordUserId.eq(discord_user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Stores (or replaces) the session for a Discord user after a successful login.
///
/// # Errors
/// Returns an error if the database operation fails.
pub async fn store_login(
    db: &DatabaseConnection,
    discord_user_id: &str,
    login: LoginResponse,
) -> Result<Session> {
    let now = chrono::Utc::now().naive_utc();
    let components = serde_json::to_string(&login.user.components)?;

    let model = if let Some(existing) = find_row(db, discord_user_id).await? {
        let mut active: operator_session::ActiveModel = existing.into();
        active.username = Set(login.user.username);
        active.role = Set(login.user.role);
        active.components = Set(components);
        active.access_token = Set(login.tokens.access_token);
        active.refresh_token = Set(login.tokens.refresh_token);
        active.updated_at = Set(now);
        active.update(db).await?
    } else {
        let active = operator_session::ActiveModel {
            discord_user_id: Set(discord_user_id.to_string()),
            username: Set(login.user.username),
            role: Set(login.user.role),
            components: Set(components),
            access_token: Set(login.tokens.access_token),
            refresh_token: Set(login.tokens.refresh_token),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        active.insert(db).await?
    };

    tracing::info!(
        "Discord user {} logged in as {}",
        model.discord_user_id,
        model.username
    );
    to_session(model)
}

/// Loads the stored session for a Discord user, if any.
///
/// # Errors
/// Returns an error if the database query fails or the stored row is corrupt.
pub async fn load(db: &DatabaseConnection, discord_user_id: &str) -> Result<Option<Session>> {
    find_row(db, discord_user_id)
        .await?
        .map(to_session)
        .transpose()
}

/// Loads the stored session, failing with [`Error::NotLoggedIn`] if there is none.
///
/// # Errors
/// Returns [`Error::NotLoggedIn`] or a database error.
pub async fn require(db: &DatabaseConnection, discord_user_id: &str) -> Result<Session> {
    load(db, discord_user_id).await?.ok_or(Error::NotLoggedIn)
}

/// Writes refreshed tokens back if the client replaced them. Returns whether it wrote.
///
/// # Errors
/// Returns an error if the database operation fails.
pub async fn persist_if_refreshed(db: &DatabaseConnection, session: &mut Session) -> Result<bool> {
    if !session.is_dirty() {
        return Ok(false);
    }
    let Some(existing) = find_row(db, &session.discord_user_id).await? else {
        // Logged out while the request was in flight
        session.mark_clean();
        return Ok(false);
    };

    let tokens = session.tokens().clone();
    let mut active: operator_session::ActiveModel = existing.into();
    active.access_token = Set(tokens.access_token);
    active.refresh_token = Set(tokens.refresh_token);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await?;

    session.mark_clean();
    tracing::debug!("Persisted refreshed tokens for {}", session.username);
    Ok(true)
}

/// Removes the stored session. Returns whether one existed.
///
/// # Errors
/// Returns an error if the database operation fails.
pub async fn logout(db: &DatabaseConnection, discord_user_id: &str) -> Result<bool> {
    let result = OperatorSession::delete_many()
        .filter(operator_session::Column::DiscordUserId.eq(discord_user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// What happened to a stored session at the end of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// The backend rejected it, so it was deleted
    LoggedOut,
    /// Refreshed tokens were written back
    Persisted,
    /// Nothing needed writing
    Unchanged,
    /// The local store failed; the failure was logged
    StoreFailed,
}

/// Finishes a command's use of `session` given the command's backend outcome.
///
/// An `Unauthorized` outcome deletes the stored session so the operator has to
/// log in again. Any other outcome writes back tokens refreshed along the way.
/// Local store errors are logged rather than returned: the backend call has
/// already happened and its result must still reach the operator.
pub async fn settle<T>(db: &DatabaseConnection, session: &mut Session, outcome: &Result<T>) -> Settled {
    if matches!(outcome, Err(Error::Unauthorized)) {
        return match logout(db, &session.discord_user_id).await {
            Ok(_) => {
                tracing::info!("Dropped rejected session for {}", session.username);
                Settled::LoggedOut
            }
            Err(e) => {
                tracing::error!("Could not drop rejected session for {}: {}", session.username, e);
                Settled::StoreFailed
            }
        };
    }
    match persist_if_refreshed(db, session).await {
        Ok(true) => Settled::Persisted,
        Ok(false) => Settled::Unchanged,
        Err(e) => {
            tracing::error!("Could not persist refreshed tokens for {}: {}", session.username, e);
            Settled::StoreFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::AdminUser, test_utils::setup_test_db};

    fn login(access: &str, components: &[&str]) -> LoginResponse {
        LoginResponse {
            tokens: TokenPair {
                access_token: access.to_string(),
                refresh_token: Some(format!("refresh-for-{access}")),
            },
            user: AdminUser {
                id: 7,
                username: "ada".to_string(),
                role: "support".to_string(),
                components: components.iter().map(|c| (*c).to_string()).collect(),
                is_active: true,
            },
        }
    }

    #[tokio::test]
    async fn test_store_and_load() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(load(&db, "42").await?.is_none());
        assert!(matches!(require(&db, "42").await, Err(Error::NotLoggedIn)));

        store_login(&db, "42", login("a1", &["complaints", "support"])).await?;
        let session = require(&db, "42").await?;

        assert_eq!(session.username, "ada");
        assert_eq!(session.profile.role, "support");
        assert_eq!(session.profile.components, vec!["complaints", "support"]);
        assert_eq!(session.tokens().access_token, "a1");
        assert!(!session.is_dirty());
        Ok(())
    }

    #[tokio::test]
    async fn test_login_again_replaces_row() -> Result<()> {
        let db = setup_test_db().await?;
        store_login(&db, "42", login("a1", &["complaints"])).await?;
        store_login(&db, "42", login("a2", &[])).await?;

        let session = require(&db, "42").await?;
        assert_eq!(session.tokens().access_token, "a2");
        assert!(session.profile.components.is_empty());
        assert_eq!(OperatorSession::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_persist_if_refreshed() -> Result<()> {
        let db = setup_test_db().await?;
        let mut session = store_login(&db, "42", login("a1", &[])).await?;

        assert!(!persist_if_refreshed(&db, &mut session).await?);

        session.replace_tokens(TokenPair {
            access_token: "a9".to_string(),
            refresh_token: None,
        });
        assert!(persist_if_refreshed(&db, &mut session).await?);
        assert!(!session.is_dirty());

        let reloaded = require(&db, "42").await?;
        assert_eq!(reloaded.tokens().access_token, "a9");
        assert_eq!(
            reloaded.tokens().refresh_token.as_deref(),
            Some("refresh-for-a1")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_logout() -> Result<()> {
        let db = setup_test_db().await?;
        store_login(&db, "42", login("a1", &[])).await?;

        assert!(logout(&db, "42").await?);
        assert!(!logout(&db, "42").await?);
        assert!(load(&db, "42").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_settle_drops_rejected_session() -> Result<()> {
        let db = setup_test_db().await?;
        let mut session = store_login(&db, "42", login("a1", &[])).await?;

        let outcome: Result<()> = Err(Error::Unauthorized);
        assert_eq!(settle(&db, &mut session, &outcome).await, Settled::LoggedOut);
        assert!(load(&db, "42").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_settle_keeps_session_on_other_outcomes() -> Result<()> {
        let db = setup_test_db().await?;
        let mut session = store_login(&db, "42", login("a1", &[])).await?;

        let failed: Result<()> = Err(Error::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(settle(&db, &mut session, &failed).await, Settled::Unchanged);

        session.replace_tokens(TokenPair {
            access_token: "a2".to_string(),
            refresh_token: Some("r2".to_string()),
        });
        assert_eq!(settle(&db, &mut session, &Ok(())).await, Settled::Persisted);
        assert_eq!(require(&db, "42").await?.tokens().access_token, "a2");
        Ok(())
    }

    #[tokio::test]
    async fn test_settle_logs_store_failure() -> Result<()> {
        let db = sea_orm::Database::connect("sqlite::memory:").await?;
        let mut session = crate::test_utils::test_session("support", &[]);
        session.replace_tokens(TokenPair {
            access_token: "a2".to_string(),
            refresh_token: None,
        });

        // No tables: every query fails
        assert_eq!(settle(&db, &mut session, &Ok(())).await, Settled::StoreFailed);
        let outcome: Result<()> = Err(Error::Unauthorized);
        assert_eq!(settle(&db, &mut session, &outcome).await, Settled::StoreFailed);
        Ok(())
    }
}
