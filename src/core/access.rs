//! Dashboard access control.
//!
//! A user's visible sections are an allow-list of component ids. The
//! `super_admin` role sees everything; every other role sees exactly what its
//! component list names.

use crate::{
    api::{ApiClient, Session, endpoints},
    core::reconcile,
    errors::{Error, Result},
    models::{AdminUser, UserAccessUpdate},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role that bypasses the component allow-list.
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// A dashboard section gated by the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, poise::ChoiceParameter)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    /// Driver complaints
    #[name = "complaints"]
    Complaints,
    /// Delivery areas, vehicle types and periods
    #[name = "delivery-management"]
    DeliveryManagement,
    /// Product discounts
    #[name = "discounts"]
    Discounts,
    /// Stock corrections
    #[name = "stock-correction"]
    StockCorrection,
    /// Referral programme
    #[name = "referrals"]
    Referrals,
    /// Support tickets
    #[name = "support"]
    Support,
    /// Foreman customers
    #[name = "foreman-customers"]
    ForemanCustomers,
    /// Employees
    #[name = "employees"]
    Employees,
    /// User administration
    #[name = "user-admin"]
    UserAdmin,
}

impl Component {
    /// Every component, in dashboard order.
    pub const ALL: [Self; 9] = [
        Self::Complaints,
        Self::DeliveryManagement,
        Self::Discounts,
        Self::StockCorrection,
        Self::Referrals,
        Self::Support,
        Self::ForemanCustomers,
        Self::Employees,
        Self::UserAdmin,
    ];

    /// Id used in the backend's component lists.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Complaints => "complaints",
            Self::DeliveryManagement => "delivery-management",
            Self::Discounts => "discounts",
            Self::StockCorrection => "stock-correction",
            Self::Referrals => "referrals",
            Self::Support => "support",
            Self::ForemanCustomers => "foreman-customers",
            Self::Employees => "employees",
            Self::UserAdmin => "user-admin",
        }
    }

    /// Looks a component up by its id.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|component| component.id() == id)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The part of a user that access decisions depend on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessProfile {
    /// Role reference
    pub role: String,
    /// Granted component ids
    pub components: Vec<String>,
}

impl AccessProfile {
    /// Whether the role bypasses the allow-list.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.role == SUPER_ADMIN_ROLE
    }
}

/// Whether the profile may open the given component.
#[must_use]
pub fn has_access(profile: &AccessProfile, component: Component) -> bool {
    profile.is_super_admin() || profile.components.iter().any(|id| id == component.id())
}

/// Components the profile may open, in dashboard order.
#[must_use]
pub fn visible_components(profile: &AccessProfile) -> Vec<Component> {
    Component::ALL
        .into_iter()
        .filter(|component| has_access(profile, *component))
        .collect()
}

/// Adds a component id to a list if it is not already there.
pub fn grant(components: &mut Vec<String>, component: Component) -> bool {
    if components.iter().any(|id| id == component.id()) {
        return false;
    }
    components.push(component.id().to_string());
    true
}

/// Removes a component id from a list.
pub fn revoke(components: &mut Vec<String>, component: Component) -> bool {
    let before = components.len();
    components.retain(|id| id != component.id());
    components.len() != before
}

/// Grants or revokes one component for a dashboard user and stores the change.
///
/// Returns `None` without calling the backend when nothing would change.
///
/// # Errors
/// - [`Error::NotFound`] if the user is unknown
/// - any API error; `users` is then left unchanged
pub async fn change_access(
    api: &ApiClient,
    session: &mut Session,
    users: &mut Vec<AdminUser>,
    user_id: i64,
    component: Component,
    allow: bool,
) -> Result<Option<AdminUser>> {
    let user = reconcile::find_record(users, user_id).ok_or_else(|| Error::NotFound {
        entity: "User",
        key: user_id.to_string(),
    })?;
    let mut components = user.components.clone();
    let changed = if allow {
        grant(&mut components, component)
    } else {
        revoke(&mut components, component)
    };
    if !changed {
        return Ok(None);
    }

    let update = UserAccessUpdate {
        role: user.role.clone(),
        components,
    };
    let outcome = endpoints::update_user_access(api, session, user_id, &update).await;
    let stored = reconcile::commit(users, outcome)?;
    tracing::info!(
        "{} {} '{}' for {}",
        session.username,
        if allow { "granted" } else { "revoked" },
        component,
        stored.username
    );
    Ok(Some(stored))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{json_response, scripted_client, test_session, text_response};

    fn profile(role: &str, components: &[Component]) -> AccessProfile {
        AccessProfile {
            role: role.to_string(),
            components: components.iter().map(|c| c.id().to_string()).collect(),
        }
    }

    #[test]
    fn test_super_admin_sees_everything() {
        let admin = profile(SUPER_ADMIN_ROLE, &[]);
        for component in Component::ALL {
            assert!(has_access(&admin, component));
        }
        assert_eq!(visible_components(&admin), Component::ALL.to_vec());
    }

    #[test]
    fn test_other_roles_use_the_allow_list() {
        let support = profile("support", &[Component::Support, Component::Complaints]);
        assert!(has_access(&support, Component::Support));
        assert!(has_access(&support, Component::Complaints));
        assert!(!has_access(&support, Component::UserAdmin));
        assert_eq!(
            visible_components(&support),
            vec![Component::Complaints, Component::Support]
        );
    }

    #[test]
    fn test_unknown_ids_grant_nothing() {
        let odd = AccessProfile {
            role: "viewer".to_string(),
            components: vec!["legacy-reports".to_string()],
        };
        assert!(visible_components(&odd).is_empty());
    }

    #[test]
    fn test_adding_a_component_never_removes_access() {
        let mut components: Vec<Component> = Vec::new();
        for next in Component::ALL {
            let before = visible_components(&profile("ops", &components));
            components.push(next);
            let after = visible_components(&profile("ops", &components));
            assert!(before.iter().all(|c| after.contains(c)));
            assert!(after.contains(&next));
        }
    }

    #[test]
    fn test_grant_and_revoke() {
        let mut ids = vec!["support".to_string()];
        assert!(grant(&mut ids, Component::Discounts));
        assert!(!grant(&mut ids, Component::Discounts));
        assert!(revoke(&mut ids, Component::Support));
        assert!(!revoke(&mut ids, Component::Support));
        assert_eq!(ids, vec!["discounts".to_string()]);
    }

    #[test]
    fn test_component_ids_round_trip() {
        for component in Component::ALL {
            assert_eq!(Component::from_id(component.id()), Some(component));
        }
        assert_eq!(Component::from_id("nope"), None);
    }

    fn user(components: &[&str]) -> AdminUser {
        AdminUser {
            id: 5,
            username: "kemi".to_string(),
            role: "support".to_string(),
            components: components.iter().map(|c| (*c).to_string()).collect(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_change_access_sends_full_component_list() {
        let (api, transport) = scripted_client(vec![Ok(json_response(
            200,
            r#"{"id": 5, "username": "kemi", "role": "support", "components": ["support", "discounts"]}"#,
        ))]);
        let mut session = test_session(SUPER_ADMIN_ROLE, &[]);
        let mut users = vec![user(&["support"])];

        let stored = change_access(&api, &mut session, &mut users, 5, Component::Discounts, true)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stored.components, vec!["support", "discounts"]);
        assert_eq!(users[0], stored);
        assert_eq!(
            transport.requests()[0].body,
            Some(serde_json::json!({ "role": "support", "components": ["support", "discounts"] }))
        );
    }

    #[tokio::test]
    async fn test_change_access_noop_skips_backend() {
        let (api, transport) = scripted_client(Vec::new());
        let mut session = test_session(SUPER_ADMIN_ROLE, &[]);
        let mut users = vec![user(&["support"])];

        let result = change_access(&api, &mut session, &mut users, 5, Component::Employees, false)
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_change_access_failure_keeps_user() {
        let (api, _transport) = scripted_client(vec![Ok(text_response(500, "oops"))]);
        let mut session = test_session(SUPER_ADMIN_ROLE, &[]);
        let mut users = vec![user(&["support"])];

        let result =
            change_access(&api, &mut session, &mut users, 5, Component::Support, false).await;

        assert!(result.is_err());
        assert_eq!(users, vec![user(&["support"])]);
    }
}
