//! Complaint business logic - filtering and resolving driver complaints.

use crate::{
    api::{ApiClient, Session, endpoints},
    core::reconcile,
    errors::{Error, Result},
    models::{Complaint, ComplaintStatus},
};

/// Complaints matching the status and search text, newest first.
///
/// The search is case-insensitive over the order reference, reporter, subject
/// and description.
#[must_use]
pub fn filter_complaints(
    complaints: &[Complaint],
    status: Option<ComplaintStatus>,
    search: Option<&str>,
) -> Vec<Complaint> {
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut matching: Vec<Complaint> = complaints
        .iter()
        .filter(|complaint| status.is_none_or(|wanted| complaint.status == wanted))
        .filter(|complaint| {
            needle.as_deref().is_none_or(|needle| {
                let reporter = complaint.reporter();
                [
                    complaint.order_reference.as_str(),
                    reporter.as_str(),
                    complaint.subject.as_deref().unwrap_or_default(),
                    complaint.description.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(needle))
            })
        })
        .cloned()
        .collect();

    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matching
}

/// Number of complaints still waiting for an operator.
#[must_use]
pub fn pending_count(complaints: &[Complaint]) -> usize {
    complaints
        .iter()
        .filter(|complaint| complaint.status == ComplaintStatus::Pending)
        .count()
}

/// Marks a complaint resolved on the backend and merges the stored copy into `complaints`.
///
/// # Errors
/// - [`Error::NotFound`] if the complaint is not in the collection
/// - [`Error::Validation`] if it is already resolved
/// - any API error; `complaints` is then left unchanged
pub async fn resolve(
    api: &ApiClient,
    session: &mut Session,
    complaints: &mut Vec<Complaint>,
    id: i64,
) -> Result<Complaint> {
    let current = reconcile::find_record(complaints, id).ok_or_else(|| Error::NotFound {
        entity: "Complaint",
        key: id.to_string(),
    })?;
    if current.status == ComplaintStatus::Resolved {
        return Err(Error::validation("status", format!("complaint #{id} is already resolved")));
    }

    let outcome =
        endpoints::update_complaint_status(api, session, id, ComplaintStatus::Resolved).await;
    let stored = reconcile::commit(complaints, outcome)?;
    tracing::info!("Complaint #{} resolved by {}", id, session.username);
    Ok(stored)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{json_response, scripted_client, test_session, text_response};
    use chrono::{TimeZone, Utc};

    fn complaint(id: i64, status: ComplaintStatus, day: u32, description: &str) -> Complaint {
        Complaint {
            id,
            order_reference: format!("ORD-{id}"),
            status,
            driver_id: Some(format!("D-{id}")),
            driver_name: (id == 2).then(|| "Musa Bello".to_string()),
            subject: None,
            description: description.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 10, day, 8, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<Complaint> {
        vec![
            complaint(1, ComplaintStatus::Pending, 1, "Package damaged"),
            complaint(2, ComplaintStatus::Resolved, 3, "Wrong address"),
            complaint(3, ComplaintStatus::Pending, 2, "Customer unreachable"),
        ]
    }

    #[test]
    fn test_filter_by_status_newest_first() {
        let pending = filter_complaints(&sample(), Some(ComplaintStatus::Pending), None);
        assert_eq!(pending.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(pending_count(&sample()), 2);
    }

    #[test]
    fn test_search_matches_reporter_and_text() {
        let by_name = filter_complaints(&sample(), None, Some("musa"));
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, 2);

        let by_text = filter_complaints(&sample(), None, Some("DAMAGED"));
        assert_eq!(by_text[0].id, 1);

        let blank = filter_complaints(&sample(), None, Some("   "));
        assert_eq!(blank.len(), 3);
    }

    #[tokio::test]
    async fn test_resolve_merges_server_copy() {
        let (api, _transport) = scripted_client(vec![Ok(json_response(
            200,
            r#"{"id": 1, "orderReference": "ORD-1", "status": "resolved",
                "description": "Package damaged", "createdAt": "2026-10-01T08:00:00Z"}"#,
        ))]);
        let mut session = test_session("support", &["complaints"]);
        let mut complaints = sample();

        let stored = resolve(&api, &mut session, &mut complaints, 1).await.unwrap();

        assert_eq!(stored.status, ComplaintStatus::Resolved);
        assert_eq!(complaints[0].status, ComplaintStatus::Resolved);
        assert_eq!(pending_count(&complaints), 1);
    }

    #[tokio::test]
    async fn test_failed_resolve_keeps_local_state() {
        let (api, _transport) = scripted_client(vec![Ok(text_response(502, "Bad gateway"))]);
        let mut session = test_session("support", &["complaints"]);
        let mut complaints = sample();

        let err = resolve(&api, &mut session, &mut complaints, 1).await.unwrap_err();

        assert!(matches!(err, Error::Api { status: 502, .. }));
        assert_eq!(complaints, sample());
    }

    #[tokio::test]
    async fn test_resolve_rejects_unknown_and_resolved() {
        let (api, transport) = scripted_client(Vec::new());
        let mut session = test_session("support", &["complaints"]);
        let mut complaints = sample();

        assert!(matches!(
            resolve(&api, &mut session, &mut complaints, 99).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            resolve(&api, &mut session, &mut complaints, 2).await,
            Err(Error::Validation { .. })
        ));
        assert!(transport.requests().is_empty());
    }
}
