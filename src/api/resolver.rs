//! Picking the backend base URL.
//!
//! Candidates are probed once, in order, at startup. The first one that answers
//! 2xx with a JSON body wins and is used for the rest of the process. If none
//! does, the caller gets [`Error::BackendUnavailable`]; nothing is retried and
//! no substitute data is produced.

use super::{
    join_path,
    transport::{ApiRequest, Transport},
};
use crate::{
    config::Settings,
    errors::{Error, Result},
};
use reqwest::Url;
use serde_json::Value;
use tracing::{info, warn};

/// Outcome of a successful probe.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// The candidate that answered
    pub base_url: Url,
    /// Its position in the candidate list
    pub index: usize,
    /// Parsed JSON body of the probe response
    pub body: Value,
}

/// Tries `candidate + path` for each candidate in order and returns the first usable answer.
///
/// A candidate is discarded on a transport error, a non-2xx status, a non-JSON
/// content type, or a body that does not parse as JSON.
///
/// # Errors
/// Returns [`Error::BackendUnavailable`] with the number of candidates tried when
/// none of them is usable.
pub async fn probe_candidates(
    transport: &dyn Transport,
    candidates: &[Url],
    path: &str,
) -> Result<Resolved> {
    for (index, candidate) in candidates.iter().enumerate() {
        let url = join_path(candidate, path)?;
        match probe_one(transport, url).await {
            Ok(body) => {
                info!("Backend resolved to {} after {} discarded candidate(s)", candidate, index);
                return Ok(Resolved {
                    base_url: candidate.clone(),
                    index,
                    body,
                });
            }
            Err(e) => warn!("Candidate {} discarded: {}", candidate, e),
        }
    }

    Err(Error::BackendUnavailable {
        attempted: candidates.len(),
    })
}

async fn probe_one(transport: &dyn Transport, url: Url) -> Result<Value> {
    let display = url.to_string();
    let response = transport.execute(ApiRequest::get(url)).await?;

    if !response.is_success() {
        return Err(Error::Api {
            status: response.status,
            message: "probe failed".to_string(),
        });
    }
    if !response.is_json() {
        return Err(Error::NotJson {
            url: display,
            content_type: response
                .content_type
                .unwrap_or_else(|| "no content type".to_string()),
        });
    }
    serde_json::from_str(&response.body).map_err(|e| Error::Decode {
        message: e.to_string(),
    })
}

/// Resolves the single base URL the process will use, from the configured candidates.
///
/// # Errors
/// Returns [`Error::Config`] for an unparsable candidate, or
/// [`Error::BackendUnavailable`] if no candidate answers.
pub async fn resolve_base_url(settings: &Settings, transport: &dyn Transport) -> Result<Url> {
    let candidates = settings
        .candidate_urls()
        .iter()
        .map(|raw| {
            Url::parse(raw).map_err(|e| Error::Config {
                message: format!("Invalid API URL '{raw}': {e}"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    probe_candidates(transport, &candidates, &settings.api.probe_path)
        .await
        .map(|resolved| resolved.base_url)
}
