//! Authenticated update pipeline
//!
//! The UpdatePipeline is responsible for:
//! - Authenticating the client against the CredentialStore
//! - Parsing the reported addresses into an AddressSet
//! - Suppressing updates the ChangeCache shows are already applied
//! - Applying changes via the ZoneUpdater
//! - Recording successful updates in the ChangeCache
//!
//! ## Request Flow
//!
//! ```text
//! UpdateRequest
//!      │
//!      ▼
//! ┌──────────────┐  missing / wrong        ┌──────────────────┐
//! │ authenticate │ ──────────────────────▶ │ Rejected(NoAuth) │ 401
//! └──────────────┘                         └──────────────────┘
//!      │
//!      ▼
//! ┌──────────────┐  no input / bad input   ┌──────────────────────────────┐
//! │ parse + limit│ ──────────────────────▶ │ NoAddress / BadAddress       │ 400
//! └──────────────┘                         └──────────────────────────────┘
//!      │
//!      ▼
//! ┌──────────────┐  same set as applied    ┌──────────┐
//! │ ChangeCache  │ ──────────────────────▶ │ NoChange │ 200
//! └──────────────┘                         └──────────┘
//!      │
//!      ▼
//! ┌──────────────┐  failure                ┌────────┐
//! │ ZoneUpdater  │ ──────────────────────▶ │ Failed │ 500
//! └──────────────┘                         └────────┘
//!      │ success, cache write-through
//!      ▼
//!   Applied 200
//! ```
//!
//! The address limit is checked before the cache so an over-limit request
//! can never be answered "no-change".

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::address::{AddressError, AddressSet};
use crate::auth::{BasicCredentials, strip_domain_suffix};
use crate::cache::ChangeCache;
use crate::config::PipelineSettings;
use crate::credentials;
use crate::traits::{CredentialStore, UpdateFailure, ZoneUpdater};

/// Transport-independent view of an update request
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// Raw `Authorization` header value
    pub authorization: Option<String>,
    /// Every `ip` query parameter value, in order
    pub ip_params: Vec<String>,
    /// Raw `X-Real-IP` header value
    pub real_ip: Option<String>,
}

/// Why a request was turned away before any update was attempted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Credential missing, malformed, unknown hostname or wrong secret
    NoAuth,
    /// No address supplied
    NoAddress,
    /// Address input unparseable or over the limit
    BadAddress(AddressError),
}

/// Terminal state of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The zone was updated
    Applied,
    /// The addresses match the last applied set; nothing was done
    NoChange,
    /// Rejected before reaching the updater
    Rejected(Rejection),
    /// The updater failed
    Failed(UpdateFailure),
}

impl Outcome {
    /// HTTP status code for this outcome
    pub fn status(&self) -> u16 {
        match self {
            Outcome::Applied | Outcome::NoChange => 200,
            Outcome::Rejected(Rejection::NoAuth) => 401,
            Outcome::Rejected(_) => 400,
            Outcome::Failed(_) => 500,
        }
    }

    /// Plain-text response body
    pub fn body(&self) -> String {
        match self {
            Outcome::Applied => "success".to_string(),
            Outcome::NoChange => "no-change".to_string(),
            Outcome::Rejected(Rejection::NoAuth) => "no auth".to_string(),
            Outcome::Rejected(Rejection::NoAddress) => "no address".to_string(),
            Outcome::Rejected(Rejection::BadAddress(AddressError::TooMany { max, .. })) => {
                format!("too many addresses\nmax {max}")
            }
            Outcome::Rejected(Rejection::BadAddress(err)) => format!("broken address\n{err}"),
            Outcome::Failed(failure) => failure.to_string(),
        }
    }

    /// Whether the client must be sent an authentication challenge
    pub fn needs_challenge(&self) -> bool {
        matches!(self, Outcome::Rejected(Rejection::NoAuth))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Applied => f.write_str("applied"),
            Outcome::NoChange => f.write_str("no-change"),
            Outcome::Rejected(Rejection::NoAuth) => f.write_str("rejected: no auth"),
            Outcome::Rejected(Rejection::NoAddress) => f.write_str("rejected: no address"),
            Outcome::Rejected(Rejection::BadAddress(err)) => write!(f, "rejected: {err}"),
            Outcome::Failed(failure) => write!(f, "failed: {failure:?}"),
        }
    }
}

/// Orchestrates authentication, parsing, change suppression and update
///
/// The pipeline is shared by all concurrent requests (wrap it in an `Arc`).
/// Its only mutable state is the injected [`ChangeCache`].
pub struct UpdatePipeline {
    settings: PipelineSettings,
    credentials: Arc<dyn CredentialStore>,
    updater: Arc<dyn ZoneUpdater>,
    cache: ChangeCache,
}

impl UpdatePipeline {
    /// Create a new pipeline
    ///
    /// # Parameters
    ///
    /// - `settings`: Domain suffix and address limit
    /// - `credentials`: Hostname → secret store
    /// - `updater`: Zone updater implementation
    /// - `cache`: Change cache (pass a fresh one per server or test)
    pub fn new(
        settings: PipelineSettings,
        credentials: Arc<dyn CredentialStore>,
        updater: Arc<dyn ZoneUpdater>,
        cache: ChangeCache,
    ) -> Self {
        Self {
            settings,
            credentials,
            updater,
            cache,
        }
    }

    /// Realm advertised in authentication challenges
    pub fn realm(&self) -> &str {
        &self.settings.domain_suffix
    }

    pub fn cache(&self) -> &ChangeCache {
        &self.cache
    }

    /// Run one request to completion
    pub async fn handle(&self, request: UpdateRequest) -> Outcome {
        let hostname = match self.authenticate(request.authorization.as_deref()) {
            Some(hostname) => hostname,
            None => return Outcome::Rejected(Rejection::NoAuth),
        };

        let addresses = match self.parse_addresses(&hostname, &request) {
            Ok(addresses) => addresses,
            Err(rejection) => return Outcome::Rejected(rejection),
        };

        if self.cache.get(&hostname).await.as_ref() == Some(&addresses) {
            debug!("{} already has {}, skipping update", hostname, addresses);
            return Outcome::NoChange;
        }

        let fqdn = format!("{}{}", hostname, self.settings.domain_suffix);
        debug!(
            "Updating {} -> {} via {}",
            fqdn,
            addresses,
            self.updater.updater_name()
        );

        match self.updater.apply(&fqdn, &addresses).await {
            Ok(()) => {
                info!("Updated {} -> {}", fqdn, addresses);
                self.cache.put(&hostname, addresses).await;
                Outcome::Applied
            }
            Err(failure) => {
                warn!("Update of {} failed: {:?}", fqdn, failure);
                Outcome::Failed(failure)
            }
        }
    }

    /// Resolve the request's credential to a known hostname label
    ///
    /// Every failure path returns `None` so callers cannot tell them apart.
    fn authenticate(&self, authorization: Option<&str>) -> Option<String> {
        let Some(creds) = authorization.and_then(BasicCredentials::from_header) else {
            debug!("Request without usable Basic credential");
            return None;
        };

        let hostname = strip_domain_suffix(&creds.hostname, &self.settings.domain_suffix);
        if credentials::verify(self.credentials.as_ref(), hostname, &creds.secret) {
            Some(hostname.to_string())
        } else {
            warn!("Authentication failed for {:?}", creds.hostname);
            None
        }
    }

    /// Gather candidate address strings and build the AddressSet
    ///
    /// `ip` query values take precedence; blank values are ignored. The
    /// `X-Real-IP` header is only consulted when no `ip` value remains.
    fn parse_addresses(
        &self,
        hostname: &str,
        request: &UpdateRequest,
    ) -> Result<AddressSet, Rejection> {
        let mut candidates: Vec<&str> = request
            .ip_params
            .iter()
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
            .collect();

        if candidates.is_empty() {
            match request.real_ip.as_deref() {
                Some(real_ip) if !real_ip.trim().is_empty() => candidates.push(real_ip),
                _ => {
                    debug!("No address supplied for {}", hostname);
                    return Err(Rejection::NoAddress);
                }
            }
        }

        AddressSet::parse(candidates, self.settings.max_addresses).map_err(|err| {
            debug!("Rejecting addresses for {}: {}", hostname, err);
            match err {
                AddressError::Empty => Rejection::NoAddress,
                other => Rejection::BadAddress(other),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_status_and_body() {
        assert_eq!(Outcome::Applied.status(), 200);
        assert_eq!(Outcome::Applied.body(), "success");
        assert_eq!(Outcome::NoChange.body(), "no-change");

        let no_auth = Outcome::Rejected(Rejection::NoAuth);
        assert_eq!(no_auth.status(), 401);
        assert_eq!(no_auth.body(), "no auth");
        assert!(no_auth.needs_challenge());

        let too_many = Outcome::Rejected(Rejection::BadAddress(AddressError::TooMany {
            count: 33,
            max: 32,
        }));
        assert_eq!(too_many.status(), 400);
        assert_eq!(too_many.body(), "too many addresses\nmax 32");
        assert!(!too_many.needs_challenge());

        let timeout = Outcome::Failed(UpdateFailure::Timeout);
        assert_eq!(timeout.status(), 500);
        assert_eq!(timeout.body(), "timeout");

        let tool = Outcome::Failed(UpdateFailure::ToolError("update failed: REFUSED\n".into()));
        assert_eq!(tool.body(), "update failed: REFUSED\n");
    }
}
