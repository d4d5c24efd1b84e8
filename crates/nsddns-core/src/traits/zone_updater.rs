// # Zone Updater Trait
//
// Defines the interface for applying an address set to the authoritative
// zone.
//
// ## Implementations
//
// - nsupdate subprocess: `nsddns-nsupdate` crate
//
// ## Usage
//
// ```rust,ignore
// use nsddns_core::ZoneUpdater;
//
// let updater = /* ZoneUpdater implementation */;
// match updater.apply("alice.dyn.example.com", &addresses).await {
//     Ok(()) => { /* zone now holds exactly `addresses` */ }
//     Err(failure) => { /* report failure.to_string() to the client */ }
// }
// ```

use async_trait::async_trait;
use thiserror::Error;

use crate::address::AddressSet;

/// Why a zone update did not go through
///
/// The `Display` text is what the client receives as the response body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateFailure {
    /// The update tool did not finish within the configured time budget
    #[error("timeout")]
    Timeout,

    /// The update tool reported diagnostics; carried verbatim
    #[error("{0}")]
    ToolError(String),

    /// The update tool could not be started or talked to
    #[error("update tool unavailable")]
    Launch(String),
}

/// Trait for zone updater implementations
///
/// One call replaces every address record of `fqdn` with the records in
/// `addresses` (delete first, then add).
///
/// # Constraints
///
/// - No retries: a failure is returned to the pipeline, which reports it to
///   the client. The client retries on its own schedule.
/// - No caching: change suppression is owned by the pipeline's
///   `ChangeCache`.
/// - Bounded: every call must finish (or give up with
///   [`UpdateFailure::Timeout`]) within the implementation's time budget.
/// - Independent: concurrent calls must not block each other.
#[async_trait]
pub trait ZoneUpdater: Send + Sync {
    /// Replace the address records of `fqdn` with `addresses`
    async fn apply(&self, fqdn: &str, addresses: &AddressSet) -> Result<(), UpdateFailure>;

    /// Name of the updater (for logging)
    fn updater_name(&self) -> &'static str;
}
