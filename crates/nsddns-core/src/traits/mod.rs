//! Core traits for nsddns
//!
//! This module defines the seams between the update pipeline and its
//! collaborators.
//!
//! - [`CredentialStore`]: Hostname → secret lookup
//! - [`ZoneUpdater`]: Apply an address set to the zone

pub mod credential_store;
pub mod zone_updater;

pub use credential_store::CredentialStore;
pub use zone_updater::{UpdateFailure, ZoneUpdater};
