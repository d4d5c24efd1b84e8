// # nsddns-core
//
// Core library for the authenticated dynamic DNS update server.
//
// ## Architecture Overview
//
// Remote clients (home routers, scripts) report their current addresses
// over HTTP. This library turns one such request into at most one zone
// update:
// - **AddressSet**: Deduplicated, typed set of reported addresses
// - **CredentialStore**: Trait for hostname → secret lookup
// - **ChangeCache**: Last applied address set per hostname
// - **ZoneUpdater**: Trait for replacing a name's address records
// - **UpdatePipeline**: Orchestrates authenticate → parse → cache → update
//
// ## Design Principles
//
// 1. **Transport-free**: The pipeline sees an `UpdateRequest`, never HTTP types
// 2. **Injected state**: The cache is owned by the pipeline, not a global
// 3. **No retries**: Failures go back to the client, who retries
// 4. **Enumeration resistance**: Unknown host and wrong secret look identical

pub mod address;
pub mod auth;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod pipeline;
pub mod traits;
pub mod transaction;

// Re-export core types for convenience
pub use address::{AddressError, AddressFamily, AddressSet, RecordType};
pub use cache::ChangeCache;
pub use config::{PipelineSettings, ServerConfig};
pub use credentials::StaticCredentials;
pub use error::{Error, Result};
pub use pipeline::{Outcome, Rejection, UpdatePipeline, UpdateRequest};
pub use traits::{CredentialStore, UpdateFailure, ZoneUpdater};
pub use transaction::{Directive, UpdateTransaction};
