// # Credential Store Trait
//
// Read-only mapping from hostname label (without the domain suffix) to the
// shared secret a client must present. The mapping is loaded once at
// startup; the pipeline never mutates it.
//
// ## Implementations
//
// - `StaticCredentials`: in-memory map, optionally loaded from the JSON
//   password file (`credentials` module)
//
// ## Usage
//
// ```rust,ignore
// use nsddns_core::credentials::{verify, StaticCredentials};
//
// let store = StaticCredentials::load("/var/named/ddns-hosts.json").await?;
// if verify(&store, "alice", "secret1") {
//     // authenticated
// }
// ```

/// Trait for credential store implementations
///
/// Hostnames are matched byte-for-byte; no case folding or other
/// normalization is applied.
///
/// # Thread Safety
///
/// The store is shared by every in-flight request and is never written
/// after construction, so implementations need no locking.
pub trait CredentialStore: Send + Sync {
    /// Expected secret for `hostname`, if the hostname is known
    fn lookup(&self, hostname: &str) -> Option<&str>;

    /// Number of configured hostnames
    fn len(&self) -> usize;

    /// Whether no hostnames are configured
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
