// # Credentials
//
// In-memory credential store plus the secret check used by the pipeline.
//
// ## Enumeration Resistance
//
// `verify` does the same work whether the hostname is unknown or the
// secret is wrong, and the pipeline maps both to the same rejection, so a
// client cannot learn which hostnames exist.

pub mod file;

use std::collections::HashMap;
use std::fmt;

use subtle::ConstantTimeEq;

use crate::traits::CredentialStore;

/// Compared against when the hostname is unknown
const ABSENT_SECRET: &str = "\u{0}nsddns-absent-host\u{0}";

/// Credential store backed by a fixed map
#[derive(Clone, Default)]
pub struct StaticCredentials {
    secrets: HashMap<String, String>,
}

impl StaticCredentials {
    /// Create a store from a hostname → secret map
    pub fn from_map(secrets: HashMap<String, String>) -> Self {
        Self { secrets }
    }
}

impl FromIterator<(String, String)> for StaticCredentials {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            secrets: iter.into_iter().collect(),
        }
    }
}

impl CredentialStore for StaticCredentials {
    fn lookup(&self, hostname: &str) -> Option<&str> {
        self.secrets.get(hostname).map(String::as_str)
    }

    fn len(&self) -> usize {
        self.secrets.len()
    }
}

// Secrets stay out of logs
impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hosts: Vec<&str> = self.secrets.keys().map(String::as_str).collect();
        hosts.sort_unstable();
        f.debug_struct("StaticCredentials")
            .field("hosts", &hosts)
            .field("secrets", &"<REDACTED>")
            .finish()
    }
}

/// Check `secret` against the stored secret for `hostname`
///
/// Returns `false` both for unknown hostnames and for wrong secrets.
pub fn verify(store: &dyn CredentialStore, hostname: &str, secret: &str) -> bool {
    match store.lookup(hostname) {
        Some(expected) => secrets_match(expected, secret),
        None => {
            let _ = secrets_match(ABSENT_SECRET, secret);
            false
        }
    }
}

/// Constant-time equality of two secrets
///
/// Only the length comparison is allowed to short-circuit.
fn secrets_match(expected: &str, supplied: &str) -> bool {
    expected.as_bytes().ct_eq(supplied.as_bytes()).into()
}
