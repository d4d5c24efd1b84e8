// # Change Cache
//
// Remembers, per hostname, the address set most recently applied to the
// zone so an identical follow-up request can be answered without running
// the update tool.
//
// ## Semantics
//
// - Written only after a successful zone update
// - Never evicted; the hostname space is bounded by the credential file
// - Not persisted: a fresh process performs one real update per hostname
//   before it starts suppressing
//
// The zone is the source of truth. The cache is an optimization only.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::address::AddressSet;

/// Last successfully applied state for one hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The address set now in the zone
    pub addresses: AddressSet,
    /// When the update was applied
    pub applied_at: DateTime<Utc>,
}

/// Shared, in-memory change cache
///
/// Cloning yields another handle onto the same map. Every read and write
/// holds the lock only for the map operation itself, so requests for
/// different hostnames never wait on each other's zone updates.
///
/// # Example
///
/// ```rust,no_run
/// use nsddns_core::address::AddressSet;
/// use nsddns_core::cache::ChangeCache;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let cache = ChangeCache::new();
///     let addrs = AddressSet::parse(["192.0.2.1"], 32)?;
///
///     cache.put("alice", addrs.clone()).await;
///     assert_eq!(cache.get("alice").await, Some(addrs));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChangeCache {
    inner: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl ChangeCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Address set last applied for `hostname`
    pub async fn get(&self, hostname: &str) -> Option<AddressSet> {
        let guard = self.inner.read().await;
        guard.get(hostname).map(|entry| entry.addresses.clone())
    }

    /// Full entry for `hostname`
    pub async fn entry(&self, hostname: &str) -> Option<CacheEntry> {
        let guard = self.inner.read().await;
        guard.get(hostname).cloned()
    }

    /// Record `addresses` as applied for `hostname`, replacing any prior entry
    pub async fn put(&self, hostname: &str, addresses: AddressSet) {
        let mut guard = self.inner.write().await;
        guard.insert(
            hostname.to_string(),
            CacheEntry {
                addresses,
                applied_at: Utc::now(),
            },
        );
    }

    /// Number of hostnames in the cache
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Hostnames with a cached entry
    pub async fn hostnames(&self) -> Vec<String> {
        let guard = self.inner.read().await;
        guard.keys().cloned().collect()
    }
}
