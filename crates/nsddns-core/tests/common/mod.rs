//! Test doubles and common utilities for pipeline contract tests
//!
//! This module provides a scripted ZoneUpdater that records every call,
//! plus helpers for building pipelines and requests.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use nsddns_core::address::AddressSet;
use nsddns_core::cache::ChangeCache;
use nsddns_core::config::PipelineSettings;
use nsddns_core::credentials::StaticCredentials;
use nsddns_core::pipeline::{UpdatePipeline, UpdateRequest};
use nsddns_core::traits::{UpdateFailure, ZoneUpdater};
use nsddns_core::transaction::UpdateTransaction;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SUFFIX: &str = ".dyn.example.com";
pub const TTL: u32 = 180;

/// A ZoneUpdater that records calls and returns a scripted result
pub struct RecordingUpdater {
    /// Call counter for apply()
    apply_call_count: Arc<AtomicUsize>,
    /// Transactions that apply() was asked to run, as script text
    scripts: Arc<Mutex<Vec<String>>>,
    /// Result to return from apply()
    result: Mutex<Result<(), UpdateFailure>>,
    /// Artificial latency per call
    delay: Duration,
}

impl RecordingUpdater {
    pub fn new() -> Self {
        Self {
            apply_call_count: Arc::new(AtomicUsize::new(0)),
            scripts: Arc::new(Mutex::new(Vec::new())),
            result: Mutex::new(Ok(())),
            delay: Duration::ZERO,
        }
    }

    /// An updater whose every call fails with `failure`
    pub fn failing(failure: UpdateFailure) -> Self {
        let updater = Self::new();
        updater.set_result(Err(failure));
        updater
    }

    /// An updater that takes `delay` per call
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new()
        }
    }

    /// Change the result returned by subsequent calls
    pub fn set_result(&self, result: Result<(), UpdateFailure>) {
        *self.result.lock().unwrap() = result;
    }

    /// Get the number of times apply() was called
    pub fn apply_call_count(&self) -> usize {
        self.apply_call_count.load(Ordering::SeqCst)
    }

    /// Scripts of every transaction requested so far
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ZoneUpdater for RecordingUpdater {
    async fn apply(&self, fqdn: &str, addresses: &AddressSet) -> Result<(), UpdateFailure> {
        self.apply_call_count.fetch_add(1, Ordering::SeqCst);
        self.scripts
            .lock()
            .unwrap()
            .push(UpdateTransaction::build(fqdn, addresses, TTL).to_script());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.result.lock().unwrap().clone()
    }

    fn updater_name(&self) -> &'static str {
        "recording"
    }
}

/// Credentials used throughout the contract tests
pub fn test_credentials() -> StaticCredentials {
    [
        ("alice".to_string(), "secret1".to_string()),
        ("bob".to_string(), "hunter2".to_string()),
    ]
    .into_iter()
    .collect()
}

/// Pipeline with the test credentials, the default limit and a fresh cache
pub fn pipeline(updater: Arc<RecordingUpdater>) -> UpdatePipeline {
    UpdatePipeline::new(
        PipelineSettings {
            domain_suffix: SUFFIX.to_string(),
            max_addresses: 32,
        },
        Arc::new(test_credentials()),
        updater,
        ChangeCache::new(),
    )
}

/// `Authorization` header value for `user:secret`
pub fn basic(user: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{secret}")))
}

/// Authenticated request with `ip` query values
pub fn request(user: &str, secret: &str, ips: &[&str]) -> UpdateRequest {
    UpdateRequest {
        authorization: Some(basic(user, secret)),
        ip_params: ips.iter().map(|s| s.to_string()).collect(),
        real_ip: None,
    }
}

/// Parse a literal address set (test input is always valid)
pub fn addresses(ips: &[&str]) -> AddressSet {
    AddressSet::parse(ips, 32).unwrap()
}
