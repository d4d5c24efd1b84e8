// # Address Sets
//
// Parses the address strings a client reports into a deduplicated, typed
// set. Equality is set equality, so two requests listing the same
// addresses in a different order (or with repeats) compare equal and the
// change cache can suppress the second one.
//
// The set is ordered (IPv4 before IPv6, ascending within a family), which
// makes the generated update transaction deterministic.

use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

use thiserror::Error;

/// Default upper bound on distinct addresses per hostname
pub const DEFAULT_MAX_ADDRESSES: usize = 32;

/// Address family of a parsed address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Family of the given address
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    /// The DNS record type carrying addresses of this family
    pub fn record_type(self) -> RecordType {
        match self {
            AddressFamily::V4 => RecordType::A,
            AddressFamily::V6 => RecordType::Aaaa,
        }
    }
}

/// DNS address record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => f.write_str("A"),
            RecordType::Aaaa => f.write_str("AAAA"),
        }
    }
}

/// Reasons an address batch is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// One of the inputs is not an IP literal
    #[error("{input:?} does not appear to be an IPv4 or IPv6 address: {reason}")]
    Invalid {
        /// The offending input, as supplied
        input: String,
        /// Parser message
        reason: String,
    },

    /// More distinct addresses than allowed
    #[error("{count} distinct addresses given, at most {max} allowed")]
    TooMany {
        /// Distinct addresses after deduplication
        count: usize,
        /// Configured limit
        max: usize,
    },

    /// No input at all
    #[error("no address given")]
    Empty,
}

/// A non-empty, deduplicated set of IPv4/IPv6 addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressSet {
    addrs: BTreeSet<IpAddr>,
}

impl AddressSet {
    /// Parse a batch of address literals
    ///
    /// Surrounding whitespace is ignored. The first input that fails to
    /// parse aborts the whole batch. The `max` limit applies to the
    /// deduplicated set, so repeating an address never counts against it.
    pub fn parse<I, S>(inputs: I, max: usize) -> Result<Self, AddressError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut addrs = BTreeSet::new();
        for input in inputs {
            let raw = input.as_ref();
            let addr = raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|e| AddressError::Invalid {
                    input: raw.to_string(),
                    reason: e.to_string(),
                })?;
            addrs.insert(addr);
        }

        if addrs.is_empty() {
            return Err(AddressError::Empty);
        }
        if addrs.len() > max {
            return Err(AddressError::TooMany {
                count: addrs.len(),
                max,
            });
        }

        Ok(Self { addrs })
    }

    /// Number of distinct addresses
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// Whether `addr` is one of the addresses
    pub fn contains(&self, addr: &IpAddr) -> bool {
        self.addrs.contains(addr)
    }

    /// Addresses in ascending order, IPv4 first
    pub fn iter(&self) -> impl Iterator<Item = &IpAddr> {
        self.addrs.iter()
    }

    /// Number of (IPv4, IPv6) addresses
    pub fn family_counts(&self) -> (usize, usize) {
        let v4 = self
            .addrs
            .iter()
            .filter(|a| AddressFamily::of(a) == AddressFamily::V4)
            .count();
        (v4, self.addrs.len() - v4)
    }
}

impl fmt::Display for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, addr) in self.addrs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{addr}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_families() {
        let set = AddressSet::parse(["2001:db8::1", "203.0.113.5"], DEFAULT_MAX_ADDRESSES).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.family_counts(), (1, 1));

        // IPv4 sorts first
        let first = set.iter().next().unwrap();
        assert_eq!(AddressFamily::of(first), AddressFamily::V4);
        assert_eq!(AddressFamily::of(first).record_type(), RecordType::A);
    }

    #[test]
    fn test_order_independent_and_deduplicating() {
        let a = AddressSet::parse(["192.0.2.1", "192.0.2.2", "2001:db8::1"], 32).unwrap();
        let b = AddressSet::parse(["2001:db8::1", "192.0.2.2", "192.0.2.1", "192.0.2.2"], 32)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_dedup_by_value_not_text() {
        let set = AddressSet::parse(["2001:db8::1", "2001:0db8:0:0:0:0:0:1", " 2001:DB8::1 "], 32)
            .unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_invalid_address_names_input() {
        let err = AddressSet::parse(["192.0.2.1", "not-an-ip"], 32).unwrap_err();
        match &err {
            AddressError::Invalid { input, .. } => assert_eq!(input, "not-an-ip"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("not-an-ip"));
    }

    #[test]
    fn test_rejects_hostnames_and_cidr() {
        assert!(AddressSet::parse(["example.com"], 32).is_err());
        assert!(AddressSet::parse(["192.0.2.0/24"], 32).is_err());
    }

    #[test]
    fn test_limit_applies_after_dedup() {
        let inputs: Vec<String> = (1..=3).map(|i| format!("192.0.2.{i}")).collect();
        let mut repeated = inputs.clone();
        repeated.extend(inputs.iter().cloned());

        assert_eq!(AddressSet::parse(&repeated, 3).unwrap().len(), 3);
        assert_eq!(
            AddressSet::parse(&repeated, 2).unwrap_err(),
            AddressError::TooMany { count: 3, max: 2 }
        );
    }

    #[test]
    fn test_limit_boundary() {
        let exact: Vec<String> = (0..DEFAULT_MAX_ADDRESSES)
            .map(|i| format!("198.51.100.{i}"))
            .collect();
        assert!(AddressSet::parse(&exact, DEFAULT_MAX_ADDRESSES).is_ok());

        let over: Vec<String> = (0..=DEFAULT_MAX_ADDRESSES)
            .map(|i| format!("198.51.100.{i}"))
            .collect();
        assert!(matches!(
            AddressSet::parse(&over, DEFAULT_MAX_ADDRESSES),
            Err(AddressError::TooMany { count: 33, max: 32 })
        ));
    }

    #[test]
    fn test_empty_batch() {
        let none: [&str; 0] = [];
        assert_eq!(AddressSet::parse(none, 32).unwrap_err(), AddressError::Empty);
    }

    #[test]
    fn test_display() {
        let set = AddressSet::parse(["192.0.2.2", "192.0.2.1"], 32).unwrap();
        assert_eq!(set.to_string(), "192.0.2.1,192.0.2.2");
    }
}
