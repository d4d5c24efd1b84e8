//! Zone update transactions
//!
//! An [`UpdateTransaction`] is the ordered directive list for one
//! hostname: delete every record of the name, add one record per address,
//! commit, end the session. The text form is the line protocol understood
//! by `nsupdate`:
//!
//! ```text
//! del alice.dyn.example.com
//! add alice.dyn.example.com 180 A 203.0.113.5
//! send
//! quit
//! ```

use std::fmt;
use std::net::IpAddr;

use crate::address::{AddressFamily, AddressSet, RecordType};

/// A single zone update directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Remove all records of the name
    Delete { name: String },
    /// Add one address record
    Add {
        name: String,
        ttl: u32,
        record_type: RecordType,
        address: IpAddr,
    },
    /// Commit the pending directives
    Send,
    /// End the session
    Quit,
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Delete { name } => write!(f, "del {name}"),
            Directive::Add {
                name,
                ttl,
                record_type,
                address,
            } => write!(f, "add {name} {ttl} {record_type} {address}"),
            Directive::Send => f.write_str("send"),
            Directive::Quit => f.write_str("quit"),
        }
    }
}

/// Ordered directives replacing the address records of one name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTransaction {
    directives: Vec<Directive>,
}

impl UpdateTransaction {
    /// Build the delete-then-add transaction for `fqdn`
    pub fn build(fqdn: &str, addresses: &AddressSet, ttl: u32) -> Self {
        let mut directives = Vec::with_capacity(addresses.len() + 3);
        directives.push(Directive::Delete {
            name: fqdn.to_string(),
        });
        for address in addresses.iter() {
            directives.push(Directive::Add {
                name: fqdn.to_string(),
                ttl,
                record_type: AddressFamily::of(address).record_type(),
                address: *address,
            });
        }
        directives.push(Directive::Send);
        directives.push(Directive::Quit);

        Self { directives }
    }

    /// Directives in the order they are sent
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Newline-terminated script for the update tool's standard input
    pub fn to_script(&self) -> String {
        let mut script = String::new();
        for directive in &self.directives {
            script.push_str(&directive.to_string());
            script.push('\n');
        }
        script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_ipv4_transaction() {
        let addrs = AddressSet::parse(["203.0.113.5"], 32).unwrap();
        let tx = UpdateTransaction::build("alice.dyn.example.com", &addrs, 180);

        assert_eq!(
            tx.to_script(),
            "del alice.dyn.example.com\n\
             add alice.dyn.example.com 180 A 203.0.113.5\n\
             send\n\
             quit\n"
        );
    }

    #[test]
    fn test_delete_precedes_adds() {
        let addrs = AddressSet::parse(["2001:db8::5", "192.0.2.7"], 32).unwrap();
        let tx = UpdateTransaction::build("bob.dyn.example.com", &addrs, 60);
        let directives = tx.directives();

        assert_eq!(directives.len(), 5);
        assert!(matches!(directives[0], Directive::Delete { .. }));
        assert_eq!(directives[1].to_string(), "add bob.dyn.example.com 60 A 192.0.2.7");
        assert_eq!(
            directives[2].to_string(),
            "add bob.dyn.example.com 60 AAAA 2001:db8::5"
        );
        assert_eq!(directives[3], Directive::Send);
        assert_eq!(directives[4], Directive::Quit);
    }
}
