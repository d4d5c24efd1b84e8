//! HTTP Basic credential parsing
//!
//! Pure string handling for the `Authorization` header and the hostname
//! it carries. Nothing here touches the credential store.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Hostname and secret decoded from a Basic `Authorization` header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub hostname: String,
    pub secret: String,
}

impl BasicCredentials {
    /// Decode a `Basic <base64(hostname:secret)>` header value
    ///
    /// The secret may itself contain colons; only the first colon splits.
    /// Returns `None` for any other scheme, bad base64, non-UTF-8 content
    /// or a missing colon.
    pub fn from_header(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (hostname, secret) = decoded.split_once(':')?;

        Some(Self {
            hostname: hostname.to_string(),
            secret: secret.to_string(),
        })
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("hostname", &self.hostname)
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

/// Strip `suffix` from `hostname` if present
///
/// A hostname that consists of nothing but the suffix is left as is.
pub fn strip_domain_suffix<'a>(hostname: &'a str, suffix: &str) -> &'a str {
    match hostname.strip_suffix(suffix) {
        Some(label) if !label.is_empty() && !suffix.is_empty() => label,
        _ => hostname,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn test_decode_basic() {
        let creds = BasicCredentials::from_header(&header("alice:secret1")).unwrap();
        assert_eq!(creds.hostname, "alice");
        assert_eq!(creds.secret, "secret1");
    }

    #[test]
    fn test_secret_may_contain_colons() {
        let creds = BasicCredentials::from_header(&header("alice:a:b:c")).unwrap();
        assert_eq!(creds.hostname, "alice");
        assert_eq!(creds.secret, "a:b:c");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let value = format!("basic {}", STANDARD.encode("alice:x"));
        assert!(BasicCredentials::from_header(&value).is_some());
    }

    #[test]
    fn test_malformed_headers() {
        assert!(BasicCredentials::from_header("").is_none());
        assert!(BasicCredentials::from_header("Basic").is_none());
        assert!(BasicCredentials::from_header("Bearer abc").is_none());
        assert!(BasicCredentials::from_header("Basic !!!not-base64!!!").is_none());
        assert!(BasicCredentials::from_header(&header("no-colon")).is_none());

        let invalid_utf8 = format!("Basic {}", STANDARD.encode([0xff, 0xfe, b':', b'x']));
        assert!(BasicCredentials::from_header(&invalid_utf8).is_none());
    }

    #[test]
    fn test_debug_hides_secret() {
        let creds = BasicCredentials::from_header(&header("alice:hunter2")).unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn test_strip_domain_suffix() {
        let suffix = ".dyn.example.com";
        assert_eq!(strip_domain_suffix("alice.dyn.example.com", suffix), "alice");
        assert_eq!(strip_domain_suffix("alice", suffix), "alice");
        assert_eq!(strip_domain_suffix("alice.other.org", suffix), "alice.other.org");
        assert_eq!(strip_domain_suffix(".dyn.example.com", suffix), ".dyn.example.com");
    }
}
