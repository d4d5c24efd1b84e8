// # Credential File
//
// Loads the password file: a flat JSON object mapping hostname labels to
// secrets.
//
// ## File Format
//
// ```json
// {
//   "alice": "secret1",
//   "bob": "another secret"
// }
// ```
//
// The file is read once at startup. Any failure here is fatal: the daemon
// must not start serving without credentials.

use std::collections::HashMap;
use std::path::Path;

use tokio::fs;

use super::StaticCredentials;
use crate::Error;

impl StaticCredentials {
    /// Parse the JSON password file contents
    pub fn from_json_str(contents: &str) -> Result<Self, Error> {
        let secrets: HashMap<String, String> = serde_json::from_str(contents)
            .map_err(|e| Error::credentials(format!("Invalid credential file: {}", e)))?;

        if let Some(host) = secrets.keys().find(|h| h.is_empty()) {
            return Err(Error::credentials(format!(
                "Invalid credential file: empty hostname {:?}",
                host
            )));
        }

        Ok(Self::from_map(secrets))
    }

    /// Load the JSON password file at `path`
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).await.map_err(|e| {
            Error::credentials(format!(
                "Failed to read credential file {}: {}",
                path.display(),
                e
            ))
        })?;

        let store = Self::from_json_str(&contents)?;
        tracing::debug!(
            "Loaded {} credential(s) from {}",
            store.secrets.len(),
            path.display()
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::CredentialStore;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_password_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"alice": "secret1", "bob": "x:y"}}"#).unwrap();

        let store = StaticCredentials::load(file.path()).await.unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.lookup("bob"), Some("x:y"));
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StaticCredentials::load(dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        for contents in ["[\"alice\"]", r#"{"alice": 42}"#, r#"{"": "x"}"#, "{"] {
            let err = StaticCredentials::from_json_str(contents).unwrap_err();
            assert!(matches!(err, Error::Credentials(_)), "{contents}: {err:?}");
        }
    }

    #[tokio::test]
    async fn test_load_malformed_file_is_credential_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "alice:secret1").unwrap();

        let err = StaticCredentials::load(file.path()).await.unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
        assert!(err.to_string().contains("Invalid credential file"));
    }
}
