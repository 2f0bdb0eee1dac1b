//! API key resolution: OS keyring first, then a YAML key file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

pub const KEYRING_SERVICE: &str = "spyfall-arena";
pub const KEYRING_USER: &str = "openrouter_api_key";
pub const DEFAULT_KEY_FILE: &str = "apikeys.yaml";
const KEY_FILE_FIELD: &str = "openrouter_api_key";
const PLACEHOLDER: &str = "your-open-router-api-key-goes-here";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error(
        "no API key found: store one in the OS keyring (service 'spyfall-arena', \
         user 'openrouter_api_key') or set 'openrouter_api_key' in {}",
        .0.display()
    )]
    CredentialNotFound(PathBuf),
}

/// Find the OpenRouter API key.
///
/// Keyring failures are logged and fall through to `fallback_path`.
pub fn resolve_credential(fallback_path: &Path) -> Result<String, CredentialError> {
    if let Some(key) = from_keyring() {
        debug!("API key loaded from keyring");
        return Ok(key);
    }
    if let Some(key) = from_file(fallback_path) {
        warn!(
            path = %fallback_path.display(),
            "API key loaded from file; storing keys in the OS keyring is recommended"
        );
        return Ok(key);
    }
    Err(CredentialError::CredentialNotFound(
        fallback_path.to_path_buf(),
    ))
}

fn from_keyring() -> Option<String> {
    let entry = match keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
        Ok(entry) => entry,
        Err(e) => {
            warn!(error = %e, "Keyring unavailable");
            return None;
        }
    };
    match entry.get_password() {
        Ok(key) if !key.trim().is_empty() => Some(key),
        Ok(_) | Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(error = %e, "Keyring lookup failed");
            None
        }
    }
}

fn from_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let keys: BTreeMap<String, serde_yaml::Value> = match serde_yaml::from_str(&content) {
        Ok(keys) => keys,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Key file is not a YAML mapping");
            return None;
        }
    };
    key_from_mapping(&keys)
}

fn key_from_mapping(keys: &BTreeMap<String, serde_yaml::Value>) -> Option<String> {
    let key = keys.get(KEY_FILE_FIELD)?.as_str()?.trim();
    if key.is_empty() || key == PLACEHOLDER {
        return None;
    }
    Some(key.to_string())
}
