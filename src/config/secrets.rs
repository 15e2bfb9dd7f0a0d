//! Credential storage for dicto.
//!
//! API keys are kept out of the main config file, in a TOML file with
//! restricted permissions under the user's local data directory. One key per
//! backend, plus the backend selected as default by `dicto auth`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CREDENTIALS_FILE: &str = "credentials.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Credentials {
    /// API key per backend id ("relay", "openai")
    #[serde(default)]
    keys: BTreeMap<String, String>,
    /// Backend id chosen as default by the auth flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_backend: Option<String>,
}

/// Saves the API key for a backend.
///
/// # Errors
/// - If the data directory cannot be determined or created
/// - If the credentials file cannot be written
pub fn save_api_key(backend_id: &str, key: &str) -> anyhow::Result<()> {
    let path = credentials_path()?;
    let mut credentials = read_credentials(&path)?;
    credentials.keys.insert(backend_id.to_string(), key.to_string());
    write_credentials(&path, &credentials)?;
    tracing::info!("API key saved for backend '{backend_id}'");
    Ok(())
}

/// Returns the stored API key for a backend, if any.
pub fn get_api_key(backend_id: &str) -> anyhow::Result<Option<String>> {
    let path = credentials_path()?;
    Ok(read_credentials(&path)?.keys.get(backend_id).cloned())
}

/// Removes the stored API key for a backend.
pub fn clear_api_key(backend_id: &str) -> anyhow::Result<()> {
    let path = credentials_path()?;
    let mut credentials = read_credentials(&path)?;
    if credentials.keys.remove(backend_id).is_some() {
        write_credentials(&path, &credentials)?;
        tracing::info!("API key cleared for backend '{backend_id}'");
    }
    Ok(())
}

/// Records which backend `dicto auth` selected as default.
pub fn save_default_backend(backend_id: &str) -> anyhow::Result<()> {
    let path = credentials_path()?;
    let mut credentials = read_credentials(&path)?;
    credentials.default_backend = Some(backend_id.to_string());
    write_credentials(&path, &credentials)
}

/// Returns the backend id selected as default, if any.
pub fn get_default_backend() -> anyhow::Result<Option<String>> {
    let path = credentials_path()?;
    Ok(read_credentials(&path)?.default_backend)
}

fn credentials_path() -> anyhow::Result<PathBuf> {
    let data_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("dicto");
    fs::create_dir_all(&data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory: {e}"))?;
    Ok(data_dir.join(CREDENTIALS_FILE))
}

fn read_credentials(path: &Path) -> anyhow::Result<Credentials> {
    if !path.exists() {
        return Ok(Credentials::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn write_credentials(path: &Path, credentials: &Credentials) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(credentials)?;
    fs::write(path, content)?;
    restrict_permissions(path)?;
    Ok(())
}

/// Credentials are readable by the owner only.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CREDENTIALS_FILE);

        let mut credentials = Credentials::default();
        credentials.keys.insert("relay".to_string(), "rk-123".to_string());
        credentials.default_backend = Some("relay".to_string());
        write_credentials(&path, &credentials).unwrap();

        let loaded = read_credentials(&path).unwrap();
        assert_eq!(loaded.keys.get("relay").map(String::as_str), Some("rk-123"));
        assert_eq!(loaded.default_backend.as_deref(), Some("relay"));
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = read_credentials(&dir.path().join("nope.toml")).unwrap();
        assert!(loaded.keys.is_empty());
        assert!(loaded.default_backend.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_credentials_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CREDENTIALS_FILE);
        write_credentials(&path, &Credentials::default()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
