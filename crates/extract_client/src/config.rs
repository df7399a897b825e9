//! Service configuration storage.
//!
//! Resolution order: `DECLARA_EXTRACT_URL` / `DECLARA_EXTRACT_TOKEN`
//! environment variables first (CI/headless), then
//! ~/.config/declara/extract.json (0600 on Unix).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const ENV_ENDPOINT: &str = "DECLARA_EXTRACT_URL";
pub const ENV_TOKEN: &str = "DECLARA_EXTRACT_TOKEN";

/// Extraction-service connection settings stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Full endpoint URL the document payload is POSTed to
    pub endpoint: String,
    /// Bearer token, if the deployment requires one
    #[serde(default)]
    pub token: Option<String>,
}

impl ServiceConfig {
    pub fn new(endpoint: String, token: Option<String>) -> Self {
        Self { endpoint, token }
    }
}

/// Returns the path to the service config file.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("declara/extract.json"))
}

/// Resolve the effective configuration: environment overrides the file.
/// Returns None if neither source provides an endpoint.
pub fn load_config() -> Option<ServiceConfig> {
    if let Ok(endpoint) = std::env::var(ENV_ENDPOINT) {
        if !endpoint.trim().is_empty() {
            let token = std::env::var(ENV_TOKEN).ok().filter(|t| !t.trim().is_empty());
            return Some(ServiceConfig::new(endpoint.trim().to_string(), token));
        }
    }
    load_config_file()
}

/// Load the saved config file only, ignoring the environment.
pub fn load_config_file() -> Option<ServiceConfig> {
    let path = config_file_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save the service config. Creates the parent directory if needed and
/// sets 0600 permissions on Unix (the token is a credential).
pub fn save_config(config: &ServiceConfig) -> Result<(), String> {
    let path = config_file_path().ok_or("could not determine config directory")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create config directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(config)
        .map_err(|e| format!("failed to serialize config: {}", e))?;

    std::fs::write(&path, &contents).map_err(|e| format!("failed to write config: {}", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, permissions)
            .map_err(|e| format!("failed to set file permissions: {}", e))?;
    }

    Ok(())
}
