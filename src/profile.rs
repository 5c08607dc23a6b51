// Persisted CLI profile
// Login, client credentials and the current token, one file per mode

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::{Credentials, GrantType, LoginCredentials, Token};
use crate::client::Mode;

const CONFIG_DIR: &str = ".bitwire";

/// Contents of `~/.bitwire/<mode>.json`
///
/// `password` holds the plain password in memory; it is base64-encoded only
/// by [`Profile::save`] and decoded by [`Profile::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_type: Option<GrantType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
}

impl Profile {
    /// Login for the password grant, if a username and password are stored
    pub fn login_credentials(&self) -> Option<LoginCredentials> {
        if self.username.is_empty() || self.password.is_empty() {
            return None;
        }
        Some(LoginCredentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }

    /// Stored token and refresh credentials, if a session was persisted
    pub fn session(&self) -> Option<(Token, Credentials)> {
        let token = self.token.clone()?;
        let grant_type = self.grant_type?;
        Some((
            token,
            Credentials {
                client_id: self.client_id.clone(),
                client_secret: self.client_secret.clone(),
                grant_type,
            },
        ))
    }

    /// Record a new session (after login or refresh)
    pub fn update_session(&mut self, token: Token, credentials: &Credentials) {
        self.client_id = credentials.client_id.clone();
        self.client_secret = credentials.client_secret.clone();
        self.grant_type = Some(credentials.grant_type);
        self.token = Some(token);
    }

    /// Replace only the token, keeping stored credentials
    pub fn update_token(&mut self, token: Token) {
        self.token = Some(token);
    }

    /// Read a profile, decoding the obfuscated password
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut profile: Profile = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let password = STANDARD
            .decode(profile.password.as_bytes())
            .context("Failed to decode stored password")?;
        profile.password = String::from_utf8(password).context("Stored password is not UTF-8")?;

        tracing::debug!("Loaded profile from {}", path.display());
        Ok(profile)
    }

    /// Write a profile, creating the config directory when needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let mut stored = self.clone();
        stored.password = STANDARD.encode(self.password.as_bytes());
        let json = serde_json::to_string_pretty(&stored).context("Failed to serialize config")?;

        write_private(path, json.as_bytes())
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!("Saved profile to {}", path.display());
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

/// Default config directory (`~/.bitwire`)
pub fn default_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(CONFIG_DIR))
}

/// Profile file for `mode` inside `dir`
pub fn profile_path(dir: &Path, mode: Mode) -> PathBuf {
    dir.join(format!("{}.json", mode.as_str()))
}
