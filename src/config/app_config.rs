use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapters::storage::gcs_store::DEFAULT_ENDPOINT;
use crate::core::errors::{Result, TresorError};
use crate::core::models::object_attrs::DeletePolicy;

/// Name of the per-user config file in the home directory.
pub const CONFIG_FILE_NAME: &str = ".tresor.toml";

/// Top-level tresor configuration, read from `~/.tresor.toml` or `--config`.
///
/// ```toml
/// [tresor]
/// bucket = "team-secrets"
/// keyring = "~/.tresor/keyring.asc"
/// identity = "alice@example.com"
///
/// [storage]
/// backend = "gcs"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub tresor: TresorSection,
    #[serde(default)]
    pub storage: StorageSection,
}

impl AppConfig {
    /// Load from `path`, or from `~/.tresor.toml` when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        if !config_path.exists() {
            return Err(TresorError::InvalidConfig {
                detail: format!(
                    "{} not found. Create it with a [tresor] section naming\n  \
                     the bucket, keyring and identity to use.",
                    config_path.display()
                ),
            });
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config = Self::parse(&content).map_err(|e| match e {
            TresorError::InvalidConfig { detail } => TresorError::InvalidConfig {
                detail: format!("{}: {detail}", config_path.display()),
            },
            other => other,
        })?;
        tracing::debug!(path = %config_path.display(), backend = ?config.storage.backend, "loaded config");
        Ok(config)
    }

    /// Parse and validate a config document.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| TresorError::InvalidConfig {
            detail: format!("failed to parse config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.tresor.bucket.trim().is_empty() {
            return Err(TresorError::InvalidConfig {
                detail: "'bucket' must not be empty".into(),
            });
        }
        if self.tresor.identity.is_empty() {
            return Err(TresorError::InvalidConfig {
                detail: "'identity' must not be empty".into(),
            });
        }
        if self.storage.backend == Backend::Local && self.storage.root.is_none() {
            return Err(TresorError::InvalidConfig {
                detail: "the local backend needs a 'root' directory in [storage]".into(),
            });
        }
        if self.storage.metadata_timeout_secs == 0 || self.storage.transfer_timeout_secs == 0 {
            return Err(TresorError::InvalidConfig {
                detail: "storage timeouts must be at least one second".into(),
            });
        }
        Ok(())
    }

    /// Key ring holding the recipient and signer identities.
    pub fn keyring_path(&self) -> PathBuf {
        expand_home(&self.tresor.keyring)
    }

    /// Key ring used to decrypt; falls back to the main key ring.
    pub fn private_key_path(&self) -> PathBuf {
        self.tresor
            .private_key
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| self.keyring_path())
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.storage.metadata_timeout_secs)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.storage.transfer_timeout_secs)
    }
}

/// `~/.tresor.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| TresorError::InvalidConfig {
        detail: "could not determine the home directory; pass --config".into(),
    })?;
    Ok(home.join(CONFIG_FILE_NAME))
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// The `[tresor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TresorSection {
    pub bucket: String,
    pub keyring: String,
    /// Substring of the user ID selecting recipient and signer.
    pub identity: String,
    pub private_key: Option<String>,
    #[serde(default)]
    pub armor: bool,
    #[serde(default = "default_sign")]
    pub sign: bool,
    #[serde(default)]
    pub input: InputMode,
}

fn default_sign() -> bool {
    true
}

/// Where `put` reads the plaintext from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// A file named with `--file`.
    #[default]
    File,
    /// Raw standard input. Passphrases then cannot be typed in.
    Stdin,
    /// Typed at the terminal, entered twice.
    Interactive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Gcs,
    Local,
}

/// The `[storage]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Directory of the local backend.
    pub root: Option<String>,
    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout_secs: u64,
    #[serde(default = "default_transfer_timeout")]
    pub transfer_timeout_secs: u64,
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

impl StorageSection {
    pub fn root_path(&self) -> Option<PathBuf> {
        self.root.as_deref().map(expand_home)
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            endpoint: default_endpoint(),
            root: None,
            metadata_timeout_secs: default_metadata_timeout(),
            transfer_timeout_secs: default_transfer_timeout(),
            delete_policy: DeletePolicy::default(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_metadata_timeout() -> u64 {
    10
}

fn default_transfer_timeout() -> u64 {
    300
}
