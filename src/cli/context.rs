use std::path::Path;

use crate::adapters::cipher::openpgp_backend::OpenPgpBackend;
use crate::adapters::key_stores::file_key_store::FileKeyStore;
use crate::adapters::prompt::deny_prompt::DenyPrompt;
use crate::adapters::prompt::static_prompt::StaticPrompt;
use crate::adapters::prompt::terminal_prompt::TerminalPrompt;
use crate::adapters::storage::gcs_store::{ACCESS_TOKEN_ENV, GcsStore};
use crate::adapters::storage::local_store::LocalStore;
use crate::config::app_config::{AppConfig, Backend, InputMode};
use crate::core::errors::{Result, TresorError};
use crate::core::services::key_service::KeyService;
use crate::core::services::object_service::ObjectService;
use crate::core::traits::blob_store::BlobStore;
use crate::core::traits::passphrase::PassphrasePrompt;

/// Everything a command needs, wired from the loaded config.
pub struct Context {
    pub config: AppConfig,
    pub keys: KeyService<FileKeyStore>,
    cipher: OpenPgpBackend,
    store: Box<dyn BlobStore>,
}

impl Context {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = AppConfig::load(config_path)?;
        let store = build_store(&config)?;
        tracing::debug!(backend = store.name(), bucket = %config.tresor.bucket, "storage ready");

        Ok(Self {
            config,
            keys: KeyService {
                store: FileKeyStore::new(),
            },
            cipher: OpenPgpBackend::new(),
            store,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.config.tresor.bucket
    }

    pub fn objects(&self) -> ObjectService<'_> {
        ObjectService {
            cipher: &self.cipher,
            store: self.store.as_ref(),
        }
    }
}

fn build_store(config: &AppConfig) -> Result<Box<dyn BlobStore>> {
    let storage = &config.storage;
    match storage.backend {
        Backend::Gcs => Ok(Box::new(
            GcsStore::new(
                storage.endpoint.clone(),
                config.metadata_timeout(),
                config.transfer_timeout(),
                storage.delete_policy,
            )
            .with_access_token(std::env::var(ACCESS_TOKEN_ENV).ok()),
        )),
        Backend::Local => {
            let root = storage.root_path().ok_or_else(|| TresorError::InvalidConfig {
                detail: "the local backend needs a 'root' directory in [storage]".into(),
            })?;
            Ok(Box::new(LocalStore::new(root, storage.delete_policy)))
        }
    }
}

/// Pick how passphrases are obtained for a run reading its payload via `input`.
///
/// `TRESOR_PASSPHRASE` wins. A payload on stdin leaves no channel to type a
/// passphrase on, so locked keys are refused instead of blocking.
pub fn passphrase_prompt(input: InputMode) -> Box<dyn PassphrasePrompt> {
    if let Some(prompt) = StaticPrompt::from_env() {
        return Box::new(prompt);
    }
    match input {
        InputMode::Stdin => Box::new(DenyPrompt::new("the payload is read from standard input")),
        InputMode::File | InputMode::Interactive => Box::new(TerminalPrompt::new()),
    }
}
