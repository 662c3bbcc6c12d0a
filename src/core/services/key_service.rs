use std::path::Path;

use crate::core::errors::Result;
use crate::core::models::identity::{Identity, Keyring};
use crate::core::traits::key_store::KeyStore;

/// Loads key material through a `KeyStore` backend.
pub struct KeyService<K: KeyStore> {
    pub store: K,
}

impl<K: KeyStore> KeyService<K> {
    /// Load the first identity of a key file.
    pub fn load_key(&self, path: &Path) -> Result<Identity> {
        self.store.load_key(path)
    }

    /// Load every identity of a key ring file.
    pub fn load_keyring(&self, path: &Path) -> Result<Keyring> {
        let keyring = self.store.load_keyring(path)?;
        tracing::debug!(path = %path.display(), identities = keyring.len(), "loaded keyring");
        Ok(keyring)
    }

    /// Load the ring at `path` and pick the identity whose user ID contains `label`.
    pub fn select_identity(&self, path: &Path, label: &str) -> Result<Identity> {
        let keyring = self.store.load_keyring(path)?;
        let identity = keyring.select(label)?.clone();
        tracing::debug!(label, key_id = %identity.key_id(), "selected identity");
        Ok(identity)
    }
}
