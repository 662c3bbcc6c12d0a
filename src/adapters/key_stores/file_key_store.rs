use std::path::Path;

use sequoia_openpgp::cert::CertParser;
use sequoia_openpgp::parse::Parse;

use crate::core::errors::{Result, TresorError};
use crate::core::models::identity::{Identity, Keyring};
use crate::core::traits::key_store::KeyStore;

/// Key store reading OpenPGP key files from local disk.
///
/// Files may be ASCII-armored or binary and may hold several
/// certificates back to back, as `gpg --export-secret-keys` writes them.
///
/// Example keyring export:
/// ```text
/// gpg --armor --export-secret-keys alice@example.com > ~/.tresor/keyring.asc
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FileKeyStore;

impl FileKeyStore {
    pub fn new() -> Self {
        Self
    }

    fn read_keyring(path: &Path) -> Result<Keyring> {
        let failure = |reason: String| TresorError::KeyLoadFailure {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = std::fs::read(path).map_err(|e| failure(e.to_string()))?;
        let parser = CertParser::from_bytes(&bytes).map_err(|e| failure(e.to_string()))?;

        let mut identities = Vec::new();
        for cert in parser {
            let cert = cert.map_err(|e| failure(format!("invalid certificate: {e}")))?;
            identities.push(Identity::new(cert));
        }

        let keyring = Keyring::new(identities);
        if keyring.is_empty() {
            return Err(failure("file contains no keys".into()));
        }

        tracing::debug!(path = %path.display(), count = keyring.len(), "loaded key file");
        Ok(keyring)
    }
}

impl KeyStore for FileKeyStore {
    fn load_key(&self, path: &Path) -> Result<Identity> {
        let keyring = Self::read_keyring(path)?;
        keyring
            .iter()
            .next()
            .cloned()
            .ok_or_else(|| TresorError::KeyLoadFailure {
                path: path.to_path_buf(),
                reason: "file contains no keys".into(),
            })
    }

    fn load_keyring(&self, path: &Path) -> Result<Keyring> {
        Self::read_keyring(path)
    }
}
