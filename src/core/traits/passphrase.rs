use zeroize::Zeroizing;

use crate::core::errors::Result;

/// Port for obtaining the passphrase of a locked private key.
pub trait PassphrasePrompt: Send + Sync {
    /// Return the passphrase for the key with the given hex ID.
    fn passphrase(&self, key_id: &str) -> Result<Zeroizing<Vec<u8>>>;
}
