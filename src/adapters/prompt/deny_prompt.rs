use zeroize::Zeroizing;

use crate::core::errors::{Result, TresorError};
use crate::core::traits::passphrase::PassphrasePrompt;

/// Prompt for headless runs: any request for a passphrase is refused.
#[derive(Debug, Clone)]
pub struct DenyPrompt {
    reason: String,
}

impl DenyPrompt {
    /// `reason` completes "a passphrase is required but ...".
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl PassphrasePrompt for DenyPrompt {
    fn passphrase(&self, key_id: &str) -> Result<Zeroizing<Vec<u8>>> {
        Err(TresorError::InvalidConfig {
            detail: format!(
                "key {key_id} is locked and needs a passphrase, but {}.\n\n  \
                 Set TRESOR_PASSPHRASE, read the payload from a file,\n  \
                 or use a key without a passphrase.",
                self.reason
            ),
        })
    }
}
