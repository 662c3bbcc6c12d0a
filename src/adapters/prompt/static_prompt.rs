use std::sync::Mutex;

use zeroize::Zeroizing;

use crate::core::errors::Result;
use crate::core::traits::passphrase::PassphrasePrompt;

/// Environment variable read by [`StaticPrompt::from_env`].
pub const PASSPHRASE_ENV: &str = "TRESOR_PASSPHRASE";

/// Answers every passphrase request with one preset secret.
///
/// Used for headless runs and tests. The key IDs it was asked for are kept.
pub struct StaticPrompt {
    secret: Zeroizing<Vec<u8>>,
    requested: Mutex<Vec<String>>,
}

impl StaticPrompt {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Build from [`PASSPHRASE_ENV`] when it is set and non-empty.
    pub fn from_env() -> Option<Self> {
        std::env::var(PASSPHRASE_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .map(Self::new)
    }

    /// Key IDs passed to [`PassphrasePrompt::passphrase`], in call order.
    #[cfg(test)]
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for StaticPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticPrompt")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl PassphrasePrompt for StaticPrompt {
    fn passphrase(&self, key_id: &str) -> Result<Zeroizing<Vec<u8>>> {
        if let Ok(mut ids) = self.requested.lock() {
            ids.push(key_id.to_string());
        }
        Ok(self.secret.clone())
    }
}
