use crate::core::errors::Result;
use crate::core::models::identity::{Identity, Keyring};
use crate::core::models::payload::DecryptedPayload;
use crate::core::traits::passphrase::PassphrasePrompt;

/// Port for the encryption/signing primitive.
///
/// Implementations live in `adapters::cipher`. Passphrases are requested
/// through `prompt` only when a locked private key is actually needed.
pub trait CipherBackend: Send + Sync {
    /// Encrypt `plaintext` for exactly one recipient, signing it when a
    /// signer is given. `armored` selects the text-safe envelope.
    fn encrypt(
        &self,
        recipient: &Identity,
        signer: Option<&Identity>,
        plaintext: &[u8],
        armored: bool,
        prompt: &dyn PassphrasePrompt,
    ) -> Result<Vec<u8>>;

    /// Decrypt `payload` with the private keys in `keyring` and report the
    /// signature outcome alongside the plaintext.
    fn decrypt(
        &self,
        keyring: &Keyring,
        payload: &[u8],
        prompt: &dyn PassphrasePrompt,
    ) -> Result<DecryptedPayload>;

    /// Human-readable name of this backend.
    fn name(&self) -> &str;
}
