use std::path::PathBuf;

/// All domain errors for tresor.
///
/// Messages name the operation and object involved. They never carry
/// plaintext, passphrases or secret key material.
#[derive(Debug, thiserror::Error)]
pub enum TresorError {
    #[error(
        "Failed to load key from {path}: {reason}\n\n  \
         Check that the file exists and holds OpenPGP key material\n  \
         (ASCII-armored or binary)."
    )]
    KeyLoadFailure { path: PathBuf, reason: String },

    #[error(
        "No identity matching '{label}' in the keyring\n\n  \
         Matching is a case-sensitive substring search over user IDs.\n  \
         Check the 'identity' setting in your config."
    )]
    IdentityNotFound { label: String },

    #[error("Encryption failed: {reason}")]
    EncryptionFailure { reason: String },

    #[error("Signing failed: {reason}")]
    SigningFailure { reason: String },

    #[error("Decryption failed: {reason}")]
    DecryptionFailure { reason: String },

    #[error("Payload is not a valid OpenPGP message: {reason}")]
    MalformedPayload { reason: String },

    #[error(
        "Signature verification failed: {reason}\n\n  \
         The object was decrypted but its signature is not valid.\n  \
         The content was discarded."
    )]
    SignatureVerificationFailed { reason: String },

    #[error(
        "Found {count} locked private keys that could decrypt this object\n\n  \
         Refusing to guess which one to unlock. Use a keyring that\n  \
         holds a single matching private key."
    )]
    TooManyKeyCandidates { count: usize },

    #[error(
        "Object is encrypted with a password only\n\n  \
         tresor only decrypts messages addressed to a private key."
    )]
    AsymmetricKeyRequired,

    #[error("Passphrase unavailable: {reason}")]
    PassphraseUnavailable { reason: String },

    #[error("Storage {operation} failed for '{key}': {reason}")]
    StorageTransport {
        operation: String,
        key: String,
        reason: String,
    },

    #[error(
        "Object '{key}' not found in bucket '{bucket}'\n\n  \
         Run 'tresor ls' to see available objects."
    )]
    ObjectNotFound { bucket: String, key: String },

    #[error("Metadata for '{key}' is inconsistent: {detail}")]
    MetadataInconsistency { key: String, detail: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TresorError>;
