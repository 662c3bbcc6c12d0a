use zeroize::Zeroizing;

use crate::core::errors::{Result, TresorError};

/// First line of an ASCII-armored OpenPGP message.
pub const ARMOR_HEADER: &str = "-----BEGIN PGP MESSAGE-----";

/// How a stored payload is encoded, judged from its leading bytes alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    /// Text envelope framed by [`ARMOR_HEADER`].
    Armored,
    /// Raw OpenPGP packet stream.
    Binary,
    /// Neither: damaged armor or arbitrary bytes.
    Malformed,
}

impl PayloadEncoding {
    /// Classify `payload` without decoding it.
    ///
    /// Leading whitespace is skipped. Binary OpenPGP packets always start
    /// with a tag byte that has the high bit set, so anything else that is
    /// not a complete armor header is rejected instead of being fed to the
    /// binary parser.
    pub fn sniff(payload: &[u8]) -> Self {
        let start = payload
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(payload.len());
        let body = &payload[start..];

        if body.starts_with(ARMOR_HEADER.as_bytes()) {
            return Self::Armored;
        }
        // Whitespace before a binary stream is not something a writer produces.
        if start == 0 && body.first().is_some_and(|b| b & 0x80 != 0) {
            return Self::Binary;
        }
        Self::Malformed
    }

    pub fn is_armored(self) -> bool {
        matches!(self, Self::Armored)
    }
}

/// Outcome of checking the signatures in a decrypted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    /// The message carried no signature.
    Unsigned,
    /// Every signature checked out; `signer` is the primary key ID.
    Verified { signer: String },
    /// Signed by a key the keyring does not hold, so nothing could be checked.
    UnknownSigner { issuer: String },
    /// At least one signature could not be verified.
    Failed { reason: String },
}

/// Plaintext recovered from a payload, together with its signature outcome.
///
/// The plaintext is only handed out by [`DecryptedPayload::into_verified`],
/// which refuses it when a signature failed. It is wiped on drop.
pub struct DecryptedPayload {
    plaintext: Zeroizing<Vec<u8>>,
    pub encoding: PayloadEncoding,
    pub signature: SignatureStatus,
}

impl DecryptedPayload {
    pub fn new(
        plaintext: Zeroizing<Vec<u8>>,
        encoding: PayloadEncoding,
        signature: SignatureStatus,
    ) -> Self {
        Self {
            plaintext,
            encoding,
            signature,
        }
    }

    /// Plaintext regardless of the signature outcome.
    #[cfg(test)]
    pub fn unverified_plaintext(&self) -> &[u8] {
        &self.plaintext
    }

    /// Plaintext unless a signature was checked and found bad.
    pub fn into_verified(self) -> Result<Zeroizing<Vec<u8>>> {
        match self.signature {
            SignatureStatus::Failed { reason } => {
                Err(TresorError::SignatureVerificationFailed { reason })
            }
            SignatureStatus::Unsigned
            | SignatureStatus::UnknownSigner { .. }
            | SignatureStatus::Verified { .. } => Ok(self.plaintext),
        }
    }
}

impl std::fmt::Debug for DecryptedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptedPayload")
            .field("plaintext_len", &self.plaintext.len())
            .field("encoding", &self.encoding)
            .field("signature", &self.signature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_armored() {
        let payload = format!("{ARMOR_HEADER}\n\nwcBMA...\n-----END PGP MESSAGE-----\n");
        assert_eq!(PayloadEncoding::sniff(payload.as_bytes()), PayloadEncoding::Armored);
    }

    #[test]
    fn sniff_armored_after_blank_lines() {
        let payload = format!("\r\n\n{ARMOR_HEADER}\n");
        assert_eq!(PayloadEncoding::sniff(payload.as_bytes()), PayloadEncoding::Armored);
    }

    #[test]
    fn sniff_binary_packet_tag() {
        // New-format PKESK tag followed by arbitrary bytes.
        assert_eq!(PayloadEncoding::sniff(&[0xc1, 0x0c, 0x03]), PayloadEncoding::Binary);
        // Old-format tag.
        assert_eq!(PayloadEncoding::sniff(&[0x85, 0x01]), PayloadEncoding::Binary);
    }

    #[test]
    fn sniff_truncated_header_is_malformed() {
        let damaged = &ARMOR_HEADER[1..];
        assert_eq!(PayloadEncoding::sniff(damaged.as_bytes()), PayloadEncoding::Malformed);

        let misspelled = ARMOR_HEADER.replace("MESSAGE", "MESSAG");
        assert_eq!(PayloadEncoding::sniff(misspelled.as_bytes()), PayloadEncoding::Malformed);
    }

    #[test]
    fn sniff_plain_text_and_empty_are_malformed() {
        assert_eq!(PayloadEncoding::sniff(b"hello world"), PayloadEncoding::Malformed);
        assert_eq!(PayloadEncoding::sniff(b""), PayloadEncoding::Malformed);
        assert_eq!(PayloadEncoding::sniff(b"   "), PayloadEncoding::Malformed);
    }

    #[test]
    fn failed_signature_withholds_plaintext() {
        let payload = DecryptedPayload::new(
            Zeroizing::new(b"data".to_vec()),
            PayloadEncoding::Binary,
            SignatureStatus::Failed {
                reason: "bad signature".into(),
            },
        );
        assert_eq!(payload.unverified_plaintext(), b"data");
        assert!(matches!(
            payload.into_verified(),
            Err(TresorError::SignatureVerificationFailed { .. })
        ));
    }

    #[test]
    fn unknown_signer_still_yields_plaintext() {
        let payload = DecryptedPayload::new(
            Zeroizing::new(b"data".to_vec()),
            PayloadEncoding::Armored,
            SignatureStatus::UnknownSigner {
                issuer: "0123456789ABCDEF".into(),
            },
        );
        assert_eq!(payload.into_verified().unwrap().as_slice(), b"data");
    }

    #[test]
    fn debug_hides_plaintext() {
        let payload = DecryptedPayload::new(
            Zeroizing::new(b"hunter2".to_vec()),
            PayloadEncoding::Binary,
            SignatureStatus::Unsigned,
        );
        assert!(!format!("{payload:?}").contains("hunter2"));
    }
}
