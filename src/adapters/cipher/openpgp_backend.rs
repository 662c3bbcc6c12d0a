use std::io::{Read, Write};

use sequoia_openpgp as openpgp;

use openpgp::armor::{Kind as ArmorKind, Reader as ArmorReader, ReaderMode};
use openpgp::cert::prelude::*;
use openpgp::crypto::{KeyPair, Password, SessionKey};
use openpgp::packet::key::{SecretParts, UnspecifiedRole};
use openpgp::packet::{Key, PKESK, SKESK};
use openpgp::parse::Parse;
use openpgp::parse::stream::{
    DecryptionHelper, DecryptorBuilder, MessageLayer, MessageStructure, VerificationError,
    VerificationHelper,
};
use openpgp::policy::StandardPolicy;
use openpgp::serialize::stream::{Armorer, Encryptor, LiteralWriter, Message, Recipient, Signer};
use openpgp::types::SymmetricAlgorithm;
use openpgp::{Cert, KeyHandle, KeyID};
use zeroize::Zeroizing;

use crate::core::errors::{Result, TresorError};
use crate::core::models::identity::{Identity, Keyring};
use crate::core::models::payload::{DecryptedPayload, PayloadEncoding, SignatureStatus};
use crate::core::traits::cipher::CipherBackend;
use crate::core::traits::passphrase::PassphrasePrompt;

const POLICY: &StandardPolicy<'static> = &StandardPolicy::new();

/// OpenPGP backend built on sequoia-openpgp.
///
/// Writes the layer stack message → [armor] → encryption → [signature] →
/// literal data, and finalizes it as a whole so trailing packets and the
/// armor footer are always flushed before the buffer is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenPgpBackend;

impl OpenPgpBackend {
    pub fn new() -> Self {
        Self
    }

    /// Unlock the first valid signing key of `signer`.
    ///
    /// The unlocked copy lives only in the returned key pair.
    fn signing_keypair(signer: &Identity, prompt: &dyn PassphrasePrompt) -> Result<KeyPair> {
        let ka = signer
            .cert()
            .keys()
            .secret()
            .with_policy(POLICY, None)
            .supported()
            .alive()
            .revoked(false)
            .for_signing()
            .next()
            .ok_or_else(|| TresorError::SigningFailure {
                reason: format!("{signer} has no usable signing key with secret material"),
            })?;

        let mut key = ka.key().clone();
        if key.secret().is_encrypted() {
            let key_id = key.keyid().to_hex();
            let passphrase = prompt.passphrase(&key_id)?;
            key = key
                .decrypt_secret(&Password::from(passphrase.to_vec()))
                .map_err(|_| TresorError::SigningFailure {
                    reason: format!("wrong passphrase for signing key {key_id}"),
                })?;
        }

        key.into_keypair().map_err(|e| TresorError::SigningFailure {
            reason: format!("cannot use signing key: {e}"),
        })
    }

    fn recipients(recipient: &Identity) -> Result<Vec<Recipient<'_>>> {
        let recipients: Vec<Recipient<'_>> = recipient
            .cert()
            .keys()
            .with_policy(POLICY, None)
            .supported()
            .alive()
            .revoked(false)
            .for_transport_encryption()
            .for_storage_encryption()
            .map(Into::into)
            .collect();

        if recipients.is_empty() {
            return Err(TresorError::EncryptionFailure {
                reason: format!("{recipient} has no valid encryption key"),
            });
        }
        Ok(recipients)
    }
}

fn encryption_failure<E: std::fmt::Display>(stage: &'static str) -> impl FnOnce(E) -> TresorError {
    move |e| TresorError::EncryptionFailure {
        reason: format!("{stage}: {e}"),
    }
}

fn signing_failure<E: std::fmt::Display>(stage: &'static str) -> impl FnOnce(E) -> TresorError {
    move |e| TresorError::SigningFailure {
        reason: format!("{stage}: {e}"),
    }
}

/// Strip the ASCII armor envelope and return the binary packet stream.
fn dearmor(payload: &[u8]) -> Result<Vec<u8>> {
    let mut reader =
        ArmorReader::from_bytes(payload, ReaderMode::Tolerant(Some(ArmorKind::Message)));
    let mut binary = Vec::new();
    reader
        .read_to_end(&mut binary)
        .map_err(|e| TresorError::MalformedPayload {
            reason: format!("invalid ASCII armor: {e}"),
        })?;

    if binary.is_empty() {
        return Err(TresorError::MalformedPayload {
            reason: "ASCII armor envelope is empty".into(),
        });
    }
    Ok(binary)
}

impl CipherBackend for OpenPgpBackend {
    fn encrypt(
        &self,
        recipient: &Identity,
        signer: Option<&Identity>,
        plaintext: &[u8],
        armored: bool,
        prompt: &dyn PassphrasePrompt,
    ) -> Result<Vec<u8>> {
        let recipients = Self::recipients(recipient)?;
        let keypair = signer
            .map(|signer| Self::signing_keypair(signer, prompt))
            .transpose()?;

        let mut sink = Vec::new();
        {
            let mut message = Message::new(&mut sink);
            if armored {
                message = Armorer::new(message)
                    .kind(ArmorKind::Message)
                    .build()
                    .map_err(encryption_failure("armor writer"))?;
            }

            let mut message = Encryptor::for_recipients(message, recipients)
                .build()
                .map_err(encryption_failure("encryption writer"))?;

            if let Some(keypair) = keypair {
                message = Signer::new(message, keypair)
                    .map_err(signing_failure("signature writer"))?
                    .build()
                    .map_err(signing_failure("signature writer"))?;
            }

            let mut message = LiteralWriter::new(message)
                .build()
                .map_err(encryption_failure("literal writer"))?;
            message
                .write_all(plaintext)
                .map_err(encryption_failure("write stream"))?;
            message
                .finalize()
                .map_err(encryption_failure("close stream"))?;
        }

        tracing::debug!(
            recipient = %recipient.key_id(),
            signer = signer.map(Identity::key_id).as_deref().unwrap_or("none"),
            armored,
            bytes = sink.len(),
            "payload encrypted"
        );
        Ok(sink)
    }

    fn decrypt(
        &self,
        keyring: &Keyring,
        payload: &[u8],
        prompt: &dyn PassphrasePrompt,
    ) -> Result<DecryptedPayload> {
        let encoding = PayloadEncoding::sniff(payload);
        let dearmored;
        let binary: &[u8] = match encoding {
            PayloadEncoding::Armored => {
                dearmored = dearmor(payload)?;
                &dearmored
            }
            PayloadEncoding::Binary => payload,
            PayloadEncoding::Malformed => {
                return Err(TresorError::MalformedPayload {
                    reason: "neither an ASCII-armored PGP message nor a binary packet stream"
                        .into(),
                });
            }
        };

        let helper = ReadHelper::new(keyring, prompt);
        let mut decryptor = DecryptorBuilder::from_bytes(binary)
            .map_err(|e| TresorError::DecryptionFailure {
                reason: e.to_string(),
            })?
            .with_policy(POLICY, None, helper)
            .map_err(|e| match e.downcast::<TresorError>() {
                Ok(domain) => domain,
                Err(other) => TresorError::DecryptionFailure {
                    reason: other.to_string(),
                },
            })?;

        let mut plaintext = Zeroizing::new(Vec::new());
        decryptor
            .read_to_end(&mut plaintext)
            .map_err(|e| TresorError::DecryptionFailure {
                reason: format!("failed to read message body: {e}"),
            })?;

        // Signatures are only final once the body has been read completely.
        let signature = decryptor.into_helper().signature_status();
        tracing::debug!(armored = encoding.is_armored(), ?signature, bytes = plaintext.len(), "payload decrypted");

        Ok(DecryptedPayload::new(plaintext, encoding, signature))
    }

    fn name(&self) -> &str {
        "openpgp"
    }
}

/// A secret key that may open one of the message's session keys.
struct Candidate<'p, 'k> {
    pkesk: &'p PKESK,
    key: Key<SecretParts, UnspecifiedRole>,
    cert: &'k Cert,
}

impl Candidate<'_, '_> {
    fn open(
        &self,
        key: Key<SecretParts, UnspecifiedRole>,
        sym_algo: Option<SymmetricAlgorithm>,
        decrypt: &mut dyn FnMut(Option<SymmetricAlgorithm>, &SessionKey) -> bool,
    ) -> openpgp::Result<Option<Cert>> {
        let mut keypair = key.into_keypair()?;
        if let Some((algo, session_key)) = self.pkesk.decrypt(&mut keypair, sym_algo)
            && decrypt(algo, &session_key)
        {
            return Ok(Some(self.cert.clone()));
        }
        Ok(None)
    }
}

/// Stream helper handing keys to the decryptor and collecting signature results.
struct ReadHelper<'a> {
    keyring: &'a Keyring,
    prompt: &'a dyn PassphrasePrompt,
    signers: Vec<String>,
    unknown_issuers: Vec<String>,
    failures: Vec<String>,
}

impl<'a> ReadHelper<'a> {
    fn new(keyring: &'a Keyring, prompt: &'a dyn PassphrasePrompt) -> Self {
        Self {
            keyring,
            prompt,
            signers: Vec::new(),
            unknown_issuers: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn candidates<'p>(&self, pkesks: &'p [PKESK]) -> Vec<Candidate<'p, 'a>> {
        let keyring: &'a Keyring = self.keyring;
        let mut candidates = Vec::new();

        for pkesk in pkesks {
            let recipient = pkesk.recipient();
            for identity in keyring {
                let cert = identity.cert();
                let keys = cert
                    .keys()
                    .secret()
                    .with_policy(POLICY, None)
                    .supported()
                    .for_transport_encryption()
                    .for_storage_encryption();
                for ka in keys {
                    let key = ka.key();
                    // Anonymous recipients may be any of our keys.
                    let addressed = match &recipient {
                        Some(handle) => key.key_handle().aliases(handle),
                        None => true,
                    };
                    if addressed {
                        candidates.push(Candidate {
                            pkesk,
                            key: key.clone(),
                            cert,
                        });
                    }
                }
            }
        }
        candidates
    }

    fn signature_status(&self) -> SignatureStatus {
        if !self.failures.is_empty() {
            return SignatureStatus::Failed {
                reason: self.failures.join("; "),
            };
        }
        if let Some(signer) = self.signers.first() {
            return SignatureStatus::Verified {
                signer: signer.clone(),
            };
        }
        match self.unknown_issuers.first() {
            Some(issuer) => SignatureStatus::UnknownSigner {
                issuer: issuer.clone(),
            },
            None => SignatureStatus::Unsigned,
        }
    }
}

impl VerificationHelper for ReadHelper<'_> {
    fn get_certs(&mut self, _ids: &[KeyHandle]) -> openpgp::Result<Vec<Cert>> {
        Ok(self
            .keyring
            .iter()
            .map(|identity| identity.cert().clone())
            .collect())
    }

    fn check(&mut self, structure: MessageStructure) -> openpgp::Result<()> {
        // Results are recorded, never raised here, so the caller gets the
        // plaintext together with a definite verdict.
        for layer in structure.iter() {
            if let MessageLayer::SignatureGroup { results } = layer {
                for result in results {
                    match result {
                        Ok(good) => self.signers.push(good.ka.cert().keyid().to_hex()),
                        // No key to check against: not a verdict on the signature.
                        Err(VerificationError::MissingKey { sig, .. }) => {
                            let issuer = sig
                                .get_issuers()
                                .first()
                                .map(|handle| KeyID::from(handle.clone()).to_hex())
                                .unwrap_or_else(|| "unknown".into());
                            self.unknown_issuers.push(issuer);
                        }
                        Err(err) => self.failures.push(err.to_string()),
                    }
                }
            }
        }
        Ok(())
    }
}

impl DecryptionHelper for ReadHelper<'_> {
    fn decrypt(
        &mut self,
        pkesks: &[PKESK],
        skesks: &[SKESK],
        sym_algo: Option<SymmetricAlgorithm>,
        decrypt: &mut dyn FnMut(Option<SymmetricAlgorithm>, &SessionKey) -> bool,
    ) -> openpgp::Result<Option<Cert>> {
        let candidates = self.candidates(pkesks);
        if candidates.is_empty() {
            if !skesks.is_empty() {
                return Err(TresorError::AsymmetricKeyRequired.into());
            }
            return Err(TresorError::DecryptionFailure {
                reason: "no private key in the keyring matches a recipient of this object".into(),
            }
            .into());
        }

        let (locked, unlocked): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|candidate| candidate.key.secret().is_encrypted());

        for candidate in &unlocked {
            if let Some(cert) = candidate.open(candidate.key.clone(), sym_algo, decrypt)? {
                return Ok(Some(cert));
            }
        }

        match locked.as_slice() {
            [] => Ok(None),
            [candidate] => {
                let key_id = candidate.key.keyid().to_hex();
                let passphrase = self.prompt.passphrase(&key_id)?;
                let key = candidate
                    .key
                    .clone()
                    .decrypt_secret(&Password::from(passphrase.to_vec()))
                    .map_err(|_| TresorError::DecryptionFailure {
                        reason: format!("wrong passphrase for key {key_id}"),
                    })?;
                candidate.open(key, sym_algo, decrypt)
            }
            many => Err(TresorError::TooManyKeyCandidates { count: many.len() }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::prompt::deny_prompt::DenyPrompt;
    use crate::adapters::prompt::static_prompt::StaticPrompt;
    use crate::core::models::payload::ARMOR_HEADER;
    use crate::test_support::{locked_identity, public_only, unlocked_identity};

    const PLAINTEXT: &[u8] = b"DATABASE_URL=postgres://localhost/db\nAPI_KEY=secret123\n";

    fn no_prompt() -> DenyPrompt {
        DenyPrompt::new("tests never prompt")
    }

    fn signing_subkey_id(identity: &Identity) -> String {
        identity
            .cert()
            .keys()
            .with_policy(POLICY, None)
            .for_signing()
            .next()
            .unwrap()
            .key()
            .keyid()
            .to_hex()
    }

    fn encryption_subkey_id(identity: &Identity) -> String {
        identity
            .cert()
            .keys()
            .with_policy(POLICY, None)
            .for_transport_encryption()
            .next()
            .unwrap()
            .key()
            .keyid()
            .to_hex()
    }

    #[test]
    fn round_trip_all_combinations() {
        let backend = OpenPgpBackend::new();
        let recipient = unlocked_identity("Alice <a@x>");
        let signer = unlocked_identity("Bob <b@x>");
        let ring = Keyring::new(vec![recipient.clone(), public_only(&signer)]);

        for armored in [false, true] {
            for signer in [None, Some(&signer)] {
                let ciphertext = backend
                    .encrypt(&recipient, signer, PLAINTEXT, armored, &no_prompt())
                    .unwrap();
                let decrypted = backend.decrypt(&ring, &ciphertext, &no_prompt()).unwrap();

                assert_eq!(decrypted.encoding.is_armored(), armored);
                match signer {
                    Some(s) => assert_eq!(
                        decrypted.signature,
                        SignatureStatus::Verified { signer: s.key_id() }
                    ),
                    None => assert_eq!(decrypted.signature, SignatureStatus::Unsigned),
                }
                assert_eq!(decrypted.into_verified().unwrap().as_slice(), PLAINTEXT);
            }
        }
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let backend = OpenPgpBackend::new();
        let alice = unlocked_identity("Alice <a@x>");
        let ring = Keyring::new(vec![alice.clone()]);

        let ciphertext = backend
            .encrypt(&alice, Some(&alice), b"", false, &no_prompt())
            .unwrap();
        let plaintext = backend
            .decrypt(&ring, &ciphertext, &no_prompt())
            .unwrap()
            .into_verified()
            .unwrap();
        assert!(plaintext.is_empty());
    }

    #[test]
    fn armored_output_is_framed() {
        let backend = OpenPgpBackend::new();
        let alice = unlocked_identity("Alice <a@x>");

        let ciphertext = backend
            .encrypt(&alice, None, PLAINTEXT, true, &no_prompt())
            .unwrap();
        let text = String::from_utf8(ciphertext).unwrap();
        assert!(text.starts_with(ARMOR_HEADER));
        assert!(text.trim_end().ends_with("-----END PGP MESSAGE-----"));
    }

    #[test]
    fn binary_output_is_not_text() {
        let backend = OpenPgpBackend::new();
        let alice = unlocked_identity("Alice <a@x>");

        let ciphertext = backend
            .encrypt(&alice, None, PLAINTEXT, false, &no_prompt())
            .unwrap();
        assert_eq!(PayloadEncoding::sniff(&ciphertext), PayloadEncoding::Binary);
    }

    #[test]
    fn damaged_armor_header_is_rejected() {
        let backend = OpenPgpBackend::new();
        let alice = unlocked_identity("Alice <a@x>");
        let ring = Keyring::new(vec![alice.clone()]);

        let ciphertext = backend
            .encrypt(&alice, None, PLAINTEXT, true, &no_prompt())
            .unwrap();
        let damaged = &ciphertext[1..];

        let err = backend.decrypt(&ring, damaged, &no_prompt()).unwrap_err();
        assert!(matches!(err, TresorError::MalformedPayload { .. }));
    }

    #[test]
    fn damaged_armor_body_is_rejected() {
        let backend = OpenPgpBackend::new();
        let alice = unlocked_identity("Alice <a@x>");
        let ring = Keyring::new(vec![alice.clone()]);

        let payload = format!("{ARMOR_HEADER}\n\n!!!not base64!!!\n-----END PGP MESSAGE-----\n");
        assert!(backend.decrypt(&ring, payload.as_bytes(), &no_prompt()).is_err());
    }

    #[test]
    fn locked_signer_prompts_for_signing_key() {
        let backend = OpenPgpBackend::new();
        let recipient = unlocked_identity("Alice <a@x>");
        let signer = locked_identity("Bob <b@x>", "correct horse");
        let prompt = StaticPrompt::new("correct horse");

        let ciphertext = backend
            .encrypt(&recipient, Some(&signer), PLAINTEXT, false, &prompt)
            .unwrap();
        assert_eq!(prompt.requested(), vec![signing_subkey_id(&signer)]);

        let ring = Keyring::new(vec![recipient, public_only(&signer)]);
        let decrypted = backend.decrypt(&ring, &ciphertext, &no_prompt()).unwrap();
        assert_eq!(decrypted.into_verified().unwrap().as_slice(), PLAINTEXT);
    }

    #[test]
    fn wrong_signing_passphrase_is_signing_failure() {
        let backend = OpenPgpBackend::new();
        let recipient = unlocked_identity("Alice <a@x>");
        let signer = locked_identity("Bob <b@x>", "correct horse");

        let err = backend
            .encrypt(&recipient, Some(&signer), PLAINTEXT, false, &StaticPrompt::new("nope"))
            .unwrap_err();
        assert!(matches!(err, TresorError::SigningFailure { .. }));
    }

    #[test]
    fn signer_without_secret_key_is_signing_failure() {
        let backend = OpenPgpBackend::new();
        let recipient = unlocked_identity("Alice <a@x>");
        let signer = public_only(&unlocked_identity("Bob <b@x>"));

        let err = backend
            .encrypt(&recipient, Some(&signer), PLAINTEXT, false, &no_prompt())
            .unwrap_err();
        assert!(matches!(err, TresorError::SigningFailure { .. }));
    }

    #[test]
    fn locked_signer_without_prompt_is_config_error() {
        let backend = OpenPgpBackend::new();
        let recipient = unlocked_identity("Alice <a@x>");
        let signer = locked_identity("Bob <b@x>", "pw");

        let err = backend
            .encrypt(&recipient, Some(&signer), PLAINTEXT, false, &no_prompt())
            .unwrap_err();
        assert!(matches!(err, TresorError::InvalidConfig { .. }));
    }

    #[test]
    fn locked_recipient_prompts_once_with_key_id() {
        let backend = OpenPgpBackend::new();
        let alice = locked_identity("Alice <a@x>", "pw");
        let ciphertext = backend
            .encrypt(&public_only(&alice), None, PLAINTEXT, false, &no_prompt())
            .unwrap();

        let prompt = StaticPrompt::new("pw");
        let ring = Keyring::new(vec![alice.clone()]);
        let plaintext = backend
            .decrypt(&ring, &ciphertext, &prompt)
            .unwrap()
            .into_verified()
            .unwrap();

        assert_eq!(plaintext.as_slice(), PLAINTEXT);
        assert_eq!(prompt.requested(), vec![encryption_subkey_id(&alice)]);
    }

    #[test]
    fn unlocked_recipient_never_prompts() {
        let backend = OpenPgpBackend::new();
        let alice = unlocked_identity("Alice <a@x>");
        let ciphertext = backend
            .encrypt(&alice, None, PLAINTEXT, false, &no_prompt())
            .unwrap();

        let prompt = StaticPrompt::new("unused");
        backend
            .decrypt(&Keyring::new(vec![alice]), &ciphertext, &prompt)
            .unwrap();
        assert!(prompt.requested().is_empty());
    }

    #[test]
    fn wrong_decryption_passphrase_fails() {
        let backend = OpenPgpBackend::new();
        let alice = locked_identity("Alice <a@x>", "pw");
        let ciphertext = backend
            .encrypt(&alice, None, PLAINTEXT, false, &no_prompt())
            .unwrap();

        let err = backend
            .decrypt(&Keyring::new(vec![alice]), &ciphertext, &StaticPrompt::new("bad"))
            .unwrap_err();
        assert!(matches!(err, TresorError::DecryptionFailure { .. }));
    }

    #[test]
    fn foreign_recipient_fails_to_decrypt() {
        let backend = OpenPgpBackend::new();
        let alice = unlocked_identity("Alice <a@x>");
        let mallory = unlocked_identity("Mallory <m@x>");
        let ciphertext = backend
            .encrypt(&alice, None, PLAINTEXT, false, &no_prompt())
            .unwrap();

        let err = backend
            .decrypt(&Keyring::new(vec![mallory]), &ciphertext, &no_prompt())
            .unwrap_err();
        assert!(matches!(err, TresorError::DecryptionFailure { .. }));
    }

    #[test]
    fn ambiguous_locked_keys_are_refused() {
        let backend = OpenPgpBackend::new();
        let (cert, _) = CertBuilder::new()
            .add_userid("Multi <m@x>")
            .add_transport_encryption_subkey()
            .add_transport_encryption_subkey()
            .set_password(Some(Password::from("pw")))
            .generate()
            .unwrap();
        let multi = Identity::new(cert);

        let ciphertext = backend
            .encrypt(&public_only(&multi), None, PLAINTEXT, false, &no_prompt())
            .unwrap();
        let prompt = StaticPrompt::new("pw");
        let err = backend
            .decrypt(&Keyring::new(vec![multi]), &ciphertext, &prompt)
            .unwrap_err();

        assert!(matches!(err, TresorError::TooManyKeyCandidates { count: 2 }));
        assert!(prompt.requested().is_empty());
    }

    #[test]
    fn password_only_message_needs_asymmetric_key() {
        let backend = OpenPgpBackend::new();
        let alice = unlocked_identity("Alice <a@x>");

        let mut ciphertext = Vec::new();
        {
            let message = Message::new(&mut ciphertext);
            let message = Encryptor::with_passwords(message, Some("shared"))
                .build()
                .unwrap();
            let mut message = LiteralWriter::new(message).build().unwrap();
            message.write_all(PLAINTEXT).unwrap();
            message.finalize().unwrap();
        }

        let err = backend
            .decrypt(&Keyring::new(vec![alice]), &ciphertext, &no_prompt())
            .unwrap_err();
        assert!(matches!(err, TresorError::AsymmetricKeyRequired));
    }

    #[test]
    fn tampered_signature_is_reported_with_plaintext() {
        let backend = OpenPgpBackend::new();
        let recipient = unlocked_identity("Alice <a@x>");
        let signer = unlocked_identity("Bob <b@x>");

        // Signed literal data whose trailing signature packet gets one bit flipped.
        let mut signed = Vec::new();
        {
            let keypair = signer
                .cert()
                .keys()
                .unencrypted_secret()
                .with_policy(POLICY, None)
                .for_signing()
                .next()
                .unwrap()
                .key()
                .clone()
                .into_keypair()
                .unwrap();
            let message = Message::new(&mut signed);
            let message = Signer::new(message, keypair).unwrap().build().unwrap();
            let mut message = LiteralWriter::new(message).build().unwrap();
            message.write_all(PLAINTEXT).unwrap();
            message.finalize().unwrap();
        }
        let last = signed.len() - 1;
        signed[last] ^= 0x01;

        let mut ciphertext = Vec::new();
        {
            let message = Message::new(&mut ciphertext);
            let mut message = Encryptor::for_recipients(message, OpenPgpBackend::recipients(&recipient).unwrap())
                .build()
                .unwrap();
            message.write_all(&signed).unwrap();
            message.finalize().unwrap();
        }

        let ring = Keyring::new(vec![recipient, public_only(&signer)]);
        let decrypted = backend.decrypt(&ring, &ciphertext, &no_prompt()).unwrap();

        assert_eq!(decrypted.unverified_plaintext(), PLAINTEXT);
        assert!(matches!(decrypted.signature, SignatureStatus::Failed { .. }));
        assert!(matches!(
            decrypted.into_verified(),
            Err(TresorError::SignatureVerificationFailed { .. })
        ));
    }

    #[test]
    fn signature_from_unknown_key_is_reported_but_readable() {
        let backend = OpenPgpBackend::new();
        let recipient = unlocked_identity("Alice <a@x>");
        let stranger = unlocked_identity("Stranger <s@x>");

        let ciphertext = backend
            .encrypt(&recipient, Some(&stranger), PLAINTEXT, false, &no_prompt())
            .unwrap();
        let decrypted = backend
            .decrypt(&Keyring::new(vec![recipient]), &ciphertext, &no_prompt())
            .unwrap();

        match &decrypted.signature {
            SignatureStatus::UnknownSigner { issuer } => {
                assert_eq!(issuer, &signing_subkey_id(&stranger))
            }
            other => panic!("expected an unknown signer, got {other:?}"),
        }
        assert_eq!(decrypted.into_verified().unwrap().as_slice(), PLAINTEXT);
    }

    #[test]
    fn errors_do_not_leak_plaintext() {
        let backend = OpenPgpBackend::new();
        let alice = unlocked_identity("Alice <a@x>");
        let mallory = unlocked_identity("Mallory <m@x>");
        let ciphertext = backend
            .encrypt(&alice, None, PLAINTEXT, true, &no_prompt())
            .unwrap();

        let err = backend
            .decrypt(&Keyring::new(vec![mallory]), &ciphertext, &no_prompt())
            .unwrap_err();
        assert!(!err.to_string().contains("secret123"));
    }
}
