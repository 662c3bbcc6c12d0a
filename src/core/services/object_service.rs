use zeroize::Zeroizing;

use crate::core::errors::Result;
use crate::core::models::identity::{Identity, Keyring};
use crate::core::models::object_attrs::{Generation, ObjectAttrs, newest_first};
use crate::core::models::object_metadata::ObjectMetadata;
use crate::core::models::payload::SignatureStatus;
use crate::core::services::metadata_service::MetadataService;
use crate::core::traits::blob_store::BlobStore;
use crate::core::traits::cipher::CipherBackend;
use crate::core::traits::passphrase::PassphrasePrompt;

/// Plaintext and parameters of one write.
pub struct PutRequest<'r> {
    pub key: &'r str,
    pub plaintext: &'r [u8],
    pub recipient: &'r Identity,
    pub signer: Option<&'r Identity>,
    /// Extension of the source file, leading dot included.
    pub extension: Option<&'r str>,
    pub armored: bool,
}

/// A decrypted object whose signature, if any, checked out.
pub struct RetrievedObject {
    pub plaintext: Zeroizing<Vec<u8>>,
    pub signature: SignatureStatus,
}

impl std::fmt::Debug for RetrievedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievedObject")
            .field("plaintext_len", &self.plaintext.len())
            .field("signature", &self.signature)
            .finish()
    }
}

/// Attributes of an object with its decoded record, when it has a usable one.
#[derive(Debug, Clone)]
pub struct ObjectDescription {
    pub attrs: ObjectAttrs,
    pub metadata: Option<ObjectMetadata>,
}

/// Composes the cipher, the blob store and the metadata record into the
/// object-level operations.
///
/// Only `put_object` and `get_object` take a passphrase prompt.
pub struct ObjectService<'a> {
    pub cipher: &'a dyn CipherBackend,
    pub store: &'a dyn BlobStore,
}

impl<'a> ObjectService<'a> {
    fn metadata(&self) -> MetadataService<'a> {
        MetadataService::new(self.store)
    }

    /// Encrypt, upload, then attach the metadata record.
    pub fn put_object(
        &self,
        bucket: &str,
        request: &PutRequest<'_>,
        prompt: &dyn PassphrasePrompt,
    ) -> Result<ObjectAttrs> {
        let ciphertext = self.cipher.encrypt(
            request.recipient,
            request.signer,
            request.plaintext,
            request.armored,
            prompt,
        )?;

        let mut attrs = self.store.put(bucket, request.key, &ciphertext)?;

        let metadata = MetadataService::build_metadata(
            request.recipient,
            request.signer,
            request.extension,
            request.armored,
        );
        if let Err(e) = self.metadata().write_metadata(bucket, request.key, &metadata) {
            tracing::warn!(bucket, key = request.key, generation = %attrs.generation, "object stored without metadata record");
            return Err(e);
        }

        attrs.metadata = metadata.to_record();
        tracing::info!(bucket, key = request.key, generation = %attrs.generation, bytes = ciphertext.len(), "put object");
        Ok(attrs)
    }

    /// Download the latest generation, or `version`, and decrypt it.
    ///
    /// The encoding is detected from the payload itself. A bad signature
    /// fails the whole read.
    pub fn get_object(
        &self,
        bucket: &str,
        key: &str,
        version: Option<Generation>,
        keyring: &Keyring,
        prompt: &dyn PassphrasePrompt,
    ) -> Result<RetrievedObject> {
        let payload = self.store.get(bucket, key, version)?;
        tracing::debug!(cipher = self.cipher.name(), bytes = payload.len(), "decrypting payload");
        let decrypted = self.cipher.decrypt(keyring, &payload, prompt)?;
        let signature = decrypted.signature.clone();
        let plaintext = decrypted.into_verified()?;

        tracing::info!(bucket, key, version = ?version.map(|g| g.0), bytes = plaintext.len(), "get object");
        Ok(RetrievedObject {
            plaintext,
            signature,
        })
    }

    /// Copy bytes and record of `source` onto `destination`, overwriting it.
    ///
    /// A source without a complete record is refused before anything is written.
    pub fn copy_object(&self, bucket: &str, source: &str, destination: &str) -> Result<ObjectAttrs> {
        let metadata = self.metadata();
        metadata.source_record(bucket, source)?;

        let mut attrs = self.store.copy(bucket, source, destination)?;
        metadata.copy_metadata(bucket, source, destination)?;

        attrs.metadata = self.store.stat(bucket, destination)?.metadata;
        tracing::info!(bucket, source, destination, generation = %attrs.generation, "copied object");
        Ok(attrs)
    }

    /// Copy, then remove the source.
    pub fn move_object(&self, bucket: &str, source: &str, destination: &str) -> Result<ObjectAttrs> {
        let attrs = self.copy_object(bucket, source, destination)?;
        self.store.delete(bucket, source)?;
        tracing::info!(bucket, source, destination, "moved object");
        Ok(attrs)
    }

    pub fn remove_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.store.delete(bucket, key)?;
        tracing::info!(bucket, key, "removed object");
        Ok(())
    }

    pub fn describe_object(&self, bucket: &str, key: &str) -> Result<ObjectDescription> {
        let attrs = self.store.stat(bucket, key)?;
        let metadata = match ObjectMetadata::from_record(key, &attrs.metadata) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::debug!(bucket, key, error = %e, "no usable metadata record");
                None
            }
        };
        Ok(ObjectDescription { attrs, metadata })
    }

    /// Listing in presentation order: by name, newest generation first.
    pub fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        include_versions: bool,
    ) -> Result<Vec<ObjectAttrs>> {
        let listing = self.store.list(bucket, prefix, include_versions)?;
        Ok(newest_first(listing))
    }
}
