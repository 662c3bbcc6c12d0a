use crate::core::errors::{Result, TresorError};
use crate::core::models::identity::Identity;
use crate::core::models::object_metadata::{CONTENT_TYPE, MetadataRecord, ObjectMetadata};
use crate::core::traits::blob_store::BlobStore;

/// Builds, reads and propagates the metadata record of stored objects.
pub struct MetadataService<'a> {
    pub store: &'a dyn BlobStore,
}

impl<'a> MetadataService<'a> {
    pub fn new(store: &'a dyn BlobStore) -> Self {
        Self { store }
    }

    /// Record for a payload encrypted to `recipient`, optionally signed by `signer`.
    pub fn build_metadata(
        recipient: &Identity,
        signer: Option<&Identity>,
        extension: Option<&str>,
        armored: bool,
    ) -> ObjectMetadata {
        ObjectMetadata::describe(recipient, signer, extension, armored)
    }

    /// Attach `metadata` and the fixed content type to the live generation of `key`.
    pub fn write_metadata(&self, bucket: &str, key: &str, metadata: &ObjectMetadata) -> Result<()> {
        self.write_record(bucket, key, &metadata.to_record())
    }

    /// Raw record of `key`, refused unless it decodes as a complete record.
    ///
    /// Only the shape is checked. Key IDs are kept as stored, whether or not
    /// the keys are held locally.
    pub fn source_record(&self, bucket: &str, key: &str) -> Result<MetadataRecord> {
        let attrs = self.store.stat(bucket, key)?;
        if attrs.metadata.is_empty() {
            return Err(TresorError::MetadataInconsistency {
                key: key.to_string(),
                detail: "object has no metadata record".into(),
            });
        }
        ObjectMetadata::from_record(key, &attrs.metadata)?;
        Ok(attrs.metadata)
    }

    pub fn write_record(&self, bucket: &str, key: &str, record: &MetadataRecord) -> Result<()> {
        self.store.update_metadata(bucket, key, CONTENT_TYPE, record)?;
        tracing::debug!(bucket, key, fields = record.len(), "wrote metadata record");
        Ok(())
    }

    /// Copy the record of `source` verbatim onto `destination`.
    pub fn copy_metadata(&self, bucket: &str, source: &str, destination: &str) -> Result<()> {
        let record = self.source_record(bucket, source)?;
        self.write_record(bucket, destination, &record)
    }
}
