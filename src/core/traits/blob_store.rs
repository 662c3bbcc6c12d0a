use crate::core::errors::Result;
use crate::core::models::object_attrs::{Generation, ObjectAttrs};
use crate::core::models::object_metadata::MetadataRecord;

/// Port for a bucket-scoped, versioned blob store.
///
/// Every call is a single bounded round trip. Nothing is retried here.
pub trait BlobStore: Send + Sync {
    /// Write `bytes` as a new generation of `key`.
    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<ObjectAttrs>;

    /// Read the latest generation, or `version` when given.
    fn get(&self, bucket: &str, key: &str, version: Option<Generation>) -> Result<Vec<u8>>;

    /// Attributes of the live generation.
    fn stat(&self, bucket: &str, key: &str) -> Result<ObjectAttrs>;

    /// Live objects under `prefix`, or every generation when
    /// `include_versions` is set. Generations come back oldest-first.
    fn list(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        include_versions: bool,
    ) -> Result<Vec<ObjectAttrs>>;

    /// Remove the live generation of `key`.
    fn delete(&self, bucket: &str, key: &str) -> Result<()>;

    /// Copy the live bytes of `source` to a new generation of `destination`,
    /// overwriting whatever `destination` held.
    fn copy(&self, bucket: &str, source: &str, destination: &str) -> Result<ObjectAttrs>;

    /// Replace the content type and side-channel metadata of the live generation.
    fn update_metadata(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        metadata: &MetadataRecord,
    ) -> Result<()>;

    /// Human-readable name of this backend.
    fn name(&self) -> &str;
}
