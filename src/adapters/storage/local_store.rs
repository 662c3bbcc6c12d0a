use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::core::errors::{Result, TresorError};
use crate::core::models::object_attrs::{DeletePolicy, Generation, ObjectAttrs};
use crate::core::models::object_metadata::MetadataRecord;
use crate::core::traits::blob_store::BlobStore;

/// Name of the file holding the live generation of an object.
const LIVE_POINTER: &str = "live";

/// Versioned blob store on the local filesystem.
///
/// Layout, one directory per object with the key hex-encoded so any
/// object name maps to a single path component:
///
/// ```text
/// <root>/<bucket>/<hex(key)>/live            current generation
/// <root>/<bucket>/<hex(key)>/<gen>.blob      stored bytes
/// <root>/<bucket>/<hex(key)>/<gen>.json      ObjectAttrs
/// ```
///
/// An object without a `live` pointer has been removed under the
/// retain policy; its generations stay readable by version.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    delete_policy: DeletePolicy,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, delete_policy: DeletePolicy) -> Self {
        Self {
            root: root.into(),
            delete_policy,
        }
    }

    fn object_dir(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(hex::encode(key))
    }

    fn live_generation(dir: &Path) -> Option<Generation> {
        fs::read_to_string(dir.join(LIVE_POINTER))
            .ok()
            .and_then(|s| s.parse().ok())
    }

    /// All generations stored for one object, oldest first.
    fn generations(dir: &Path) -> std::io::Result<Vec<Generation>> {
        let mut generations: Vec<Generation> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                let name = name.to_str()?;
                name.strip_suffix(".json")?.parse().ok()
            })
            .collect();
        generations.sort();
        Ok(generations)
    }

    fn read_attrs(dir: &Path, generation: Generation) -> std::io::Result<ObjectAttrs> {
        let json = fs::read_to_string(dir.join(format!("{generation}.json")))?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    fn write_attrs(dir: &Path, attrs: &ObjectAttrs) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(attrs)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(dir.join(format!("{}.json", attrs.generation)), json)
    }

    /// Point the object at `generation`. Rename keeps readers from
    /// seeing a half-written pointer.
    fn set_live(dir: &Path, generation: Generation) -> std::io::Result<()> {
        let staging = dir.join(format!("{LIVE_POINTER}.tmp"));
        fs::write(&staging, generation.to_string())?;
        fs::rename(staging, dir.join(LIVE_POINTER))
    }

    /// Next generation: the current time in microseconds, bumped past the
    /// newest existing generation when the clock has not moved on.
    fn next_generation(dir: &Path) -> Generation {
        let now = Utc::now().timestamp_micros();
        let last = Self::generations(dir)
            .ok()
            .and_then(|g| g.last().copied())
            .map(|g| g.0)
            .unwrap_or(i64::MIN);
        Generation(now.max(last.saturating_add(1)))
    }

    fn write_generation(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: Option<String>,
        metadata: MetadataRecord,
    ) -> std::io::Result<ObjectAttrs> {
        let dir = self.object_dir(bucket, key);
        fs::create_dir_all(&dir)?;

        let generation = Self::next_generation(&dir);
        fs::write(dir.join(format!("{generation}.blob")), bytes)?;

        let attrs = ObjectAttrs {
            name: key.to_string(),
            generation,
            size: bytes.len() as u64,
            updated: Utc::now(),
            content_type,
            md5: None,
            metadata,
            live: true,
        };
        Self::write_attrs(&dir, &attrs)?;
        Self::set_live(&dir, generation)?;
        Ok(attrs)
    }

    fn live_attrs(&self, bucket: &str, key: &str) -> Result<(PathBuf, ObjectAttrs)> {
        let dir = self.object_dir(bucket, key);
        let generation = Self::live_generation(&dir).ok_or_else(|| not_found(bucket, key))?;
        let attrs = Self::read_attrs(&dir, generation).map_err(transport("stat", key))?;
        Ok((dir, attrs))
    }
}

fn not_found(bucket: &str, key: &str) -> TresorError {
    TresorError::ObjectNotFound {
        bucket: bucket.to_string(),
        key: key.to_string(),
    }
}

fn transport<'a>(operation: &'a str, key: &'a str) -> impl FnOnce(std::io::Error) -> TresorError + 'a {
    move |e| TresorError::StorageTransport {
        operation: operation.to_string(),
        key: key.to_string(),
        reason: e.to_string(),
    }
}

impl BlobStore for LocalStore {
    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<ObjectAttrs> {
        let attrs = self
            .write_generation(bucket, key, bytes, None, MetadataRecord::new())
            .map_err(transport("put", key))?;
        tracing::debug!(bucket, key, generation = %attrs.generation, bytes = bytes.len(), "stored object");
        Ok(attrs)
    }

    fn get(&self, bucket: &str, key: &str, version: Option<Generation>) -> Result<Vec<u8>> {
        let dir = self.object_dir(bucket, key);
        let generation = match version {
            Some(generation) => generation,
            None => Self::live_generation(&dir).ok_or_else(|| not_found(bucket, key))?,
        };

        let path = dir.join(format!("{generation}.blob"));
        if !path.is_file() {
            return Err(not_found(bucket, key));
        }
        fs::read(path).map_err(transport("get", key))
    }

    fn stat(&self, bucket: &str, key: &str) -> Result<ObjectAttrs> {
        self.live_attrs(bucket, key).map(|(_, attrs)| attrs)
    }

    fn list(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        include_versions: bool,
    ) -> Result<Vec<ObjectAttrs>> {
        let bucket_dir = self.root.join(bucket);
        if !bucket_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut listing = Vec::new();
        let entries = fs::read_dir(&bucket_dir).map_err(transport("list", bucket))?;
        for entry in entries {
            let entry = entry.map_err(transport("list", bucket))?;
            let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(|encoded| hex::decode(encoded).ok())
                .and_then(|raw| String::from_utf8(raw).ok())
            else {
                continue;
            };
            if prefix.is_some_and(|p| !name.starts_with(p)) {
                continue;
            }

            let dir = entry.path();
            let live = Self::live_generation(&dir);
            let generations = if include_versions {
                Self::generations(&dir).map_err(transport("list", &name))?
            } else {
                live.into_iter().collect()
            };

            for generation in generations {
                let mut attrs =
                    Self::read_attrs(&dir, generation).map_err(transport("list", &name))?;
                attrs.live = live == Some(generation);
                listing.push(attrs);
            }
        }

        listing.sort_by(|a, b| a.name.cmp(&b.name).then(a.generation.cmp(&b.generation)));
        Ok(listing)
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let dir = self.object_dir(bucket, key);
        if Self::live_generation(&dir).is_none() {
            return Err(not_found(bucket, key));
        }

        match self.delete_policy {
            DeletePolicy::Retain => {
                fs::remove_file(dir.join(LIVE_POINTER)).map_err(transport("delete", key))?
            }
            DeletePolicy::Purge => fs::remove_dir_all(&dir).map_err(transport("delete", key))?,
        }
        tracing::debug!(bucket, key, policy = %self.delete_policy, "removed object");
        Ok(())
    }

    fn copy(&self, bucket: &str, source: &str, destination: &str) -> Result<ObjectAttrs> {
        let (dir, attrs) = self.live_attrs(bucket, source)?;
        let bytes = fs::read(dir.join(format!("{}.blob", attrs.generation)))
            .map_err(transport("copy", source))?;

        // Same as a server-side copy: bytes and metadata travel together.
        self.write_generation(bucket, destination, &bytes, attrs.content_type, attrs.metadata)
            .map_err(transport("copy", destination))
    }

    fn update_metadata(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        metadata: &MetadataRecord,
    ) -> Result<()> {
        let (dir, mut attrs) = self.live_attrs(bucket, key)?;
        attrs.content_type = Some(content_type.to_string());
        attrs.metadata = metadata.clone();
        attrs.updated = Utc::now();
        Self::write_attrs(&dir, &attrs).map_err(transport("update metadata", key))
    }

    fn name(&self) -> &str {
        "local"
    }
}
