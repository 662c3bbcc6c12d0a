use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::TresorError;
use crate::core::models::object_metadata::MetadataRecord;

/// Opaque, monotonically increasing version token of one stored revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(pub i64);

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Generation {
    type Err = TresorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Generation)
            .map_err(|_| TresorError::InvalidConfig {
                detail: format!("'{s}' is not a valid object generation"),
            })
    }
}

/// Attributes of one generation of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectAttrs {
    pub name: String,
    pub generation: Generation,
    pub size: u64,
    pub updated: DateTime<Utc>,
    pub content_type: Option<String>,
    /// Hex-encoded MD5 digest of the stored bytes, when the backend reports one.
    pub md5: Option<String>,
    #[serde(default)]
    pub metadata: MetadataRecord,
    /// `false` for noncurrent generations returned by a versioned listing.
    #[serde(default = "default_live")]
    pub live: bool,
}

fn default_live() -> bool {
    true
}

/// What removing an object does to its older generations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Drop only the live generation; older generations stay readable by version.
    ///
    /// On GCS this holds only when object versioning is enabled on the bucket.
    /// Without it the object is gone for good, as with [`DeletePolicy::Purge`].
    #[default]
    Retain,
    /// Delete every generation of the object.
    Purge,
}

impl std::fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retain => write!(f, "retain"),
            Self::Purge => write!(f, "purge"),
        }
    }
}

/// Reorder a listing for display: grouped by name, newest generation first.
///
/// Backends return generations oldest-first.
pub fn newest_first(mut attrs: Vec<ObjectAttrs>) -> Vec<ObjectAttrs> {
    attrs.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| b.generation.cmp(&a.generation))
    });
    attrs
}
