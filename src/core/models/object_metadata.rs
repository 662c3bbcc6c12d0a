use std::collections::BTreeMap;
use std::path::Path;

use crate::core::errors::{Result, TresorError};
use crate::core::models::identity::Identity;

/// Content type attached to every object tresor writes.
pub const CONTENT_TYPE: &str = "application/pgp-encrypted";

pub const SIGNING_KEY: &str = "Signing-Key";
pub const ENCRYPTION_KEY: &str = "Encryption-Key";
pub const FILE_EXTENSION: &str = "File-Extension";
pub const ASCII_ARMOR: &str = "ASCII-Armor";

/// Stored in place of an absent optional field so every key is present.
const ABSENT: &str = "null";

/// Raw side-channel metadata as the backing store keeps it.
pub type MetadataRecord = BTreeMap<String, String>;

/// Typed view of the metadata that travels with an encrypted object.
///
/// Absence is modelled with `Option` in memory and only becomes the
/// `"null"` sentinel in [`ObjectMetadata::to_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub signing_key: Option<String>,
    pub encryption_key: String,
    pub file_extension: Option<String>,
    pub ascii_armor: bool,
}

impl ObjectMetadata {
    /// Describe a payload encrypted for `recipient` and optionally signed by `signer`.
    pub fn describe(
        recipient: &Identity,
        signer: Option<&Identity>,
        extension: Option<&str>,
        armored: bool,
    ) -> Self {
        Self {
            signing_key: signer.map(Identity::key_id),
            encryption_key: recipient.key_id(),
            file_extension: extension
                .filter(|ext| !ext.is_empty())
                .map(str::to_string),
            ascii_armor: armored,
        }
    }

    /// Extension of a local file including the leading dot (`"notes.txt"` → `".txt"`).
    pub fn extension_of(path: &Path) -> Option<String> {
        path.extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
    }

    /// Encode for the storage boundary. All four fields are always present.
    pub fn to_record(&self) -> MetadataRecord {
        let mut record = MetadataRecord::new();
        record.insert(
            SIGNING_KEY.into(),
            self.signing_key.clone().unwrap_or_else(|| ABSENT.into()),
        );
        record.insert(ENCRYPTION_KEY.into(), self.encryption_key.clone());
        record.insert(
            FILE_EXTENSION.into(),
            self.file_extension.clone().unwrap_or_else(|| ABSENT.into()),
        );
        record.insert(ASCII_ARMOR.into(), self.ascii_armor.to_string());
        record
    }

    /// Decode a stored record for the object at `key`.
    ///
    /// `Encryption-Key` is required. Records written by older releases may
    /// lack `ASCII-Armor`; it then reads as `false`.
    pub fn from_record(key: &str, record: &MetadataRecord) -> Result<Self> {
        let encryption_key = present(record, ENCRYPTION_KEY).ok_or_else(|| {
            TresorError::MetadataInconsistency {
                key: key.to_string(),
                detail: format!("missing '{ENCRYPTION_KEY}'"),
            }
        })?;

        let ascii_armor = match record.get(ASCII_ARMOR).map(String::as_str) {
            None | Some("false") => false,
            Some("true") => true,
            Some(other) => {
                return Err(TresorError::MetadataInconsistency {
                    key: key.to_string(),
                    detail: format!("'{ASCII_ARMOR}' must be true or false, found '{other}'"),
                });
            }
        };

        Ok(Self {
            signing_key: present(record, SIGNING_KEY),
            encryption_key,
            file_extension: present(record, FILE_EXTENSION),
            ascii_armor,
        })
    }
}

fn present(record: &MetadataRecord, field: &str) -> Option<String> {
    record
        .get(field)
        .filter(|value| !value.is_empty() && value.as_str() != ABSENT)
        .cloned()
}
