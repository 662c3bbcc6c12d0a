use std::path::Path;

use crate::core::errors::Result;
use crate::core::models::identity::{Identity, Keyring};

/// Port for reading key material from local storage.
///
/// Keys are loaded fresh on every call and never cached.
pub trait KeyStore: Send + Sync {
    /// Load the first identity in the key file at `path`.
    fn load_key(&self, path: &Path) -> Result<Identity>;

    /// Load every identity in the key file at `path`, in file order.
    fn load_keyring(&self, path: &Path) -> Result<Keyring>;
}
