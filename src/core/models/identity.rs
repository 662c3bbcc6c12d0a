use sequoia_openpgp::Cert;

use crate::core::errors::{Result, TresorError};

/// An OpenPGP certificate loaded for the duration of one operation.
///
/// Secret key material, when present, stays encrypted inside the
/// certificate. Unlocking happens on a clone, right where it is needed.
#[derive(Clone)]
pub struct Identity {
    cert: Cert,
}

impl Identity {
    pub fn new(cert: Cert) -> Self {
        Self { cert }
    }

    pub fn cert(&self) -> &Cert {
        &self.cert
    }

    /// 16-digit uppercase hex ID of the primary key.
    pub fn key_id(&self) -> String {
        self.cert.keyid().to_hex()
    }

    pub fn fingerprint(&self) -> String {
        self.cert.fingerprint().to_hex()
    }

    /// All user IDs of the certificate, in certificate order.
    pub fn labels(&self) -> Vec<String> {
        self.cert
            .userids()
            .map(|ua| String::from_utf8_lossy(ua.userid().value()).into_owned())
            .collect()
    }

    /// Whether the certificate carries any secret key material.
    pub fn has_secret(&self) -> bool {
        self.cert.is_tsk()
    }

    fn matches(&self, needle: &str) -> bool {
        self.labels().iter().any(|label| label.contains(needle))
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("key_id", &self.key_id())
            .field("fingerprint", &self.fingerprint())
            .field("labels", &self.labels())
            .field("has_secret", &self.has_secret())
            .finish()
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.labels().first() {
            Some(label) => write!(f, "{} ({})", self.key_id(), label),
            None => write!(f, "{}", self.key_id()),
        }
    }
}

/// Ordered set of identities read from one key file.
#[derive(Debug, Clone, Default)]
pub struct Keyring {
    identities: Vec<Identity>,
}

impl Keyring {
    pub fn new(identities: Vec<Identity>) -> Self {
        Self { identities }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Identity> {
        self.identities.iter()
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Select the first identity, in ring order, with a user ID containing
    /// `label`. Matching is case-sensitive.
    pub fn select(&self, label: &str) -> Result<&Identity> {
        self.identities
            .iter()
            .find(|identity| identity.matches(label))
            .ok_or_else(|| TresorError::IdentityNotFound {
                label: label.to_string(),
            })
    }
}

impl<'a> IntoIterator for &'a Keyring {
    type Item = &'a Identity;
    type IntoIter = std::slice::Iter<'a, Identity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
