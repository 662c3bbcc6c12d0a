//! Key fixtures shared by unit tests.

use sequoia_openpgp::cert::prelude::*;
use sequoia_openpgp::crypto::Password;

use crate::core::models::identity::Identity;

/// A freshly generated identity whose secret keys are not passphrase protected.
pub fn unlocked_identity(user_id: &str) -> Identity {
    let (cert, _) = CertBuilder::general_purpose(Some(user_id))
        .generate()
        .unwrap();
    Identity::new(cert)
}

/// A freshly generated identity whose secret keys are locked with `passphrase`.
pub fn locked_identity(user_id: &str, passphrase: &str) -> Identity {
    let (cert, _) = CertBuilder::general_purpose(Some(user_id))
        .set_password(Some(Password::from(passphrase)))
        .generate()
        .unwrap();
    Identity::new(cert)
}

/// The public half of `identity`, as a correspondent would hold it.
pub fn public_only(identity: &Identity) -> Identity {
    Identity::new(identity.cert().clone().strip_secret_key_material())
}
