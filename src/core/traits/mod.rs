pub mod blob_store;
pub mod cipher;
pub mod key_store;
pub mod passphrase;
