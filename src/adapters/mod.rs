pub mod cipher;
pub mod key_stores;
pub mod prompt;
pub mod storage;
