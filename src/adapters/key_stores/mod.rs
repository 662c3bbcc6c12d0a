pub mod file_key_store;
