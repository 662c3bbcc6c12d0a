pub mod key_service;
pub mod metadata_service;
pub mod object_service;
