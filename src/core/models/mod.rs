pub mod identity;
pub mod object_attrs;
pub mod object_metadata;
pub mod payload;
