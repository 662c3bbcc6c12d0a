pub mod cp;
pub mod get;
pub mod info;
pub mod ls;
pub mod mv;
pub mod put;
pub mod rm;
pub mod tree;
