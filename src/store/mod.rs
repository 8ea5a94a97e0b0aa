pub mod error;
pub mod file_name;
pub mod local_store;
