pub mod types;
pub mod error;
