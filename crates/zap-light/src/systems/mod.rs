pub mod shadow;
pub mod lighting;
