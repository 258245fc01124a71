pub mod geometry;
pub mod config;
pub mod world;
