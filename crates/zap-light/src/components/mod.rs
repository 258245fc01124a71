pub mod color;
pub mod binding;
pub mod source;
pub mod block;
pub mod no_cast;
pub mod background;
