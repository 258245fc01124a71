pub mod blend;
pub mod surface;
pub mod tessellate;
pub mod painter;
pub mod view;
pub mod buffers;
