pub mod macros;
pub mod wm;
