pub mod catalog;
pub mod play;

pub use catalog::*;
pub use play::*;
