pub mod grid;
pub mod message;
pub mod packing;

pub use grid::LambertGrid;
pub use message::GribMessage;
