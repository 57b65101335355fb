//! Small helpers shared by the shell state machines.

mod geometry;
mod serial;

pub use geometry::{Edges, Orientations, Point, Rectangle, Size};
pub use serial::{Serial, SerialCounter};
