//! Domain entities and the value types they are built from.

pub mod category;
pub mod item;
pub mod location;
pub mod room;
pub mod types;
