//! Presentation shapes returned by the service layer.

pub mod categories;
pub mod items;
pub mod rooms;
