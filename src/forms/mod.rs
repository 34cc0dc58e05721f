//! Raw input structures and their conversion into typed payloads.

pub mod categories;
pub mod intake;
pub mod items;
pub mod locations;
pub mod rooms;
