//! Diesel row types and their conversions to domain entities.

pub mod category;
#[cfg(feature = "cli")]
pub mod config;
pub mod item;
pub mod location;
pub mod room;
