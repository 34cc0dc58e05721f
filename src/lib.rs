//! Household inventory: rooms, nested locations, categories and items.
//!
//! The `data` feature builds the domain model, the hierarchy engine, both
//! entity stores and the service layer. The `cli` feature adds configuration
//! loading and the `inventory` binary on top.

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod dto;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "data")]
pub mod hierarchy;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "data")]
pub mod services;

#[cfg(all(test, feature = "data"))]
mod test_support;
