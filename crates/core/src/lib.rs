#![warn(clippy::all, missing_docs)]

//! Core inventory logic for the dealership console.
//!
//! This crate hosts the vehicle models, the delimited line codec,
//! the persisted inventory store and its backing resources,
//! search filters and configuration handling used by the console
//! and any future frontends.

pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod resource;
pub mod store;

pub use crate::config::AppConfig;
pub use error::{StoreError, StoreResult};
pub use filter::VehicleFilter;
pub use models::{DealershipHeader, VehicleRecord};
pub use resource::{FileResource, MemoryResource, Resource, WriteMode};
pub use store::InventoryStore;
