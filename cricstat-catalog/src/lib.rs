//! Cricket statistics data model types and YAML sample-data loading.
//!
//! This crate defines the persistent data model without any database
//! dependencies. Consumers can use these types directly for serialization,
//! display, or passing to `cricstat-db` for persistence.

pub mod types;
pub mod yaml;

pub use types::*;
pub use yaml::{load_dataset, parse_dataset, YamlError};
