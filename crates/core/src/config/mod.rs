//! Configuration loading and schema definitions
//!
//! Shared configuration types for geocoding, rate limiting, navigation,
//! device location and logging.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
