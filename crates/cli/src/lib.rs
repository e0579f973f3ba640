//! Terminal output helpers for the storefinder command line
//!
//! - Status messages and value formatting
//! - Text/JSON output selection
//! - Progress indicators for slow provider calls

#![warn(missing_docs)]

pub mod output;
pub mod progress;

pub use output::{OutputFormat, Status};
