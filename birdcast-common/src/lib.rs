//! # Birdcast Common Library
//!
//! Shared code for the Birdcast prediction service including:
//! - Locality and species catalog with alias tables
//! - Free-text query feature extraction
//! - Model bundle types and tree-ensemble inference
//! - Configuration loading
//! - Clock and calendar helpers

pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod time;

pub use error::{Error, Result};
pub use time::{Clock, FixedClock, SystemClock};
