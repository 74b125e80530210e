//! Configuration module for hybridmark
//!
//! This module holds the configuration the host hands to the engine,
//! including serialization/deserialization to/from JSON.

mod settings;

pub use settings::*;
