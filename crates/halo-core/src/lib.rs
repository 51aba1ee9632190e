//! Core data model for Halo: prompt tokens, generation steps, score maps,
//! scored sentences, and the layer/head attention aggregator.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod model;

pub use aggregate::aggregate_attention;
pub use error::CoreError;
