//! Library crate for reprobe exposing the probe engine.
pub mod classifier;
pub mod config;
pub mod error;
pub mod prober;
pub mod report;
pub mod resolver;
pub mod stats;
pub mod types;
