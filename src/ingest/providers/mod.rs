// src/ingest/providers/mod.rs
pub mod facebook;

pub use facebook::FacebookGraphClient;
