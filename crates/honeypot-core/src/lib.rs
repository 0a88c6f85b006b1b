//! Shared building blocks for honeypot analytics.
//!
//! Holds the event data model, the aggregate view types, the error type,
//! cell and timestamp parsing, and the configuration surface.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod protocols;
pub mod settings;
