//! Data pipeline for honeypot analytics.
//!
//! Responsible for reading honeypot CSV logs, cleaning and labelling the
//! events, deriving the aggregate views and descriptive statistics, and
//! running the top-level analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod cleaner;
pub mod mapper;
pub mod quality;
pub mod reader;
pub mod statistics;

pub use honeypot_core as core;
