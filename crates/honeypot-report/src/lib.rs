//! Output layer for honeypot analytics.
//!
//! Turns a finished [`honeypot_data::analysis::AnalysisReport`] into
//! chart-ready JSON views, a cleaned CSV export, and a plain-text
//! statistics summary. Every sink implements [`emitter::ReportEmitter`].

pub mod csv_export;
pub mod emitter;
pub mod summary;

pub use honeypot_core as core;
