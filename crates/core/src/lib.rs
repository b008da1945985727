//! Shared domain types for the photo → illustration → mesh pipeline.
//!
//! Holds the error type, timestamp aliases, art-style presets, the
//! file-naming rules for generated artifacts, and the explicit job-state
//! record threaded between pipeline stages.

pub mod error;
pub mod job;
pub mod naming;
pub mod style;
pub mod types;
