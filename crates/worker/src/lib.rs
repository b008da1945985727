//! `toon3d-worker` library crate.
//!
//! Exposes the configuration loader and the pipeline runner for
//! integration testing. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod pipeline;
