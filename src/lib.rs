//! BulkImaginator
//!
//! This library provides the core of the bulk-imaginator service: an
//! in-memory job store and a serial queue driver that turns batches of text
//! prompts into images, one Gemini call at a time.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
