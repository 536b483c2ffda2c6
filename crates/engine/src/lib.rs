//! Asynchronous job pipeline for the scribe service.
//!
//! One submitted recording becomes one job that an executor drives through
//! the fixed stage sequence (prepare, transcribe, summarize) off the
//! caller's request path. The registry holds the single pollable view of
//! every job; the submission and status services are the only two entry
//! points the HTTP layer needs.

pub mod adapter;
pub mod executor;
pub mod progress;
pub mod registry;
pub mod status;
pub mod submit;
