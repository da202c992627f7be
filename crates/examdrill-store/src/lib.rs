//! examdrill-store — answer-store backends and configuration.
//!
//! Implements the [`examdrill_core::store::AnswerStore`] contract: an
//! instrumented in-memory store for tests and ephemeral sessions, and a
//! JSON-file store for sessions that survive a restart. Also hosts the
//! configuration layer and the store factory.

pub mod config;
pub mod json_file;
pub mod memory;

pub use config::{create_store, load_config, load_config_from, ExamdrillConfig};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
