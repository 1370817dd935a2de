//! Lexicon Server
//!
//! JSON API and embedded web UI over a `lexicon_core::Storage`.
//! Exported as a library so both binaries and the tests share one router.

pub mod api;
pub mod config;

pub use config::{ConfigError, ServerConfig};
