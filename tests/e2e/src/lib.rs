//! End-to-end test support for Lexicon
//!
//! - `harness`: isolated databases
//! - `mocks`: vocabulary fixtures and a controllable clock

pub mod harness;
pub mod mocks;
