//! Test doubles and data


pub use fixtures::{ManualClock, TestDataFactory, VOCABULARY};
