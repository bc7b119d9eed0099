//! Level 3: Feature Integration Tests
//!
//! These tests exercise complete archive features through the public API.

pub mod archive_api;
pub mod open_save;
