//! Test support shared by the crewbot integration suites.
//!
//! Integration tests link this crate to get a single, race-safe logging setup
//! that plays nicely with cargo/nextest output capture.

pub mod logging;
