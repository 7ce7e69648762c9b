//! Integration tests for the Pulsegate API.
//!
//! These tests drive complete exports through the HTTP router into the
//! in-memory sinks and check what each sink received.

mod common;
mod health_tests;
mod log_sink_tests;
mod metrics_sink_tests;
mod rejection_tests;
