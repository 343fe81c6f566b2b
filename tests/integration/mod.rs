//! Integration test suite for medq.
//!
//! These tests run the real HTTP client and controller against a stub
//! `/query` backend served by axum on an ephemeral port.
//!
//! # Test Categories
//!
//! - `client_contract`: request shape and reply classification over HTTP
//! - `controller_flow`: keystrokes through update, commands and back
//! - `headless`: the `medq ask` binary end to end
//!
//! # CI Compatibility
//!
//! No external services are contacted; every backend is local.


mod client_contract;
mod controller_flow;
mod headless;
