//! Client Tests
//!
//! Every public command run against the scripted transport: what goes on
//! the wire, how each response is interpreted, and when the connection is
//! torn down.

#[path = "../common/mod.rs"]
mod common;

mod error_tests;
mod fetch_tests;
