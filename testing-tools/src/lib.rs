// Testing Tools Library
//
// This crate provides testing utilities and tools for the mail bridge.
// Currently includes:
// - bridge-test-client: live email stream integration testing tool

pub mod output;
pub mod scenarios;
pub mod session;
