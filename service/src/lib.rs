//! Startup concerns shared by the host binaries: command line and
//! environment configuration, and terminal logging.

pub mod config;
pub mod logging;
