//! CLI subcommand implementations.

pub mod activity;
pub mod import;
pub mod report;
pub mod watch;
