//! CLI subcommand implementations.

pub mod delete;
pub mod entry;
pub mod history;
pub mod status;
pub mod util;
pub mod watch;
