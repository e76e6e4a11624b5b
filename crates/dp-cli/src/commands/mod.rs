//! CLI subcommand implementations.

pub mod add;
pub mod conflicts;
pub mod day;
pub mod edit;
pub mod format;
pub mod list;
pub mod rm;
pub mod show;
pub mod status;
pub mod util;
pub mod week;
