//! Command implementations for the CLI.

mod classify;
mod compose;
mod config;
mod simulate;

pub use classify::cmd_classify;
pub use compose::cmd_compose;
pub use config::cmd_config;
pub use simulate::cmd_simulate;
