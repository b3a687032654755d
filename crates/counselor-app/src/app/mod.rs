pub mod repl;
pub mod setup;

pub use repl::run_repl_mode;
pub use setup::{open_coordinator, setup_from_cli, AppConfig};
