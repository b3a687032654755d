//! Terminal front end for the career counselor chat
//!
//! The binary in `main.rs` wires these modules together; they are exposed
//! as a library so the subcommands and rendering can be tested directly.

pub mod app;
pub mod cli;
pub mod commands;
pub mod file_store;
pub mod render;

pub use cli::{Cli, Commands, ProfileAction};
pub use app::{setup_from_cli, AppConfig};
