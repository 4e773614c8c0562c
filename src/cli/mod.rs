//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing and subcommand handlers.

mod args;
mod commands;

pub use args::{Args, Command, ConfigAction, OverlayAction, OverlayFields};
pub use commands::{
    build_store, handle_config_action, handle_overlay_action, overlay_from_fields, render,
    run_console, show_status, start_stream, stop_stream, CliError,
};
