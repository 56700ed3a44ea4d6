//! `demand-periods` library crate.
//!
//! The binary (`dp`) is a thin wrapper around this library so that:
//!
//! - the period logic is testable without spawning processes
//! - the same pipeline serves the line-oriented commands and the TUI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod periods;
pub mod plot;
pub mod report;
pub mod tui;
