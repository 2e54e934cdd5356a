//! CLI module for clipaug
//!
//! This module is only available when the "cli" feature is enabled.

mod config;
#[path = "main.rs"]
mod main_impl;

pub use main_impl::{main, AugmentArgs, Cli, CliLogFormat, Command, FilterArgs, StatsArgs};
