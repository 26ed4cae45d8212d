//! Library side of the `retrohub` command-line tool.
//!
//! The binary is a thin wrapper: it parses [`Cli`], installs the log
//! subscriber and hands over to [`run`].

#![allow(clippy::return_self_not_must_use)]

pub mod commands;
pub mod config;

pub use commands::run;
pub use config::{CacheCommand, Cli, Command, GamesCommand};
