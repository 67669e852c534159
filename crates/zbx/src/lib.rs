//! zbx -- library crate behind the `zbx` command line tool.
//!
//! Exposes config loading, flag parsers, connection setup and the command
//! implementations so they can be driven from tests against a mock server.

pub mod args;
pub mod commands;
pub mod config;
pub mod display;
pub mod session;

use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/zbx/config.toml";

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs_or_home() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn dirs_or_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
