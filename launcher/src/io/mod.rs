//! I/O helpers for launcher commands.

pub mod config;
pub mod discover;
pub mod process;
