//! CLI command implementations.

pub mod clear;
pub mod common;
pub mod config;
pub mod download;
#[cfg(feature = "server")]
pub mod serve;
pub mod stats;
pub mod tile;
