//! Shared types for the zweb crates: the error type, structured trace
//! events and the TOML configuration model.

pub mod config;
pub mod error;
pub mod trace;
