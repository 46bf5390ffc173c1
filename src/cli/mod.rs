//! CLI argument parsing and command implementations.

pub mod args;
pub mod doctor;
pub mod send;
pub mod serve;
pub mod setup;

pub use args::{Cli, Commands};
