//! howlerctl support library
//!
//! Argument parsing and configuration shared by the `howlerctl` binary. The
//! protocol and device logic live in the `howler-transport` and
//! `howler-device` crates.

pub mod config;
pub mod control;

pub use config::{Config, Overrides};
pub use control::{ArgError, Control};
