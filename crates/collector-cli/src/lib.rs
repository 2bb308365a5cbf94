//! Library side of the `collector` binary: job files and logging setup.

pub mod config;
pub mod logging;
