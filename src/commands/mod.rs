//! CLI commands module.

pub mod check;
pub mod simulate;
pub mod watch;
