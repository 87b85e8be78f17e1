#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod impls;

mod schedule;
pub use schedule::Scheduler;

mod cli;
pub use cli::{Cli, Commands, ReportFormat};

mod config;
pub use config::{AccessConfig, AppConfig, CancellationConfig};
