//! visreg CLI library
//!
//! Command-line front end for the `visreg` comparison engine.
//!
//! ## Usage
//!
//! ```bash
//! visreg compare header shots/header.png       # compare, seeding the baseline on first run
//! visreg approve header shots/header.png       # accept a new look
//! visreg diff old.png new.png -o diff.png      # compare two files directly
//! visreg clean                                 # drop actual and diff artifacts
//! ```

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;

pub use commands::{ApproveArgs, Cli, ColorArg, Commands, CompareArgs, DiffArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
