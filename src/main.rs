use std::process::ExitCode;

use crate::cli::run;

pub mod batch;
pub mod cli;
mod config;
pub mod domain;
pub mod http;
pub mod importer;
pub mod link;
pub mod settings;

fn main() -> ExitCode {
    run()
}
