//! CLI support module
//!
//! Exit codes and result mapping for the command-line wrapper

mod exit_codes;

pub use exit_codes::{exit_code_description, print_exit_codes, CliResult, ExitCodes};
