//! wfcheck CLI binary entry point.

use std::process::ExitCode;

fn main() -> ExitCode {
    ExitCode::from(wfcheck::app::run_from(std::env::args_os()))
}
