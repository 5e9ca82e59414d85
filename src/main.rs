use std::process::ExitCode;

use retropak::cli;

fn main() -> ExitCode {
    cli::run()
}
