use std::process::ExitCode;

use grid_outbreak::runner::run_with_args;

fn main() -> ExitCode {
    match run_with_args() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
