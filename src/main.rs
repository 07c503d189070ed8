//! bookdb - Audiobook catalog storage and change detection

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = book_catalog::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
