//! Entry point for the `tzlink` lookup client.
//!
//! Delegates to [`tzlink_cli::run`], which loads configuration, sends one
//! encrypted query to the daemon and prints the decrypted answer.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    tzlink_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
