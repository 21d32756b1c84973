//! Command-line client for the tzlink lookup daemon.
//!
//! The runtime splits configuration flags from the command, loads the shared
//! configuration, sends one encrypted request over TCP and prints the answer.
//! Successful lookups go to stdout; any other outcome is written to stderr as
//! `error <code>: <message>` and the process exits with a failure status.
//! Configuration loading and the output streams are injectable for tests.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap::error::ErrorKind;
use tzlink_config::Config;
use tzlink_protocol::{Client, ResponseMessage, SharedKey};

mod cli;
mod config;
mod errors;

use cli::{Cli, CliCommand};
use config::{ConfigLoader, OrthoConfigLoader, split_arguments};
pub(crate) use errors::AppError;

/// Runs the CLI using the provided arguments and output streams.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_arguments(&args);

    let result = Cli::try_parse_from(split.command)
        .map_err(AppError::CliUsage)
        .and_then(|cli| loader.load(&split.config).map(|config| (cli, config)))
        .and_then(|(cli, config)| {
            lookup(&cli.command, &config, Duration::from_secs(cli.timeout))
        });

    match result {
        Ok(response) => render(&response, stdout, stderr),
        Err(AppError::CliUsage(error))
            if matches!(
                error.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            let _ = write!(stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn lookup(
    command: &CliCommand,
    config: &Config,
    timeout: Duration,
) -> Result<ResponseMessage, AppError> {
    let key = SharedKey::from_passphrase(config.aes_key()).map_err(AppError::Key)?;
    let endpoint = config.listen();
    Client::new(endpoint.connect_host(), endpoint.port(), key)
        .with_timeout(timeout)
        .send(&command.request())
        .map_err(AppError::Exchange)
}

fn render<W: Write, E: Write>(
    response: &ResponseMessage,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode {
    if response.code.is_success() {
        let _ = writeln!(stdout, "{}", response.message);
        ExitCode::SUCCESS
    } else {
        let _ = writeln!(
            stderr,
            "error {}: {}",
            response.code.code(),
            response.message
        );
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests;
