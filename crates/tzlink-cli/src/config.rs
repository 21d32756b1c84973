//! Configuration loading for the CLI.
//!
//! Configuration flags lead the argument list (`tzlink --listen tcp://host:port
//! timezone --user-id 42`). They are peeled off and handed to `ortho_config`,
//! and the remainder is parsed by `clap`.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use tzlink_config::Config;

use crate::AppError;

/// Flags owned by the shared configuration rather than the CLI parser.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--listen",
    "--aes-key",
    "--max-message-bytes",
    "--default-timezone",
    "--records-path",
    "--log-filter",
    "--log-format",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the program name plus leading config flags.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagKind {
    /// A configuration flag; `true` when its value is the next argument.
    Config { separate_value: bool },
    /// Anything else; ends the configuration prefix.
    Other,
}

fn classify(argument: &OsStr) -> FlagKind {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagKind::Other;
    }
    let (flag, inline) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (&*text, false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagKind::Config {
            separate_value: !inline,
        }
    } else {
        FlagKind::Other
    }
}

/// Arguments partitioned between the configuration loader and `clap`.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ArgumentSplit {
    /// Program name followed by the leading configuration flags.
    pub(crate) config: Vec<OsString>,
    /// Program name followed by the command and its arguments.
    pub(crate) command: Vec<OsString>,
}

pub(crate) fn split_arguments(args: &[OsString]) -> ArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ArgumentSplit::default();
    };
    let mut config = vec![program.clone()];
    let mut remaining = rest.iter().peekable();
    while let Some(argument) = remaining.peek() {
        match classify(argument) {
            FlagKind::Config { separate_value } => {
                config.extend(remaining.next().cloned());
                if separate_value {
                    config.extend(remaining.next().cloned());
                }
            }
            FlagKind::Other => break,
        }
    }
    let mut command = vec![program.clone()];
    command.extend(remaining.cloned());
    ArgumentSplit { config, command }
}
