//! Command-line argument definitions for the `tzlink` client.

use clap::{ArgGroup, Parser, Subcommand};

use tzlink_protocol::{RequestKind, RequestMessage};

/// Seconds to wait on the daemon before giving up.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Queries the tzlink daemon for user timezones and aliases.
#[derive(Parser, Debug)]
#[command(name = "tzlink", disable_help_subcommand = true, version)]
pub(crate) struct Cli {
    /// Seconds to wait for the daemon to connect and answer.
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub(crate) timeout: u64,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Lookups understood by the daemon.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Prints the timezone of a user, addressed by id or alias.
    #[command(group(ArgGroup::new("subject").required(true).args(["user_id", "alias"])))]
    Timezone {
        /// Numeric user id.
        #[arg(long, value_name = "ID")]
        user_id: Option<u64>,
        /// Alias registered by the user.
        #[arg(long, value_name = "ALIAS")]
        alias: Option<String>,
    },
    /// Prints the alias registered by a user.
    Alias {
        /// Numeric user id.
        #[arg(long, value_name = "ID")]
        user_id: u64,
    },
    /// Prints the user id that owns an alias.
    User {
        /// Alias to resolve.
        #[arg(long, value_name = "ALIAS")]
        alias: String,
    },
}

impl CliCommand {
    /// Builds the wire request for this lookup.
    pub(crate) fn request(&self) -> RequestMessage {
        match self {
            Self::Timezone {
                user_id: Some(user_id),
                ..
            } => RequestMessage::for_user(RequestKind::Timezone, *user_id),
            Self::Timezone { alias, .. } => RequestMessage::for_alias(
                RequestKind::TimezoneFromAlias,
                alias.clone().unwrap_or_default(),
            ),
            Self::Alias { user_id } => RequestMessage::for_user(RequestKind::Alias, *user_id),
            Self::User { alias } => {
                RequestMessage::for_alias(RequestKind::UserFromAlias, alias.clone())
            }
        }
    }
}
