//! Command-line arguments

use clap::Parser;
use core_runtime::logging::{LogFormat, LogLevel};
use std::ffi::OsString;
use std::path::PathBuf;

/// Long flags accepted with a single leading dash
const LONG_FLAGS: &[&str] = &[
    "from",
    "to",
    "fromFolder",
    "toFolder",
    "token-dir",
    "log-format",
    "log-level",
    "log-filter",
    "insecure-exchange",
    "help",
    "version",
];

/// Copy the permission metadata of a Drive folder between two accounts
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "drive-permission-migrate")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Source account (e.g. alice@example.com)
    #[arg(long, value_name = "EMAIL")]
    pub from: String,

    /// Destination account
    #[arg(long, value_name = "EMAIL")]
    pub to: String,

    /// Name of the folder to read in the source account
    #[arg(
        long = "fromFolder",
        alias = "from-folder",
        value_name = "NAME",
        allow_hyphen_values = true
    )]
    pub from_folder: String,

    /// Name of the folder to resolve in the destination account
    #[arg(
        long = "toFolder",
        alias = "to-folder",
        value_name = "NAME",
        allow_hyphen_values = true
    )]
    pub to_folder: String,

    /// Directory holding the per-account token files
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub token_dir: PathBuf,

    /// Log output format: pretty, json or compact
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Minimum log level for this program's crates
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Explicit filter directives, overriding --log-level
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Accept invalid TLS certificates during the authorization code exchange
    #[arg(long)]
    pub insecure_exchange: bool,
}

impl Args {
    /// Parse the process arguments
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Parse `args` (program name first), reporting errors instead of exiting
    pub fn try_parse_normalized<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }
}

/// Rewrite `-fromFolder x` style flags as `--fromFolder x`.
///
/// Only known long flags are rewritten, so short flags such as `-h` and
/// folder names that start with a dash pass through unchanged.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = text.strip_prefix('-') else {
                return arg;
            };
            if rest.starts_with('-') {
                return arg;
            }
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if LONG_FLAGS.contains(&name) {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}
