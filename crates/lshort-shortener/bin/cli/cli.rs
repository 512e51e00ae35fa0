use clap::{Parser, Subcommand, ValueEnum};
use lshort_storage::{BackendOptions, RedbOptions, SledOptions, DEFAULT_LEASE_SIZE};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const BACKEND_ENV: &str = "LSHORT_BACKEND";
pub const DB_PATH_ENV: &str = "LSHORT_DB_PATH";
pub const LEASE_SIZE_ENV: &str = "LSHORT_LEASE_SIZE";
pub const FIRST_SEQUENCE_ENV: &str = "LSHORT_FIRST_SEQUENCE";
pub const BASE_URL_ENV: &str = "LSHORT_BASE_URL";
pub const LOG_FORMAT_ENV: &str = "LSHORT_LOG_FORMAT";

pub const DEFAULT_DB_PATH: &str = "lshort.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    #[value(name = "redb")]
    Redb,
    #[value(name = "sled")]
    Sled,
}

impl Display for BackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendArg::Redb => write!(f, "redb"),
            BackendArg::Sled => write!(f, "sled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store urls and print the short key issued for each.
    Shrink {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Print the url stored under each key.
    Expand {
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "shrinker", about = "Shrink urls into short keys and expand them back")]
pub struct CLI {
    #[arg(long, env = BACKEND_ENV, value_enum, default_value_t = BackendArg::Redb)]
    pub backend: BackendArg,

    /// Database file (redb) or directory (sled).
    #[arg(long, env = DB_PATH_ENV, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Sequence numbers reserved per lease (sled only).
    #[arg(long, env = LEASE_SIZE_ENV, default_value_t = DEFAULT_LEASE_SIZE)]
    pub lease_size: u64,

    /// First sequence number of a fresh store.
    #[arg(long, env = FIRST_SEQUENCE_ENV, default_value_t = 1)]
    pub first_sequence: u64,

    /// Print full links under this base url instead of bare keys.
    #[arg(long, env = BASE_URL_ENV)]
    pub base_url: Option<String>,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl CLI {
    pub fn backend_options(&self) -> BackendOptions {
        match self.backend {
            BackendArg::Redb => BackendOptions::Redb(
                RedbOptions::builder()
                    .first_sequence(self.first_sequence)
                    .build(),
            ),
            BackendArg::Sled => BackendOptions::Sled(
                SledOptions::builder()
                    .lease_size(self.lease_size)
                    .first_sequence(self.first_sequence)
                    .build(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_redb() {
        let cli = CLI::try_parse_from(["shrinker", "shrink", "https://example.com"]).unwrap();
        assert_eq!(cli.backend, BackendArg::Redb);
        assert_eq!(cli.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert!(matches!(cli.backend_options(), BackendOptions::Redb(_)));
        assert!(matches!(cli.command, Command::Shrink { ref urls } if urls.len() == 1));
    }

    #[test]
    fn sled_options_carry_lease_size() {
        let cli = CLI::try_parse_from([
            "shrinker",
            "--backend",
            "sled",
            "--lease-size",
            "100",
            "expand",
            "3",
            "4",
        ])
        .unwrap();
        match cli.backend_options() {
            BackendOptions::Sled(options) => assert_eq!(options.lease_size, 100),
            other => panic!("unexpected backend {}", other.name()),
        }
        assert!(matches!(cli.command, Command::Expand { ref keys } if keys.len() == 2));
    }

    #[test]
    fn subcommand_requires_arguments() {
        assert!(CLI::try_parse_from(["shrinker", "shrink"]).is_err());
        assert!(CLI::try_parse_from(["shrinker", "--backend", "bolt", "expand", "3"]).is_err());
    }
}
