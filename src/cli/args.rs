use clap::Parser;
use std::env;

use crate::cli::command::Command;

pub const DEFAULT_STORE_URI: &str = "sqlite://.collectibles/collectibles.sqlite";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Register the collectibles schema and seed default documents",
    long_about = "Connects to the collectibles document store, registers every collection with its uniqueness constraints and inserts the default user, catalog, item and image records that are missing. Safe to run on every startup.",
    subcommand_required = false,
    arg_required_else_help = false
)]
pub struct Cli {
    #[arg(
        long,
        env = "COLLECTIBLES_STORE_URI",
        default_value = DEFAULT_STORE_URI,
        value_name = "URI",
        help = "Document store URI (sqlite://PATH or memory://)"
    )]
    pub store_uri: String,

    #[arg(
        long,
        default_value_t = false,
        help = "Reset all persisted state (delete the SQLite database) before starting"
    )]
    pub reset: bool,

    #[arg(
        long = "log-file",
        env = "COLLECTIBLES_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    dotenvy::from_filename(&dotenv_path).ok();

    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_seed() {
        let cli = Cli::try_parse_from(["collectibles-seed"]).unwrap();
        assert!(cli.cmd.is_none());
        assert!(!cli.reset);
    }

    #[test]
    fn parses_status_subcommand_with_store() {
        let cli = Cli::try_parse_from([
            "collectibles-seed",
            "--store-uri",
            "memory://",
            "--reset",
            "status",
        ])
        .unwrap();
        assert_eq!(cli.store_uri, "memory://");
        assert!(cli.reset);
        assert!(matches!(cli.cmd, Some(Command::Status)));
    }
}
