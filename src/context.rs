use std::path::PathBuf;

/// Settings resolved from flags, environment and `.env`.
#[derive(Clone, Debug)]
pub struct Context {
    pub store_uri: String,
    pub reset: bool,
    pub log_file: Option<PathBuf>,
}

impl Context {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        Self {
            store_uri: cli.store_uri.clone(),
            reset: cli.reset,
            log_file: cli.log_file.as_ref().map(PathBuf::from),
        }
    }
}
