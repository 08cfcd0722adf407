use std::path::Path;
use std::process::{Command, Output};

pub fn base_cmd(store_uri: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_collectibles-seed"));
    cmd.env("DOTENV_PATH", "/nonexistent/.env")
        .env("RUST_LOG", "info")
        .env_remove("COLLECTIBLES_LOG_FILE")
        .arg("--store-uri")
        .arg(store_uri);
    cmd
}

pub fn sqlite_uri(dir: &Path) -> String {
    format!("sqlite://{}", dir.join("store/collectibles.sqlite").display())
}

pub fn assert_success(label: &str, output: &Output) {
    assert!(
        output.status.success(),
        "{label} stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Parses `status` output into `(collection, count)` pairs.
pub fn parse_status(output: &Output) -> Vec<(String, u64)> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| {
            let (name, count) = line.split_once('\t')?;
            Some((name.to_string(), count.parse().ok()?))
        })
        .collect()
}
