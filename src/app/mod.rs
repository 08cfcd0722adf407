mod wiring;

use crate::{cli, context, schema, seed, storage};
use anyhow::{Context as AnyhowContext, Result};
use std::sync::Arc;

pub struct App {
    pub ctx: context::Context,
    pub store: Arc<dyn storage::DocumentStore>,
}

impl App {
    /// Connects to the configured store. A store that cannot be reached is fatal.
    pub fn connect(ctx: context::Context) -> Result<Self> {
        let store = wiring::init_store(&ctx)?;
        Ok(Self { ctx, store })
    }
}

pub async fn run_seed(app: &App) -> Result<seed::SeedReport> {
    log::info!("🌱 Seeding {}", app.ctx.store_uri);
    let store = app.store.clone();
    let report = tokio::task::spawn_blocking(move || seed::ensure_seeded(store.as_ref()))
        .await
        .context("seed task panicked")?
        .context("seeding failed")?;

    for step in &report.steps {
        log::debug!("{} {:?}: {}", step.collection, step.key, step.outcome);
    }
    if report.is_noop() {
        log::info!("✅ Store already seeded, nothing to do");
    }
    Ok(report)
}

pub async fn collection_counts(app: &App) -> Result<Vec<(String, u64)>> {
    let store = app.store.clone();
    tokio::task::spawn_blocking(move || -> Result<Vec<(String, u64)>> {
        schema::register_schema(store.as_ref()).context("registering schema")?;
        let mut counts = Vec::new();
        for name in store.collection_names()? {
            let n = store.count(&name)?;
            counts.push((name, n));
        }
        Ok(counts)
    })
    .await
    .context("status task panicked")?
}

pub fn describe_schema() -> String {
    let mut out = String::new();
    for collection in schema::collections() {
        out.push_str(collection.name);
        out.push('\n');
        for index in collection.unique {
            out.push_str(&format!("  unique {} ({})\n", index.name, index.fields.join(", ")));
        }
    }
    out
}

fn log_startup_info(ctx: &context::Context) {
    log::info!("🚀 Starting collectibles-seed");
    log::info!("🗄️  Store: {}", ctx.store_uri);
    if let Some(path) = ctx.log_file.as_deref() {
        log::info!("📝 Log file: {}", path.to_string_lossy());
    }
}

pub async fn run() -> Result<()> {
    let cli = cli::parse();
    let ctx = context::Context::from_cli(&cli);
    crate::tracing::init(ctx.log_file.as_deref());

    match cli.cmd.unwrap_or(cli::Command::Seed) {
        cli::Command::Schema => print!("{}", describe_schema()),
        cli::Command::Seed => {
            log_startup_info(&ctx);
            let app = App::connect(ctx)?;
            run_seed(&app).await?;
        }
        cli::Command::Status => {
            log_startup_info(&ctx);
            let app = App::connect(ctx)?;
            for (name, count) in collection_counts(&app).await? {
                println!("{name}\t{count}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Outcome;

    fn memory_app() -> App {
        App::connect(context::Context {
            store_uri: "memory://".to_string(),
            reset: false,
            log_file: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn run_seed_is_idempotent_through_the_app() {
        let app = memory_app();
        let first = run_seed(&app).await.unwrap();
        let second = run_seed(&app).await.unwrap();

        assert_eq!(first.outcome("users"), Some(Outcome::Created));
        assert!(second.is_noop());
    }

    #[tokio::test]
    async fn status_lists_every_collection_with_counts() {
        let app = memory_app();
        let empty = collection_counts(&app).await.unwrap();
        assert_eq!(empty.len(), schema::collections().len());
        assert!(empty.iter().all(|(_, n)| *n == 0));

        run_seed(&app).await.unwrap();
        let seeded = collection_counts(&app).await.unwrap();
        assert!(seeded.iter().all(|(_, n)| *n == 1), "{seeded:?}");
    }

    #[test]
    fn connect_rejects_unknown_store() {
        let err = App::connect(context::Context {
            store_uri: "mongodb://localhost".to_string(),
            reset: false,
            log_file: None,
        })
        .err()
        .expect("unknown scheme must fail");
        assert!(format!("{err:#}").contains("cannot connect to store"));
    }

    #[test]
    fn schema_description_names_unique_indexes() {
        let text = describe_schema();
        assert!(text.starts_with("users\n"));
        assert!(text.contains("  unique users_email_uq (email)"));
        assert!(text.contains("series_characters_pair_uq (series_id, character_id)"));
    }
}
