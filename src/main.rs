mod app;
mod cli;
mod context;
mod models;
mod schema;
mod seed;
mod storage;
mod tracing;
mod types;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
