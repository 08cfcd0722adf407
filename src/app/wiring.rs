use std::sync::Arc;

use crate::{context, storage};
use anyhow::{Context, Result};

pub fn init_store(ctx: &context::Context) -> Result<Arc<dyn storage::DocumentStore>> {
    if ctx.reset {
        log::warn!("🧹 Resetting store before seeding");
    }
    storage::connect(&ctx.store_uri, ctx.reset).context("connecting to document store")
}
