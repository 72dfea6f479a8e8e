use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use crate::catalog::{Catalog, RecipeFilter};
use crate::output::types::Meta;
use crate::telemetry::{self};
use crate::telemetry::ops::recipes::Phase as RecipesPhase;

/// meal recipes [QUERY] [--type Soup]
#[derive(Args, Debug)]
pub struct RecipesCmd {
    /// Case-insensitive text matched against name, type, tags and ingredients
    pub query: Option<String>,
    /// Only recipes of this type (case-insensitive)
    #[arg(long = "type")]
    pub kind: Option<String>,
}

pub async fn run(catalog_path: &Path, args: RecipesCmd) -> Result<()> {
    let t0 = Instant::now();
    let log = telemetry::recipes();
    let _g = log
        .root_span_kv([
            ("catalog", catalog_path.display().to_string()),
            ("query", format!("{:?}", args.query)),
            ("type", format!("{:?}", args.kind)),
        ])
        .entered();

    let catalog = {
        let _s = log.span(&RecipesPhase::LoadCatalog).entered();
        Catalog::load(catalog_path).await.context("load recipe catalog")?
    };

    let filter = RecipeFilter::new(args.query, args.kind);
    let hits = {
        let _s = log.span(&RecipesPhase::Filter).entered();
        catalog.search(&filter)
    };

    let _out = log.span(&RecipesPhase::Output).entered();
    if hits.is_empty() {
        log.info("ℹ️  No matching recipes");
    } else {
        log.info(format!("📖 Recipes ({} of {}):", hits.len(), catalog.len()));
        for r in &hits {
            let tags = if r.tags.is_empty() { String::new() } else { format!("  #{}", r.tags.join(" #")) };
            log.info(format!("{} [{}] serves={}{}", r.name, r.kind, r.serves, tags));
        }
    }
    if telemetry::config::json_mode() {
        log.result(&hits, Some(Meta::elapsed(t0)))?;
    }
    Ok(())
}
