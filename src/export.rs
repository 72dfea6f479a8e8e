use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::output::types::Meta;
use crate::shopping::{self, ShopCmd, ShoppingRow};
use crate::telemetry::{self};
use crate::telemetry::ops::export::Phase as ExportPhase;

/// meal export "Pancakes:8" --out shopping-list.md
#[derive(Args, Debug)]
pub struct ExportCmd {
    #[command(flatten)]
    pub shop: ShopCmd,
    /// Write the Markdown checklist here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Serialize)]
struct ExportResult {
    path: Option<String>,
    bytes: usize,
    markdown: String,
}

pub async fn run(catalog_path: &Path, args: ExportCmd) -> Result<()> {
    let t0 = Instant::now();
    let log = telemetry::export();
    let _g = log
        .root_span_kv([("out", format!("{:?}", args.out))])
        .entered();

    let selections = shopping::collect_selections(&args.shop).await?;
    let outcome = shopping::load_and_generate(catalog_path, &selections, &args.shop.plan, &telemetry::shop()).await?;

    let markdown = {
        let _s = log.span(&ExportPhase::Render).entered();
        render_markdown(&outcome.rows)
    };

    let _w = log.span(&ExportPhase::Write).entered();
    if let Some(path) = &args.out {
        tokio::fs::write(path, markdown.as_bytes())
            .await
            .with_context(|| format!("write {}", path.display()))?;
        log.info(format!("📝 Shopping list written to {}", path.display()));
    }

    if telemetry::config::json_mode() {
        let result = ExportResult {
            path: args.out.as_ref().map(|p| p.display().to_string()),
            bytes: markdown.len(),
            markdown,
        };
        log.result(&result, Some(Meta::elapsed(t0)))?;
    } else if args.out.is_none() {
        print!("{markdown}");
    }
    Ok(())
}

/// Markdown checklist: one `##` section per category, one unchecked box per item.
pub fn render_markdown(rows: &[ShoppingRow]) -> String {
    let mut md = String::from("# Shopping List\n\n");
    let mut open = false;
    for row in rows {
        match row {
            ShoppingRow::Category(h) => {
                if open { md.push('\n'); }
                let _ = write!(md, "## {}\n\n", h.name);
                open = true;
            }
            ShoppingRow::Item(i) => {
                let _ = writeln!(md, "- [ ] {} *({})*", i.display, i.recipes);
            }
        }
    }
    if open { md.push('\n'); }
    md
}
