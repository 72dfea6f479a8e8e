use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;

use crate::catalog::Catalog;
use crate::output::types::Meta;
use crate::plan::{self, PlanArgs};
use crate::telemetry::{self};
use crate::telemetry::ops::shop::Phase as ShopPhase;

pub mod aggregate;
mod error;
pub mod present;
pub mod quantity;
pub mod service;

pub use aggregate::{validate_selections, Selection};
pub use error::SelectionError;
pub use present::ShoppingRow;
pub use service::{generate, ShoppingOutcome, ShoppingRequest};

/// meal shop "Pancakes:8" "Caldo Verde:4"
#[derive(Args, Debug)]
pub struct ShopCmd {
    /// Recipe selections as NAME or NAME:SERVINGS (servings default to 1)
    pub selections: Vec<String>,
    /// JSON file with a list of {name, servings} or {"recipes": [...]}
    #[arg(long)]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub plan: PlanArgs,
}

pub async fn run(catalog_path: &Path, args: ShopCmd) -> Result<()> {
    let t0 = Instant::now();
    let log = telemetry::shop();
    let _g = log
        .root_span_kv([
            ("catalog", catalog_path.display().to_string()),
            ("selections", args.selections.len().to_string()),
            ("file", format!("{:?}", args.file)),
        ])
        .entered();

    let selections = {
        let _s = log.span(&ShopPhase::ReadSelections).entered();
        collect_selections(&args).await?
    };
    let outcome = load_and_generate(catalog_path, &selections, &args.plan, &log).await?;

    let _out = log.span(&ShopPhase::Output).entered();
    log.totals(selections.len(), outcome.skipped.len(), outcome.categories(), outcome.items());
    if telemetry::config::json_mode() {
        log.result(&outcome.rows, Some(Meta::elapsed(t0)))?;
    } else {
        for row in &outcome.rows {
            match row {
                ShoppingRow::Category(h) => log.info(format!("== {} ==", h.name)),
                ShoppingRow::Item(i) => log.info(format!("  {}  ({})", i.display, i.recipes)),
            }
        }
    }
    Ok(())
}

/// Shared by `shop` and `export`: read the catalog, check the meal plan when one
/// was given, then aggregate and present.
pub(crate) async fn load_and_generate(
    catalog_path: &Path,
    selections: &[Selection],
    plan_args: &PlanArgs,
    log: &telemetry::ctx::LogCtx<telemetry::ops::shop::Shop>,
) -> Result<ShoppingOutcome> {
    let catalog = {
        let _s = log.span(&ShopPhase::LoadCatalog).entered();
        Catalog::load(catalog_path).await.context("load recipe catalog")?
    };
    if let Some(meal_plan) = plan_args.plan() {
        plan::ensure_covered(&meal_plan, selections, &catalog)?;
    }
    Ok(generate(&catalog, selections, Some(log)))
}

pub(crate) async fn collect_selections(args: &ShopCmd) -> Result<Vec<Selection>> {
    let mut out = Vec::new();
    if let Some(path) = &args.file {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("read selections file {}", path.display()))?;
        out.extend(parse_selection_file(&bytes).with_context(|| format!("parse selections file {}", path.display()))?);
    }
    for raw in &args.selections {
        out.push(parse_selection_arg(raw)?);
    }
    validate_selections(&out)?;
    Ok(out)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectionFile {
    List(Vec<Selection>),
    Wrapped(ShoppingRequest),
}

fn parse_selection_file(bytes: &[u8]) -> Result<Vec<Selection>> {
    match serde_json::from_slice::<SelectionFile>(bytes) {
        Ok(SelectionFile::List(list)) => Ok(list),
        Ok(SelectionFile::Wrapped(req)) => Ok(req.recipes),
        Err(_) => bail!("expected a list of {{name, servings}} records or {{\"recipes\": [...]}}"),
    }
}

/// "Name" or "Name:8". Only the last colon splits, so names may contain colons.
fn parse_selection_arg(raw: &str) -> Result<Selection> {
    if let Some((name, servings)) = raw.rsplit_once(':') {
        if let Ok(n) = servings.trim().parse::<f64>() {
            if name.is_empty() { bail!("missing recipe name in selection {:?}", raw); }
            return Ok(Selection::new(name, n));
        }
    }
    if raw.is_empty() { bail!("empty selection"); }
    Ok(Selection::new(raw, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_servings() {
        assert_eq!(parse_selection_arg("Pancakes:8").unwrap(), Selection::new("Pancakes", 8.0));
        assert_eq!(parse_selection_arg("Caldo Verde").unwrap(), Selection::new("Caldo Verde", 1.0));
        assert_eq!(parse_selection_arg("Soup: 2.5").unwrap(), Selection::new("Soup", 2.5));
    }

    #[test]
    fn colon_without_number_stays_in_name() {
        assert_eq!(parse_selection_arg("Soup: the classic").unwrap(), Selection::new("Soup: the classic", 1.0));
    }

    #[test]
    fn empty_selection_is_an_error() {
        assert!(parse_selection_arg("").is_err());
        assert!(parse_selection_arg(":4").is_err());
    }

    #[tokio::test]
    async fn bad_servings_in_args_are_rejected() {
        for raw in ["Pancakes:nan", "Pancakes:inf", "Pancakes:-2", "Pancakes:0"] {
            let cmd = ShopCmd { selections: vec![raw.into()], file: None, plan: PlanArgs::default() };
            let err = collect_selections(&cmd).await.unwrap_err();
            assert!(err.to_string().contains("invalid servings"), "{raw}: {err}");
        }
    }

    #[tokio::test]
    async fn bad_servings_in_file_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sel.json");
        std::fs::write(&path, br#"{"recipes": [{"name": "A", "servings": -2}]}"#).unwrap();
        let cmd = ShopCmd { selections: vec![], file: Some(path), plan: PlanArgs::default() };
        assert!(collect_selections(&cmd).await.is_err());
    }

    #[test]
    fn selection_file_accepts_both_shapes() {
        let list = parse_selection_file(br#"[{"name": "A", "servings": 2}, {"name": "B"}]"#).unwrap();
        assert_eq!(list, vec![Selection::new("A", 2.0), Selection::new("B", 1.0)]);
        let wrapped = parse_selection_file(br#"{"recipes": [{"name": "A", "servings": 3}]}"#).unwrap();
        assert_eq!(wrapped, vec![Selection::new("A", 3.0)]);
    }

    #[test]
    fn selection_file_rejects_other_shapes() {
        assert!(parse_selection_file(br#"[1, 2, 3]"#).is_err());
        assert!(parse_selection_file(br#""Pancakes""#).is_err());
    }

    #[tokio::test]
    async fn meal_plan_gates_the_list() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("recipe_db.json");
        std::fs::write(&db, br#"[
            {"name": "Soup", "type": "Soup", "serves": 2, "ingredients": [{"name": "leek", "quantity": 2}]},
            {"name": "Stew", "type": "Main", "serves": 2, "ingredients": [{"name": "beef", "quantity": 500, "unit": "g"}]}
        ]"#).unwrap();
        let log = telemetry::shop();
        let plan_args = PlanArgs { meals: Some(2), meal_type: crate::plan::MealType::Both };

        let short = [Selection::new("Soup", 2.0), Selection::new("Stew", 1.0)];
        let err = load_and_generate(&db, &short, &plan_args, &log).await.unwrap_err();
        assert!(err.to_string().contains("Main: 1 / 2 servings"));

        let covered = [Selection::new("Soup", 2.0), Selection::new("Stew", 2.0)];
        let outcome = load_and_generate(&db, &covered, &plan_args, &log).await.unwrap();
        assert_eq!(outcome.items(), 2);

        let no_plan = load_and_generate(&db, &short, &PlanArgs::default(), &log).await.unwrap();
        assert_eq!(no_plan.items(), 2);
    }

    #[tokio::test]
    async fn file_and_args_are_concatenated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sel.json");
        std::fs::write(&path, br#"[{"name": "A", "servings": 2}]"#).unwrap();
        let cmd = ShopCmd { selections: vec!["B:4".into()], file: Some(path), plan: PlanArgs::default() };
        let sel = collect_selections(&cmd).await.unwrap();
        assert_eq!(sel, vec![Selection::new("A", 2.0), Selection::new("B", 4.0)]);
    }
}
