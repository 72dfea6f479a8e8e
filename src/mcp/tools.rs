#![cfg(feature = "mcp-server")]

use std::path::Path;

use rmcp::model::{CallToolRequestParam, CallToolResult, JsonObject, Tool, ToolAnnotations};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use crate::catalog::{Catalog, RecipeFilter};
use crate::export::render_markdown;
use crate::mcp::types::{PlanParams, RecipeSearchParams, ShoppingListParams};
use crate::plan;
use crate::shopping::{self, Selection, ShoppingOutcome};
use crate::telemetry;

const RECIPES_SEARCH: &str = "recipes.search";
const SHOPPING_LIST: &str = "shopping.list";
const SHOPPING_EXPORT: &str = "shopping.export";
const PLAN_PROGRESS: &str = "plan.progress";

fn read_only(name: &'static str, description: &'static str) -> Tool {
    Tool::new(name, description, rmcp::object!({"type": "object"}))
        .annotate(ToolAnnotations::new().read_only(true).idempotent(true).open_world(false))
}

pub fn tool_catalog() -> Vec<Tool> {
    vec![
        read_only(RECIPES_SEARCH, "Search recipes by free text (name, type, tags, ingredients) and optional type")
            .with_input_schema::<RecipeSearchParams>(),
        read_only(SHOPPING_LIST, "Categorized shopping list for recipes scaled to the requested servings")
            .with_input_schema::<ShoppingListParams>(),
        read_only(SHOPPING_EXPORT, "Shopping list rendered as a Markdown checklist")
            .with_input_schema::<ShoppingListParams>(),
        read_only(PLAN_PROGRESS, "How far the selected servings cover a plan of N soup and/or main meals")
            .with_input_schema::<PlanParams>(),
    ]
}

pub async fn handle_call(
    catalog_path: &Path,
    ct: &CancellationToken,
    request: CallToolRequestParam,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let CallToolRequestParam { name, arguments } = request;
    let tool = name.as_ref();
    match tool {
        RECIPES_SEARCH => {
            let params: RecipeSearchParams = parse_params(tool, arguments)?;
            let catalog = load_catalog(catalog_path, ct, tool).await?;
            let hits = catalog.search(&RecipeFilter::new(params.query.clone(), params.kind.clone()));
            structured(json!({
                "filters": { "query": params.query, "type": params.kind },
                "count": hits.len(),
                "recipes": hits,
            }))
        }
        SHOPPING_LIST => {
            let params: ShoppingListParams = parse_params(tool, arguments)?;
            let outcome = shopping_outcome(catalog_path, ct, tool, &params.selections()).await?;
            structured(json!({ "rows": outcome.rows, "skipped": outcome.skipped }))
        }
        SHOPPING_EXPORT => {
            let params: ShoppingListParams = parse_params(tool, arguments)?;
            let outcome = shopping_outcome(catalog_path, ct, tool, &params.selections()).await?;
            structured(json!({ "markdown": render_markdown(&outcome.rows), "skipped": outcome.skipped }))
        }
        PLAN_PROGRESS => {
            let params: PlanParams = parse_params(tool, arguments)?;
            let selections = params.selections();
            check_selections(tool, &selections)?;
            let catalog = load_catalog(catalog_path, ct, tool).await?;
            let report = plan::progress(&params.plan(), &selections, &catalog);
            emit_result(telemetry::plan().result(&report, None));
            structured(&report)
        }
        _ => Err(rmcp::ErrorData::invalid_params(format!("unknown tool: {tool}"), None)),
    }
}

fn structured<T: Serialize>(value: T) -> Result<CallToolResult, rmcp::ErrorData> {
    let value = serde_json::to_value(value).map_err(|err| {
        rmcp::ErrorData::internal_error(format!("serialize tool result: {err}"), None)
    })?;
    Ok(CallToolResult::structured(value))
}

fn parse_params<T: DeserializeOwned>(tool: &str, arguments: Option<JsonObject>) -> Result<T, rmcp::ErrorData> {
    serde_json::from_value(Value::Object(arguments.unwrap_or_else(Map::new)))
        .map_err(|err| rmcp::ErrorData::invalid_params(format!("invalid {tool} parameters: {err}"), None))
}

fn check_selections(tool: &str, selections: &[Selection]) -> Result<(), rmcp::ErrorData> {
    shopping::validate_selections(selections)
        .map_err(|err| rmcp::ErrorData::invalid_params(format!("invalid {tool} parameters: {err}"), None))
}

async fn load_catalog(catalog_path: &Path, ct: &CancellationToken, tool: &str) -> Result<Catalog, rmcp::ErrorData> {
    tokio::select! {
        _ = ct.cancelled() => Err(rmcp::ErrorData::internal_error(format!("{tool} cancelled"), None)),
        res = Catalog::load(catalog_path) => res.map_err(|err| {
            rmcp::ErrorData::internal_error(
                "recipe catalog unavailable",
                Some(json!({ "reason": err.to_string() })),
            )
        }),
    }
}

async fn shopping_outcome(
    catalog_path: &Path,
    ct: &CancellationToken,
    tool: &str,
    selections: &[Selection],
) -> Result<ShoppingOutcome, rmcp::ErrorData> {
    check_selections(tool, selections)?;
    let catalog = load_catalog(catalog_path, ct, tool).await?;
    let outcome = shopping::generate(&catalog, selections, None);
    emit_result(telemetry::shop().result(&outcome.rows, None));
    Ok(outcome)
}

fn emit_result(res: anyhow::Result<()>) {
    if let Err(err) = res {
        tracing::warn!(target: "meal::mcp", error = %err, "could not record tool result");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_catalog(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("recipe_db.json");
        let db = json!([
            {"name": "Pancakes", "type": "Main", "serves": 4, "ingredients": [
                {"name": "flour", "quantity": 200, "unit": "g", "category": "Dry"}
            ]},
            {"name": "Caldo Verde", "type": "Soup", "serves": 4, "ingredients": [
                {"name": "kale", "quantity": 200, "unit": "g", "category": "Produce"}
            ]}
        ]);
        std::fs::write(&path, serde_json::to_vec(&db).unwrap()).unwrap();
        path
    }

    fn request(name: &'static str, args: Value) -> CallToolRequestParam {
        CallToolRequestParam { name: name.into(), arguments: args.as_object().cloned() }
    }

    async fn call(path: &Path, name: &'static str, args: Value) -> Result<Value, rmcp::ErrorData> {
        let out = handle_call(path, &CancellationToken::new(), request(name, args)).await?;
        Ok(out.structured_content.expect("structured tool output"))
    }

    #[tokio::test]
    async fn shopping_list_defaults_servings_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(&dir);
        let v = call(&path, SHOPPING_LIST, json!({"recipes": [{"name": "Pancakes"}, {"name": "Ghost", "servings": 2}]}))
            .await
            .unwrap();
        assert_eq!(v["rows"][1]["display"], "flour: 50.0 g");
        assert_eq!(v["skipped"], json!(["Ghost"]));
    }

    #[tokio::test]
    async fn search_maps_type_parameter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(&dir);
        let v = call(&path, RECIPES_SEARCH, json!({"type": "soup"})).await.unwrap();
        assert_eq!(v["count"], 1);
        assert_eq!(v["recipes"][0]["name"], "Caldo Verde");
    }

    #[tokio::test]
    async fn plan_progress_reads_camel_case_params() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(&dir);
        let v = call(&path, PLAN_PROGRESS, json!({"meals": 2, "mealType": "main", "recipes": [{"name": "Pancakes", "servings": 2}]}))
            .await
            .unwrap();
        assert_eq!(v["complete"], true);
        assert_eq!(v["main"]["required"], 2);
    }

    #[tokio::test]
    async fn export_returns_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(&dir);
        let v = call(&path, SHOPPING_EXPORT, json!({"recipes": [{"name": "Caldo Verde", "servings": 8}]})).await.unwrap();
        assert_eq!(v["markdown"], "# Shopping List\n\n## Produce\n\n- [ ] kale: 400.0 g *(Caldo Verde)*\n\n");
    }

    #[tokio::test]
    async fn bad_input_is_invalid_params() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(&dir);
        assert!(call(&path, "recipes.delete", json!({})).await.is_err());
        assert!(call(&path, SHOPPING_LIST, json!({"recipes": "Pancakes"})).await.is_err());
        let err = call(&path, SHOPPING_LIST, json!({"recipes": [{"name": "Pancakes", "servings": -1}]}))
            .await
            .unwrap_err();
        assert!(err.message.contains("invalid servings"));
    }

    #[test]
    fn catalog_lists_every_tool() {
        let names: Vec<String> = tool_catalog().into_iter().map(|t| t.name.to_string()).collect();
        assert_eq!(names, [RECIPES_SEARCH, SHOPPING_LIST, SHOPPING_EXPORT, PLAN_PROGRESS]);
    }
}
