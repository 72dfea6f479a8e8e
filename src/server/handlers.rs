//! Handlers for the two catalog operations plus the Markdown export.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::Instrument;

use crate::catalog::{Recipe, RecipeFilter};
use crate::export::render_markdown;
use crate::plan::{self, PlanProgress, PlanRequest};
use crate::shopping::{self, ShoppingRequest, ShoppingRow};
use crate::telemetry::{self};
use crate::telemetry::ops::serve::Phase as ServePhase;

use super::error::ApiError;
use super::ServerState;

/// Query string for `GET /api/recipes`
#[derive(Debug, Default, Deserialize)]
pub struct RecipeQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// List or search recipes
///
/// GET /api/recipes?q=&type=
pub async fn list_recipes(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<RecipeQuery>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let log = telemetry::serve();
    let span = log.span_kv(&ServePhase::Request, [("route", "recipes".to_string()), ("q", format!("{:?}", params.q))]);

    let catalog = state.load_catalog().instrument(span.clone()).await?;
    let _s = span.entered();
    let filter = RecipeFilter::new(params.q, params.kind);
    let hits: Vec<Recipe> = catalog.search(&filter).into_iter().cloned().collect();
    log.debug(format!("recipes: {} match(es)", hits.len()));
    Ok(Json(hits))
}

/// Build the aggregated shopping list
///
/// POST /api/shopping-list
pub async fn shopping_list(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ShoppingRequest>,
) -> Result<Json<Vec<ShoppingRow>>, ApiError> {
    let rows = build_rows(&state, &request).await?;
    Ok(Json(rows))
}

/// Same list rendered as a Markdown checklist
///
/// POST /api/shopping-list/markdown
pub async fn shopping_list_markdown(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ShoppingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = build_rows(&state, &request).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        render_markdown(&rows),
    ))
}

/// Meal-plan coverage of the current selections
///
/// POST /api/plan
pub async fn plan_progress(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<PlanProgress>, ApiError> {
    let log = telemetry::serve();
    let span = log.span_kv(&ServePhase::Request, [("route", "plan".to_string()), ("meals", request.meals.to_string())]);
    shopping::validate_selections(&request.recipes)?;

    let catalog = state.load_catalog().instrument(span.clone()).await?;
    let _s = span.entered();
    let report = plan::progress(&request.plan(), &request.recipes, &catalog);
    log.debug(format!("plan: complete={}", report.complete));
    Ok(Json(report))
}

async fn build_rows(state: &ServerState, request: &ShoppingRequest) -> Result<Vec<ShoppingRow>, ApiError> {
    let log = telemetry::serve();
    let span = log.span_kv(&ServePhase::Request, [("route", "shopping-list".to_string()), ("selections", request.recipes.len().to_string())]);
    shopping::validate_selections(&request.recipes)?;

    let catalog = state.load_catalog().instrument(span.clone()).await?;
    let _s = span.entered();
    let outcome = shopping::generate(&catalog, &request.recipes, Some(&telemetry::shop()));
    log.debug(format!(
        "shopping-list: {} row(s), {} skipped selection(s)",
        outcome.rows.len(),
        outcome.skipped.len()
    ));
    Ok(outcome.rows)
}
