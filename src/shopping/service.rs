use serde::{Deserialize, Serialize};
use tracing::span::EnteredSpan;

use crate::catalog::Catalog;
use crate::telemetry::ctx::LogCtx;
use crate::telemetry::ops::shop::{Phase as ShopPhase, Shop as ShopOp};
use crate::telemetry::{current_sink, OutputEvent};

use super::aggregate::{aggregate, Selection};
use super::present::{build_list, ShoppingRow};

/// Payload shared by the HTTP and MCP surfaces: `{"recipes": [{"name", "servings"}]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShoppingRequest {
    #[serde(default)]
    pub recipes: Vec<Selection>,
}

#[derive(Debug)]
pub struct ShoppingOutcome {
    pub rows: Vec<ShoppingRow>,
    pub skipped: Vec<String>,
}

impl ShoppingOutcome {
    pub fn categories(&self) -> usize {
        self.rows.iter().filter(|r| r.as_item().is_none()).count()
    }

    pub fn items(&self) -> usize {
        self.rows.len() - self.categories()
    }
}

/// Aggregate + present for one request. Unknown recipe names are dropped, never an error.
pub fn generate(
    catalog: &Catalog,
    selections: &[Selection],
    log: Option<&LogCtx<ShopOp>>,
) -> ShoppingOutcome {
    let _aggregate_span = enter_span(log, &ShopPhase::Aggregate);
    let agg = aggregate(selections, catalog);
    drop(_aggregate_span);

    for name in agg.skipped() {
        if let Some(ctx) = log {
            ctx.debug_kv("selection skipped: unknown recipe", [("recipe", name.clone())]);
        }
        if let Err(err) = current_sink().on_event(&OutputEvent::SelectionSkipped { recipe: name.as_str() }) {
            tracing::warn!(error = %err, "failed to record skipped selection");
        }
    }

    let _present_span = enter_span(log, &ShopPhase::Present);
    let rows = build_list(&agg);
    drop(_present_span);

    ShoppingOutcome { rows, skipped: agg.skipped().to_vec() }
}

fn enter_span(log: Option<&LogCtx<ShopOp>>, phase: &ShopPhase) -> Option<EnteredSpan> {
    log.map(|ctx| ctx.span(phase).entered())
}
