use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Recipes;

#[derive(Copy, Clone, Debug)]
pub enum Phase { LoadCatalog, Filter, Output }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::LoadCatalog => "load_catalog",
        Phase::Filter => "filter",
        Phase::Output => "output",
    }}
    fn span(&self) -> Span { match self {
        Phase::LoadCatalog => info_span!("load_catalog"),
        Phase::Filter => info_span!("filter"),
        Phase::Output => info_span!("output"),
    }}
}

impl OpMarker for Recipes {
    const NAME: &'static str = "recipes";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("recipes") }
}
