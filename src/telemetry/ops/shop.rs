use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Shop;

#[derive(Copy, Clone, Debug)]
pub enum Phase { ReadSelections, LoadCatalog, Aggregate, Present, Output }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::ReadSelections => "read_selections",
        Phase::LoadCatalog => "load_catalog",
        Phase::Aggregate => "aggregate",
        Phase::Present => "present",
        Phase::Output => "output",
    }}
    fn span(&self) -> Span { match self {
        Phase::ReadSelections => info_span!("read_selections"),
        Phase::LoadCatalog => info_span!("load_catalog"),
        Phase::Aggregate => info_span!("aggregate"),
        Phase::Present => info_span!("present"),
        Phase::Output => info_span!("output"),
    }}
}

impl OpMarker for Shop {
    const NAME: &'static str = "shop";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("shop") }
}
