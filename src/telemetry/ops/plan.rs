use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Plan;

#[derive(Copy, Clone, Debug)]
pub enum Phase { ReadSelections, LoadCatalog, Tally, Output }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::ReadSelections => "read_selections",
        Phase::LoadCatalog => "load_catalog",
        Phase::Tally => "tally",
        Phase::Output => "output",
    }}
    fn span(&self) -> Span { match self {
        Phase::ReadSelections => info_span!("read_selections"),
        Phase::LoadCatalog => info_span!("load_catalog"),
        Phase::Tally => info_span!("tally"),
        Phase::Output => info_span!("output"),
    }}
}

impl OpMarker for Plan {
    const NAME: &'static str = "plan";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("plan") }
}
