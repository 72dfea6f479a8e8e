use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Export;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Render, Write }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Render => "render", Phase::Write => "write" } }
    fn span(&self) -> Span { match self { Phase::Render => info_span!("render"), Phase::Write => info_span!("write") } }
}

impl OpMarker for Export {
    const NAME: &'static str = "export";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("export") }
}
