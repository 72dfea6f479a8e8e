use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use anyhow::Result;
use serde::Serialize;

use crate::output::config::OutputConfig;
use crate::output::types::Envelope;
use crate::output::Emitter;

/// Out-of-band notices raised while a list is being built.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputEvent<'a> {
    /// A selection named no catalog recipe and contributed nothing.
    SelectionSkipped { recipe: &'a str },
}

impl OutputEvent<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            OutputEvent::SelectionSkipped { .. } => "selection_skipped",
        }
    }
}

/// Where result envelopes and events go: stdout for the CLI, the MCP peer
/// while the MCP server runs.
pub trait OutputSink: Send + Sync {
    fn on_result(&self, env: &Envelope) -> Result<()>;

    fn on_event(&self, _event: &OutputEvent<'_>) -> Result<()> {
        Ok(())
    }
}

/// Writes envelopes to stdout; events are dropped (they are already in the log).
#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn on_result(&self, env: &Envelope) -> Result<()> {
        Emitter::new(OutputConfig::from_env()).emit(env)?;
        Ok(())
    }
}

type DynSink = Arc<dyn OutputSink>;

/// Installed sinks, innermost last. Empty means stdout.
fn installed() -> &'static RwLock<Vec<DynSink>> {
    static STACK: OnceLock<RwLock<Vec<DynSink>>> = OnceLock::new();
    STACK.get_or_init(|| RwLock::new(Vec::new()))
}

pub fn current_sink() -> DynSink {
    let stack = installed().read().unwrap_or_else(PoisonError::into_inner);
    match stack.last() {
        Some(sink) => sink.clone(),
        None => Arc::new(StdoutSink),
    }
}

/// Removes its sink from the stack when dropped, whatever the drop order.
#[must_use = "the sink is uninstalled as soon as the guard is dropped"]
pub struct SinkGuard {
    sink: DynSink,
}

pub fn install_sink(sink: DynSink) -> SinkGuard {
    installed()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(sink.clone());
    SinkGuard { sink }
}

impl Drop for SinkGuard {
    fn drop(&mut self) {
        let mut stack = installed().write().unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = stack.iter().rposition(|s| Arc::ptr_eq(s, &self.sink)) {
            stack.remove(pos);
        }
    }
}
