#![cfg(feature = "mcp-server")]

use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use rmcp::model::{LoggingLevel, LoggingMessageNotificationParam};
use serde_json::{json, Value};

use crate::output::types::Envelope;
use crate::telemetry::{OutputEvent, OutputSink};

/// Something a tool call produced that the client should hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum Captured {
    Result { op: &'static str, result: Value, duration_ms: Option<u128> },
    Event { kind: &'static str, detail: Value },
}

impl Captured {
    /// Results are `notice`, skipped selections `warning`: the list silently lacks them.
    pub fn into_notification(self) -> LoggingMessageNotificationParam {
        match self {
            Captured::Result { op, result, duration_ms } => LoggingMessageNotificationParam {
                level: LoggingLevel::Notice,
                logger: Some(format!("meal::{op}")),
                data: json!({ "op": op, "result": result, "duration_ms": duration_ms }),
            },
            Captured::Event { kind, detail } => LoggingMessageNotificationParam {
                level: LoggingLevel::Warning,
                logger: Some(format!("meal::event::{kind}")),
                data: detail,
            },
        }
    }
}

/// Stands in for stdout while the MCP server runs: envelopes and events are
/// buffered and drained after each tool call.
#[derive(Default, Debug)]
pub struct McpSink {
    captured: Mutex<Vec<Captured>>,
}

impl McpSink {
    pub fn new() -> Self { Self::default() }

    pub fn drain(&self) -> Vec<Captured> {
        std::mem::take(&mut *self.captured.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push(&self, item: Captured) {
        self.captured.lock().unwrap_or_else(PoisonError::into_inner).push(item);
    }
}

impl OutputSink for McpSink {
    fn on_result(&self, env: &Envelope) -> Result<()> {
        self.push(Captured::Result {
            op: env.op,
            result: env.result.clone(),
            duration_ms: env.meta.map(|m| m.duration_ms),
        });
        Ok(())
    }

    fn on_event(&self, event: &OutputEvent<'_>) -> Result<()> {
        self.push(Captured::Event { kind: event.kind(), detail: serde_json::to_value(event)? });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::types::Meta;

    #[test]
    fn results_become_notice_notifications() {
        let sink = McpSink::new();
        let env = Envelope::result("shop", &json!([{"type": "category", "name": "Dry"}]), Some(Meta { duration_ms: 3 })).unwrap();
        sink.on_result(&env).unwrap();

        let mut captured = sink.drain();
        assert_eq!(captured.len(), 1);
        assert!(sink.drain().is_empty());

        let note = captured.remove(0).into_notification();
        assert!(matches!(note.level, LoggingLevel::Notice));
        assert_eq!(note.logger.as_deref(), Some("meal::shop"));
        assert_eq!(note.data["result"][0]["name"], "Dry");
        assert_eq!(note.data["duration_ms"], 3);
    }

    #[test]
    fn skipped_selection_names_the_recipe() {
        let sink = McpSink::new();
        sink.on_event(&OutputEvent::SelectionSkipped { recipe: "Lasagna" }).unwrap();
        let note = sink.drain().remove(0).into_notification();
        assert!(matches!(note.level, LoggingLevel::Warning));
        assert_eq!(note.logger.as_deref(), Some("meal::event::selection_skipped"));
        assert_eq!(note.data, json!({"kind": "selection_skipped", "recipe": "Lasagna"}));
    }
}
