use std::io::{self, Write};

use serde::Serialize;
use serde_json::{json, Value};

use super::config::{OutputConfig, OutputFormat};
use super::types::Envelope;

/// Writes one result envelope per line (or one pretty block) in the configured frame.
#[derive(Debug, Clone, Copy)]
pub struct Emitter {
    cfg: OutputConfig,
}

impl Emitter {
    pub fn new(cfg: OutputConfig) -> Self { Emitter { cfg } }

    pub fn emit(&self, env: &Envelope) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_to(env, &mut out)?;
        out.flush()
    }

    pub fn write_to<W: Write>(&self, env: &Envelope, w: &mut W) -> io::Result<()> {
        match self.cfg.format {
            OutputFormat::Json => self.write_value(env, w),
            OutputFormat::Mcp => self.write_value(&notification(env), w),
        }
    }

    fn write_value<T: Serialize, W: Write>(&self, value: &T, w: &mut W) -> io::Result<()> {
        if self.cfg.pretty {
            serde_json::to_writer_pretty(&mut *w, value)?;
        } else {
            serde_json::to_writer(&mut *w, value)?;
        }
        writeln!(w)
    }
}

fn notification(env: &Envelope) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "notifications/result",
        "params": {
            "schema_version": env.schema_version,
            "request_id": env.request_id,
            "op": env.op,
            "result": env.result,
        }
    })
}
