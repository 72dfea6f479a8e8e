use std::env;

/// How a result envelope is written to stdout. Envelopes only reach stdout in
/// `--json` mode; human-readable output goes through the log instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    /// JSON-RPC style `notifications/result` frame
    Mcp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        Self::parse(
            env::var("MEAL_OUTPUT_FORMAT").ok().as_deref(),
            env::var("MEAL_OUTPUT_PRETTY").ok().as_deref(),
        )
    }

    /// `MEAL_OUTPUT_FORMAT=mcp` picks the notification frame, anything else plain JSON.
    pub fn parse(format: Option<&str>, pretty: Option<&str>) -> Self {
        let format = match format.map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("mcp") => OutputFormat::Mcp,
            _ => OutputFormat::Json,
        };
        let pretty = pretty
            .map(str::trim)
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"));
        OutputConfig { format, pretty }
    }
}
