#![cfg(feature = "mcp-server")]

pub mod server;
pub mod adapter;
pub mod types;
pub mod tools;

pub use cli::{run, McpCmd};

mod cli {
    use std::path::Path;

    use anyhow::Result;
    use clap::Parser;

    #[derive(Debug, Parser, Default)]
    #[command(name = "mcp", about = "Start the MCP server over stdio")]
    pub struct McpCmd {
        #[arg(long, help = "Maximum concurrent MCP tool calls (overrides MCP_MAX_CONCURRENCY)")]
        pub max_concurrency: Option<usize>,
    }

    pub async fn run(catalog_path: &Path, cmd: McpCmd) -> Result<()> {
        super::server::run_server(catalog_path.to_path_buf(), cmd).await
    }
}
