#![cfg(feature = "mcp-server")]

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::{
    ErrorData as McpError,
    ServiceExt,
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam,
        CallToolResult,
        Implementation,
        ListToolsResult,
        PaginatedRequestParam,
        ProtocolVersion,
        ServerCapabilities,
        ServerInfo,
    },
    service::{Peer, QuitReason, RequestContext, RoleServer},
};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::mcp::adapter::McpSink;
use crate::mcp::tools;
use crate::telemetry::{install_sink, OutputSink};

use super::McpCmd;

const DEFAULT_MAX_CONCURRENCY: usize = 2;

/// `--max-concurrency`, then `MCP_MAX_CONCURRENCY`, then the default; never below one.
pub(crate) fn resolve_concurrency(flag: Option<usize>, env: Option<&str>) -> usize {
    flag.or_else(|| env.and_then(|v| v.trim().parse().ok()))
        .unwrap_or(DEFAULT_MAX_CONCURRENCY)
        .max(1)
}

struct Shared {
    catalog_path: PathBuf,
    sink: Arc<McpSink>,
    permits: Semaphore,
}

#[derive(Clone)]
struct MealMcpServer {
    shared: Arc<Shared>,
}

impl MealMcpServer {
    fn new(catalog_path: PathBuf, max_concurrency: usize) -> Self {
        let shared = Shared {
            catalog_path,
            sink: Arc::new(McpSink::new()),
            permits: Semaphore::new(max_concurrency),
        };
        MealMcpServer { shared: Arc::new(shared) }
    }

    async fn call(
        &self,
        request: CallToolRequestParam,
        ct: CancellationToken,
        peer: Peer<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let _permit = self.shared.permits.acquire().await.map_err(|err| {
            McpError::internal_error(format!("tool permits closed: {err}"), None)
        })?;
        let tool = request.name.clone();
        let result = tools::handle_call(&self.shared.catalog_path, &ct, request).await;
        self.forward_captured(&peer).await;
        if let Err(err) = &result {
            tracing::debug!(target: "meal::mcp", tool = %tool, error = %err.message, "tool call failed");
        }
        result
    }

    async fn forward_captured(&self, peer: &Peer<RoleServer>) {
        for item in self.shared.sink.drain() {
            if let Err(err) = peer.notify_logging_message(item.into_notification()).await {
                tracing::warn!(target: "meal::mcp", error = %err, "could not forward notification");
            }
        }
    }
}

fn server_info() -> ServerInfo {
    ServerInfo {
        protocol_version: ProtocolVersion::LATEST,
        capabilities: ServerCapabilities::builder().enable_tools().build(),
        server_info: Implementation {
            name: "meal".to_string(),
            title: Some("Meal planner".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            icons: None,
            website_url: None,
        },
        instructions: Some(
            "Search the recipe catalog, check meal-plan coverage and build scaled shopping lists. \
             All tools are read-only."
                .to_string(),
        ),
    }
}

impl ServerHandler for MealMcpServer {
    fn get_info(&self) -> ServerInfo { server_info() }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move { Ok(ListToolsResult::with_all_items(tools::tool_catalog())) }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let server = self.clone();
        async move { server.call(request, context.ct, context.peer).await }
    }
}

pub async fn run_server(catalog_path: PathBuf, cmd: McpCmd) -> Result<()> {
    let env_limit = std::env::var("MCP_MAX_CONCURRENCY").ok();
    let max_concurrency = resolve_concurrency(cmd.max_concurrency, env_limit.as_deref());
    let server = MealMcpServer::new(catalog_path, max_concurrency);

    // envelopes must never reach stdout: it carries the protocol
    let sink: Arc<dyn OutputSink> = server.shared.sink.clone();
    let _sink_guard = install_sink(sink);

    tracing::info!(target: "meal::mcp", max_concurrency, "serving MCP over stdio");
    let running = server
        .serve((tokio::io::stdin(), tokio::io::stdout()))
        .await
        .context("start MCP server")?;

    match running.waiting().await.context("MCP server task")? {
        QuitReason::JoinError(err) => Err(anyhow::Error::from(err).context("MCP server task aborted")),
        QuitReason::Closed => {
            tracing::info!(target: "meal::mcp", "client closed the transport");
            Ok(())
        }
        _ => {
            tracing::info!(target: "meal::mcp", "MCP server cancelled");
            Ok(())
        }
    }
}
