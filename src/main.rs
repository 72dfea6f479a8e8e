use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod catalog;
mod export;
mod output;
mod plan;
mod recipes;
mod shopping;
mod telemetry;
#[cfg(feature = "http-server")]
mod server;
#[cfg(feature = "mcp-server")]
mod mcp;

const DEFAULT_CATALOG: &str = "recipe_db.json";

#[derive(Parser)]
#[command(name = "meal", about = "Recipe catalog and shopping-list planner")]
struct Cli {
    /// Recipe catalog (JSON array); falls back to MEAL_CATALOG, then ./recipe_db.json
    #[arg(global = true, short, long)]
    catalog: Option<PathBuf>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List or search recipes
    Recipes(recipes::RecipesCmd),
    /// Build the aggregated shopping list for selected recipes
    Shop(shopping::ShopCmd),
    /// Check how far the selections cover a meal plan
    Plan(plan::PlanCmd),
    /// Render the shopping list as a Markdown checklist
    Export(export::ExportCmd),
    /// Serve the catalog and shopping list over HTTP
    #[cfg(feature = "http-server")]
    Serve(server::ServeCmd),
    /// Serve the catalog and shopping list as MCP tools over stdio
    #[cfg(feature = "mcp-server")]
    Mcp(mcp::McpCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and MEAL_LOG_FORMAT
    telemetry::config::init_tracing();
    let catalog_path = cli
        .catalog
        .or_else(|| env::var_os("MEAL_CATALOG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG));

    match cli.command {
        Commands::Recipes(args) => recipes::run(&catalog_path, args).await?,
        Commands::Shop(args) => shopping::run(&catalog_path, args).await?,
        Commands::Plan(args) => plan::run(&catalog_path, args).await?,
        Commands::Export(args) => export::run(&catalog_path, args).await?,
        #[cfg(feature = "http-server")]
        Commands::Serve(args) => server::run(&catalog_path, args).await?,
        #[cfg(feature = "mcp-server")]
        Commands::Mcp(args) => mcp::run(&catalog_path, args).await?,
    }

    Ok(())
}
