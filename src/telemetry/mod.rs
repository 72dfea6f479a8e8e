pub mod config;
pub mod ctx;
pub mod ops;
pub mod sink;

use ctx::LogCtx;

pub use sink::{current_sink, install_sink, OutputEvent, OutputSink, SinkGuard};

// Factory helpers, one typed context per operation
pub fn recipes() -> LogCtx<ops::recipes::Recipes> { LogCtx::new(config::logs_are_json()) }
pub fn shop() -> LogCtx<ops::shop::Shop> { LogCtx::new(config::logs_are_json()) }
pub fn export() -> LogCtx<ops::export::Export> { LogCtx::new(config::logs_are_json()) }
pub fn serve() -> LogCtx<ops::serve::Serve> { LogCtx::new(config::logs_are_json()) }
pub fn plan() -> LogCtx<ops::plan::Plan> { LogCtx::new(config::logs_are_json()) }
