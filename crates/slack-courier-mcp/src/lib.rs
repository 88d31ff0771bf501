// slack-courier-mcp/src/lib.rs
// ============================================================================
// Module: Slack Courier MCP
// Description: MCP server and Slack Web API adapter for Slack Courier.
// Purpose: Provide MCP tool routing over the Slack Web API.
// Dependencies: slack-courier-config, slack-courier-contract, axum, tokio
// ============================================================================

//! ## Overview
//! Slack Courier MCP exposes a small Slack workspace surface through MCP
//! tools: channel listing, message posting, thread replies, reactions, and
//! user lookups. All tools are thin passthrough adapters over the Slack Web
//! API; the router folds tool failures into result envelopes so transports
//! only ever fail on protocol-shape faults.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod config;
pub mod server;
pub mod slack;
pub mod telemetry;
pub mod tools;

#[cfg(test)]
mod tests {
    //! Test-only lint relaxations for panic-based assertions and debug output.
    #![allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only output and panic-based assertions are permitted."
    )]
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::McpAuditEvent;
pub use audit::McpAuditSink;
pub use audit::McpFileAuditSink;
pub use audit::McpNoopAuditSink;
pub use audit::McpStderrAuditSink;
pub use audit::build_audit_sink;
pub use config::CourierConfig;
pub use server::McpServer;
pub use server::McpServerError;
pub use slack::SlackClient;
pub use slack::SlackClientError;
pub use telemetry::MCP_LATENCY_BUCKETS_MS;
pub use telemetry::McpMethod;
pub use telemetry::McpMetricEvent;
pub use telemetry::McpMetrics;
pub use telemetry::McpOutcome;
pub use telemetry::NoopMetrics;
pub use tools::DispatchOutcome;
pub use tools::ToolError;
pub use tools::ToolRouter;
