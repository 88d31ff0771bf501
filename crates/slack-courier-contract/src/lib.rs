// crates/slack-courier-contract/src/lib.rs
// ============================================================================
// Module: Slack Courier Contract Library
// Description: Canonical tool catalog and contract shapes for Slack Courier.
// Purpose: Single source of truth for tool names, schemas, and generated docs.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The contract library defines the canonical tool surface exposed over MCP:
//! the stable tool names, their input schemas, and the richer contracts
//! (output schemas, worked examples, usage notes) used to generate the
//! markdown reference. The catalog is pure data; routing and remote calls
//! live in `slack-courier-mcp`.
//!
//! Tool names and schemas are part of the external contract; changes here are
//! breaking changes for callers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod tooling;
pub mod types;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use tooling::required_fields;
pub use tooling::tool_contracts;
pub use tooling::tool_definitions;
pub use tooling::tooling_markdown;
pub use types::ToolContract;
pub use types::ToolDefinition;
pub use types::ToolExample;
pub use types::ToolName;
