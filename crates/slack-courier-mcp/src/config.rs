// slack-courier-mcp/src/config.rs
// ============================================================================
// Module: MCP Configuration (Re-export)
// Description: Re-export canonical Slack Courier config types.
// Purpose: Preserve MCP public API while centralizing config logic.
// Dependencies: slack-courier-config
// ============================================================================

//! ## Overview
//! This module re-exports the canonical configuration model from
//! `slack-courier-config` to keep MCP callers stable while enforcing a single
//! source of truth.

/// Re-export canonical config types and helpers.
pub use slack_courier_config::*;
