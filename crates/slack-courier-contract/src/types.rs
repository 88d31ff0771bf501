// crates/slack-courier-contract/src/types.rs
// ============================================================================
// Module: Contract Types
// Description: Tool identifiers and contract shapes for Slack Courier.
// Purpose: Provide canonical shapes for tool listing, dispatch, and docs.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the typed contract shapes serialized to MCP clients:
//! the [`ToolName`] identifier enum and the definition/contract/example
//! structures built from it. The eight tool names are stable wire identifiers;
//! [`ToolName::all`] fixes their canonical order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Tool Names
// ============================================================================

/// Canonical tool names for the Slack Courier MCP surface.
///
/// # Invariants
/// - Wire names are the `snake_case` forms of the variants and never change.
/// - [`ToolName::all`] order matches [`crate::tooling::tool_contracts`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// List workspace channels (static allow-list or dynamic paging).
    ListChannels,
    /// Post a new message to a channel.
    PostMessage,
    /// Reply to an existing message thread.
    ReplyToThread,
    /// Add an emoji reaction to a message.
    AddReaction,
    /// Fetch recent messages from a channel.
    GetChannelHistory,
    /// Fetch all replies in a message thread.
    GetThreadReplies,
    /// List workspace users with pagination.
    GetUsers,
    /// Fetch one user's profile.
    GetUserProfile,
}

impl ToolName {
    /// Returns the canonical string name for the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListChannels => "list_channels",
            Self::PostMessage => "post_message",
            Self::ReplyToThread => "reply_to_thread",
            Self::AddReaction => "add_reaction",
            Self::GetChannelHistory => "get_channel_history",
            Self::GetThreadReplies => "get_thread_replies",
            Self::GetUsers => "get_users",
            Self::GetUserProfile => "get_user_profile",
        }
    }

    /// Returns all tool names in canonical catalog order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::ListChannels,
            Self::PostMessage,
            Self::ReplyToThread,
            Self::AddReaction,
            Self::GetChannelHistory,
            Self::GetThreadReplies,
            Self::GetUsers,
            Self::GetUserProfile,
        ]
    }

    /// Parses a tool name from its string representation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "list_channels" => Some(Self::ListChannels),
            "post_message" => Some(Self::PostMessage),
            "reply_to_thread" => Some(Self::ReplyToThread),
            "add_reaction" => Some(Self::AddReaction),
            "get_channel_history" => Some(Self::GetChannelHistory),
            "get_thread_replies" => Some(Self::GetThreadReplies),
            "get_users" => Some(Self::GetUsers),
            "get_user_profile" => Some(Self::GetUserProfile),
            _ => None,
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Tooling Contracts
// ============================================================================

/// Tool definition used by MCP tool listing.
///
/// # Invariants
/// - `name` is a stable MCP tool identifier.
/// - `input_schema` is a JSON Schema payload for the tool input shape and is
///   serialized as `inputSchema` on the wire, matching MCP client expectations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// MCP tool name.
    pub name: ToolName,
    /// Tool description for clients.
    pub description: String,
    /// JSON schema for tool input.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tool contract with full request and response schemas.
///
/// # Invariants
/// - `input_schema` and `output_schema` are JSON Schema payloads.
/// - `examples` validate against the schemas when emitted by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolContract {
    /// Tool name.
    pub name: ToolName,
    /// Tool description.
    pub description: String,
    /// JSON schema for tool input payload.
    pub input_schema: Value,
    /// JSON schema for the Slack response body passed through as the result.
    pub output_schema: Value,
    /// Example payloads for documentation.
    pub examples: Vec<ToolExample>,
    /// Notes describing tool usage and passthrough semantics.
    pub notes: Vec<String>,
}

/// Tool example with input/output payloads.
///
/// # Invariants
/// - `input` and `output` align with the tool schemas when generated by the
///   catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolExample {
    /// Short example description.
    pub description: String,
    /// Example input payload.
    pub input: Value,
    /// Example output payload.
    pub output: Value,
}
