// crates/slack-courier-contract/src/tooling.rs
// ============================================================================
// Module: Tool Catalog
// Description: Canonical tool contracts and schemas for Slack Courier.
// Purpose: Provide tool contracts for MCP listing and the markdown reference.
// Dependencies: serde_json, slack-courier-contract::types
// ============================================================================

//! ## Overview
//! This module defines the canonical tool surface. Tool contracts drive the
//! MCP `tools/list` response and generate the markdown reference emitted by
//! `slack-courier tools`. Input schemas mirror what the dispatcher enforces;
//! output schemas describe the Slack response body that is passed through
//! verbatim as the tool result.
//!
//! Tool inputs are untrusted caller data; schemas document the contract but
//! enforcement happens in the dispatcher.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Value;
use serde_json::json;

use crate::types::ToolContract;
// ============================================================================
// SECTION: Re-Exports
// ============================================================================
/// Tool definition shape used by MCP tool listings.
pub use crate::types::ToolDefinition;
use crate::types::ToolExample;
use crate::types::ToolName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default page size for `list_channels` and `get_users`.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Upper bound applied to `list_channels` and `get_users` page sizes.
///
/// Out-of-range limits are clamped here, never rejected.
pub const MAX_PAGE_LIMIT: u32 = 200;

/// Default message count for `get_channel_history`.
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Channel identifier used across contract examples.
const EXAMPLE_CHANNEL_ID: &str = "C0123456789";

/// User identifier used across contract examples.
const EXAMPLE_USER_ID: &str = "U0123456789";

/// Message timestamp used across contract examples.
const EXAMPLE_MESSAGE_TS: &str = "1712345678.000200";

/// Thread parent timestamp used across contract examples.
const EXAMPLE_THREAD_TS: &str = "1712345600.000100";

// ============================================================================
// SECTION: Required Arguments
// ============================================================================

/// Returns the required argument names for a tool, in contract order.
///
/// The dispatcher checks these before decoding and names every absent field
/// in its error message; input schemas embed the same slice in `required`.
#[must_use]
pub const fn required_fields(tool: ToolName) -> &'static [&'static str] {
    match tool {
        ToolName::ListChannels | ToolName::GetUsers => &[],
        ToolName::PostMessage => &["channel_id", "text"],
        ToolName::ReplyToThread => &["channel_id", "thread_ts", "text"],
        ToolName::AddReaction => &["channel_id", "timestamp", "reaction"],
        ToolName::GetChannelHistory => &["channel_id"],
        ToolName::GetThreadReplies => &["channel_id", "thread_ts"],
        ToolName::GetUserProfile => &["user_id"],
    }
}

// ============================================================================
// SECTION: Tool Contracts
// ============================================================================

/// Returns the canonical tool contracts.
///
/// The order is intentional: it is preserved in `tools/list` responses and
/// generated docs to keep diffs stable across releases. Append new tools at
/// the end.
#[must_use]
pub fn tool_contracts() -> Vec<ToolContract> {
    vec![
        list_channels_contract(),
        post_message_contract(),
        reply_to_thread_contract(),
        add_reaction_contract(),
        get_channel_history_contract(),
        get_thread_replies_contract(),
        get_users_contract(),
        get_user_profile_contract(),
    ]
}

/// Builds the tool contract for `list_channels`.
fn list_channels_contract() -> ToolContract {
    build_tool_contract(
        ToolName::ListChannels,
        "List public channels in the workspace with pagination.",
        list_channels_input_schema(),
        list_channels_output_schema(),
        tool_examples(ToolName::ListChannels),
        vec![
            "When a static channel allow-list is configured, only those channels are returned, \
             in allow-list order, and next_cursor is always empty."
                .to_string(),
            "In dynamic mode the result is the raw conversations.list body, continuation cursor \
             included."
                .to_string(),
            "limit above 200 is clamped to 200, never rejected; limit 0 is sent upstream as 0."
                .to_string(),
        ],
    )
}

/// Builds the tool contract for `post_message`.
fn post_message_contract() -> ToolContract {
    build_tool_contract(
        ToolName::PostMessage,
        "Post a new message to a Slack channel.",
        post_message_input_schema(),
        chat_post_message_output_schema(),
        tool_examples(ToolName::PostMessage),
        vec![
            "The result is the raw chat.postMessage body; an ok:false body is returned as \
             content, not as a tool error."
                .to_string(),
            "The bot must be a member of the target channel.".to_string(),
        ],
    )
}

/// Builds the tool contract for `reply_to_thread`.
fn reply_to_thread_contract() -> ToolContract {
    build_tool_contract(
        ToolName::ReplyToThread,
        "Reply to a specific message thread in Slack.",
        reply_to_thread_input_schema(),
        chat_post_message_output_schema(),
        tool_examples(ToolName::ReplyToThread),
        vec![
            "thread_ts identifies the thread parent; replying to a reply attaches to the same \
             thread."
                .to_string(),
            "The result is the raw chat.postMessage body.".to_string(),
        ],
    )
}

/// Builds the tool contract for `add_reaction`.
fn add_reaction_contract() -> ToolContract {
    build_tool_contract(
        ToolName::AddReaction,
        "Add an emoji reaction to a message.",
        add_reaction_input_schema(),
        add_reaction_output_schema(),
        tool_examples(ToolName::AddReaction),
        vec![
            "reaction is the bare emoji name, for example thumbsup, without surrounding colons."
                .to_string(),
            "Reacting twice with the same emoji surfaces Slack's already_reacted error inside \
             the body."
                .to_string(),
        ],
    )
}

/// Builds the tool contract for `get_channel_history`.
fn get_channel_history_contract() -> ToolContract {
    build_tool_contract(
        ToolName::GetChannelHistory,
        "Get recent messages from a channel.",
        get_channel_history_input_schema(),
        conversation_messages_output_schema(),
        tool_examples(ToolName::GetChannelHistory),
        vec![
            "Messages arrive newest first, as conversations.history returns them.".to_string(),
            "limit defaults to 10 and is sent upstream unmodified.".to_string(),
        ],
    )
}

/// Builds the tool contract for `get_thread_replies`.
fn get_thread_replies_contract() -> ToolContract {
    build_tool_contract(
        ToolName::GetThreadReplies,
        "Get all replies in a message thread.",
        get_thread_replies_input_schema(),
        conversation_messages_output_schema(),
        tool_examples(ToolName::GetThreadReplies),
        vec![
            "The thread parent is included as the first element of messages.".to_string(),
        ],
    )
}

/// Builds the tool contract for `get_users`.
fn get_users_contract() -> ToolContract {
    build_tool_contract(
        ToolName::GetUsers,
        "Get a list of workspace users with basic profile information.",
        get_users_input_schema(),
        get_users_output_schema(),
        tool_examples(ToolName::GetUsers),
        vec![
            "Deleted and bot users are included exactly as users.list reports them.".to_string(),
            "limit above 200 is clamped to 200; continue paging via \
             response_metadata.next_cursor."
                .to_string(),
        ],
    )
}

/// Builds the tool contract for `get_user_profile`.
fn get_user_profile_contract() -> ToolContract {
    build_tool_contract(
        ToolName::GetUserProfile,
        "Get detailed profile information for a specific user.",
        get_user_profile_input_schema(),
        get_user_profile_output_schema(),
        tool_examples(ToolName::GetUserProfile),
        vec![
            "Custom profile field labels are always included (include_labels is set upstream)."
                .to_string(),
        ],
    )
}

/// Assembles a [`ToolContract`] from its parts.
fn build_tool_contract(
    name: ToolName,
    description: &str,
    input_schema: Value,
    output_schema: Value,
    examples: Vec<ToolExample>,
    notes: Vec<String>,
) -> ToolContract {
    ToolContract {
        name,
        description: description.to_string(),
        input_schema,
        output_schema,
        examples,
        notes,
    }
}

/// Returns the MCP tool definitions for tool listing.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    let contracts = tool_contracts();
    let mut definitions = Vec::with_capacity(contracts.len());
    for contract in contracts {
        definitions.push(ToolDefinition {
            name: contract.name,
            description: contract.description,
            input_schema: contract.input_schema,
        });
    }
    definitions
}

/// Builds markdown documentation for the tool contracts.
#[must_use]
pub fn tooling_markdown(contracts: &[ToolContract]) -> String {
    let mut out = String::new();
    out.push_str("# Slack Courier MCP Tools\n\n");
    out.push_str("This document summarizes the MCP tool surface and expected usage. ");
    out.push_str("Every tool returns a single text content block whose payload is the ");
    out.push_str("serialized Slack response body, or a serialized `{\"error\": ...}` object ");
    out.push_str("when dispatch fails.\n\n");
    out.push_str("## Usage quickstart\n\n");
    out.push_str("- `list_channels` enumerates the channel surface (allow-list or paged).\n");
    out.push_str("- `post_message` and `reply_to_thread` write into a channel or thread.\n");
    out.push_str("- `add_reaction` decorates an existing message.\n");
    out.push_str("- `get_channel_history` and `get_thread_replies` read conversations.\n");
    out.push_str("- `get_users` and `get_user_profile` resolve workspace members.\n\n");
    out.push_str("| Tool | Description |\n");
    out.push_str("| --- | --- |\n");
    for contract in contracts {
        out.push_str("| ");
        out.push_str(contract.name.as_str());
        out.push_str(" | ");
        out.push_str(&contract.description);
        out.push_str(" |\n");
    }
    out.push('\n');
    for contract in contracts {
        out.push_str("## ");
        out.push_str(contract.name.as_str());
        out.push('\n');
        out.push('\n');
        out.push_str(contract.description.as_str());
        out.push('\n');
        out.push('\n');
        out.push_str("### Inputs\n\n");
        render_schema_fields(&mut out, &contract.input_schema);
        out.push('\n');
        out.push_str("### Outputs\n\n");
        render_schema_fields(&mut out, &contract.output_schema);
        out.push('\n');
        if !contract.notes.is_empty() {
            out.push_str("### Notes\n\n");
            for note in &contract.notes {
                out.push_str("- ");
                out.push_str(note);
                out.push('\n');
            }
            out.push('\n');
        }
        append_tool_examples(&mut out, &contract.examples);
    }
    out
}

// ============================================================================
// SECTION: Tooling Markdown Helpers
// ============================================================================

/// Render top-level schema fields as markdown bullet points.
fn render_schema_fields(out: &mut String, schema: &Value) {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        out.push_str("_No fields._\n");
        return;
    };
    let required = required_field_set(schema);
    let mut keys: Vec<&String> = properties.keys().collect();
    keys.sort();
    for key in keys {
        let value = &properties[key];
        let required_label = if required.contains(key) { "required" } else { "optional" };
        let description = schema_description(value)
            .unwrap_or_else(|| String::from("See schema for details."));
        out.push_str("- `");
        out.push_str(key);
        out.push_str("` (");
        out.push_str(required_label);
        out.push_str("): ");
        out.push_str(&description);
        out.push('\n');
    }
}

/// Collect required field names from a JSON schema object.
fn required_field_set(schema: &Value) -> BTreeSet<String> {
    let mut required = BTreeSet::new();
    if let Some(items) = schema.get("required").and_then(Value::as_array) {
        for item in items {
            if let Some(field) = item.as_str() {
                required.insert(field.to_string());
            }
        }
    }
    required
}

/// Extract a description from a schema if present.
fn schema_description(schema: &Value) -> Option<String> {
    schema.get("description").and_then(Value::as_str).map(str::to_string)
}

/// Append example input/output payloads for a tool, if defined.
fn append_tool_examples(out: &mut String, examples: &[ToolExample]) {
    if examples.is_empty() {
        return;
    }
    out.push_str("### Example\n\n");
    for (idx, example) in examples.iter().enumerate() {
        if examples.len() > 1 {
            out.push_str("Example ");
            out.push_str(&(idx + 1).to_string());
            out.push_str(": ");
        }
        out.push_str(&example.description);
        out.push('\n');
        out.push('\n');
        out.push_str("Input:\n");
        render_json_block(out, &example.input);
        out.push_str("Output:\n");
        render_json_block(out, &example.output);
    }
}

/// Render a JSON value in a fenced markdown code block.
fn render_json_block(out: &mut String, value: &Value) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| String::from("{}"));
    out.push_str("```json\n");
    out.push_str(&rendered);
    out.push_str("\n```\n");
}

// ============================================================================
// SECTION: Schema Helpers
// ============================================================================

/// Returns a JSON schema for strings.
fn schema_for_string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description
    })
}

/// Returns a JSON schema for numeric page limits with a default.
fn schema_for_limit(description: &str, default: u32) -> Value {
    json!({
        "type": "number",
        "description": description,
        "default": default
    })
}

/// Returns a JSON schema for a Slack response body with known top-level keys.
///
/// Passthrough results are never reshaped, so only `ok` is required; the
/// property map documents the keys Slack is known to return.
fn schema_for_slack_response(description: &str, properties: Value) -> Value {
    json!({
        "type": "object",
        "description": description,
        "properties": properties,
        "required": ["ok"]
    })
}

// ============================================================================
// SECTION: Input Schemas
// ============================================================================

/// Input schema for `list_channels`.
fn list_channels_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "limit": schema_for_limit(
                "Maximum number of channels to return (default 100, max 200)",
                DEFAULT_PAGE_LIMIT
            ),
            "cursor": schema_for_string("Pagination cursor for the next page of results")
        }
    })
}

/// Input schema for `post_message`.
fn post_message_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "channel_id": schema_for_string("The ID of the channel to post to"),
            "text": schema_for_string("The message text to post")
        },
        "required": required_fields(ToolName::PostMessage)
    })
}

/// Input schema for `reply_to_thread`.
fn reply_to_thread_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "channel_id": schema_for_string("The ID of the channel containing the thread"),
            "thread_ts": schema_for_string(
                "Timestamp of the parent message in the format '1234567890.123456'"
            ),
            "text": schema_for_string("The reply text")
        },
        "required": required_fields(ToolName::ReplyToThread)
    })
}

/// Input schema for `add_reaction`.
fn add_reaction_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "channel_id": schema_for_string("The ID of the channel containing the message"),
            "timestamp": schema_for_string("Timestamp of the message to react to"),
            "reaction": schema_for_string("Emoji name without colons")
        },
        "required": required_fields(ToolName::AddReaction)
    })
}

/// Input schema for `get_channel_history`.
fn get_channel_history_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "channel_id": schema_for_string("The ID of the channel"),
            "limit": schema_for_limit(
                "Number of messages to retrieve (default 10)",
                DEFAULT_HISTORY_LIMIT
            )
        },
        "required": required_fields(ToolName::GetChannelHistory)
    })
}

/// Input schema for `get_thread_replies`.
fn get_thread_replies_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "channel_id": schema_for_string("The ID of the channel containing the thread"),
            "thread_ts": schema_for_string(
                "Timestamp of the parent message in the format '1234567890.123456'"
            )
        },
        "required": required_fields(ToolName::GetThreadReplies)
    })
}

/// Input schema for `get_users`.
fn get_users_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "cursor": schema_for_string("Pagination cursor for the next page of results"),
            "limit": schema_for_limit(
                "Maximum number of users to return (default 100, max 200)",
                DEFAULT_PAGE_LIMIT
            )
        }
    })
}

/// Input schema for `get_user_profile`.
fn get_user_profile_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": schema_for_string("The ID of the user")
        },
        "required": required_fields(ToolName::GetUserProfile)
    })
}

// ============================================================================
// SECTION: Output Schemas
// ============================================================================

/// Output schema for `list_channels` (both modes share this shape).
fn list_channels_output_schema() -> Value {
    schema_for_slack_response(
        "Channel listing body; synthesized in static allow-list mode, raw conversations.list \
         otherwise.",
        json!({
            "ok": { "type": "boolean", "description": "True when the listing succeeded" },
            "channels": {
                "type": "array",
                "items": { "type": "object" },
                "description": "Channel objects in catalog order"
            },
            "response_metadata": {
                "type": "object",
                "description": "Pagination metadata; next_cursor is empty when no further pages \
                                exist and always empty in static allow-list mode"
            }
        }),
    )
}

/// Output schema shared by `post_message` and `reply_to_thread`.
fn chat_post_message_output_schema() -> Value {
    schema_for_slack_response(
        "Raw chat.postMessage response body.",
        json!({
            "ok": { "type": "boolean", "description": "True when the message was posted" },
            "channel": { "type": "string", "description": "Channel that received the message" },
            "ts": { "type": "string", "description": "Timestamp assigned to the new message" },
            "message": { "type": "object", "description": "Posted message object" }
        }),
    )
}

/// Output schema for `add_reaction`.
fn add_reaction_output_schema() -> Value {
    schema_for_slack_response(
        "Raw reactions.add response body.",
        json!({
            "ok": { "type": "boolean", "description": "True when the reaction was added" }
        }),
    )
}

/// Output schema shared by `get_channel_history` and `get_thread_replies`.
fn conversation_messages_output_schema() -> Value {
    schema_for_slack_response(
        "Raw conversation messages body.",
        json!({
            "ok": { "type": "boolean", "description": "True when the read succeeded" },
            "messages": {
                "type": "array",
                "items": { "type": "object" },
                "description": "Message objects as Slack returns them"
            },
            "has_more": {
                "type": "boolean",
                "description": "True when further messages exist beyond this page"
            }
        }),
    )
}

/// Output schema for `get_users`.
fn get_users_output_schema() -> Value {
    schema_for_slack_response(
        "Raw users.list response body.",
        json!({
            "ok": { "type": "boolean", "description": "True when the listing succeeded" },
            "members": {
                "type": "array",
                "items": { "type": "object" },
                "description": "User objects as Slack returns them"
            },
            "response_metadata": {
                "type": "object",
                "description": "Pagination metadata carrying next_cursor"
            }
        }),
    )
}

/// Output schema for `get_user_profile`.
fn get_user_profile_output_schema() -> Value {
    schema_for_slack_response(
        "Raw users.profile.get response body.",
        json!({
            "ok": { "type": "boolean", "description": "True when the profile was fetched" },
            "profile": { "type": "object", "description": "Profile fields for the user" }
        }),
    )
}

// ============================================================================
// SECTION: Example Payloads
// ============================================================================

/// Return example payloads for a tool.
fn tool_examples(tool_name: ToolName) -> Vec<ToolExample> {
    match tool_name {
        ToolName::ListChannels => list_channels_examples(),
        ToolName::PostMessage => post_message_examples(),
        ToolName::ReplyToThread => reply_to_thread_examples(),
        ToolName::AddReaction => add_reaction_examples(),
        ToolName::GetChannelHistory => get_channel_history_examples(),
        ToolName::GetThreadReplies => get_thread_replies_examples(),
        ToolName::GetUsers => get_users_examples(),
        ToolName::GetUserProfile => get_user_profile_examples(),
    }
}

/// Returns example payloads for `list_channels`.
fn list_channels_examples() -> Vec<ToolExample> {
    vec![ToolExample {
        description: String::from("List the first page of public channels."),
        input: json!({ "limit": 2 }),
        output: json!({
            "ok": true,
            "channels": [
                { "id": EXAMPLE_CHANNEL_ID, "name": "general", "is_archived": false },
                { "id": "C0123456790", "name": "deploys", "is_archived": false }
            ],
            "response_metadata": { "next_cursor": "dGVhbTpDMDEyMzQ1Njc5MQ==" }
        }),
    }]
}

/// Returns example payloads for `post_message`.
fn post_message_examples() -> Vec<ToolExample> {
    vec![ToolExample {
        description: String::from("Post a deploy notification."),
        input: json!({ "channel_id": EXAMPLE_CHANNEL_ID, "text": "Deploy finished." }),
        output: json!({
            "ok": true,
            "channel": EXAMPLE_CHANNEL_ID,
            "ts": EXAMPLE_MESSAGE_TS,
            "message": { "text": "Deploy finished." }
        }),
    }]
}

/// Returns example payloads for `reply_to_thread`.
fn reply_to_thread_examples() -> Vec<ToolExample> {
    vec![ToolExample {
        description: String::from("Reply inside an incident thread."),
        input: json!({
            "channel_id": EXAMPLE_CHANNEL_ID,
            "thread_ts": EXAMPLE_THREAD_TS,
            "text": "Taking a look."
        }),
        output: json!({
            "ok": true,
            "channel": EXAMPLE_CHANNEL_ID,
            "ts": EXAMPLE_MESSAGE_TS,
            "message": { "thread_ts": EXAMPLE_THREAD_TS, "text": "Taking a look." }
        }),
    }]
}

/// Returns example payloads for `add_reaction`.
fn add_reaction_examples() -> Vec<ToolExample> {
    vec![ToolExample {
        description: String::from("Acknowledge a message with a thumbsup."),
        input: json!({
            "channel_id": EXAMPLE_CHANNEL_ID,
            "timestamp": EXAMPLE_MESSAGE_TS,
            "reaction": "thumbsup"
        }),
        output: json!({ "ok": true }),
    }]
}

/// Returns example payloads for `get_channel_history`.
fn get_channel_history_examples() -> Vec<ToolExample> {
    vec![ToolExample {
        description: String::from("Fetch the most recent channel message."),
        input: json!({ "channel_id": EXAMPLE_CHANNEL_ID, "limit": 1 }),
        output: json!({
            "ok": true,
            "messages": [
                { "ts": EXAMPLE_MESSAGE_TS, "user": EXAMPLE_USER_ID, "text": "Deploy finished." }
            ],
            "has_more": true,
            "response_metadata": { "next_cursor": "bmV4dF90czoxNzEyMzQ1Njcw" }
        }),
    }]
}

/// Returns example payloads for `get_thread_replies`.
fn get_thread_replies_examples() -> Vec<ToolExample> {
    vec![ToolExample {
        description: String::from("Read a thread including its parent."),
        input: json!({ "channel_id": EXAMPLE_CHANNEL_ID, "thread_ts": EXAMPLE_THREAD_TS }),
        output: json!({
            "ok": true,
            "messages": [
                { "ts": EXAMPLE_THREAD_TS, "text": "Deploy finished." },
                { "ts": EXAMPLE_MESSAGE_TS, "thread_ts": EXAMPLE_THREAD_TS, "text": "Taking a look." }
            ],
            "has_more": false
        }),
    }]
}

/// Returns example payloads for `get_users`.
fn get_users_examples() -> Vec<ToolExample> {
    vec![ToolExample {
        description: String::from("List one user and continue via cursor."),
        input: json!({ "limit": 1 }),
        output: json!({
            "ok": true,
            "members": [
                { "id": EXAMPLE_USER_ID, "name": "sam", "profile": { "real_name": "Sam Reyes" } }
            ],
            "response_metadata": { "next_cursor": "dXNlcjpVMDEyMzQ1Njc5MA==" }
        }),
    }]
}

/// Returns example payloads for `get_user_profile`.
fn get_user_profile_examples() -> Vec<ToolExample> {
    vec![ToolExample {
        description: String::from("Fetch a user's profile fields."),
        input: json!({ "user_id": EXAMPLE_USER_ID }),
        output: json!({
            "ok": true,
            "profile": {
                "real_name": "Sam Reyes",
                "display_name": "sam",
                "email": "sam@example.com"
            }
        }),
    }]
}

#[cfg(test)]
mod tests;
