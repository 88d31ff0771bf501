// slack-courier-mcp/src/tools.rs
// ============================================================================
// Module: Tool Router
// Description: Tool dispatch for MCP requests.
// Purpose: Validate tool arguments and route them to the Slack adapter.
// Dependencies: serde, serde_json, slack-courier-contract, thiserror
// ============================================================================

//! ## Overview
//! The tool router is the single recovery boundary for tool execution. Every
//! dispatch produces a [`DispatchOutcome`] whose text is either the raw Slack
//! response body or a serialized `{"error": ...}` envelope; tool failures
//! never escape as transport errors. Validation runs in a fixed order so
//! callers see deterministic messages: an absent arguments object first, then
//! an unrecognized tool name, then every missing required argument named in
//! one message, then typed decoding, and only then the Slack call.
//!
//! Slack's own `ok:false` bodies count as dispatch success and pass through
//! verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use slack_courier_contract::ToolDefinition;
use slack_courier_contract::ToolName;
use slack_courier_contract::tooling::required_fields;
use thiserror::Error;

use crate::slack::SlackClient;
use crate::slack::SlackClientError;

// ============================================================================
// SECTION: Router
// ============================================================================

/// Tool router for MCP requests.
///
/// # Invariants
/// - Dispatch is infallible; failures fold into the outcome envelope.
#[derive(Clone)]
pub struct ToolRouter {
    /// Slack Web API adapter shared across requests.
    slack: Arc<SlackClient>,
}

/// Outcome of a tool dispatch.
///
/// # Invariants
/// - `text` is a serialized JSON object: a Slack body on success, an
///   `{"error": ...}` envelope on failure.
/// - `error_kind` is `Some` exactly when `text` is an error envelope.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Serialized payload for the MCP text content block.
    pub text: String,
    /// Parsed tool name when recognized.
    pub tool: Option<ToolName>,
    /// Normalized error label when dispatch failed.
    pub error_kind: Option<&'static str>,
}

impl ToolRouter {
    /// Creates a router over a shared Slack client.
    #[must_use]
    pub const fn new(slack: Arc<SlackClient>) -> Self {
        Self { slack }
    }

    /// Lists the MCP tools supported by this server.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        slack_courier_contract::tooling::tool_definitions()
    }

    /// Dispatches a tool call by name with an optional arguments object.
    #[must_use]
    pub fn dispatch(&self, name: &str, arguments: Option<Value>) -> DispatchOutcome {
        let tool = ToolName::parse(name);
        match self.try_dispatch(tool, name, arguments) {
            Ok(body) => DispatchOutcome {
                text: render_json(&body),
                tool,
                error_kind: None,
            },
            Err(error) => DispatchOutcome {
                text: render_error(&error),
                tool,
                error_kind: Some(error.kind()),
            },
        }
    }

    /// Runs the ordered validation steps and the adapter call.
    fn try_dispatch(
        &self,
        tool: Option<ToolName>,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<Value, ToolError> {
        let Some(arguments) = arguments else {
            return Err(ToolError::MissingArguments);
        };
        let Some(tool) = tool else {
            return Err(ToolError::UnknownTool(name.to_string()));
        };
        ensure_required_fields(tool, &arguments)?;
        match tool {
            ToolName::ListChannels => self.handle_list_channels(arguments),
            ToolName::PostMessage => self.handle_post_message(arguments),
            ToolName::ReplyToThread => self.handle_reply_to_thread(arguments),
            ToolName::AddReaction => self.handle_add_reaction(arguments),
            ToolName::GetChannelHistory => self.handle_get_channel_history(arguments),
            ToolName::GetThreadReplies => self.handle_get_thread_replies(arguments),
            ToolName::GetUsers => self.handle_get_users(arguments),
            ToolName::GetUserProfile => self.handle_get_user_profile(arguments),
        }
    }

    /// Handles `list_channels` tool requests.
    fn handle_list_channels(&self, arguments: Value) -> Result<Value, ToolError> {
        let request = decode::<ListChannelsArgs>(arguments)?;
        Ok(self.slack.list_channels(request.limit, request.cursor.as_deref())?)
    }

    /// Handles `post_message` tool requests.
    fn handle_post_message(&self, arguments: Value) -> Result<Value, ToolError> {
        let request = decode::<PostMessageArgs>(arguments)?;
        Ok(self.slack.post_message(&request.channel_id, &request.text)?)
    }

    /// Handles `reply_to_thread` tool requests.
    fn handle_reply_to_thread(&self, arguments: Value) -> Result<Value, ToolError> {
        let request = decode::<ReplyToThreadArgs>(arguments)?;
        Ok(self.slack.post_thread_reply(
            &request.channel_id,
            &request.thread_ts,
            &request.text,
        )?)
    }

    /// Handles `add_reaction` tool requests.
    fn handle_add_reaction(&self, arguments: Value) -> Result<Value, ToolError> {
        let request = decode::<AddReactionArgs>(arguments)?;
        Ok(self.slack.add_reaction(
            &request.channel_id,
            &request.timestamp,
            &request.reaction,
        )?)
    }

    /// Handles `get_channel_history` tool requests.
    fn handle_get_channel_history(&self, arguments: Value) -> Result<Value, ToolError> {
        let request = decode::<GetChannelHistoryArgs>(arguments)?;
        Ok(self.slack.channel_history(&request.channel_id, request.limit)?)
    }

    /// Handles `get_thread_replies` tool requests.
    fn handle_get_thread_replies(&self, arguments: Value) -> Result<Value, ToolError> {
        let request = decode::<GetThreadRepliesArgs>(arguments)?;
        Ok(self.slack.thread_replies(&request.channel_id, &request.thread_ts)?)
    }

    /// Handles `get_users` tool requests.
    fn handle_get_users(&self, arguments: Value) -> Result<Value, ToolError> {
        let request = decode::<GetUsersArgs>(arguments)?;
        Ok(self.slack.list_users(request.limit, request.cursor.as_deref())?)
    }

    /// Handles `get_user_profile` tool requests.
    fn handle_get_user_profile(&self, arguments: Value) -> Result<Value, ToolError> {
        let request = decode::<GetUserProfileArgs>(arguments)?;
        Ok(self.slack.user_profile(&request.user_id)?)
    }
}

// ============================================================================
// SECTION: Argument Payloads
// ============================================================================

/// Arguments for `list_channels`.
#[derive(Debug, Deserialize)]
struct ListChannelsArgs {
    /// Page size; defaults and clamping happen in the adapter.
    limit: Option<u32>,
    /// Continuation cursor from a previous page.
    cursor: Option<String>,
}

/// Arguments for `post_message`.
#[derive(Debug, Deserialize)]
struct PostMessageArgs {
    /// Target channel id.
    channel_id: String,
    /// Message text to post.
    text: String,
}

/// Arguments for `reply_to_thread`.
#[derive(Debug, Deserialize)]
struct ReplyToThreadArgs {
    /// Channel containing the thread.
    channel_id: String,
    /// Timestamp of the thread parent message.
    thread_ts: String,
    /// Reply text to post.
    text: String,
}

/// Arguments for `add_reaction`.
#[derive(Debug, Deserialize)]
struct AddReactionArgs {
    /// Channel containing the message.
    channel_id: String,
    /// Timestamp of the message to react to.
    timestamp: String,
    /// Emoji name without surrounding colons.
    reaction: String,
}

/// Arguments for `get_channel_history`.
#[derive(Debug, Deserialize)]
struct GetChannelHistoryArgs {
    /// Channel to read.
    channel_id: String,
    /// Message count; forwarded unclamped.
    limit: Option<u32>,
}

/// Arguments for `get_thread_replies`.
#[derive(Debug, Deserialize)]
struct GetThreadRepliesArgs {
    /// Channel containing the thread.
    channel_id: String,
    /// Timestamp of the thread parent message.
    thread_ts: String,
}

/// Arguments for `get_users`.
#[derive(Debug, Deserialize)]
struct GetUsersArgs {
    /// Page size; defaults and clamping happen in the adapter.
    limit: Option<u32>,
    /// Continuation cursor from a previous page.
    cursor: Option<String>,
}

/// Arguments for `get_user_profile`.
#[derive(Debug, Deserialize)]
struct GetUserProfileArgs {
    /// User to resolve.
    user_id: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool dispatch errors.
///
/// Rendered messages are part of the tool contract; clients match on them.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Call arrived without an arguments object.
    #[error("no arguments provided")]
    MissingArguments,
    /// Tool name not recognized.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// One or more required arguments absent or null.
    #[error("missing required arguments: {0}")]
    MissingRequiredFields(String),
    /// Arguments present but failed typed decoding.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// Slack client failure.
    #[error(transparent)]
    Slack(#[from] SlackClientError),
}

impl ToolError {
    /// Returns a stable label for audit and metric streams.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingArguments => "missing_arguments",
            Self::UnknownTool(_) => "unknown_tool",
            Self::MissingRequiredFields(_) => "missing_required_fields",
            Self::InvalidArguments(_) => "invalid_arguments",
            Self::Slack(_) => "slack_transport",
        }
    }
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Rejects calls whose required arguments are absent or null, naming every
/// missing field in contract order.
fn ensure_required_fields(tool: ToolName, arguments: &Value) -> Result<(), ToolError> {
    let missing: Vec<&str> = required_fields(tool)
        .iter()
        .copied()
        .filter(|field| arguments.get(field).is_none_or(Value::is_null))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(ToolError::MissingRequiredFields(missing.join(", ")))
}

/// Decodes a JSON value into a typed argument payload.
fn decode<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T, ToolError> {
    serde_json::from_value(payload).map_err(|err| ToolError::InvalidArguments(err.to_string()))
}

// ============================================================================
// SECTION: Rendering Helpers
// ============================================================================

/// Fallback envelope used when result serialization itself fails.
const SERIALIZATION_FALLBACK: &str = "{\"error\":\"serialization failure\"}";

/// Serializes a Slack body for the result content block.
fn render_json(body: &Value) -> String {
    serde_json::to_string(body).unwrap_or_else(|_| String::from(SERIALIZATION_FALLBACK))
}

/// Serializes a dispatch error into the `{"error": ...}` envelope.
fn render_error(error: &ToolError) -> String {
    let envelope = json!({ "error": error.to_string() });
    serde_json::to_string(&envelope).unwrap_or_else(|_| String::from(SERIALIZATION_FALLBACK))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use std::sync::Arc;

    use serde_json::Value;
    use serde_json::json;
    use slack_courier_contract::ToolName;

    use super::ToolRouter;
    use crate::config::SlackConfig;
    use crate::slack::SlackClient;

    // ========================================================================
    // SECTION: Fixtures
    // ========================================================================

    /// Router whose Slack client is never reached by short-circuit paths.
    fn offline_router() -> ToolRouter {
        let client = SlackClient::new(&SlackConfig::default()).expect("client should build");
        ToolRouter::new(Arc::new(client))
    }

    /// Parses an outcome text and returns its `error` message.
    fn error_message(text: &str) -> String {
        let envelope: Value = serde_json::from_str(text).expect("outcome text should be json");
        envelope
            .get("error")
            .and_then(Value::as_str)
            .expect("outcome should carry an error")
            .to_string()
    }

    // ========================================================================
    // SECTION: Validation Order Tests (6 tests)
    // ========================================================================

    #[test]
    fn dispatch_requires_arguments_object() {
        let outcome = offline_router().dispatch("list_channels", None);
        assert_eq!(error_message(&outcome.text), "no arguments provided");
        assert_eq!(outcome.error_kind, Some("missing_arguments"));
        assert_eq!(outcome.tool, Some(ToolName::ListChannels));
    }

    #[test]
    fn dispatch_checks_arguments_before_tool_name() {
        let outcome = offline_router().dispatch("slack_nope", None);
        assert_eq!(error_message(&outcome.text), "no arguments provided");
        assert_eq!(outcome.error_kind, Some("missing_arguments"));
        assert_eq!(outcome.tool, None);
    }

    #[test]
    fn dispatch_reports_unknown_tool_by_name() {
        let outcome = offline_router().dispatch("slack_nope", Some(json!({})));
        assert_eq!(error_message(&outcome.text), "unknown tool: slack_nope");
        assert_eq!(outcome.error_kind, Some("unknown_tool"));
        assert_eq!(outcome.tool, None);
    }

    #[test]
    fn dispatch_names_every_missing_argument() {
        let outcome = offline_router().dispatch("reply_to_thread", Some(json!({ "text": "hi" })));
        assert_eq!(
            error_message(&outcome.text),
            "missing required arguments: channel_id, thread_ts"
        );
        assert_eq!(outcome.error_kind, Some("missing_required_fields"));
    }

    #[test]
    fn dispatch_treats_null_argument_as_missing() {
        let arguments = json!({ "channel_id": null, "text": "hello" });
        let outcome = offline_router().dispatch("post_message", Some(arguments));
        assert_eq!(error_message(&outcome.text), "missing required arguments: channel_id");
        assert_eq!(outcome.error_kind, Some("missing_required_fields"));
    }

    #[test]
    fn dispatch_rejects_wrong_argument_types() {
        let arguments = json!({ "channel_id": "C1", "limit": "ten" });
        let outcome = offline_router().dispatch("get_channel_history", Some(arguments));
        assert!(error_message(&outcome.text).starts_with("invalid arguments:"));
        assert_eq!(outcome.error_kind, Some("invalid_arguments"));
        assert_eq!(outcome.tool, Some(ToolName::GetChannelHistory));
    }

    // ========================================================================
    // SECTION: Catalog Tests (1 test)
    // ========================================================================

    #[test]
    fn list_tools_exposes_full_catalog() {
        let tools = offline_router().list_tools();
        let names: Vec<ToolName> = tools.into_iter().map(|tool| tool.name).collect();
        assert_eq!(ToolName::all(), names.as_slice());
    }
}
