// slack-courier-mcp/src/slack.rs
// ============================================================================
// Module: Slack Web API Client
// Description: Blocking Slack Web API adapter for the tool surface.
// Purpose: Translate tool arguments into Slack calls and return raw bodies.
// Dependencies: reqwest, serde_json, slack-courier-config, slack-courier-contract
// ============================================================================

//! ## Overview
//! This module issues bounded, blocking requests against the Slack Web API and
//! hands back the response body as parsed JSON. The adapter stays mechanical:
//! it fills in defaults, clamps page sizes, and forwards everything else
//! verbatim. Slack's own `ok:false` error bodies are successful results here;
//! only transport failures, oversized bodies, and non-JSON responses surface
//! as [`SlackClientError`].
//!
//! `list_channels` is the one dual-mode call: when a static channel allow-list
//! is configured it resolves each pinned id through `conversations.info` and
//! synthesizes a listing body, otherwise it pages through
//! `conversations.list`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;

use reqwest::blocking::Client;
use reqwest::blocking::Response;
use serde_json::Value;
use serde_json::json;
use slack_courier_contract::tooling::DEFAULT_HISTORY_LIMIT;
use slack_courier_contract::tooling::DEFAULT_PAGE_LIMIT;
use slack_courier_contract::tooling::MAX_PAGE_LIMIT;
use thiserror::Error;

use crate::config::SlackConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// User agent sent with every Slack request.
const USER_AGENT: &str = concat!("slack-courier/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced by the Slack client.
///
/// Messages carry the Slack API method name only; transport detail is
/// discarded so credentials and URLs never leak into results or logs.
#[derive(Debug, Error)]
pub enum SlackClientError {
    /// HTTP client construction failed.
    #[error("slack client init failed: {0}")]
    Init(String),
    /// Request transport failed or the body arrived truncated.
    #[error("slack request failed: {0}")]
    Request(String),
    /// Response body exceeded the configured size cap.
    #[error("slack response exceeds size limit: {0}")]
    ResponseTooLarge(String),
    /// Response body was not valid JSON.
    #[error("slack response is not valid json: {0}")]
    InvalidJson(String),
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking Slack Web API client.
///
/// # Invariants
/// - Every request carries the bot token as a bearer credential.
/// - No request timeout or retry is configured; each call runs to completion.
/// - Bodies are parsed as JSON regardless of HTTP status code.
pub struct SlackClient {
    /// Underlying blocking HTTP client.
    client: Client,
    /// Bot token presented as a bearer credential.
    bot_token: String,
    /// Workspace id forwarded to listing endpoints.
    team_id: String,
    /// Static channel allow-list; empty means dynamic discovery.
    channel_ids: Vec<String>,
    /// Slack Web API base URL without trailing slash.
    base_url: String,
    /// Response body size cap in bytes.
    max_response_bytes: usize,
}

impl SlackClient {
    /// Builds a client from validated Slack configuration.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &SlackConfig) -> Result<Self, SlackClientError> {
        // No timeout: in-flight tool calls run to completion per request.
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|_| SlackClientError::Init("http client build failed".to_string()))?;
        Ok(Self {
            client,
            bot_token: config.bot_token.clone(),
            team_id: config.team_id.clone(),
            channel_ids: config.channel_ids.clone(),
            base_url: config.base_url.clone(),
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Lists channels in static allow-list mode or via dynamic discovery.
    ///
    /// Static mode resolves each configured id with `conversations.info`,
    /// drops unknown or archived channels, and synthesizes a listing body
    /// with an empty continuation cursor. Dynamic mode returns the raw
    /// `conversations.list` body.
    ///
    /// # Errors
    /// Returns an error if any underlying request fails; in static mode the
    /// first transport failure aborts the whole listing.
    pub fn list_channels(
        &self,
        limit: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<Value, SlackClientError> {
        if !self.channel_ids.is_empty() {
            return self.list_static_channels();
        }
        let mut query = vec![
            ("types", String::from("public_channel")),
            ("exclude_archived", String::from("true")),
            ("limit", effective_page_limit(limit).to_string()),
            ("team_id", self.team_id.clone()),
        ];
        if let Some(cursor) = cursor
            && !cursor.is_empty()
        {
            query.push(("cursor", cursor.to_string()));
        }
        self.get("conversations.list", &query)
    }

    /// Posts a message to a channel via `chat.postMessage`.
    ///
    /// # Errors
    /// Returns an error if the request fails at the transport level.
    pub fn post_message(&self, channel_id: &str, text: &str) -> Result<Value, SlackClientError> {
        let body = json!({ "channel": channel_id, "text": text });
        self.post("chat.postMessage", &body)
    }

    /// Replies to a thread via `chat.postMessage` with `thread_ts` set.
    ///
    /// # Errors
    /// Returns an error if the request fails at the transport level.
    pub fn post_thread_reply(
        &self,
        channel_id: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<Value, SlackClientError> {
        let body = json!({ "channel": channel_id, "thread_ts": thread_ts, "text": text });
        self.post("chat.postMessage", &body)
    }

    /// Adds an emoji reaction to a message via `reactions.add`.
    ///
    /// The tool-level `reaction` argument maps to Slack's `name` field.
    ///
    /// # Errors
    /// Returns an error if the request fails at the transport level.
    pub fn add_reaction(
        &self,
        channel_id: &str,
        timestamp: &str,
        reaction: &str,
    ) -> Result<Value, SlackClientError> {
        let body = json!({ "channel": channel_id, "timestamp": timestamp, "name": reaction });
        self.post("reactions.add", &body)
    }

    /// Fetches recent channel messages via `conversations.history`.
    ///
    /// The limit defaults to [`DEFAULT_HISTORY_LIMIT`] and is forwarded
    /// unclamped.
    ///
    /// # Errors
    /// Returns an error if the request fails at the transport level.
    pub fn channel_history(
        &self,
        channel_id: &str,
        limit: Option<u32>,
    ) -> Result<Value, SlackClientError> {
        let query = vec![
            ("channel", channel_id.to_string()),
            ("limit", effective_history_limit(limit).to_string()),
        ];
        self.get("conversations.history", &query)
    }

    /// Fetches all replies in a thread via `conversations.replies`.
    ///
    /// # Errors
    /// Returns an error if the request fails at the transport level.
    pub fn thread_replies(
        &self,
        channel_id: &str,
        thread_ts: &str,
    ) -> Result<Value, SlackClientError> {
        let query = vec![("channel", channel_id.to_string()), ("ts", thread_ts.to_string())];
        self.get("conversations.replies", &query)
    }

    /// Lists workspace users via `users.list`.
    ///
    /// # Errors
    /// Returns an error if the request fails at the transport level.
    pub fn list_users(
        &self,
        limit: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<Value, SlackClientError> {
        let mut query = vec![
            ("limit", effective_page_limit(limit).to_string()),
            ("team_id", self.team_id.clone()),
        ];
        if let Some(cursor) = cursor
            && !cursor.is_empty()
        {
            query.push(("cursor", cursor.to_string()));
        }
        self.get("users.list", &query)
    }

    /// Fetches one user's profile via `users.profile.get`.
    ///
    /// Custom field labels are always requested.
    ///
    /// # Errors
    /// Returns an error if the request fails at the transport level.
    pub fn user_profile(&self, user_id: &str) -> Result<Value, SlackClientError> {
        let query =
            vec![("user", user_id.to_string()), ("include_labels", String::from("true"))];
        self.get("users.profile.get", &query)
    }

    /// Resolves the static allow-list through `conversations.info`.
    fn list_static_channels(&self) -> Result<Value, SlackClientError> {
        let mut channels = Vec::with_capacity(self.channel_ids.len());
        for channel_id in &self.channel_ids {
            let query = vec![("channel", channel_id.clone())];
            let body = self.get("conversations.info", &query)?;
            if let Some(channel) = usable_channel(&body) {
                channels.push(channel.clone());
            }
        }
        Ok(json!({
            "ok": true,
            "channels": channels,
            "response_metadata": { "next_cursor": "" }
        }))
    }

    /// Issues a GET request against a Slack Web API method.
    fn get(
        &self,
        method: &'static str,
        query: &[(&'static str, String)],
    ) -> Result<Value, SlackClientError> {
        let response = self
            .client
            .get(self.endpoint(method))
            .bearer_auth(&self.bot_token)
            .query(query)
            .send()
            .map_err(|_| SlackClientError::Request(method.to_string()))?;
        self.parse_body(method, response)
    }

    /// Issues a POST request with a JSON body against a Slack Web API method.
    fn post(&self, method: &'static str, body: &Value) -> Result<Value, SlackClientError> {
        let response = self
            .client
            .post(self.endpoint(method))
            .bearer_auth(&self.bot_token)
            .json(body)
            .send()
            .map_err(|_| SlackClientError::Request(method.to_string()))?;
        self.parse_body(method, response)
    }

    /// Joins the base URL with a Slack Web API method name.
    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// Reads a bounded response body and parses it as JSON.
    ///
    /// HTTP status is not consulted; Slack reports API errors inside the body
    /// as `ok:false` and those bodies flow back to the caller unchanged.
    fn parse_body(
        &self,
        method: &'static str,
        mut response: Response,
    ) -> Result<Value, SlackClientError> {
        let bytes = read_response_limited(&mut response, self.max_response_bytes, method)?;
        serde_json::from_slice(&bytes)
            .map_err(|_| SlackClientError::InvalidJson(method.to_string()))
    }
}

// ============================================================================
// SECTION: Response Handling
// ============================================================================

/// Reads a response body while enforcing the configured size cap.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
    method: &'static str,
) -> Result<Vec<u8>, SlackClientError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| SlackClientError::ResponseTooLarge(method.to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(SlackClientError::ResponseTooLarge(method.to_string()));
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle
        .read_to_end(&mut buf)
        .map_err(|_| SlackClientError::Request(method.to_string()))?;
    if buf.len() > max_bytes {
        return Err(SlackClientError::ResponseTooLarge(method.to_string()));
    }
    if let Some(expected) = expected_len {
        let expected = usize::try_from(expected)
            .map_err(|_| SlackClientError::Request(method.to_string()))?;
        if buf.len() < expected {
            return Err(SlackClientError::Request(method.to_string()));
        }
    }
    Ok(buf)
}

/// Extracts the channel object from a `conversations.info` body when the
/// lookup succeeded and the channel is present and not archived.
fn usable_channel(body: &Value) -> Option<&Value> {
    if body.get("ok").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    let channel = body.get("channel")?;
    if channel.is_null() {
        return None;
    }
    if channel.get("is_archived").and_then(Value::as_bool) == Some(true) {
        return None;
    }
    Some(channel)
}

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Effective page size for channel and user listings.
///
/// Defaults to [`DEFAULT_PAGE_LIMIT`] and clamps to [`MAX_PAGE_LIMIT`];
/// out-of-range requests are never rejected.
fn effective_page_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT)
}

/// Effective message count for channel history, forwarded unclamped.
fn effective_history_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_HISTORY_LIMIT)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
