// slack-courier-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: MCP server implementations for stdio and HTTP transports.
// Purpose: Expose Slack Courier tools via JSON-RPC 2.0.
// Dependencies: axum, serde_json, tokio, slack-courier-config
// ============================================================================

//! ## Overview
//! The MCP server speaks JSON-RPC 2.0 over Content-Length framed stdio or one
//! request per HTTP POST, and always routes tool calls through
//! [`crate::tools::ToolRouter`]. Protocol-shape faults are the only JSON-RPC
//! errors this server emits: unparseable payloads, malformed requests,
//! oversized bodies, unknown methods, and malformed tool-call params. Tool
//! failures are folded into successful responses by the router, so a client
//! that sent a well-formed `tools/call` always receives a result envelope.
//!
//! The stdio loop survives bad input. A parse error answers with id `null`
//! and the loop keeps reading; an oversized frame is discarded to keep the
//! stream aligned; only clean end-of-input ends the loop. One structured
//! audit event and one metric observation are recorded per inbound message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use slack_courier_contract::ToolDefinition;
use slack_courier_contract::ToolName;

use crate::audit::McpAuditEvent;
use crate::audit::McpAuditEventParams;
use crate::audit::McpAuditSink;
use crate::audit::build_audit_sink;
use crate::config::CourierConfig;
use crate::config::ServerTransport;
use crate::slack::SlackClient;
use crate::telemetry::McpMethod;
use crate::telemetry::McpMetricEvent;
use crate::telemetry::McpMetrics;
use crate::telemetry::McpOutcome;
use crate::telemetry::NoopMetrics;
use crate::tools::DispatchOutcome;
use crate::tools::ToolRouter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// MCP protocol revision implemented by this server.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported during initialization.
const SERVER_NAME: &str = "slack-courier";

/// Response emitted when the response envelope itself fails to serialize.
const SERIALIZATION_FALLBACK_RESPONSE: &str =
    "{\"jsonrpc\":\"2.0\",\"id\":null,\"error\":{\"code\":-32603,\"message\":\"serialization \
     failed\"}}";

// ============================================================================
// SECTION: MCP Server
// ============================================================================

/// MCP server instance.
pub struct McpServer {
    /// Server configuration.
    config: CourierConfig,
    /// Shared request-handling state.
    state: ServerState,
}

impl McpServer {
    /// Builds a new MCP server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when validation or initialization fails.
    pub fn from_config(config: CourierConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let slack =
            SlackClient::new(&config.slack).map_err(|err| McpServerError::Init(err.to_string()))?;
        let router = ToolRouter::new(Arc::new(slack));
        let audit =
            build_audit_sink(&config.audit).map_err(|err| McpServerError::Init(err.to_string()))?;
        let state = ServerState {
            router,
            audit,
            metrics: Arc::new(NoopMetrics),
            transport: config.server.transport,
            max_body_bytes: config.server.max_body_bytes,
        };
        Ok(Self {
            config,
            state,
        })
    }

    /// Replaces the metrics sink, keeping the rest of the state.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn McpMetrics>) -> Self {
        self.state.metrics = metrics;
        self
    }

    /// Replaces the audit sink, keeping the rest of the state.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn McpAuditSink>) -> Self {
        self.state.audit = audit;
        self
    }

    /// Serves requests using the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the transport fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        match self.config.server.transport {
            ServerTransport::Stdio => {
                let mut reader = BufReader::new(std::io::stdin());
                let mut writer = std::io::stdout();
                serve_stdio(&self.state, &mut reader, &mut writer)
            }
            ServerTransport::Http => serve_http(self.config, self.state).await,
        }
    }
}

/// Shared server state for request handlers.
#[derive(Clone)]
struct ServerState {
    /// Tool router for request dispatch.
    router: ToolRouter,
    /// Audit sink receiving one event per inbound message.
    audit: Arc<dyn McpAuditSink>,
    /// Metrics sink for request counters and latencies.
    metrics: Arc<dyn McpMetrics>,
    /// Transport label stamped on audit and metric events.
    transport: ServerTransport,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Serves framed JSON-RPC requests until the input stream closes cleanly.
fn serve_stdio(
    state: &ServerState,
    reader: &mut BufReader<impl Read>,
    writer: &mut impl Write,
) -> Result<(), McpServerError> {
    loop {
        let exchange = match read_framed(reader, state.max_body_bytes)? {
            FramedRead::Eof => return Ok(()),
            FramedRead::Oversize(declared_len) => handle_oversize(state, declared_len),
            FramedRead::Payload(bytes) => handle_payload(state, &bytes),
        };
        if let Some(payload) = exchange.payload {
            write_framed(writer, &payload)?;
        }
    }
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Serves JSON-RPC requests over HTTP.
async fn serve_http(config: CourierConfig, state: ServerState) -> Result<(), McpServerError> {
    let bind = config
        .server
        .bind
        .as_ref()
        .ok_or_else(|| McpServerError::Config("bind address required".to_string()))?;
    let addr: SocketAddr =
        bind.parse().map_err(|_| McpServerError::Config("invalid bind address".to_string()))?;
    let app = Router::new().route("/rpc", post(handle_http)).with_state(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| McpServerError::Transport("http bind failed".to_string()))?;
    axum::serve(listener, app)
        .await
        .map_err(|_| McpServerError::Transport("http server failed".to_string()))
}

/// Handles HTTP JSON-RPC requests.
async fn handle_http(State(state): State<Arc<ServerState>>, bytes: Bytes) -> Response {
    let exchange = if bytes.len() > state.max_body_bytes {
        handle_oversize(&state, bytes.len())
    } else {
        handle_payload(&state, &bytes)
    };
    match exchange.payload {
        Some(payload) => {
            (exchange.status, [(CONTENT_TYPE, "application/json")], payload).into_response()
        }
        None => exchange.status.into_response(),
    }
}

// ============================================================================
// SECTION: JSON-RPC Envelopes
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier; absent for notifications.
    #[serde(default)]
    id: Value,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Tool call parameters for JSON-RPC requests.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments; absent and null both mean no arguments.
    #[serde(default)]
    arguments: Option<Value>,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Registered tool definitions.
    tools: Vec<ToolDefinition>,
}

/// Tool call response payload.
#[derive(Debug, Serialize)]
struct ToolCallResult {
    /// Tool output content.
    content: Vec<ToolContent>,
}

/// Tool output payloads for JSON-RPC responses.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolContent {
    /// Plain text tool output.
    Text {
        /// Serialized result payload.
        text: String,
    },
}

/// Builds a successful JSON-RPC response.
fn rpc_ok(id: Value, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: Some(result),
        error: None,
    }
}

/// Builds a failed JSON-RPC response.
fn rpc_error(id: Value, code: i64, message: &str) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_string(),
        }),
    }
}

// ============================================================================
// SECTION: Request Processing
// ============================================================================

/// Serialized exchange ready for the transport layer.
struct Exchange {
    /// HTTP status paired with the response.
    status: StatusCode,
    /// Serialized JSON-RPC response; `None` for notifications.
    payload: Option<Vec<u8>>,
}

/// Processed request with the labels recorded on audit and metric events.
struct Processed {
    /// HTTP status paired with the response.
    status: StatusCode,
    /// JSON-RPC response; `None` for notifications.
    response: Option<JsonRpcResponse>,
    /// Method classification.
    method: McpMethod,
    /// Tool name when a tool call reached dispatch.
    tool: Option<ToolName>,
    /// Request id rendered for correlation.
    request_id: Option<String>,
    /// Normalized error label for protocol faults and failed dispatches.
    error_kind: Option<&'static str>,
}

/// Handles one raw payload end to end, recording telemetry.
fn handle_payload(state: &ServerState, bytes: &[u8]) -> Exchange {
    let started = Instant::now();
    let processed = process_payload(state, bytes);
    finish(state, processed, bytes.len(), started)
}

/// Handles an oversized body without parsing it.
fn handle_oversize(state: &ServerState, declared_len: usize) -> Exchange {
    let started = Instant::now();
    let processed = Processed {
        status: StatusCode::PAYLOAD_TOO_LARGE,
        response: Some(rpc_error(Value::Null, -32600, "request body too large")),
        method: McpMethod::Invalid,
        tool: None,
        request_id: None,
        error_kind: Some("oversize"),
    };
    finish(state, processed, declared_len, started)
}

/// Parses a payload in two steps so parse errors and malformed requests get
/// distinct JSON-RPC codes.
fn process_payload(state: &ServerState, bytes: &[u8]) -> Processed {
    let Ok(value) = serde_json::from_slice::<Value>(bytes) else {
        return Processed {
            status: StatusCode::BAD_REQUEST,
            response: Some(rpc_error(Value::Null, -32700, "parse error")),
            method: McpMethod::Invalid,
            tool: None,
            request_id: None,
            error_kind: Some("parse_error"),
        };
    };
    let Ok(request) = serde_json::from_value::<JsonRpcRequest>(value) else {
        return Processed {
            status: StatusCode::BAD_REQUEST,
            response: Some(rpc_error(Value::Null, -32600, "invalid json-rpc request")),
            method: McpMethod::Invalid,
            tool: None,
            request_id: None,
            error_kind: Some("invalid_request"),
        };
    };
    handle_request(state, request)
}

/// Dispatches a parsed JSON-RPC request.
fn handle_request(state: &ServerState, request: JsonRpcRequest) -> Processed {
    let method = McpMethod::classify(&request.method);
    let request_id = render_request_id(&request.id);
    if request.jsonrpc != "2.0" {
        return Processed {
            status: StatusCode::BAD_REQUEST,
            response: Some(rpc_error(request.id, -32600, "invalid json-rpc version")),
            method,
            tool: None,
            request_id,
            error_kind: Some("invalid_request"),
        };
    }
    match method {
        McpMethod::Initialize => Processed {
            status: StatusCode::OK,
            response: Some(rpc_ok(request.id, initialize_result())),
            method,
            tool: None,
            request_id,
            error_kind: None,
        },
        McpMethod::Ping => Processed {
            status: StatusCode::OK,
            response: Some(rpc_ok(request.id, json!({}))),
            method,
            tool: None,
            request_id,
            error_kind: None,
        },
        McpMethod::Notification => Processed {
            status: StatusCode::ACCEPTED,
            response: None,
            method,
            tool: None,
            request_id,
            error_kind: None,
        },
        McpMethod::ToolsList => handle_tools_list(state, request.id, request_id),
        McpMethod::ToolsCall => {
            handle_tools_call(state, request.id, request.params, request_id)
        }
        McpMethod::Invalid | McpMethod::Other => Processed {
            status: StatusCode::BAD_REQUEST,
            response: Some(rpc_error(request.id, -32601, "method not found")),
            method,
            tool: None,
            request_id,
            error_kind: Some("method_not_found"),
        },
    }
}

/// Handles `tools/list` requests.
fn handle_tools_list(state: &ServerState, id: Value, request_id: Option<String>) -> Processed {
    let tools = state.router.list_tools();
    match serde_json::to_value(ToolListResult {
        tools,
    }) {
        Ok(value) => Processed {
            status: StatusCode::OK,
            response: Some(rpc_ok(id, value)),
            method: McpMethod::ToolsList,
            tool: None,
            request_id,
            error_kind: None,
        },
        Err(_) => Processed {
            status: StatusCode::OK,
            response: Some(rpc_error(id, -32603, "serialization failed")),
            method: McpMethod::ToolsList,
            tool: None,
            request_id,
            error_kind: Some("serialization"),
        },
    }
}

/// Handles `tools/call` requests.
fn handle_tools_call(
    state: &ServerState,
    id: Value,
    params: Option<Value>,
    request_id: Option<String>,
) -> Processed {
    let params = params.unwrap_or(Value::Null);
    let Ok(call) = serde_json::from_value::<ToolCallParams>(params) else {
        return Processed {
            status: StatusCode::BAD_REQUEST,
            response: Some(rpc_error(id, -32602, "invalid tool params")),
            method: McpMethod::ToolsCall,
            tool: None,
            request_id,
            error_kind: Some("invalid_params"),
        };
    };
    let outcome = call_tool_with_blocking(&state.router, &call.name, call.arguments);
    let result = ToolCallResult {
        content: vec![ToolContent::Text {
            text: outcome.text,
        }],
    };
    match serde_json::to_value(result) {
        Ok(value) => Processed {
            status: StatusCode::OK,
            response: Some(rpc_ok(id, value)),
            method: McpMethod::ToolsCall,
            tool: outcome.tool,
            request_id,
            error_kind: outcome.error_kind,
        },
        Err(_) => Processed {
            status: StatusCode::OK,
            response: Some(rpc_error(id, -32603, "serialization failed")),
            method: McpMethod::ToolsCall,
            tool: outcome.tool,
            request_id,
            error_kind: Some("serialization"),
        },
    }
}

/// Executes a tool dispatch, shifting to a blocking context when available.
fn call_tool_with_blocking(
    router: &ToolRouter,
    name: &str,
    arguments: Option<Value>,
) -> DispatchOutcome {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| router.dispatch(name, arguments))
        }
        _ => router.dispatch(name, arguments),
    }
}

/// Builds the initialize handshake result.
fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

/// Renders a request id for correlation; null ids carry no label.
fn render_request_id(id: &Value) -> Option<String> {
    if id.is_null() {
        return None;
    }
    Some(id.to_string())
}

/// Serializes the response and records audit and metric events.
fn finish(
    state: &ServerState,
    processed: Processed,
    request_bytes: usize,
    started: Instant,
) -> Exchange {
    let payload = processed.response.as_ref().map(|response| {
        serde_json::to_vec(response)
            .unwrap_or_else(|_| SERIALIZATION_FALLBACK_RESPONSE.as_bytes().to_vec())
    });
    let response_bytes = payload.as_ref().map_or(0, Vec::len);
    record_exchange(state, &processed, request_bytes, response_bytes, started.elapsed());
    Exchange {
        status: processed.status,
        payload,
    }
}

/// Emits one audit event and one metric observation for an exchange.
fn record_exchange(
    state: &ServerState,
    processed: &Processed,
    request_bytes: usize,
    response_bytes: usize,
    latency: Duration,
) {
    let error_code = processed
        .response
        .as_ref()
        .and_then(|response| response.error.as_ref())
        .map(|error| error.code);
    let outcome = if error_code.is_some() || processed.error_kind.is_some() {
        McpOutcome::Error
    } else {
        McpOutcome::Ok
    };
    let event = McpAuditEvent::new(McpAuditEventParams {
        request_id: processed.request_id.clone(),
        transport: state.transport,
        method: processed.method,
        tool: processed.tool,
        outcome,
        error_code,
        error_kind: processed.error_kind,
        request_bytes,
        response_bytes,
    });
    state.audit.record(&event);
    let metric = McpMetricEvent {
        transport: state.transport,
        method: processed.method,
        tool: processed.tool,
        outcome,
        error_code,
        error_kind: processed.error_kind,
        request_bytes,
        response_bytes,
    };
    state.metrics.record_request(metric.clone());
    state.metrics.record_latency(metric, latency);
}

// ============================================================================
// SECTION: Framing Helpers
// ============================================================================

/// Result of reading one framed stdio message.
#[derive(Debug)]
enum FramedRead {
    /// Complete payload within the size limit.
    Payload(Vec<u8>),
    /// Declared length exceeded the limit; the body was discarded.
    Oversize(usize),
    /// Clean end of stream before any header byte.
    Eof,
}

/// Reads a framed stdio payload using MCP Content-Length headers.
///
/// Oversized bodies are consumed and reported rather than failing the loop,
/// so the stream stays aligned on the next frame.
fn read_framed(
    reader: &mut BufReader<impl Read>,
    max_body_bytes: usize,
) -> Result<FramedRead, McpServerError> {
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if bytes == 0 {
            if saw_header {
                return Err(McpServerError::Transport("stdio closed mid-frame".to_string()));
            }
            return Ok(FramedRead::Eof);
        }
        saw_header = true;
        if line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| McpServerError::Transport("invalid content length".to_string()))?;
            content_length = Some(parsed);
        }
    }
    let len = content_length
        .ok_or_else(|| McpServerError::Transport("missing content length".to_string()))?;
    if len > max_body_bytes {
        discard_exact(reader, len)?;
        return Ok(FramedRead::Oversize(len));
    }
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
    Ok(FramedRead::Payload(buf))
}

/// Skips a declared body so the next frame starts on a header line.
fn discard_exact(
    reader: &mut BufReader<impl Read>,
    len: usize,
) -> Result<(), McpServerError> {
    let len_u64 = u64::try_from(len)
        .map_err(|_| McpServerError::Transport("invalid content length".to_string()))?;
    let copied = std::io::copy(&mut reader.by_ref().take(len_u64), &mut std::io::sink())
        .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
    if copied < len_u64 {
        return Err(McpServerError::Transport("stdio closed mid-frame".to_string()));
    }
    Ok(())
}

/// Writes a framed stdio payload using MCP Content-Length headers.
fn write_framed(writer: &mut impl Write, payload: &[u8]) -> Result<(), McpServerError> {
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer
        .write_all(header.as_bytes())
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer
        .write_all(payload)
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer.flush().map_err(|_| McpServerError::Transport("stdio write failed".to_string()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
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

    use std::io::BufReader;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::sync::Mutex;

    use serde_json::Value;
    use serde_json::json;

    use super::FramedRead;
    use super::ServerState;
    use super::read_framed;
    use super::serve_stdio;
    use crate::audit::McpAuditEvent;
    use crate::audit::McpAuditSink;
    use crate::audit::McpNoopAuditSink;
    use crate::config::ServerTransport;
    use crate::config::SlackConfig;
    use crate::slack::SlackClient;
    use crate::telemetry::McpMethod;
    use crate::telemetry::McpOutcome;
    use crate::telemetry::NoopMetrics;
    use crate::tools::ToolRouter;

    // ========================================================================
    // SECTION: Fixtures
    // ========================================================================

    /// Audit sink that stores recorded events for assertions.
    struct RecordingSink {
        events: Mutex<Vec<McpAuditEvent>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }

        fn events(&self) -> Vec<McpAuditEvent> {
            self.events.lock().expect("sink lock poisoned").clone()
        }
    }

    impl McpAuditSink for RecordingSink {
        fn record(&self, event: &McpAuditEvent) {
            self.events.lock().expect("sink lock poisoned").push(event.clone());
        }
    }

    fn test_state(audit: Arc<dyn McpAuditSink>) -> ServerState {
        let client = SlackClient::new(&SlackConfig::default()).expect("client should build");
        ServerState {
            router: ToolRouter::new(Arc::new(client)),
            audit,
            metrics: Arc::new(NoopMetrics),
            transport: ServerTransport::Stdio,
            max_body_bytes: 1024 * 1024,
        }
    }

    fn frame(payload: &str) -> Vec<u8> {
        format!("Content-Length: {}\r\n\r\n{payload}", payload.len()).into_bytes()
    }

    /// Runs the stdio loop over canned input and returns the raw output.
    fn run_stdio(state: &ServerState, input: Vec<u8>) -> Vec<u8> {
        let mut reader = BufReader::new(Cursor::new(input));
        let mut output = Vec::new();
        serve_stdio(state, &mut reader, &mut output).expect("stdio loop should exit cleanly");
        output
    }

    /// Reads every framed response out of captured stdio output.
    fn parse_responses(output: &[u8]) -> Vec<Value> {
        let mut reader = BufReader::new(Cursor::new(output.to_vec()));
        let mut responses = Vec::new();
        loop {
            match read_framed(&mut reader, 1024 * 1024) {
                Ok(FramedRead::Payload(bytes)) => {
                    responses
                        .push(serde_json::from_slice(&bytes).expect("response should be json"));
                }
                Ok(FramedRead::Eof) => break,
                Ok(FramedRead::Oversize(_)) => panic!("unexpected oversize response frame"),
                Err(err) => panic!("framed response read failed: {err}"),
            }
        }
        responses
    }

    // ========================================================================
    // SECTION: Framing Tests (4 tests)
    // ========================================================================

    #[test]
    fn read_framed_accepts_payload_at_limit() {
        let payload = br#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#;
        let framed = format!(
            "Content-Length: {}\r\n\r\n{}",
            payload.len(),
            String::from_utf8_lossy(payload)
        );
        let mut reader = BufReader::new(Cursor::new(framed.into_bytes()));
        let result = read_framed(&mut reader, payload.len()).expect("frame should read");
        match result {
            FramedRead::Payload(bytes) => assert_eq!(bytes, payload),
            other => panic!("expected payload, got {other:?}"),
        }
    }

    #[test]
    fn read_framed_reports_oversize_and_realigns() {
        let mut input = frame("{\"oversized\":true}");
        input.extend_from_slice(&frame("{}"));
        let mut reader = BufReader::new(Cursor::new(input));
        match read_framed(&mut reader, 4).expect("oversize should not fail the loop") {
            FramedRead::Oversize(len) => assert_eq!(len, 18),
            other => panic!("expected oversize, got {other:?}"),
        }
        match read_framed(&mut reader, 1024).expect("next frame should read") {
            FramedRead::Payload(bytes) => assert_eq!(bytes, b"{}"),
            other => panic!("expected payload, got {other:?}"),
        }
    }

    #[test]
    fn read_framed_returns_eof_on_clean_close() {
        let mut reader = BufReader::new(Cursor::new(Vec::new()));
        let result = read_framed(&mut reader, 1024).expect("clean close should not error");
        assert!(matches!(result, FramedRead::Eof));
    }

    #[test]
    fn read_framed_rejects_truncated_frame() {
        let input = b"Content-Length: 10\r\n\r\n{}".to_vec();
        let mut reader = BufReader::new(Cursor::new(input));
        assert!(read_framed(&mut reader, 1024).is_err());
    }

    // ========================================================================
    // SECTION: Protocol Tests (8 tests)
    // ========================================================================

    #[test]
    fn initialize_reports_server_identity() {
        let state = test_state(Arc::new(McpNoopAuditSink));
        let input = frame(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#);
        let responses = parse_responses(&run_stdio(&state, input));
        assert_eq!(responses.len(), 1);
        let result = responses[0].get("result").expect("initialize should succeed");
        assert_eq!(
            result.get("protocolVersion").and_then(Value::as_str),
            Some("2024-11-05")
        );
        assert_eq!(
            result.pointer("/serverInfo/name").and_then(Value::as_str),
            Some("slack-courier")
        );
        assert!(result.pointer("/capabilities/tools").is_some());
    }

    #[test]
    fn ping_returns_empty_object() {
        let state = test_state(Arc::new(McpNoopAuditSink));
        let input = frame(r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#);
        let responses = parse_responses(&run_stdio(&state, input));
        assert_eq!(responses[0].get("result"), Some(&json!({})));
        assert_eq!(responses[0].get("id"), Some(&json!(7)));
    }

    #[test]
    fn unknown_method_maps_to_method_not_found() {
        let state = test_state(Arc::new(McpNoopAuditSink));
        let input = frame(r#"{"jsonrpc":"2.0","id":2,"method":"resources/list"}"#);
        let responses = parse_responses(&run_stdio(&state, input));
        assert_eq!(responses[0].pointer("/error/code"), Some(&json!(-32601)));
    }

    #[test]
    fn invalid_version_maps_to_invalid_request() {
        let state = test_state(Arc::new(McpNoopAuditSink));
        let input = frame(r#"{"jsonrpc":"1.0","id":3,"method":"ping"}"#);
        let responses = parse_responses(&run_stdio(&state, input));
        assert_eq!(responses[0].pointer("/error/code"), Some(&json!(-32600)));
        assert_eq!(responses[0].get("id"), Some(&json!(3)));
    }

    #[test]
    fn parse_error_answers_null_id_and_keeps_serving() {
        let state = test_state(Arc::new(McpNoopAuditSink));
        let mut input = frame("{not json");
        input.extend_from_slice(&frame(r#"{"jsonrpc":"2.0","id":4,"method":"ping"}"#));
        let responses = parse_responses(&run_stdio(&state, input));
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].pointer("/error/code"), Some(&json!(-32700)));
        assert_eq!(responses[0].get("id"), Some(&Value::Null));
        assert_eq!(responses[1].get("result"), Some(&json!({})));
    }

    #[test]
    fn oversize_frame_answers_invalid_request_and_keeps_serving() {
        let mut state = test_state(Arc::new(McpNoopAuditSink));
        state.max_body_bytes = 64;
        let mut input = frame(&"x".repeat(100));
        input.extend_from_slice(&frame(r#"{"jsonrpc":"2.0","id":5,"method":"ping"}"#));
        let responses = parse_responses(&run_stdio(&state, input));
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].pointer("/error/code"), Some(&json!(-32600)));
        assert_eq!(
            responses[0].pointer("/error/message"),
            Some(&json!("request body too large"))
        );
        assert_eq!(responses[1].get("result"), Some(&json!({})));
        assert_eq!(responses[1].get("id"), Some(&json!(5)));
    }

    #[test]
    fn notifications_produce_no_response() {
        let state = test_state(Arc::new(McpNoopAuditSink));
        let mut input =
            frame(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#);
        input.extend_from_slice(&frame(r#"{"jsonrpc":"2.0","id":8,"method":"ping"}"#));
        let responses = parse_responses(&run_stdio(&state, input));
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].get("id"), Some(&json!(8)));
    }

    #[test]
    fn tools_list_returns_full_catalog() {
        let state = test_state(Arc::new(McpNoopAuditSink));
        let input = frame(r#"{"jsonrpc":"2.0","id":9,"method":"tools/list"}"#);
        let responses = parse_responses(&run_stdio(&state, input));
        let tools = responses[0]
            .pointer("/result/tools")
            .and_then(Value::as_array)
            .expect("tools should list");
        assert_eq!(tools.len(), 8);
        assert_eq!(tools[0].get("name"), Some(&json!("list_channels")));
        assert!(tools[0].get("inputSchema").is_some());
    }

    // ========================================================================
    // SECTION: Tool Call Tests (2 tests)
    // ========================================================================

    #[test]
    fn tool_failure_folds_into_text_content() {
        let state = test_state(Arc::new(McpNoopAuditSink));
        let input = frame(
            r#"{"jsonrpc":"2.0","id":10,"method":"tools/call","params":{"name":"slack_nope","arguments":{}}}"#,
        );
        let responses = parse_responses(&run_stdio(&state, input));
        assert!(responses[0].get("error").is_none(), "tool failures are not rpc errors");
        assert_eq!(
            responses[0].pointer("/result/content/0/type"),
            Some(&json!("text"))
        );
        let text = responses[0]
            .pointer("/result/content/0/text")
            .and_then(Value::as_str)
            .expect("content should carry text");
        assert_eq!(text, r#"{"error":"unknown tool: slack_nope"}"#);
    }

    #[test]
    fn malformed_tool_params_map_to_invalid_params() {
        let state = test_state(Arc::new(McpNoopAuditSink));
        let input = frame(
            r#"{"jsonrpc":"2.0","id":11,"method":"tools/call","params":{"arguments":{}}}"#,
        );
        let responses = parse_responses(&run_stdio(&state, input));
        assert_eq!(responses[0].pointer("/error/code"), Some(&json!(-32602)));
    }

    // ========================================================================
    // SECTION: Audit Wiring Tests (1 test)
    // ========================================================================

    #[test]
    fn audit_records_one_event_per_inbound_message() {
        let sink = RecordingSink::new();
        let state = test_state(sink.clone());
        let mut input = frame(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
        input.extend_from_slice(&frame("{broken"));
        input.extend_from_slice(&frame(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        ));
        let _ = run_stdio(&state, input);
        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].method, McpMethod::Ping);
        assert_eq!(events[0].outcome, McpOutcome::Ok);
        assert_eq!(events[0].request_id.as_deref(), Some("1"));
        assert_eq!(events[1].method, McpMethod::Invalid);
        assert_eq!(events[1].outcome, McpOutcome::Error);
        assert_eq!(events[1].error_code, Some(-32700));
        assert_eq!(events[2].method, McpMethod::Notification);
        assert_eq!(events[2].response_bytes, 0);
    }
}
