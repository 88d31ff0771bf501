// slack-courier-mcp/src/audit.rs
// ============================================================================
// Module: MCP Audit
// Description: Structured audit events for MCP request handling.
// Purpose: Record request outcomes without leaking payload contents.
// Dependencies: serde, slack-courier-contract, slack-courier-config
// ============================================================================

//! ## Overview
//! This module emits one structured audit event per MCP request. Events carry
//! routing metadata and outcome labels only; message text, tokens, and Slack
//! response bodies never enter the audit stream. Sinks are pluggable so
//! deployments can route events to stderr, an append-only file, or nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use slack_courier_contract::ToolName;

use crate::config::AuditConfig;
use crate::config::AuditSinkKind;
use crate::config::ServerTransport;
use crate::telemetry::McpMethod;
use crate::telemetry::McpOutcome;

// ============================================================================
// SECTION: Audit Event
// ============================================================================

/// Audit event for a single MCP request.
///
/// # Invariants
/// - `event` is always `"mcp_request"`.
/// - `timestamp_ms` is derived from the system clock at construction.
/// - Optional fields are `None` when the metadata is unavailable.
#[derive(Debug, Clone, Serialize)]
pub struct McpAuditEvent {
    /// Event type label.
    pub event: &'static str,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u128,
    /// JSON-RPC request id rendered as a string, when present.
    pub request_id: Option<String>,
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// JSON-RPC method classification.
    pub method: McpMethod,
    /// Tool name when available (tools/call).
    pub tool: Option<ToolName>,
    /// Request outcome.
    pub outcome: McpOutcome,
    /// JSON-RPC error code when present.
    pub error_code: Option<i64>,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

/// Parameters for constructing an audit event.
///
/// # Invariants
/// - Field meanings match [`McpAuditEvent`].
#[derive(Debug, Clone)]
pub struct McpAuditEventParams {
    /// JSON-RPC request id rendered as a string, when present.
    pub request_id: Option<String>,
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// JSON-RPC method classification.
    pub method: McpMethod,
    /// Tool name when available (tools/call).
    pub tool: Option<ToolName>,
    /// Request outcome.
    pub outcome: McpOutcome,
    /// JSON-RPC error code when present.
    pub error_code: Option<i64>,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

impl McpAuditEvent {
    /// Creates an audit event stamped with the current time.
    #[must_use]
    pub fn new(params: McpAuditEventParams) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self {
            event: "mcp_request",
            timestamp_ms,
            request_id: params.request_id,
            transport: params.transport,
            method: params.method,
            tool: params.tool,
            outcome: params.outcome,
            error_code: params.error_code,
            error_kind: params.error_kind,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
        }
    }
}

// ============================================================================
// SECTION: Sink Trait
// ============================================================================

/// Audit sink for MCP request events.
pub trait McpAuditSink: Send + Sync {
    /// Records an MCP request event.
    fn record(&self, event: &McpAuditEvent);
}

// ============================================================================
// SECTION: Sink Implementations
// ============================================================================

/// Audit sink that writes JSON lines to stderr.
///
/// # Invariants
/// - Events are serialized as single-line JSON.
/// - Write failures are ignored; auditing never blocks request handling.
pub struct McpStderrAuditSink;

impl McpAuditSink for McpStderrAuditSink {
    fn record(&self, event: &McpAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
///
/// # Invariants
/// - Events are serialized as single-line JSON.
/// - Write failures are ignored; auditing never blocks request handling.
pub struct McpFileAuditSink {
    /// Append-only audit log file.
    file: Mutex<std::fs::File>,
}

impl McpFileAuditSink {
    /// Opens or creates the audit log file in append mode.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &str) -> io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl McpAuditSink for McpFileAuditSink {
    fn record(&self, event: &McpAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Audit sink that discards all events.
///
/// # Invariants
/// - Events are intentionally discarded.
pub struct McpNoopAuditSink;

impl McpAuditSink for McpNoopAuditSink {
    fn record(&self, _event: &McpAuditEvent) {}
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Builds the audit sink selected by configuration.
///
/// # Errors
/// Returns an error if a file sink is requested without a path or the file
/// cannot be opened.
pub fn build_audit_sink(config: &AuditConfig) -> io::Result<Arc<dyn McpAuditSink>> {
    match config.sink {
        AuditSinkKind::Stderr => Ok(Arc::new(McpStderrAuditSink)),
        AuditSinkKind::File => {
            let Some(path) = config.path.as_deref() else {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "audit file sink requires a path",
                ));
            };
            Ok(Arc::new(McpFileAuditSink::new(path)?))
        }
        AuditSinkKind::None => Ok(Arc::new(McpNoopAuditSink)),
    }
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

    use serde_json::Value;
    use slack_courier_contract::ToolName;

    use super::AuditConfig;
    use super::AuditSinkKind;
    use super::McpAuditEvent;
    use super::McpAuditEventParams;
    use super::McpAuditSink;
    use super::McpFileAuditSink;
    use super::ServerTransport;
    use super::build_audit_sink;
    use crate::telemetry::McpMethod;
    use crate::telemetry::McpOutcome;

    // ========================================================================
    // SECTION: Fixtures
    // ========================================================================

    fn sample_event() -> McpAuditEvent {
        McpAuditEvent::new(McpAuditEventParams {
            request_id: Some("1".to_string()),
            transport: ServerTransport::Stdio,
            method: McpMethod::ToolsCall,
            tool: Some(ToolName::PostMessage),
            outcome: McpOutcome::Ok,
            error_code: None,
            error_kind: None,
            request_bytes: 120,
            response_bytes: 256,
        })
    }

    // ========================================================================
    // SECTION: Sink Tests (3 tests)
    // ========================================================================

    #[test]
    fn file_sink_appends_one_json_line_per_event() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let path = file.path().to_string_lossy().to_string();
        let sink = McpFileAuditSink::new(&path).expect("file sink should open");
        sink.record(&sample_event());
        sink.record(&sample_event());
        let contents = std::fs::read_to_string(file.path()).expect("audit log readable");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let event: Value = serde_json::from_str(lines[0]).expect("line should be json");
        assert_eq!(event.get("event").and_then(Value::as_str), Some("mcp_request"));
        assert_eq!(event.get("tool").and_then(Value::as_str), Some("post_message"));
        assert_eq!(event.get("transport").and_then(Value::as_str), Some("stdio"));
        assert_eq!(event.get("request_bytes").and_then(Value::as_u64), Some(120));
    }

    #[test]
    fn build_audit_sink_requires_path_for_file_sink() {
        let config = AuditConfig {
            sink: AuditSinkKind::File,
            path: None,
        };
        assert!(build_audit_sink(&config).is_err());
    }

    #[test]
    fn build_audit_sink_honors_configured_kind() {
        let stderr = AuditConfig {
            sink: AuditSinkKind::Stderr,
            path: None,
        };
        assert!(build_audit_sink(&stderr).is_ok());
        let none = AuditConfig {
            sink: AuditSinkKind::None,
            path: None,
        };
        assert!(build_audit_sink(&none).is_ok());
    }
}

