// crates/slack-courier-contract/tests/tool_name_order.rs
// ============================================================================
// Module: Tool Name Ordering Tests
// Description: Ensure canonical tool ordering and wire names stay consistent.
// Purpose: Prevent drift between ToolName, the catalog, and the wire format.
// Dependencies: slack-courier-contract, serde_json
// ============================================================================

//! ## Overview
//! Confirms the canonical tool ordering used in `tools/list` and docs is
//! stable, and that wire names round-trip through serde and `parse`.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use slack_courier_contract::ToolName;
use slack_courier_contract::tool_definitions;
use slack_courier_contract::tooling::tool_contracts;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn tool_name_order_matches_tool_contracts() {
    let contract_names: Vec<ToolName> =
        tool_contracts().into_iter().map(|contract| contract.name).collect();
    assert_eq!(
        ToolName::all(),
        contract_names.as_slice(),
        "ToolName::all order drifted from tool_contracts()",
    );
}

#[test]
fn wire_names_round_trip() {
    for tool in ToolName::all() {
        let serialized = serde_json::to_value(tool).expect("tool name serializes");
        assert_eq!(serialized, Value::String(tool.as_str().to_string()));
        assert_eq!(ToolName::parse(tool.as_str()), Some(*tool), "parse lost {tool}");
    }
    assert_eq!(ToolName::parse("slack_nope"), None);
    assert_eq!(ToolName::parse(""), None);
}

#[test]
fn definitions_serialize_input_schema_in_camel_case() {
    let definitions = tool_definitions();
    let first = definitions.first().expect("catalog is non-empty");
    let serialized = serde_json::to_value(first).expect("definition serializes");
    assert!(serialized.get("inputSchema").is_some(), "inputSchema key missing on the wire");
    assert!(serialized.get("input_schema").is_none(), "snake_case leak on the wire");
}

#[test]
fn listing_is_idempotent() {
    let first = tool_definitions();
    let second = tool_definitions();
    assert_eq!(first, second, "tool listing must be stable across calls");
}
