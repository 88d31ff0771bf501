// crates/slack-courier-contract/src/tooling/tests.rs
// ============================================================================
// Module: Tool Catalog Unit Tests
// Description: Validates catalog ordering, schemas, and examples.
// Purpose: Keep contract examples and dispatch expectations in sync.
// Dependencies: jsonschema, serde_json, slack-courier-contract
// ============================================================================

//! ## Overview
//! Verifies that tool input/output examples satisfy their JSON schemas, that
//! the catalog covers every tool exactly once in canonical order, and that
//! the schema defaults match the published page limits.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only validation helpers use panic-based assertions for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonschema::Validator;
use serde_json::Value;

use super::DEFAULT_HISTORY_LIMIT;
use super::DEFAULT_PAGE_LIMIT;
use super::required_fields;
use super::tool_contracts;
use super::tool_definitions;
use super::tool_examples;
use super::tooling_markdown;
use crate::types::ToolName;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn compile_schema(schema: &Value) -> Validator {
    jsonschema::validator_for(schema).expect("schema compilation failed")
}

fn schema_required_fields(tool: ToolName) -> Vec<String> {
    let contracts = tool_contracts();
    let contract = contracts
        .into_iter()
        .find(|contract| contract.name == tool)
        .expect("contract missing for tool");
    contract
        .input_schema
        .get("required")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

fn schema_default(tool: ToolName, field: &str) -> Option<u64> {
    let contracts = tool_contracts();
    let contract = contracts
        .into_iter()
        .find(|contract| contract.name == tool)
        .expect("contract missing for tool");
    contract
        .input_schema
        .get("properties")
        .and_then(|properties| properties.get(field))
        .and_then(|schema| schema.get("default"))
        .and_then(Value::as_u64)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn tool_examples_match_tool_schemas() {
    for contract in tool_contracts() {
        let input_schema = compile_schema(&contract.input_schema);
        let output_schema = compile_schema(&contract.output_schema);
        let examples = tool_examples(contract.name);
        assert!(!examples.is_empty(), "tool examples missing for {}", contract.name);
        for example in examples {
            assert!(
                input_schema.is_valid(&example.input),
                "input example failed for {}",
                contract.name
            );
            assert!(
                output_schema.is_valid(&example.output),
                "output example failed for {}",
                contract.name
            );
        }
    }
}

#[test]
fn catalog_covers_every_tool_exactly_once() {
    let names: Vec<ToolName> =
        tool_contracts().into_iter().map(|contract| contract.name).collect();
    assert_eq!(ToolName::all(), names.as_slice(), "catalog order drifted from ToolName::all");
}

#[test]
fn required_fields_match_dispatch_expectations() {
    assert!(required_fields(ToolName::ListChannels).is_empty());
    assert_eq!(required_fields(ToolName::PostMessage), ["channel_id", "text"]);
    assert_eq!(required_fields(ToolName::ReplyToThread), ["channel_id", "thread_ts", "text"]);
    assert_eq!(required_fields(ToolName::AddReaction), ["channel_id", "timestamp", "reaction"]);
    assert_eq!(required_fields(ToolName::GetChannelHistory), ["channel_id"]);
    assert_eq!(required_fields(ToolName::GetThreadReplies), ["channel_id", "thread_ts"]);
    assert!(required_fields(ToolName::GetUsers).is_empty());
    assert_eq!(required_fields(ToolName::GetUserProfile), ["user_id"]);
}

#[test]
fn schemas_embed_canonical_required_fields() {
    for tool in ToolName::all() {
        assert_eq!(
            schema_required_fields(*tool),
            required_fields(*tool),
            "schema required drifted for {tool}"
        );
    }
}

#[test]
fn page_limit_defaults_recorded_in_schemas() {
    assert_eq!(
        schema_default(ToolName::ListChannels, "limit"),
        Some(u64::from(DEFAULT_PAGE_LIMIT))
    );
    assert_eq!(schema_default(ToolName::GetUsers, "limit"), Some(u64::from(DEFAULT_PAGE_LIMIT)));
    assert_eq!(
        schema_default(ToolName::GetChannelHistory, "limit"),
        Some(u64::from(DEFAULT_HISTORY_LIMIT))
    );
}

#[test]
fn definitions_derive_from_contracts() {
    let contracts = tool_contracts();
    let definitions = tool_definitions();
    assert_eq!(contracts.len(), definitions.len());
    for (contract, definition) in contracts.iter().zip(definitions.iter()) {
        assert_eq!(contract.name, definition.name);
        assert_eq!(contract.description, definition.description);
        assert_eq!(contract.input_schema, definition.input_schema);
    }
}

#[test]
fn markdown_reference_lists_every_tool() {
    let contracts = tool_contracts();
    let markdown = tooling_markdown(&contracts);
    for tool in ToolName::all() {
        let heading = format!("## {tool}");
        assert!(markdown.contains(&heading), "markdown missing section for {tool}");
    }
}
