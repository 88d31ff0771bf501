// slack-courier-config/src/lib.rs
// ============================================================================
// Module: Slack Courier Config Library
// Description: Canonical config model, layered loading, and validation.
// Purpose: Single source of truth for slack-courier.toml semantics.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! `slack-courier-config` defines the canonical configuration model for
//! Slack Courier. Configuration is layered: a TOML file (optional), then
//! process environment overrides for the Slack credential surface, then
//! strict fail-closed validation. Every consumer receives a fully validated
//! [`CourierConfig`] by injection and never reads the environment itself.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
