// crates/slack-courier-cli/src/main.rs
// ============================================================================
// Module: Slack Courier CLI Entry Point
// Description: Command dispatcher for the Slack Courier MCP server.
// Purpose: Serve the MCP surface and render the generated tool reference.
// Dependencies: clap, slack-courier-config, slack-courier-contract,
//               slack-courier-mcp, thiserror, tokio
// ============================================================================

//! ## Overview
//! The Slack Courier CLI starts the MCP server (`serve`) and renders the
//! generated tool reference (`tools`). Configuration failures are reported on
//! stderr before any transport opens, so a misconfigured server never answers
//! a request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use slack_courier_config::CourierConfig;
use slack_courier_contract::tool_contracts;
use slack_courier_contract::tooling_markdown;
use slack_courier_mcp::McpServer;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "slack-courier", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Slack Courier MCP server.
    Serve(ServeCommand),
    /// Print the generated tool reference as markdown.
    Tools,
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to slack-courier.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };
    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Tools => command_tools(),
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
///
/// Configuration is loaded and validated before any transport opens; a
/// missing token or team id is fatal here, not after the first request.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = CourierConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let server = tokio::task::spawn_blocking(move || McpServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Tools Command
// ============================================================================

/// Executes the `tools` command, printing the markdown tool reference.
fn command_tools() -> CliResult<ExitCode> {
    let reference = tooling_markdown(&tool_contracts());
    write_stdout(&reference)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Prints top-level help when no subcommand is given.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command
        .print_help()
        .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))?;
    Ok(())
}

/// Writes a string to stdout.
fn write_stdout(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(message.as_bytes())
        .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
    ExitCode::FAILURE
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

    use slack_courier_contract::ToolName;

    use super::*;

    // ============================================================================
    // SECTION: Argument Parsing Tests (3 tests)
    // ============================================================================

    #[test]
    fn parse_serve_accepts_config_path() {
        let cli = Cli::try_parse_from(["slack-courier", "serve", "--config", "courier.toml"])
            .expect("serve should parse");
        match cli.command {
            Some(Commands::Serve(command)) => {
                assert_eq!(command.config.as_deref(), Some(std::path::Path::new("courier.toml")));
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }

    #[test]
    fn parse_serve_config_is_optional() {
        let cli = Cli::try_parse_from(["slack-courier", "serve"]).expect("serve should parse");
        match cli.command {
            Some(Commands::Serve(command)) => assert!(command.config.is_none()),
            other => panic!("expected serve command, got {other:?}"),
        }
    }

    #[test]
    fn parse_tools_takes_no_arguments() {
        let cli = Cli::try_parse_from(["slack-courier", "tools"]).expect("tools should parse");
        assert!(matches!(cli.command, Some(Commands::Tools)));
    }

    // ============================================================================
    // SECTION: Tool Reference Tests (1 test)
    // ============================================================================

    #[test]
    fn tool_reference_names_every_tool() {
        let reference = tooling_markdown(&tool_contracts());
        for tool in ToolName::all() {
            assert!(reference.contains(tool.as_str()), "reference should mention {tool}");
        }
    }
}
