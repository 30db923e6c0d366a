use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

mod cmd;
mod config;
mod invoke;
mod mcp;
mod tools;
mod utils;

use cmd::{CallArgs, ToolsArgs};
use config::Settings;
use invoke::Dispatcher;

/// mtv-mcp - MCP server for KubeVirt (virtctl) and Migration Toolkit for
/// Virtualization (kubectl-mtv)
///
/// Commands:
///   mtv-mcp serve                         MCP over stdio
///   mtv-mcp tools [NAME] [--json]         show the tool catalogue
///   mtv-mcp call <TOOL> [--param k=v ...] [--param-file F] [--json]
///
/// Global flags / env:
///   -v / -vv                 Increase verbosity (logs go to stderr)
///   -q / --quiet             Errors only
///   --virtctl-command CMD    VM CLI command line, e.g. "kubectl virt" (or VIRTCTL_COMMAND)
///   --timeout SECS           Per-command timeout
///   RUST_LOG                 Overrides -v / -q when set
///
/// Examples:
///   mtv-mcp serve
///   mtv-mcp tools VirtctlVMLifecycle
///   mtv-mcp call VirtctlVMLifecycle --param vm_name=fedora --param operation=start
///   mtv-mcp call ManageMapping --param-file mapping.yaml --json
#[derive(Parser, Debug)]
#[command(
    name = "mtv-mcp",
    version,
    author,
    about = "MCP server exposing virtctl, kubectl and kubectl-mtv as tools",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// VM CLI command line (shell-style split)
    #[arg(
        long = "virtctl-command",
        env = "VIRTCTL_COMMAND",
        default_value = config::DEFAULT_VIRTCTL,
        global = true,
        value_name = "CMD"
    )]
    virtctl_command: String,

    /// Timeout for each external command, in seconds
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT.as_secs(), global = true, value_name = "SECS")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the tools over MCP (stdio)
    Serve,

    /// List tools, or show one in detail
    Tools(ToolsArgs),

    /// Invoke a tool directly
    Call(CallArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let settings = Arc::new(Settings::new(
        &cli.virtctl_command,
        Duration::from_secs(cli.timeout),
    )?);
    tracing::debug!(?settings, "settings");

    match cli.command {
        Commands::Serve => mcp::serve(Dispatcher::new(settings)).await,
        Commands::Tools(args) => cmd::execute_tools(args),
        Commands::Call(args) => cmd::execute_call(args, &Dispatcher::new(settings)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn virtctl_command_and_timeout_flags() {
        let cli = Cli::try_parse_from([
            "mtv-mcp",
            "--virtctl-command",
            "kubectl virt",
            "--timeout",
            "30",
            "call",
            "GetVersion",
        ])
        .unwrap();
        assert_eq!(cli.virtctl_command, "kubectl virt");
        assert_eq!(cli.timeout, 30);
        assert!(matches!(cli.command, Commands::Call(ref a) if a.tool == "GetVersion"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mtv-mcp", "tools", "--json", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Tools(ref a) if a.json && a.name.is_none()));
    }
}
