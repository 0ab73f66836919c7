//! gitid CLI.
//!
//! Points a repository's `origin` at a per-identity SSH host alias, makes sure
//! the identity has a key, and keeps `~/.ssh/config` in sync with the alias.

use anyhow::Result;
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "gitid")]
#[command(about = "Per-identity SSH host aliases for git remotes")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    setup: commands::setup::SetupArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only report errors and the final status
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    commands::setup::execute(cli.setup, cli.quiet)
}
