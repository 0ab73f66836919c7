//! The `gitid` setup flow: resolve settings, run the core steps, print a report.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use gitid_core::git;
use gitid_core::keys::public_key_path;
use gitid_core::utils::paths::{default_ssh_dir, expand_path};
use gitid_core::{
    GitIdError, Identity, KeyStatus, ReconcileOutcome, RemoteAction, RemoteSource, SetupReport,
    SetupRequest, Settings, SshKeygen, load_settings,
};
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Identity label, e.g. `work` or `llc`
    #[arg(short, long)]
    identity: String,

    /// SSH user for the host block [default: git]
    #[arg(short, long)]
    user: Option<String>,

    /// Remote URL to alias instead of reading `origin` (the repository is left untouched)
    #[arg(short, long = "repo", value_name = "URL")]
    repo: Option<String>,

    /// Prefix for host aliases and key names [default: gitid]
    #[arg(short, long)]
    prefix: Option<String>,

    /// Directory holding the SSH config and keys [default: ~/.ssh]
    #[arg(long, value_name = "DIR")]
    ssh_dir: Option<PathBuf>,

    /// Show what would change without touching git, keys or the SSH config
    #[arg(long)]
    dry_run: bool,
}

pub fn execute(args: SetupArgs, quiet: bool) -> Result<()> {
    let loaded = load_settings()?;
    if let Some(source) = &loaded.source {
        debug!("Using settings from {}", source.display());
    }
    let request = build_request(args, loaded.settings)?;

    let report = gitid_core::setup::run(&request, &SshKeygen)?;
    print_report(&request, &report, quiet);
    Ok(())
}

/// Layer CLI flags over the loaded settings and pick the remote source.
fn build_request(args: SetupArgs, settings: Settings) -> Result<SetupRequest> {
    let prefix = args.prefix.unwrap_or(settings.prefix);
    let user = args.user.unwrap_or(settings.user);
    let ssh_dir = match args.ssh_dir.or(settings.ssh_dir) {
        Some(dir) => expand_path(&dir)?,
        None => default_ssh_dir()?,
    };

    let identity = Identity::new(&args.identity, &prefix)?;

    let remote = if let Some(url) = args.repo {
        RemoteSource::Explicit(url)
    } else {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        if !git::is_inside_work_tree(&cwd) {
            return Err(GitIdError::NotInGitRepo)
                .context("Run gitid inside a git repository or pass --repo <URL>");
        }
        RemoteSource::Repository(cwd)
    };

    Ok(SetupRequest {
        identity,
        user,
        ssh_dir,
        remote,
        dry_run: args.dry_run,
    })
}

fn print_report(request: &SetupRequest, report: &SetupReport, quiet: bool) {
    let dry_run = request.dry_run;
    let tag = if dry_run {
        "DRY RUN".yellow()
    } else {
        "OK".green()
    };

    if !quiet {
        println!("{} Host alias: {}", "OK".green(), report.host.hostname().cyan());

        match &report.remote {
            RemoteAction::Rewritten { from, to } => {
                println!("{} Rewrote {}: {} -> {}", "OK".green(), git::ORIGIN, from, to);
            }
            RemoteAction::Suggested { from, to } => {
                println!("{} Remote should change: {} -> {}", "NOTE".yellow(), from, to);
                if !dry_run {
                    println!("     git remote set-url {} {}", git::ORIGIN, to);
                }
            }
            RemoteAction::Unchanged { url } => {
                println!("{} Remote already uses this identity: {}", "OK".green(), url);
            }
        }

        match &report.key {
            KeyStatus::AlreadyPresent(path) => {
                println!("{} Key exists: {}", "OK".green(), path.display());
            }
            KeyStatus::Generated(path) => {
                println!("{} Generated key: {}", "OK".green(), path.display());
                println!(
                    "     Add {} to your git host",
                    public_key_path(path).display()
                );
            }
            KeyStatus::Missing(path) => {
                println!("{} Would generate key: {}", tag, path.display());
            }
        }

        let config = report.config_path.display();
        match &report.config {
            ReconcileOutcome::Appended { .. } if dry_run => {
                println!("{tag} Would add Host block to {config}");
            }
            ReconcileOutcome::Appended { .. } => {
                println!("{tag} Added Host block to {config}");
            }
            ReconcileOutcome::UserUpdated { previous } => {
                println!("{tag} Changed User {previous} -> {} in {config}", request.user);
            }
            ReconcileOutcome::UserInserted => {
                println!("{tag} Added User line to {config}");
            }
            ReconcileOutcome::Unchanged => {
                println!("{} {config} already up to date", "OK".green());
            }
            ReconcileOutcome::Skipped => {
                println!(
                    "{} Existing Host block in {config} left unchanged",
                    "NOTE".yellow()
                );
            }
        }
    }

    if dry_run {
        println!(
            "{tag} No changes written for {}",
            report.host.label().bold()
        );
    } else {
        println!(
            "{tag} {} is set up for {}",
            report.host.label().bold(),
            report.host.real_host()
        );
    }
}
