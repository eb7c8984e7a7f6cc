// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotlens::{
    deploy::{unknown_conditions, Disposition, FileMapping, SimulationRequest},
    path::default_settings_path,
    server, AnyProvider, Dashboard, Platform, Settings,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use std::{net::SocketAddr, path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  dotlens [options] <dotlens-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to settings file.
    #[arg(short, long, env = "DOTLENS_SETTINGS", value_name = "path")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    async fn run(self) -> Result<()> {
        let settings = load_settings(self.settings).await?;
        match self.command {
            Command::Serve(opts) => run_serve(settings, opts).await,
            Command::Deploy(opts) => run_deploy(settings, opts).await,
            Command::Tree(opts) => run_tree(settings, opts).await,
            Command::Simulate(opts) => run_simulate(settings, opts).await,
            Command::Check => run_check(settings).await,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Serve dashboard HTTP API.
    #[command(override_usage = "dotlens serve [options]")]
    Serve(ServeOptions),

    /// List files deployed on a platform.
    #[command(override_usage = "dotlens deploy [options]")]
    Deploy(DeployOptions),

    /// Show what happens to every source file on a platform.
    #[command(override_usage = "dotlens tree [options]")]
    Tree(TreeOptions),

    /// Show deployment changes caused by toggling modules.
    #[command(override_usage = "dotlens simulate [options]")]
    Simulate(SimulateOptions),

    /// Check repository configuration and ignore file for problems.
    #[command(override_usage = "dotlens check")]
    Check,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ServeOptions {
    /// Socket address to listen on instead of the one in settings.
    #[arg(short, long, env = "DOTLENS_BIND", value_name = "address")]
    pub bind: Option<SocketAddr>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct DeployOptions {
    /// Target platform.
    #[arg(short, long, value_name = "platform")]
    pub platform: Option<Platform>,

    /// Only list deploy paths matching glob, e.g., ".config/**".
    #[arg(short, long, value_name = "glob")]
    pub filter: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct TreeOptions {
    /// Target platform.
    #[arg(short, long, value_name = "platform")]
    pub platform: Option<Platform>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SimulateOptions {
    /// Target platform.
    #[arg(short, long, value_name = "platform")]
    pub platform: Option<Platform>,

    /// Module to switch on.
    #[arg(short, long, value_name = "module")]
    pub enable: Vec<String>,

    /// Module to switch off.
    #[arg(short, long, value_name = "module")]
    pub disable: Vec<String>,
}

#[tokio::main]
async fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run().await {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

async fn run() -> Result<()> {
    Cli::parse().run().await
}

async fn load_settings(path: Option<PathBuf>) -> Result<Settings> {
    let path = match path {
        Some(path) => path,
        None => default_settings_path()?,
    };

    let data = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read settings from {path:?}"))?;
    let settings = data
        .parse::<Settings>()
        .with_context(|| format!("invalid settings in {path:?}"))?;

    Ok(settings)
}

fn dashboard(settings: &Settings) -> Result<Dashboard<AnyProvider>> {
    let provider = AnyProvider::from_settings(&settings.repository)?;
    Ok(Dashboard::new(provider, settings.files.clone()))
}

async fn run_serve(settings: Settings, opts: ServeOptions) -> Result<()> {
    let bind = opts.bind.unwrap_or(settings.server.bind);
    let dashboard = dashboard(&settings)?;
    server::serve(bind, dashboard, settings.server.default_platform).await?;

    Ok(())
}

async fn run_deploy(settings: Settings, opts: DeployOptions) -> Result<()> {
    let filter = opts
        .filter
        .as_deref()
        .map(glob::Pattern::new)
        .transpose()
        .context("invalid filter")?;
    let platform = opts.platform.unwrap_or(settings.server.default_platform);
    let deployment = dashboard(&settings)?.deployment(platform).await?;

    let files = deployment
        .files
        .iter()
        .filter(|mapping| {
            filter
                .as_ref()
                .is_none_or(|filter| filter.matches(mapping.target_path()))
        })
        .collect::<Vec<_>>();
    for mapping in &files {
        println!("{}", format_mapping(mapping));
    }
    info!("{} of {} files deployed on {platform}", files.len(), deployment.total);

    Ok(())
}

async fn run_tree(settings: Settings, opts: TreeOptions) -> Result<()> {
    let platform = opts.platform.unwrap_or(settings.server.default_platform);
    let tree = dashboard(&settings)?.source_tree(platform).await?;

    for entry in &tree.entries {
        let (status, detail) = describe(&entry.disposition);
        println!("{status:<11} {}{detail}", entry.source_path);
    }

    Ok(())
}

async fn run_simulate(settings: Settings, opts: SimulateOptions) -> Result<()> {
    let platform = opts.platform.unwrap_or(settings.server.default_platform);
    let mut modules = IndexMap::new();
    modules.extend(opts.enable.into_iter().map(|module| (module, true)));
    modules.extend(opts.disable.into_iter().map(|module| (module, false)));

    let request = SimulationRequest { platform, modules };
    let result = dashboard(&settings)?.simulate(request).await?;

    for mapping in &result.added {
        println!("+ {}", format_mapping(mapping));
    }
    for mapping in &result.removed {
        println!("- {}", format_mapping(mapping));
    }
    println!(
        "{} -> {} files deployed on {platform}",
        result.total_before, result.total_after
    );

    Ok(())
}

async fn run_check(settings: Settings) -> Result<()> {
    let snapshot = dashboard(&settings)?.snapshot().await?;
    let unknown = unknown_conditions(&snapshot.ignore_text);
    if snapshot.warnings.is_empty() && unknown.is_empty() {
        println!("configuration looks good");
    }

    for warning in &snapshot.warnings {
        println!("warning: {warning}");
    }

    for (line, condition) in unknown {
        println!("warning: ignore line {line} has unknown condition {condition:?}, treating it as true");
    }

    Ok(())
}

fn format_mapping(mapping: &FileMapping) -> String {
    let mut line = format!("{} <- {}", mapping.deploy_path, mapping.source_path);
    if mapping.is_template {
        line.push_str(" [template]");
    }
    if mapping.is_executable {
        line.push_str(" [executable]");
    }

    line
}

fn describe(disposition: &Disposition) -> (&'static str, String) {
    match disposition {
        Disposition::Deployed { mapping } => ("deployed", format!(" -> {}", mapping.deploy_path)),
        Disposition::Structural => ("structural", String::new()),
        Disposition::Ignored { pattern } => ("ignored", format!(" ({pattern})")),
        Disposition::Unsupported { platforms } => {
            let platforms = platforms.iter().map(Platform::as_str).collect::<Vec<_>>();
            ("unsupported", format!(" ({})", platforms.join(", ")))
        }
        Disposition::Disabled { modules } => {
            let modules = modules.iter().map(String::as_str).collect::<Vec<_>>();
            ("disabled", format!(" ({})", modules.join(", ")))
        }
    }
}
