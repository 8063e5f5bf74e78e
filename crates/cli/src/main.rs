//! glaunch - graphics backend probing launcher
//!
//! Tries a sequence of graphics backend configurations (software OpenGL,
//! Vulkan via lavapipe, then the default environment) until one keeps the
//! target application alive, then hands control to it and propagates its
//! exit status.

mod console;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glaunch_core::application::{Prober, ReapPolicy};
use glaunch_core::domain::{builtin_backends, BackendConfig, LaunchPlan, LaunchVerdict};
use glaunch_core::port::clock::SystemClock;
use glaunch_infra_system::{vulkan_icd, SystemReporter, TokioProcessRunner};

use console::ConsoleReporter;
use settings::Settings;

#[derive(Parser)]
#[command(name = "glaunch")]
#[command(about = "Launches a GPU application by probing graphics backends", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe backends in order and launch the target (the default)
    Run {
        /// Target executable (overrides settings)
        #[arg(short, long)]
        executable: Option<PathBuf>,

        /// Grace period before each liveness probe, in seconds
        #[arg(long)]
        grace_secs: Option<u64>,

        /// Leave children that failed their probe running (historical behavior)
        #[arg(long)]
        no_reap: bool,

        /// Skip a backend by label (repeatable)
        #[arg(long)]
        skip: Vec<String>,
    },

    /// Show the backend probing table
    List,

    /// Inspect the rendering environment of this host
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let settings = Settings::load().map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;

    match cli.command.unwrap_or(Commands::Run {
        executable: None,
        grace_secs: None,
        no_reap: false,
        skip: Vec::new(),
    }) {
        Commands::Run {
            executable,
            grace_secs,
            no_reap,
            skip,
        } => run(settings, executable, grace_secs, no_reap, skip).await,

        Commands::List => {
            list(&settings);
            Ok(())
        }

        Commands::Doctor => {
            doctor();
            Ok(())
        }
    }
}

/// Logging goes to stderr so the progress lines own stdout.
/// Pretty by default, JSON when GLAUNCH_LOG_FORMAT=json.
fn init_logging() {
    let log_format = std::env::var("GLAUNCH_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

async fn run(
    settings: Settings,
    executable: Option<PathBuf>,
    grace_secs: Option<u64>,
    no_reap: bool,
    skip: Vec<String>,
) -> Result<()> {
    let executable = executable.unwrap_or_else(|| settings.executable.clone());
    let grace = Duration::from_secs(grace_secs.unwrap_or(settings.grace_secs));
    let reap_policy = if no_reap || !settings.reap_rejected {
        ReapPolicy::Abandon
    } else {
        ReapPolicy::Reap
    };

    let backends = effective_backends(&settings, &skip);
    let plan = LaunchPlan::new(executable, backends, grace)?;

    info!(
        executable = %plan.executable.display(),
        backends = plan.backends.len(),
        grace_secs = grace.as_secs(),
        reap_policy = ?reap_policy,
        "Starting backend probe"
    );

    let prober = Prober::new(
        Arc::new(TokioProcessRunner),
        Arc::new(SystemClock),
        Arc::new(ConsoleReporter),
        reap_policy,
    );

    let report = prober.launch(&plan).await?;

    if report.verdict == LaunchVerdict::FallbackSpawnFailed {
        eprintln!(
            "{} {}",
            "✗".red().bold(),
            format!("Could not launch {}", plan.executable.display())
        );
    }

    std::process::exit(report.verdict.exit_code());
}

/// Settings table (or the built-in one), minus skipped labels. The lavapipe
/// ICD path is resolved here so the prober only ever sees plain data.
fn effective_backends(settings: &Settings, skip: &[String]) -> Vec<BackendConfig> {
    let icd = vulkan_icd::find_lavapipe_icd();
    let table = settings
        .backends
        .clone()
        .unwrap_or_else(|| builtin_backends(icd.as_deref()));

    table
        .into_iter()
        .filter(|backend| !skip.iter().any(|label| label == &backend.label))
        .collect()
}

#[derive(Tabled)]
struct BackendRow {
    #[tabled(rename = "#")]
    order: usize,
    #[tabled(rename = "Backend")]
    label: String,
    #[tabled(rename = "Environment overrides")]
    overrides: String,
}

fn list(settings: &Settings) {
    let backends = effective_backends(settings, &[]);

    let mut rows: Vec<BackendRow> = backends
        .iter()
        .enumerate()
        .map(|(i, backend)| BackendRow {
            order: i + 1,
            label: backend.label.clone(),
            overrides: backend
                .env
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" "),
        })
        .collect();

    // The unconditional final attempt, always last.
    rows.push(BackendRow {
        order: rows.len() + 1,
        label: "Default".to_string(),
        overrides: "(none)".to_string(),
    });

    println!("{}", Table::new(rows));
}

fn doctor() {
    let report = SystemReporter::new().collect();

    println!("{}", "Render Environment".cyan().bold());
    println!();
    println!("  {} {}", "CPUs:".bold(), report.cpu_count);
    println!(
        "  {} {} / {} MB",
        "Memory:".bold(),
        report.memory_used_mb,
        report.memory_total_mb
    );

    if report.has_display() {
        let mut servers = Vec::new();
        if let Some(display) = &report.display {
            servers.push(format!("X11 ({display})"));
        }
        if let Some(wayland) = &report.wayland_display {
            servers.push(format!("Wayland ({wayland})"));
        }
        println!(
            "  {} {}",
            "Display:".bold(),
            servers.join(", ").green()
        );
    } else {
        println!("  {} {}", "Display:".bold(), "none detected".yellow());
    }

    match &report.lavapipe_icd {
        Some(path) => println!(
            "  {} {}",
            "Lavapipe:".bold(),
            path.display().to_string().green()
        ),
        None => println!(
            "  {} {}",
            "Lavapipe:".bold(),
            "not installed (vulkan attempt will use the conventional path)".yellow()
        ),
    }

    println!();
    if report.icd_manifests.is_empty() {
        println!("  {} (none)", "Vulkan ICDs:".bold());
    } else {
        println!("  {}", "Vulkan ICDs:".bold());
        for manifest in &report.icd_manifests {
            println!("    {}", manifest.display());
        }
    }

    println!();
    if report.render_vars.is_empty() {
        println!("  {} (none)", "Graphics variables:".bold());
    } else {
        println!("  {}", "Graphics variables:".bold());
        for (key, value) in &report.render_vars {
            println!("    {key}={value}");
        }
    }
}
