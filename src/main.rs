//! simsweep - terminal client for a similar-image duplicate backend.
//!
//! Usage:
//!   simsweep                          Launch interactive TUI
//!   simsweep ls [PATH]                List directories on the server
//!   simsweep groups                   Print the duplicate groups
//!   simsweep act ACTION SOURCE TARGET Resolve a pair of duplicates
//!   simsweep --help                   Show help

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use itertools::Itertools;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use simsweep_client::{Backend, HttpBackend};
use simsweep_core::{ActionRequest, ClientConfig, DuplicateGroup, GroupAction};
use simsweep_tui::{TuiConfig, UserSettings};

#[derive(Parser)]
#[command(
    name = "simsweep",
    version,
    about = "Pick scan directories and resolve duplicate images on a simsweep server",
    long_about = "simsweep drives a remote similar-image duplicate finder.\n\n\
                  Run `simsweep` for the interactive TUI, or use subcommands \
                  for one-off requests."
)]
struct Cli {
    /// Server base URL (defaults to the saved setting)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Log file (defaults to the user cache directory)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List subdirectories of a server path
    Ls {
        /// Absolute path on the server; empty lists the allowed roots
        #[arg(default_value = "")]
        path: String,
    },

    /// Print the duplicate groups of the last scan
    Groups {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Apply an action to a pair of files in one group
    Act {
        /// copy_date, hardlink_image or copy_image
        action: GroupAction,
        /// File whose date or content is kept
        source: String,
        /// File that is changed
        target: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_file.clone())?;

    let settings = UserSettings::load();
    let server = cli.server.clone().unwrap_or_else(|| settings.server.clone());
    let config = ClientConfig::new(server.as_str())
        .wrap_err_with(|| format!("Invalid server URL {server}"))?;
    let backend = HttpBackend::new(config.clone()).wrap_err("Failed to create HTTP client")?;

    match cli.command {
        Some(command) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_command(backend, command))?;
        }
        None => {
            simsweep_tui::run(backend, TuiConfig::new(&config, settings))
                .wrap_err("Terminal UI failed")?;
        }
    }

    Ok(())
}

/// Log to a file; the TUI owns the terminal.
fn init_logging(log_file: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    let Some(path) = log_file.or_else(|| {
        dirs::cache_dir().map(|dir| dir.join("simsweep").join("simsweep.log"))
    }) else {
        return Ok(None);
    };

    let dir = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "simsweep.log".into());
    std::fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("Cannot create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    let filter = EnvFilter::try_from_env("SIMSWEEP_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .try_init()
        .wrap_err("Failed to install logger")?;

    Ok(Some(guard))
}

async fn run_command<B: Backend>(backend: B, command: Command) -> Result<()> {
    match command {
        Command::Ls { path } => {
            let entries = backend
                .list_directories(&path)
                .await
                .wrap_err_with(|| format!("Cannot list {path:?}"))?;
            if entries.is_empty() {
                eprintln!("No subdirectories.");
            }
            for entry in entries {
                println!("{}", entry.path);
            }
        }
        Command::Groups { format } => {
            let groups = backend
                .duplicate_groups()
                .await
                .wrap_err("Cannot fetch duplicate groups")?;
            match format {
                OutputFormat::Text => print_groups(&groups),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&groups)?),
            }
        }
        Command::Act {
            action,
            source,
            target,
        } => {
            let request = ActionRequest {
                action,
                source,
                target,
            };
            backend
                .group_action(&request)
                .await
                .wrap_err_with(|| format!("{action} failed"))?;
            println!("{}: {} -> {}", action.label(), request.source, request.target);
        }
    }
    Ok(())
}

fn print_groups(groups: &[DuplicateGroup]) {
    println!();
    println!("{}", "─".repeat(70));
    println!(" Duplicate Image Groups");
    println!("{}", "─".repeat(70));
    println!();

    if groups.is_empty() {
        println!(" No duplicate groups.");
        return;
    }

    let reclaimable: u64 = groups.iter().map(DuplicateGroup::wasted_bytes).sum();
    println!(
        " {} groups, {} files, {} reclaimable",
        groups.len(),
        groups.iter().map(DuplicateGroup::len).sum::<usize>(),
        format_size(reclaimable)
    );
    println!();

    for (i, group) in groups.iter().enumerate() {
        println!(
            " Group {} ({} files, {} reclaimable)",
            i + 1,
            group.len(),
            format_size(group.wasted_bytes())
        );
        for file in &group.files {
            println!(
                "   {:<50} {:>10}  {}  {}  dev {}",
                file.canonical_path(),
                format_size(file.size),
                file.date.format("%Y-%m-%d %H:%M:%S"),
                file.date_source,
                file.device_id
            );
            if file.extra_links() > 0 {
                println!("     also: {}", file.paths.iter().skip(1).join(", "));
            }
        }
        println!();
    }
}

fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
