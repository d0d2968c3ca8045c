//! hnyfind - search Honeycomb datasets from a launcher.
//!
//! `hnyfind [QUERY]` prints a Script Filter JSON document of matching
//! datasets, `hnyfind --download` refreshes the local cache, and
//! `hnyfind --set <KEY>` stores the API key in the keychain.

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hnyfind_core::auth::KeyringCredentials;
use hnyfind_core::cache::CacheManager;
use hnyfind_core::feedback::Feedback;
use hnyfind_core::refresh::PidFileCoordinator;
use hnyfind_core::{set_credential, Config, DownloadOutcome, Workflow};

/// Log file written by background downloads, whose stderr goes nowhere
const DOWNLOAD_LOG: &str = "download.log";

#[derive(Debug, Parser)]
#[command(name = "hnyfind", version, about = "Search Honeycomb datasets")]
struct Cli {
    /// Store the Honeycomb API key in the keychain
    #[arg(long = "set", value_name = "KEY")]
    set: Option<String>,

    /// Download the dataset list into the cache and exit
    #[arg(long)]
    download: bool,

    /// Text to match against dataset names; words are joined with spaces
    #[arg(
        value_name = "QUERY",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true,
    )]
    query: Vec<String>,
}

impl Cli {
    fn query_text(&self) -> String {
        self.query.join(" ")
    }

    fn is_query_mode(&self) -> bool {
        self.set.is_none() && !self.download
    }
}

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG to control the level (e.g. RUST_LOG=debug). With a
/// `log_dir`, events are also appended to a log file there; the returned
/// guard must live until exit so buffered lines get flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, DOWNLOAD_LOG);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn write_feedback(feedback: &Feedback) -> Result<()> {
    let mut stdout = io::stdout().lock();
    feedback
        .write_to(&mut stdout)
        .context("Failed to write results")?;
    stdout.flush()?;
    Ok(())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(ref api_key) = cli.set {
        let _guard = init_tracing(None);
        set_credential(&KeyringCredentials::default(), api_key)?;
        return Ok(ExitCode::SUCCESS);
    }

    // Config errors are reported once logging is up
    let (config, config_error) = match Config::load() {
        Ok(c) => (c, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let cache_dir = config.cache_dir()?;

    let log_dir = cli.download.then_some(cache_dir.as_path());
    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let _guard = init_tracing(log_dir);
    if let Some(e) = config_error {
        warn!(error = %format!("{e:#}"), "Failed to load config, using defaults");
    }

    let cache = CacheManager::new(cache_dir.clone())?;
    let coordinator = PidFileCoordinator::for_current_exe(cache_dir)
        .context("Cannot locate the hnyfind executable")?;
    let workflow = Workflow::new(config, cache, KeyringCredentials::default(), coordinator);

    if cli.download {
        // Logged here, while the file writer guard is still alive
        return match workflow.download().await {
            Ok(DownloadOutcome::Stored(count)) => {
                info!(count, "Download complete");
                Ok(ExitCode::SUCCESS)
            }
            Ok(DownloadOutcome::AlreadyRunning) => Ok(ExitCode::SUCCESS),
            Err(e) => {
                error!(error = %format!("{e:#}"), "Download failed");
                Err(e)
            }
        };
    }

    match workflow.query(&cli.query_text()) {
        Ok(feedback) => {
            write_feedback(&feedback)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Query failed");
            write_feedback(&Feedback::error(&e))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn is_mode_flag(arg: &str) -> bool {
    arg == "--download" || arg == "--set" || arg.starts_with("--set=")
}

/// Whether raw arguments that failed to parse were meant as a query
fn is_query_invocation(args: &[String]) -> bool {
    !args.iter().skip(1).any(|a| is_mode_flag(a))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let args: Vec<String> = std::env::args_os()
                .map(|a| a.to_string_lossy().into_owned())
                .collect();
            if e.use_stderr() && is_query_invocation(&args) {
                let err = anyhow!("Invalid arguments: {}", e.kind());
                let _ = write_feedback(&Feedback::error(&err));
            }
            e.exit()
        }
    };
    let query_mode = cli.is_query_mode();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            // The launcher must still get a document to show
            if query_mode {
                let _ = write_feedback(&Feedback::error(&e));
            }
            ExitCode::FAILURE
        }
    }
}
