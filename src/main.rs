// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use url::Url;

use localcast::logging::init_logging;
use localcast::server::bind;
use localcast::{
    AppState, DirectoryPoller, FeedOptions, FfprobeProber, Library, LogReporter, NoopReporter,
    ProgressEvent, ProgressReporter, SharedProgressReporter, SyncError, SyncOptions, SyncResult,
    WatchOptions, run_sync_loop, serve,
};

// Emoji with fallback for terminals without Unicode support
static RADIO: Emoji<'_, '_> = Emoji("📻 ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");

/// Serve a folder of audio files as a podcast feed
#[derive(Parser, Debug)]
#[command(name = "localcast")]
#[command(about = "Serve a folder of audio files as a podcast feed")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch the directory and serve its feed over HTTP
    Serve(ServeArgs),
    /// Synchronize the metadata cache once and exit
    Scan(LibraryArgs),
}

#[derive(Args, Debug)]
struct LibraryArgs {
    /// Directory containing the audio files
    #[arg(short, long, env = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Program used to read media durations
    #[arg(long, env = "FFPROBE", default_value = "ffprobe")]
    ffprobe: PathBuf,

    /// Maximum number of concurrent duration probes
    #[arg(short = 'c', long, default_value = "4")]
    concurrent: usize,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    /// Also append logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    library: LibraryArgs,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Public base URL used in feed links instead of the request's Host header
    #[arg(long, env = "PUBLIC_URL")]
    public_url: Option<Url>,

    /// Feed title
    #[arg(long, default_value = "Local podcast feed")]
    title: String,

    /// Milliseconds between directory change checks
    #[arg(long, default_value = "2000")]
    poll_ms: u64,

    /// Milliseconds to wait for a burst of changes to settle
    #[arg(long, default_value = "500")]
    debounce_ms: u64,
}

impl LibraryArgs {
    fn library(&self, reporter: SharedProgressReporter) -> Library {
        let options = SyncOptions {
            max_concurrent_probes: self.concurrent,
            ..Default::default()
        };

        Library::new(
            &self.dir,
            Arc::new(FfprobeProber::new(&self.ffprobe)),
            options,
            reporter,
        )
    }
}

/// Progress reporter using an indicatif spinner for terminal output
struct SpinnerReporter {
    bar: ProgressBar,
}

impl SpinnerReporter {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {wide_msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }
}

impl ProgressReporter for SpinnerReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::SyncStarted { dir } => {
                self.bar
                    .set_message(format!("{SEARCH}Scanning {}", dir.display().to_string().cyan()));
            }

            ProgressEvent::DirectoryListed {
                total_files,
                cached_files,
                new_files,
            } => {
                self.bar.println(format!(
                    "{HEADPHONES}{} media files, {} cached, {} new",
                    total_files.to_string().cyan(),
                    cached_files.to_string().green(),
                    new_files.to_string().yellow()
                ));
            }

            ProgressEvent::CacheDiscarded { error } => {
                self.bar.println(format!(
                    "{WARNING}{} {}",
                    "Ignoring metadata cache:".yellow(),
                    error.dimmed()
                ));
            }

            ProgressEvent::ProbeStarting {
                file,
                probe_index,
                total_to_probe,
            } => {
                self.bar.set_message(format!(
                    "[{}/{}] {}",
                    (probe_index + 1).to_string().cyan(),
                    total_to_probe.to_string().cyan(),
                    file_name(&file)
                ));
            }

            ProgressEvent::ProbeCompleted { .. } => {}

            ProgressEvent::ProbeFailed { file, error } => {
                self.bar.println(format!(
                    "{WARNING}{} - {}",
                    file_name(&file).yellow(),
                    error.dimmed()
                ));
            }

            ProgressEvent::SyncCompleted { .. } => {
                self.bar.finish_and_clear();
            }
        }
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn print_summary(result: &SyncResult) {
    println!(
        "\n{PARTY}{} {} episodes, {} new, {} removed, {} without duration",
        "Sync complete:".bold().green(),
        result.total.to_string().green().bold(),
        result.probed.to_string().yellow(),
        result.pruned.to_string().cyan(),
        if result.probe_failures > 0 {
            result.probe_failures.to_string().red().bold()
        } else {
            result.probe_failures.to_string().green()
        }
    );
}

async fn scan(args: LibraryArgs) -> Result<()> {
    init_logging(args.verbose, args.log_file.as_deref());

    println!(
        "\n{}{} {}\n",
        RADIO,
        "localcast".bold().magenta(),
        "- Local Podcast Feed".dimmed()
    );

    let library = args.library(Arc::new(SpinnerReporter::new()));

    match library.sync().await {
        Ok(result) => print_summary(&result),
        Err(SyncError::CacheWrite(e)) => {
            println!("{WARNING}{}", format!("Metadata cache not saved: {e}").yellow());
        }
        Err(e) => return Err(e).context("Failed to scan library"),
    }

    println!(
        "\n{FOLDER}Library: {}\n",
        library.root().display().to_string().cyan()
    );
    Ok(())
}

async fn run_server(args: ServeArgs) -> Result<()> {
    init_logging(args.library.verbose, args.library.log_file.as_deref());

    let reporter = if args.library.verbose {
        LogReporter::shared()
    } else {
        NoopReporter::shared()
    };
    let library = Arc::new(args.library.library(reporter));

    let watch = WatchOptions {
        poll_interval: Duration::from_millis(args.poll_ms),
        debounce: Duration::from_millis(args.debounce_ms),
    };
    // Baseline is taken now, so files arriving during the first scan still trigger a resync
    let poller = DirectoryPoller::for_library(&library, watch.poll_interval);

    match library.sync().await {
        Ok(result) => log::info!(
            "Ready: {} episodes in {}",
            result.total,
            library.root().display()
        ),
        Err(e) => log::error!("Initial scan of {} failed: {e}", library.root().display()),
    }

    let (signals, receiver) = mpsc::channel(1);
    tokio::spawn(poller.run(signals));
    tokio::spawn(run_sync_loop(library.clone(), receiver, watch.debounce));

    let state = AppState::new(
        library.directory().clone(),
        FeedOptions {
            title: args.title,
            public_url: args.public_url,
        },
    );

    let listener = bind(&format!("{}:{}", args.host, args.port))
        .await
        .context("Failed to start server")?;
    serve(listener, state).await.context("Server stopped")
}

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Serve(args) => run_server(args).await,
        Command::Scan(args) => scan(args).await,
    }
}
