//! CLI frontend for Kodoku Quest.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use kq_core::DEFAULT_UTC_OFFSET_HOURS;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::Context;

#[derive(Parser)]
#[command(
    name = "kq",
    about = "Kodoku Quest: score the day you spent at home",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory for sessions, cache and statistics
    #[arg(long, global = true, env = "KQ_DATA_DIR", default_value = ".kodoku")]
    data_dir: PathBuf,

    /// RNG seed for reproducible scenes and rewards
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Local offset from UTC in hours
    #[arg(long, global = true, default_value_t = DEFAULT_UTC_OFFSET_HOURS, allow_negative_numbers = true)]
    utc_offset: i32,

    /// OPI endpoint URL (falls back to a local estimate when unset)
    #[arg(long, global = true, env = "KQ_OPI_URL")]
    opi_url: Option<String>,

    /// Bearer token for the OPI endpoint
    #[arg(long, global = true, env = "KQ_OPI_KEY", hide_env_values = true)]
    opi_key: Option<String>,

    /// Always fetch, never read or write the OPI cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current scene and remember the form for `play`
    Scene {
        /// Resume this session instead of the pending one
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Submit a choice from the last scene
    Play {
        /// Choice key, e.g. stay_tea
        choice: String,

        /// Override the OPI the scene was shown with
        #[arg(long)]
        opi: Option<String>,

        /// Override the anti-forgery token
        #[arg(long)]
        csrf: Option<String>,

        /// Override the session id
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Print the current OPI reading
    Opi,

    /// Show session totals, history and titles
    Status {
        /// Session id (default: the pending one)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Show daily statistics
    Stats,

    /// OPI cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove every cache entry
    Clear,
    /// Remove expired cache entries
    Gc,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let ctx = Context {
        data_dir: cli.data_dir,
        seed: cli.seed,
        utc_offset_hours: cli.utc_offset,
        opi_url: cli.opi_url,
        opi_key: cli.opi_key,
        no_cache: cli.no_cache,
    };

    let result = match cli.command {
        Commands::Scene { session } => commands::scene::run(&ctx, session.as_deref()).await,
        Commands::Play {
            choice,
            opi,
            csrf,
            session,
        } => commands::play::run(&ctx, &choice, opi, csrf, session),
        Commands::Opi => commands::opi::run(&ctx).await,
        Commands::Status { session } => commands::status::run(&ctx, session.as_deref()),
        Commands::Stats => commands::stats::run(&ctx),
        Commands::Cache { action } => match action {
            CacheAction::Clear => commands::cache::clear(&ctx),
            CacheAction::Gc => commands::cache::gc(&ctx),
        },
    };

    if let Err(e) = result {
        eprintln!("{:?}", miette::miette!("{e}"));
        process::exit(1);
    }
}
