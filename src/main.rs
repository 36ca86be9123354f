//! histkeep CLI - bounded conversation history.

use clap::{Parser, Subcommand};
use histkeep::{cli, config, logging};
use std::path::PathBuf;
use std::process::ExitCode;

/// Get the version string.
///
/// - Release builds (on a git tag): "0.1.0"
/// - Development builds: "0.1.0-dev (abc1234)"
/// - Dirty working directory: "0.1.0-dev (abc1234-dirty)"
fn version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("HISTKEEP_GIT_HASH");
    const IS_RELEASE: &str = env!("HISTKEEP_IS_RELEASE");

    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" {
            VERSION.to_string()
        } else {
            format!("{VERSION}-dev ({GIT_HASH})")
        }
    })
}

#[derive(Parser)]
#[command(name = "histkeep")]
#[command(author, version = version(), about = "Bounded conversation history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty session and print its id.
    New,

    /// Append a chat turn to a session.
    Record {
        /// Session ID.
        session_id: String,

        /// Speaker role (system, user, assistant).
        role: String,

        /// Message content.
        content: String,

        /// Extra string field as key=value. Repeatable.
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Capacity for this session. Defaults to the configured max_length.
        #[arg(long)]
        max_length: Option<usize>,
    },

    /// Show a session's records.
    Show {
        /// Session ID.
        session_id: String,

        /// Only show the last N records.
        #[arg(short, long)]
        last: Option<usize>,

        /// Show every field of each record.
        #[arg(short, long)]
        verbose: bool,

        /// Print the records as a JSON array.
        #[arg(long)]
        json: bool,
    },

    /// List recent sessions.
    List {
        /// Maximum number of sessions to show. Defaults to 20.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only show sessions whose id matches this glob.
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Clear a session's history.
    Reset {
        /// Session ID.
        session_id: String,
    },

    /// Write a session's history to a JSON file.
    Export {
        /// Session ID.
        session_id: String,

        /// Output path. Defaults to conversation_<timestamp>.json.
        path: Option<PathBuf>,
    },

    /// Replace a session's history with a JSON file.
    Import {
        /// Session ID.
        session_id: String,

        /// Input path.
        path: PathBuf,
    },

    /// Show record, text and sentiment statistics for a session.
    Stats {
        /// Session ID.
        session_id: String,
    },

    /// Remove old sessions.
    Clean {
        /// Duration (e.g., "7d", "30d", "24h"). Defaults to the configured retention.
        #[arg(long)]
        before: Option<String>,

        /// Remove all sessions.
        #[arg(long)]
        all: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("histkeep: error: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init_logging(&config.logging.level);

    let result = match cli.command {
        Commands::New => cli::new::run(&config),
        Commands::Record {
            session_id,
            role,
            content,
            fields,
            max_length,
        } => cli::record::run(&config, &session_id, &role, &content, &fields, max_length),
        Commands::Show {
            session_id,
            last,
            verbose,
            json,
        } => cli::show::run(&config, &session_id, last, verbose, json),
        Commands::List { limit, filter } => cli::list::run(&config, limit, filter.as_deref()),
        Commands::Reset { session_id } => cli::reset::run(&config, &session_id),
        Commands::Export { session_id, path } => {
            cli::export::run(&config, &session_id, path.as_deref())
        }
        Commands::Import { session_id, path } => cli::import::run(&config, &session_id, &path),
        Commands::Stats { session_id } => cli::stats::run(&config, &session_id),
        Commands::Clean { before, all } => cli::clean::run(&config, before.as_deref(), all),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("histkeep: error: {e}");
            ExitCode::FAILURE
        }
    }
}
