mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "adprobe")]
#[command(about = "Translate, issue, and validate classifieds search requests")]
struct Cli {
    /// Mappings file to use instead of the built-in table
    #[arg(long, global = true, env = "ADPROBE_MAPPINGS_PATH")]
    mappings: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, env = "ADPROBE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// A search as performed in the UI.
#[derive(Debug, Args)]
struct SearchArgs {
    /// Category label as shown on the page
    #[arg(long)]
    category: Option<String>,
    /// Location label as shown on the page ("" for no location filter)
    #[arg(long)]
    location: Option<String>,
    /// Keyword (not sent to the search endpoint)
    #[arg(long)]
    keyword: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every known category and location mapping
    Mappings,
    /// Show the backend parameters and request URL for a search
    Translate(SearchArgs),
    /// Decode the search parameters of a request URL
    Decode {
        /// Full request URL, e.g. copied from the browser's network panel
        url: String,
    },
    /// Issue a search directly and validate the request the backend received
    Check(SearchArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cli.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let registry = commands::load_registry(cli.mappings.as_deref())?;

    match cli.command {
        Commands::Mappings => commands::run_mappings(&registry),
        Commands::Translate(args) => commands::run_translate(&registry, &args.into()),
        Commands::Decode { url } => commands::run_decode(&url),
        Commands::Check(args) => commands::run_check(registry, &args.into()).await,
    }
}

impl From<SearchArgs> for adprobe_core::UiSearchRequest {
    fn from(args: SearchArgs) -> Self {
        Self {
            category: args.category,
            location: args.location,
            keyword: args.keyword,
        }
    }
}
