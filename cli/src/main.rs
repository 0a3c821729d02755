mod commands;
mod util;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::evaluate::EvaluateArgs;
use commands::report::ReportArgs;

#[derive(Parser)]
#[command(
    name = "redflagged",
    version,
    about = "RedFlagged CLI: turn used-car red flags into a purchase verdict",
    after_help = "\
EXIT CODES:
  0  Success
  1  Client error (4xx): invalid input, unauthorized, rate limited
  2  Server error (5xx)
  3  Connection error: API unreachable
  4  Usage error: bad arguments or unreadable input"
)]
struct Cli {
    /// API base URL
    #[arg(long, env = "REDFLAGGED_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// API key sent as a bearer token
    #[arg(long, env = "REDFLAGGED_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Evaluate red flags from a file into a verdict
    Evaluate(EvaluateArgs),
    /// Request a full report for a VIN from the API
    Report(ReportArgs),
    /// Generate an API key and the hash to configure on the server
    Keygen,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let api_key = cli.api_key.as_deref();

    let code = match cli.command {
        Commands::Health => commands::health::run(&cli.api_url).await,
        Commands::Evaluate(args) => commands::evaluate::run(&cli.api_url, api_key, args).await,
        Commands::Report(args) => commands::report::run(&cli.api_url, api_key, args).await,
        Commands::Keygen => commands::keygen::run(),
    };

    std::process::exit(code);
}
