mod decimate;
mod encode;
mod io;
mod tail;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "decimator",
    about = "Reduce long point traces to a bounded number of representative points"
)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[clap(long, short = 'v', global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decimate a point trace
    Decimate(decimate::Opts),
    /// Keep only the most recent points of a trace
    Tail(tail::Opts),
    /// Transcode point traces between encodings
    Encode(encode::Opts),
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Decimate(opts) => decimate::decimate(&opts).await,
        Command::Tail(opts) => tail::tail(&opts).await,
        Command::Encode(opts) => encode::encode(&opts).await,
    }
}

// Logs go to stderr so stdout stays a clean point stream.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
