//! foodlabel command-line entry point.
//!
//! `foodlabel run <input.csv>` expands abbreviations, extracts entities in
//! rate-limited batches, and writes `chunk_<n>.csv` files.
//! `foodlabel standardize <input.csv>` only expands abbreviations and needs no
//! API key. `foodlabel config show` prints the effective settings.

mod cli;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // LLM_API_KEY and friends may live in .env
    let _ = dotenvy::dotenv();

    // Logs go to stderr so `standardize` can write CSV to stdout
    let default_filter = if cli::is_verbose() {
        "foodlabel=info"
    } else {
        "foodlabel=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    cli::run().await
}
