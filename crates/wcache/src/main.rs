//! wcache - line-oriented shell over a weighted LRU cache

mod handler;

use anyhow::Result;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{info, warn};
use weightcache::{CacheConfig, LogSink, WeightedCache, WriteSink, DEFAULT_BUDGET};

use crate::handler::{CommandHandler, Reply};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Maximum total weight kept resident
    #[arg(short, long, default_value_t = DEFAULT_BUDGET, allow_negative_numbers = true)]
    budget: i64,

    /// Report every eviction
    #[arg(short, long)]
    verbose: bool,

    /// Send eviction notices to the log instead of stderr
    #[arg(long)]
    log_notices: bool,
}

fn main() -> Result<()> {
    // Replies own stdout; logs and notices go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = CacheConfig::new(args.budget).verbose(args.verbose);
    let cache = Arc::new(WeightedCache::with_config(config));
    if args.log_notices {
        cache.set_sink(LogSink);
    } else {
        cache.set_sink(WriteSink::new(io::stderr()));
    }

    info!("Starting wcache v{}", env!("CARGO_PKG_VERSION"));
    info!("Budget: {}", config.budget);
    info!("Verbose: {}", config.verbose);

    let handler = CommandHandler::new(Arc::clone(&cache));
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let reply = match handler.handle(&line) {
            Some(reply) => reply,
            None => continue,
        };

        if let Reply::Error(msg) = &reply {
            warn!("{}", msg);
        }
        writeln!(out, "{}", reply)?;
        out.flush()?;

        if reply == Reply::Bye {
            break;
        }
    }

    let stats = cache.stats();
    info!(
        "Shutting down: {} entries, weight {}, {} evictions",
        cache.len(),
        cache.weight(),
        stats.evictions()
    );
    Ok(())
}
