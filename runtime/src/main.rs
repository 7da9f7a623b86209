// Copyright 2026 Harmap Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::Parser;
use harmap::cli::map_cmd;
use harmap::config::{
    MapperConfig, DEFAULT_ENDPOINT, DEFAULT_INPUT, DEFAULT_MAX_ADDRESSES, DEFAULT_OUTPUT,
    DEFAULT_TIMEOUT_SECS,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "harmap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Plot the servers contacted in a HAR capture on a world map")]
struct Cli {
    /// HAR capture file to read
    #[arg(value_name = "HAR", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// HTML map file to write (overwritten if present)
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Maximum number of addresses to look up
    #[arg(short = 'n', long, value_name = "NUM", default_value_t = DEFAULT_MAX_ADDRESSES)]
    limit: usize,

    /// Geolocation endpoint; {ip} is replaced with each address
    #[arg(long, value_name = "URL", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Per-request timeout in seconds (0 waits forever)
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Lookups allowed in flight at once (1..=64)
    #[arg(long, value_name = "NUM", default_value_t = 1)]
    concurrency: usize,

    /// Minimum milliseconds between the start of two lookups
    #[arg(long, value_name = "MS", default_value_t = 0)]
    delay_ms: u64,

    /// Initial map zoom level
    #[arg(long, value_name = "LEVEL", default_value_t = 2)]
    zoom: u8,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Suppress progress and summary output
    #[arg(short, long)]
    quiet: bool,

    /// Debug logging and full unresolved list
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn to_config(&self) -> MapperConfig {
        let mut config = MapperConfig::new(&self.input, &self.output);
        config.max_addresses = self.limit;
        config.endpoint = self.endpoint.clone();
        config.timeout = MapperConfig::timeout_from_secs(self.timeout);
        config.concurrency = self.concurrency;
        config.min_delay = Duration::from_millis(self.delay_ms);
        config.view.zoom = self.zoom;
        config
    }

    /// `HARMAP_*` variables read back by `cli::output`.
    fn mode_flags(&self) -> Vec<&'static str> {
        [
            (self.json, "HARMAP_JSON"),
            (self.quiet, "HARMAP_QUIET"),
            (self.verbose, "HARMAP_VERBOSE"),
            (self.no_color, "HARMAP_NO_COLOR"),
        ]
        .into_iter()
        .filter_map(|(on, var)| on.then_some(var))
        .collect()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Still single-threaded here; the runtime is built afterwards.
    for var in cli.mode_flags() {
        std::env::set_var(var, "1");
    }

    let default_level = if cli.verbose { "harmap=debug" } else { "harmap=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(map_cmd::run(&cli.to_config()))
}
