//! Discover extraction recipes for a page and print them as JSON.
//!
//! ```text
//! discover_recipes <file|url> [--options options.json] [--cache DIR] [--offline] [--details]
//! ```
//!
//! Diagnostics go to stderr and are controlled by `RUST_LOG`.

use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use rs_recipe_miner::encoding::decode_page;
use rs_recipe_miner::url_utils::parse_url;
use rs_recipe_miner::{discover, discover_with_details, CachedFetcher, FetchOptions, Fetcher, HttpFetcher, Options};
use tracing::info;

const USAGE: &str =
    "usage: discover_recipes <file|url> [--options options.json] [--cache DIR] [--offline] [--details]";

struct Args {
    source: String,
    options: Option<PathBuf>,
    cache: Option<PathBuf>,
    offline: bool,
    details: bool,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let mut source = None;
    let mut parsed = Args {
        source: String::new(),
        options: None,
        cache: None,
        offline: false,
        details: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--options" => parsed.options = Some(args.next().ok_or(USAGE)?.into()),
            "--cache" => parsed.cache = Some(args.next().ok_or(USAGE)?.into()),
            "--offline" => parsed.offline = true,
            "--details" => parsed.details = true,
            "-h" | "--help" => return Err(USAGE.into()),
            _ if source.is_none() => source = Some(arg),
            _ => return Err(format!("unexpected argument: {arg}\n{USAGE}").into()),
        }
    }

    parsed.source = source.ok_or(USAGE)?;
    Ok(parsed)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = parse_args()?;

    let mut options: Options = match &args.options {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Options::default(),
    };

    let fetch_options = FetchOptions {
        cache_dir: args.cache.clone(),
        offline: args.offline,
        ..FetchOptions::default()
    };
    let fetcher = CachedFetcher::new(HttpFetcher::new(&fetch_options)?, &fetch_options)?;

    let html = match parse_url(&args.source) {
        Some(url) => {
            if options.url.is_none() {
                options.url = Some(url.to_string());
            }
            fetcher.fetch(&url)?
        }
        None => decode_page(&fs::read(&args.source)?, None),
    };

    let discovery = if args.details {
        discover_with_details(&html, &options, &fetcher)?
    } else {
        discover(&html, &options)?
    };
    info!(source = %args.source, recipes = discovery.recipes.len(), "done");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &discovery)?;
    writeln!(out)?;
    Ok(())
}
