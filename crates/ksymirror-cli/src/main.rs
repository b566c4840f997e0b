//! ksymirror CLI
//!
//! Mirror a Kaitai Struct format and everything it imports from the format
//! gallery into a local tree (`<output_dir>/<category>/<name>.ksy`), with
//! import references rewritten to point at the mirrored files.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{ArgAction, Parser};
use colored::Colorize;
use ksymirror_core::{mirror, plan, resolve_localized, Catalog};
use tracing_subscriber::EnvFilter;

mod remote;

use remote::{HtmlExtractor, HttpFetcher, DEFAULT_BASE_URL};

const BUNDLED_CATALOG: &str = include_str!("../../../format-db.json");

#[derive(Parser)]
#[command(name = "ksymirror")]
#[command(
    author,
    version,
    about = "Mirror a .ksy format and its imports from the Kaitai format gallery"
)]
struct Cli {
    /// Format to mirror: a bare name (`zip`) or `category/name` (`archive/zip`).
    query: String,

    /// Mirror root.
    #[arg(default_value = ".")]
    output_dir: PathBuf,

    /// Catalog file: JSON object mapping format name to category
    /// (defaults to the catalog bundled with the binary).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Format gallery root.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// HTTP User-Agent.
    #[arg(long, default_value = concat!("ksymirror/", env!("CARGO_PKG_VERSION")))]
    user_agent: String,

    /// Resolve and localize, print what would be written, write nothing.
    #[arg(long)]
    dry_run: bool,

    /// More log output (repeatable: info, debug, trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(&cli)
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let catalog = match path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::from_json_str(BUNDLED_CATALOG, Path::new("<bundled format-db.json>"))?,
    };
    Ok(catalog)
}

fn run(cli: &Cli) -> Result<()> {
    // Catalog problems are usage errors: no network access before this passes.
    let catalog = load_catalog(cli.catalog.as_deref())?;
    let root = catalog.resolve(&cli.query)?;

    println!(
        "{} {} → {}",
        "Mirror".green().bold(),
        root,
        cli.output_dir.display()
    );

    let fetcher = HttpFetcher::new(&cli.base_url, &cli.user_agent, cli.timeout_secs)?;
    let extractor = HtmlExtractor::new()?;

    if cli.dry_run {
        let cache = resolve_localized(&root, &catalog, fetcher, extractor)?;
        for planned in plan(&cache, &cli.output_dir) {
            let action = if planned.exists {
                "skip".yellow()
            } else {
                "write".cyan()
            };
            println!("  {} {} {}", "→".cyan(), action, planned.path.display());
        }
        return Ok(());
    }

    let report = mirror(&root, &catalog, fetcher, extractor, &cli.output_dir)?;
    for path in &report.written {
        println!("  {} {}", "→".cyan(), path.display());
    }
    println!(
        "  {} written={} skipped={}",
        "→".yellow(),
        report.written.len(),
        report.skipped.len()
    );

    Ok(())
}
