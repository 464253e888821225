//! # modvendor CLI Entry Point
//!
//! Parses the command line with clap, merges it with `.modvendor.toml` and
//! runs the vendoring pipeline from the project root.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;

use modvendor::config::{CliOverrides, FileConfig, Settings};
use modvendor::modcache::ModCache;
use modvendor::vendor;

#[derive(Parser)]
#[command(name = "modvendor")]
#[command(about = "Copy the Go module files a project uses into ./vendor/", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Copy files matching glob patterns to ./vendor/ (ie. --copy="**/*.c **/*.h **/*.proto")
    #[arg(long)]
    copy: Option<String>,

    /// Copy all files of every module instead of only the used packages
    #[arg(long, value_name = "BOOL")]
    fullcopy: Option<bool>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Additional package directories to copy which are not listed in
    /// vendor/modules.txt, comma separated (ie. --include=github.com/a/b/dir1,github.com/a/b/dir2)
    #[arg(long)]
    include: Option<String>,

    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long = "dir")]
    dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error!".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    let file = FileConfig::load(&root)?;
    let settings = Settings::resolve(
        root,
        file,
        CliOverrides {
            copy: cli.copy,
            fullcopy: cli.fullcopy,
            include: cli.include,
            verbose: cli.verbose,
        },
    )?;

    vendor::run(&settings, &ModCache::discover())?;
    Ok(())
}
