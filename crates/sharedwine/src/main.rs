use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use sharedwine::config::LaunchConfigReader;
use sharedwine::utils::logger::Logger;
use sharedwine::{dispatch, LaunchConfig, LoggerConfig, SharedWineEntry};

#[derive(Parser, Debug)]
#[command(version, about = "Start Wine through the shared loader library")]
struct Args {
    /// Wine installation root (contains bin/ and lib64/)
    #[arg(short, long, required_unless_present = "config")]
    root: Option<PathBuf>,

    /// Wine prefix; defaults to $WINEPREFIX
    #[arg(short, long)]
    prefix: Option<PathBuf>,

    /// JSON launch configuration; command line flags override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    /// Command run inside the Wine desktop
    cmdline: Option<String>,
}

fn load_config(args: Args) -> Result<LaunchConfig> {
    let mut config = match &args.config {
        Some(path) => LaunchConfigReader::read_json(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => LaunchConfig::new(PathBuf::new()),
    };

    if let Some(root) = args.root {
        config.root = root;
    }
    if args.prefix.is_some() {
        config.prefix = args.prefix;
    }
    if args.cmdline.is_some() {
        config.cmdline = args.cmdline;
    }
    if args.verbose {
        config.logger_config = Some(LoggerConfig::verbose());
    }
    Ok(config.or_env_prefix())
}

fn main() -> Result<()> {
    let config = load_config(Args::parse())?;
    Logger::init_logging(config.logger_config.clone());

    let handle = dispatch(config, Arc::new(SharedWineEntry))?;
    let outcome = handle.wait()?;
    if !outcome.diagnostic.is_empty() {
        eprintln!("{}", outcome.diagnostic);
    }
    Ok(())
}
