//! hmd CLI - hackmud script deployer.
//!
//! - `hmd`: deploy every script, then watch for changes
//! - `hmd --once`: deploy every script and exit
//! - `hmd transpile <file>`: print one script's deployable form

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hmd::{transpile, CacheError, Config, ConfigError, Deployer, TranspileError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Cache(#[from] CacheError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Transpile(#[from] TranspileError),

    #[error("{0}")]
    Watch(#[from] notify::Error),

    #[error("{0} script(s) failed to deploy")]
    Failed(usize),
}

/// Transpile and deploy hackmud scripts.
#[derive(Parser)]
#[command(name = "hmd", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    deploy: DeployArgs,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the deployable form of a single script.
    Transpile {
        /// Script to transpile.
        file: PathBuf,
    },
}

#[derive(Args)]
struct DeployArgs {
    /// Directory holding `<user>/<script>.js` files.
    #[arg(long)]
    scripts_dir: Option<PathBuf>,

    /// hackmud's script directory (defaults to ~/.config/hackmud).
    #[arg(long, env = "HACKMUD_DIR")]
    deploy_dir: Option<PathBuf>,

    /// Lock file tracking deployed script hashes.
    #[arg(long)]
    lock_file: Option<PathBuf>,

    /// Deploy once and exit instead of watching.
    #[arg(long)]
    once: bool,
}

impl DeployArgs {
    fn execute(self) -> Result<(), CliError> {
        let cwd = std::env::current_dir()?;
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let config = Config::resolve(
            &cwd,
            home.as_deref(),
            self.scripts_dir,
            self.deploy_dir,
            self.lock_file,
        )?;
        config.ensure_scripts_dir()?;

        let mut deployer = Deployer::new(config)?;
        let summary = deployer.deploy_all();

        if self.once {
            return match summary.failed {
                0 => Ok(()),
                failed => Err(CliError::Failed(failed)),
            };
        }

        hmd::watch(&mut deployer)?;
        Ok(())
    }
}

fn transpile_file(file: PathBuf) -> Result<(), CliError> {
    let source = std::fs::read_to_string(&file)?;
    let output = transpile(&source)?;
    println!("{}", output);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    // --verbose enables DEBUG, otherwise use RUST_LOG or default to INFO
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Some(Command::Transpile { file }) => transpile_file(file),
        None => cli.deploy.execute(),
    };

    if let Err(err) = result {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}
