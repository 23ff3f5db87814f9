use clap::{Parser, Subcommand};
use logwatch_core::cli::config::ConfigCmd;
use logwatch_core::conf::config_path_from_env;
use logwatch_core::logging::init_logging;
use logwatch_core::{conf, supervisor};

use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "logwatch",
    version,
    about = "Logwatch: access-log monitoring agent"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Configuration tooling
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },

    /// Run the monitoring agent (default)
    Run {
        /// Path to the YAML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Log at debug level by default
        #[arg(long, short)]
        verbose: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Config { cmd }) => {
            if let Err(e) = logwatch_core::cli::config::run(cmd) {
                eprintln!("config error: {e:#}");
                return ExitCode::from(2);
            }
            ExitCode::SUCCESS
        }

        Some(Command::Run { config, verbose }) => run_agent(config, verbose),

        None => run_agent(None, false),
    }
}

fn run_agent(config_path: Option<PathBuf>, verbose: bool) -> ExitCode {
    init_logging(verbose);

    let path = config_path.or_else(config_path_from_env);
    let config = match conf::load_config(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(supervisor::run(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "agent terminated");
            ExitCode::FAILURE
        }
    }
}
