use crate::conf::{config_path_from_env, load_config};

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Validate configuration and exit
    Check {
        /// Path to the YAML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print resolved configuration
    Dump {
        /// Path to the YAML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long, conflicts_with = "yaml")]
        json: bool,

        /// Output as YAML
        #[arg(long)]
        yaml: bool,
    },
}

pub fn run(cmd: ConfigCmd) -> Result<()> {
    match cmd {
        ConfigCmd::Check { config } => check(config),
        ConfigCmd::Dump { config, json, yaml } => dump(config, json, yaml),
    }
}

fn check(path: Option<PathBuf>) -> Result<()> {
    let cfg = load_config(resolve_path(path).as_deref())?;

    println!("✔ Config loaded successfully");
    println!("✔ {} access log patterns", cfg.access_log_globs().len());
    println!(
        "✔ overwatch reporting {}",
        if cfg.overwatch.is_active() { "active" } else { "inactive" }
    );
    println!(
        "✔ sentry reporting {}",
        if cfg.sentry.is_active() { "active" } else { "inactive" }
    );

    Ok(())
}

fn dump(path: Option<PathBuf>, json: bool, yaml: bool) -> Result<()> {
    let cfg = load_config(resolve_path(path).as_deref())?;

    if yaml {
        dump_yaml(&cfg)?;
    } else if json || !yaml {
        // default: json
        dump_json(&cfg)?;
    }

    Ok(())
}

fn resolve_path(path: Option<PathBuf>) -> Option<PathBuf> {
    path.or_else(config_path_from_env)
}

fn dump_json<T: Serialize>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

fn dump_yaml<T: Serialize>(value: &T) -> Result<()> {
    let s = serde_yaml::to_string(value)?;
    println!("{s}");
    Ok(())
}
