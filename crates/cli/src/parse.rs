//! ArgMatches → CliAction conversion.
//!
//! The config file is loaded first (explicit `--config`, else `mtfind.toml`
//! in the working directory if present, else defaults), then command-line
//! flags override individual fields.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ArgMatches;
use mtfind_engine::{MtfindConfig, CONFIG_FILE_NAME};
use tracing::Level;

/// What the user asked for.
#[derive(Debug)]
pub enum CliAction {
    /// Write a default config file at the given path
    Init(PathBuf),
    /// Run the search workload
    Run(RunOptions),
}

/// Fully resolved settings for a run.
#[derive(Debug)]
pub struct RunOptions {
    /// Effective configuration after flag overrides
    pub config: MtfindConfig,
    /// How long the workload produces requests
    pub duration: Duration,
}

/// Log level selected by the number of `-v` flags
pub fn verbosity(matches: &ArgMatches) -> Level {
    match matches.get_count("verbose") {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Translate parsed arguments into an action.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let config_path = matches.get_one::<PathBuf>("config").cloned();

    if matches.subcommand_name() == Some("init") {
        return Ok(CliAction::Init(
            config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
        ));
    }

    let mut config = load_config(config_path.as_deref())?;

    if let Some(sources) = matches.get_many::<PathBuf>("source") {
        config.sources = sources.cloned().collect();
    }
    if let Some(dictionary) = matches.get_one::<PathBuf>("dictionary") {
        config.dictionary = Some(dictionary.clone());
    }
    if let Some(workers) = matches.get_one::<usize>("workers") {
        config.workers = *workers;
    }
    if let Some(bias) = matches.get_one::<f64>("premium-bias") {
        config.premium_bias = *bias;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = Some(*seed);
    }
    config.validate().map_err(|e| e.to_string())?;

    if config.sources.is_empty() {
        return Err("no content sources: pass --source or set `sources` in the config".to_string());
    }

    let secs = matches.get_one::<u64>("duration-secs").copied().unwrap_or(10);
    Ok(CliAction::Run(RunOptions {
        config,
        duration: Duration::from_secs(secs),
    }))
}

fn load_config(explicit: Option<&Path>) -> Result<MtfindConfig, String> {
    match explicit {
        Some(path) => MtfindConfig::from_file(path)
            .map_err(|e| format!("Failed to load config '{}': {}", path.display(), e)),
        None => {
            let default_path = Path::new(CONFIG_FILE_NAME);
            if default_path.is_file() {
                MtfindConfig::from_file(default_path)
                    .map_err(|e| format!("Failed to load config '{}': {}", CONFIG_FILE_NAME, e))
            } else {
                Ok(MtfindConfig::default())
            }
        }
    }
}
