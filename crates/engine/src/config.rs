//! Configuration via `mtfind.toml`
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! runnable configuration. The scheduler and payment settings are derived
//! from it with [`MtfindConfig::scheduler_config`] and
//! [`MtfindConfig::payment_config`].

use crate::scheduler::{SchedulerConfig, DEFAULT_PREMIUM_BIAS};
use mtfind_concurrency::{PaymentConfig, DEFAULT_RECHARGE_AMOUNT};
use mtfind_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "mtfind.toml";

/// Synthetic request producer settings (`[workload]` table).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Clients created per period
    #[serde(default = "default_clients")]
    pub clients: usize,
    /// Requests submitted by each client
    #[serde(default = "default_requests_per_client")]
    pub requests_per_client: usize,
    /// Time between two batches, in milliseconds
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

fn default_clients() -> usize {
    4
}

fn default_requests_per_client() -> usize {
    4
}

fn default_period_ms() -> u64 {
    2000
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            clients: default_clients(),
            requests_per_client: default_requests_per_client(),
            period_ms: default_period_ms(),
        }
    }
}

impl WorkloadConfig {
    /// Time between two batches
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Configuration loaded from `mtfind.toml`.
///
/// # Example
///
/// ```toml
/// premium_bias = 0.8
/// recharge_amount = 15
/// sources = ["corpus/a.txt", "corpus/b.txt"]
///
/// [workload]
/// clients = 4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MtfindConfig {
    /// Probability that a dispatch iteration samples the Premium queue
    #[serde(default = "default_premium_bias")]
    pub premium_bias: f64,
    /// Units credited by one recharge transaction
    #[serde(default = "default_recharge_amount")]
    pub recharge_amount: u32,
    /// Initial credit of a Premium client
    #[serde(default = "default_premium_credit")]
    pub premium_credit: u32,
    /// Search executors (one worker each); 0 means one per CPU
    #[serde(default)]
    pub workers: usize,
    /// Sleep after sampling an empty queue, in milliseconds
    #[serde(default = "default_idle_backoff_ms")]
    pub idle_backoff_ms: u64,
    /// Seed for tier sampling and the workload; random when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Word list for generated queries; derived from the sources when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<PathBuf>,
    /// Text files to search
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Request producer settings
    #[serde(default)]
    pub workload: WorkloadConfig,
}

fn default_premium_bias() -> f64 {
    DEFAULT_PREMIUM_BIAS
}

fn default_recharge_amount() -> u32 {
    DEFAULT_RECHARGE_AMOUNT
}

fn default_premium_credit() -> u32 {
    15
}

fn default_idle_backoff_ms() -> u64 {
    1
}

impl Default for MtfindConfig {
    fn default() -> Self {
        Self {
            premium_bias: default_premium_bias(),
            recharge_amount: default_recharge_amount(),
            premium_credit: default_premium_credit(),
            workers: 0,
            idle_backoff_ms: default_idle_backoff_ms(),
            seed: None,
            dictionary: None,
            sources: Vec::new(),
            workload: WorkloadConfig::default(),
        }
    }
}

impl MtfindConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# mtfind configuration
#
# Probability that a worker serves the Premium queue on a given iteration.
# 1.0 serves Premium only, 0.0 Standard only.
premium_bias = 0.8

# Units credited per recharge, and the initial credit of Premium clients
recharge_amount = 15
premium_credit = 15

# Search executors, each with its own dispatch worker (0 = one per CPU)
workers = 0

# Pause after sampling an empty queue, in milliseconds
idle_backoff_ms = 1

# Fixed seed for reproducible runs
# seed = 42

# Word list for generated queries (one word per line).
# When omitted, words are taken from the sources.
# dictionary = "words.txt"

# Text files to search
sources = []

[workload]
clients = 4
requests_per_client = 4
period_ms = 2000
"#
    }

    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.premium_bias) {
            return Err(Error::invalid_config(format!(
                "premium_bias must be within [0, 1], got {}",
                self.premium_bias
            )));
        }
        if self.recharge_amount == 0 {
            return Err(Error::invalid_config("recharge_amount must be positive"));
        }
        if self.workload.period_ms == 0 {
            return Err(Error::invalid_config("workload.period_ms must be positive"));
        }
        Ok(())
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MtfindConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_config(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::invalid_config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Worker count with 0 resolved to the number of CPUs
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Scheduler settings
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            premium_bias: self.premium_bias,
            idle_backoff: Duration::from_millis(self.idle_backoff_ms),
            seed: self.seed,
        }
    }

    /// Payment authority settings
    pub fn payment_config(&self) -> PaymentConfig {
        PaymentConfig {
            recharge_amount: self.recharge_amount,
        }
    }
}
