use std::path::PathBuf;

use anyhow::{Context, Result};
use chatpane_core::{Config, Settings};
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "chatpane")]
#[command(about = "Terminal chat pane for a /chat reply endpoint", version)]
pub struct Cli {
    /// Base URL of the server exposing POST /chat
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Language of the fixed messages (en, zh)
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Shortest pause between revealed characters, in milliseconds
    #[arg(long)]
    pub min_delay_ms: Option<u64>,

    /// Longest pause between revealed characters, in milliseconds
    #[arg(long)]
    pub max_delay_ms: Option<u64>,

    /// Give up on a reply after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Config file to read instead of the default location
    #[arg(short, long, env = "CHATPANE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for log files
    #[arg(long, env = "CHATPANE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Write the effective settings back to the config file before starting
    #[arg(long)]
    pub save: bool,
}

impl Cli {
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(Config::get_config_path()?),
        }
    }

    /// Flags as a config layer; unset flags leave lower layers alone.
    pub fn overrides(&self) -> Config {
        Config {
            endpoint: self.endpoint.clone(),
            locale: self.locale.clone(),
            min_delay_ms: self.min_delay_ms,
            max_delay_ms: self.max_delay_ms,
            request_timeout_secs: self.timeout_secs,
        }
    }

    /// File, then CHATPANE_ENDPOINT / CHATPANE_LOCALE, then flags.
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path()?;
        let file = Config::load_from(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Ok(file
            .with_env_overrides(|key| std::env::var(key).ok())
            .merge(self.overrides()))
    }

    /// Load and validate the layered config. With `--save`, the merged
    /// config is written back only once it has resolved cleanly.
    pub fn settings(&self) -> Result<Settings> {
        let config = self.load_config()?;
        let settings = config.resolve().context("Invalid configuration")?;

        if self.save {
            let path = self.config_path()?;
            config
                .save_to(&path)
                .with_context(|| format!("Failed to save config to {}", path.display()))?;
        }
        Ok(settings)
    }
}
