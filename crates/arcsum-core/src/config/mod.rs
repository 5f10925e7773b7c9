mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist. API keys come
    /// only from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.read_secrets();
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error for an empty model name, a zero token limit or a zero timeout.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.llm.model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }
        if self.llm.max_tokens == 0 {
            bail!("llm.max_tokens must be greater than zero");
        }
        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
