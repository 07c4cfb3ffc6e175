// Run configuration: every section has defaults, a TOML file overrides any subset

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use qlearn_agent::{AgentConfig, Discretizer, DiscretizerConfig, TrainingConfig};
use qlearn_env::NoiseConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    pub agent: AgentConfig,
    pub discretizer: DiscretizerConfig,
    pub training: TrainingConfig,
    pub noise: NoiseConfig,
}

impl QLearningConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Defaults, or the file at `path` when one is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_toml_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.agent.validate().context("Invalid [agent] section")?;
        Discretizer::from_config(&self.discretizer).context("Invalid [discretizer] section")?;
        self.training.validate().context("Invalid [training] section")?;
        self.noise.validate().context("Invalid [noise] section")?;
        Ok(())
    }
}
