/// Configuration management for the genealogy query engine
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TWO_SIDED_DESCENDANT_LIMIT: usize = 1000;
pub const DEFAULT_COMMON_ANCESTRY_CONE_LIMIT: usize = 100_000;
pub const DEFAULT_PRIMARY_FILL: &str = "#66ff66";
pub const DEFAULT_SECONDARY_FILL: &str = "#6666ff";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: QueryLimits,
    #[serde(default)]
    pub render: RenderSettings,
}

/// Size guards applied before expensive queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    /// Above this many descendants the ancestry view drops its descendant half
    pub two_sided_descendant_limit: usize,
    /// Common-ancestry queries are refused when either ancestor cone is larger
    pub common_ancestry_cone_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Fill of the first queried person in DOT output
    pub primary_fill: String,
    /// Fill of the second queried person (common ancestry, path)
    pub secondary_fill: String,
    pub bold_highlights: bool,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            two_sided_descendant_limit: DEFAULT_TWO_SIDED_DESCENDANT_LIMIT,
            common_ancestry_cone_limit: DEFAULT_COMMON_ANCESTRY_CONE_LIMIT,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            primary_fill: DEFAULT_PRIMARY_FILL.to_string(),
            secondary_fill: DEFAULT_SECONDARY_FILL.to_string(),
            bold_highlights: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: QueryLimits::default(),
            render: RenderSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(limit) = std::env::var("GENEALOGY_DESCENDANT_LIMIT") {
            config.limits.two_sided_descendant_limit = limit.parse()?;
        }

        if let Ok(limit) = std::env::var("GENEALOGY_COMMON_CONE_LIMIT") {
            config.limits.common_ancestry_cone_limit = limit.parse()?;
        }

        if let Ok(fill) = std::env::var("GENEALOGY_PRIMARY_FILL") {
            config.render.primary_fill = fill;
        }

        if let Ok(fill) = std::env::var("GENEALOGY_SECONDARY_FILL") {
            config.render.secondary_fill = fill;
        }

        Ok(config)
    }

    /// Merge with another configuration (other takes precedence where it
    /// differs from the defaults)
    pub fn merge_with(&mut self, other: Config) {
        let defaults = Config::default();

        if other.limits.two_sided_descendant_limit != defaults.limits.two_sided_descendant_limit {
            self.limits.two_sided_descendant_limit = other.limits.two_sided_descendant_limit;
        }
        if other.limits.common_ancestry_cone_limit != defaults.limits.common_ancestry_cone_limit {
            self.limits.common_ancestry_cone_limit = other.limits.common_ancestry_cone_limit;
        }

        if other.render.primary_fill != defaults.render.primary_fill {
            self.render.primary_fill = other.render.primary_fill;
        }
        if other.render.secondary_fill != defaults.render.secondary_fill {
            self.render.secondary_fill = other.render.secondary_fill;
        }
        self.render.bold_highlights = other.render.bold_highlights;
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.limits.two_sided_descendant_limit == 0 {
            return Err(anyhow::anyhow!("Two-sided descendant limit must be greater than 0"));
        }

        if self.limits.common_ancestry_cone_limit == 0 {
            return Err(anyhow::anyhow!("Common ancestry cone limit must be greater than 0"));
        }

        if self.render.primary_fill.trim().is_empty()
            || self.render.secondary_fill.trim().is_empty()
        {
            return Err(anyhow::anyhow!("Highlight fill colours must not be empty"));
        }

        Ok(())
    }
}
