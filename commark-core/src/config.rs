//! Configuration for commark

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::fences::FenceTokens;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parsing: ParsingConfig,
    pub render: RenderConfig,
    /// Optional TOML file with extra language comment syntaxes, merged over
    /// the builtin table by [`crate::syntax::SyntaxRegistry`].
    pub syntax_table: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    pub markdown_header: String,
    pub markdown_footer: String,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            markdown_header: "```markdown".to_string(),
            markdown_footer: "```".to_string(),
        }
    }
}

impl ParsingConfig {
    pub fn fence_tokens(&self) -> FenceTokens {
        FenceTokens::new(&self.markdown_header, &self.markdown_footer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Fence tag used when a language cannot be inferred from the source.
    pub default_language: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_language: "text".to_string(),
        }
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "commark")
            .map(|proj_dirs| proj_dirs.config_dir().join("commark.toml"))
    }

    /// Load configuration from file, falling back to defaults if missing
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load from a specific path (for testing)
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
