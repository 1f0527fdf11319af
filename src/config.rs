//! Configuration management for the resume matcher

use crate::error::{MatcherError, Result};
use crate::processing::gaps::{default_role_catalog, RoleProfile};
use crate::processing::scorer::ScoringWeights;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub processing: ProcessingConfig,
    pub scoring: ScoringWeights,
    pub roles: RolesConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackendKind,
    pub models_dir: PathBuf,
    pub model_name: String,
    /// Dimension used by the hash backend; the model backend reports its own.
    pub hash_dimension: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackendKind {
    Model2Vec,
    Hash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k_chunks: usize,
    pub similarity_threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolesConfig {
    pub default_role: String,
    pub catalog: Vec<RoleProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-matcher")
            .join("models");

        Self {
            embedding: EmbeddingConfig {
                backend: EmbeddingBackendKind::Model2Vec,
                models_dir,
                model_name: "minishlab/M2V_base_output".to_string(),
                hash_dimension: 256,
            },
            processing: ProcessingConfig {
                chunk_size: 200,
                chunk_overlap: 50,
                top_k_chunks: 5,
                similarity_threshold: 0.1,
            },
            scoring: ScoringWeights::default(),
            roles: RolesConfig {
                default_role: "sde".to_string(),
                catalog: default_role_catalog(),
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                MatcherError::Configuration(format!("Failed to parse config: {}", e))
            })?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            MatcherError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        if self.processing.chunk_overlap >= self.processing.chunk_size {
            return Err(MatcherError::Configuration(format!(
                "Chunk overlap {} must be smaller than chunk size {}",
                self.processing.chunk_overlap, self.processing.chunk_size
            )));
        }
        if !self
            .roles
            .catalog
            .iter()
            .any(|p| p.key == self.roles.default_role)
        {
            return Err(MatcherError::Configuration(format!(
                "Default role '{}' is not in the role catalog",
                self.roles.default_role
            )));
        }
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-matcher")
            .join("config.toml")
    }

    pub fn model_path(&self) -> PathBuf {
        self.embedding
            .models_dir
            .join(self.embedding.model_name.replace('/', "_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_default_role_in_catalog() {
        let config = Config::default();
        assert!(config
            .roles
            .catalog
            .iter()
            .any(|p| p.key == config.roles.default_role));
    }

    #[test]
    fn test_bad_overlap_rejected() {
        let mut config = Config::default();
        config.processing.chunk_overlap = config.processing.chunk_size;
        assert!(matches!(
            config.validate(),
            Err(MatcherError::Configuration(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let restored: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(restored.roles.default_role, config.roles.default_role);
        assert_eq!(restored.processing.chunk_size, config.processing.chunk_size);
        assert_eq!(restored.embedding.backend, config.embedding.backend);
    }
}
