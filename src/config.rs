//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione dei batch di ridimensionamento.
//!
//! ## Parametri di configurazione:
//! - `create_directories`: Crea le directory di output mancanti (default: true)
//! - `skip_existing`: Salta i file il cui output esiste già (default: false)
//! - `dry_run`: Simula senza scrivere nulla (default: false)
//! - `include_all_files`: Processa anche i file che non sono immagini (default: false)
//! - `extensions`: Estensioni accettate (default: vuoto = tutti i formati noti a `image`)
//! - `output_suffix`: Suffisso inserito prima dell'estensione (default: None)
//! - `json_output`: Report finale in JSON (default: false)
//!
//! ## Validazione:
//! - Le estensioni non possono essere vuote né contenere `.` o `/`
//! - Il suffisso non può essere vuoto né contenere `/`
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     skip_existing: true,
//!     output_suffix: Some("-small".to_string()),
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Create missing output directories
    pub create_directories: bool,
    /// Skip files whose output already exists
    pub skip_existing: bool,
    /// Dry run - don't write anything
    pub dry_run: bool,
    /// Process every file, not only images
    pub include_all_files: bool,
    /// Accepted extensions (empty = any image format)
    pub extensions: Vec<String>,
    /// Suffix inserted before the output extension
    pub output_suffix: Option<String>,
    /// Output the final report as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_directories: true,
            skip_existing: false,
            dry_run: false,
            include_all_files: false,
            extensions: Vec::new(),
            output_suffix: None,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        for ext in &self.extensions {
            if ext.is_empty() {
                return Err(anyhow::anyhow!("Extensions must not be empty"));
            }
            if ext.contains('.') || ext.contains('/') {
                return Err(anyhow::anyhow!(
                    "Extension must be given without dots or slashes: {}",
                    ext
                ));
            }
        }

        if let Some(ref suffix) = self.output_suffix {
            if suffix.is_empty() {
                return Err(anyhow::anyhow!("Output suffix must not be empty"));
            }
            if suffix.contains('/') || suffix.contains('\\') {
                return Err(anyhow::anyhow!(
                    "Output suffix must not contain a path separator: {}",
                    suffix
                ));
            }
        }

        Ok(())
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("batch-resizer").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.extensions = vec!["jpg".to_string(), String::new()];
        assert!(config.validate().is_err());

        config.extensions = vec![".jpg".to_string()];
        assert!(config.validate().is_err());

        config.extensions = vec!["jpg".to_string(), "png".to_string()];
        assert!(config.validate().is_ok());

        config.output_suffix = Some("a/b".to_string());
        assert!(config.validate().is_err());

        config.output_suffix = Some(String::new());
        assert!(config.validate().is_err());

        config.output_suffix = Some("-small".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.create_directories);
        assert!(!config.skip_existing);
        assert!(!config.dry_run);
        assert!(!config.include_all_files);
        assert!(config.extensions.is_empty());
        assert!(config.output_suffix.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"dry_run": true}"#).unwrap();
        assert!(config.dry_run);
        assert!(config.create_directories);
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            skip_existing: true,
            extensions: vec!["jpg".to_string()],
            output_suffix: Some("-small".to_string()),
            ..Default::default()
        };

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert!(loaded_config.skip_existing);
        assert_eq!(loaded_config.extensions, vec!["jpg"]);
        assert_eq!(loaded_config.output_suffix.as_deref(), Some("-small"));
    }

    #[tokio::test]
    async fn test_missing_file_loads_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_file(&temp_dir.path().join("absent.json")).await.unwrap();
        assert!(config.create_directories);
    }

    #[tokio::test]
    async fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{"extensions": [".png"]}"#).await.unwrap();
        assert!(Config::from_file(&config_path).await.is_err());
    }
}
