use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level Strata configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrataConfig {
    /// I/O settings.
    #[serde(default)]
    pub io: IoConfig,

    /// Wavelet transform settings.
    #[serde(default)]
    pub transform: TransformToml,

    /// Layer delineation settings.
    #[serde(default)]
    pub layers: LayersToml,

    /// Block selection settings.
    #[serde(default)]
    pub select: SelectToml,
}

impl StrataConfig {
    /// Reads and parses a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    #[serde(default = "default_depth_column")]
    pub depth_column: String,
    #[serde(default = "default_value_column")]
    pub value_column: String,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            depth_column: default_depth_column(),
            value_column: default_value_column(),
            compression: default_compression(),
            row_group_size: default_row_group_size(),
        }
    }
}

fn default_depth_column() -> String {
    "depth".to_string()
}
fn default_value_column() -> String {
    "value".to_string()
}
fn default_compression() -> String {
    "snappy".to_string()
}
fn default_row_group_size() -> usize {
    1_000_000
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformToml {
    #[serde(default = "default_first_width")]
    pub first_width: usize,
    #[serde(default = "default_width_step")]
    pub width_step: usize,
    #[serde(default)]
    pub max_width: Option<usize>,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for TransformToml {
    fn default() -> Self {
        Self {
            first_width: default_first_width(),
            width_step: default_width_step(),
            max_width: None,
            parallel: true,
        }
    }
}

fn default_first_width() -> usize {
    8
}
fn default_width_step() -> usize {
    4
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayersToml {
    #[serde(default = "default_zero_tolerance")]
    pub zero_tolerance: f64,
    #[serde(default = "default_null_response")]
    pub null_response: String,
}

impl Default for LayersToml {
    fn default() -> Self {
        Self {
            zero_tolerance: default_zero_tolerance(),
            null_response: default_null_response(),
        }
    }
}

fn default_zero_tolerance() -> f64 {
    1e-9
}
fn default_null_response() -> String {
    "merge".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectToml {
    #[serde(default = "default_select_mode")]
    pub mode: String,
    #[serde(default = "default_select_value")]
    pub value: f64,
}

impl Default for SelectToml {
    fn default() -> Self {
        Self {
            mode: default_select_mode(),
            value: default_select_value(),
        }
    }
}

fn default_select_mode() -> String {
    "top-count".to_string()
}
fn default_select_value() -> f64 {
    5.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: StrataConfig = toml::from_str("").unwrap();
        assert!(config.io.input.is_none());
        assert_eq!(config.io.depth_column, "depth");
        assert_eq!(config.io.value_column, "value");
        assert_eq!(config.io.compression, "snappy");
        assert_eq!(config.transform.first_width, 8);
        assert_eq!(config.transform.width_step, 4);
        assert!(config.transform.max_width.is_none());
        assert!(config.transform.parallel);
        assert_eq!(config.layers.zero_tolerance, 1e-9);
        assert_eq!(config.layers.null_response, "merge");
        assert_eq!(config.select.mode, "top-count");
        assert_eq!(config.select.value, 5.0);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: StrataConfig = toml::from_str(
            r#"
            [io]
            input = "well.parquet"
            value_column = "gr"

            [transform]
            max_width = 120
            parallel = false

            [select]
            mode = "min-thickness"
            value = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(config.io.input, Some(PathBuf::from("well.parquet")));
        assert_eq!(config.io.depth_column, "depth");
        assert_eq!(config.io.value_column, "gr");
        assert_eq!(config.transform.first_width, 8);
        assert_eq!(config.transform.max_width, Some(120));
        assert!(!config.transform.parallel);
        assert_eq!(config.layers.null_response, "merge");
        assert_eq!(config.select.mode, "min-thickness");
        assert_eq!(config.select.value, 2.5);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(toml::from_str::<StrataConfig>("[layers]\nzero_tol = 0.1\n").is_err());
        assert!(toml::from_str::<StrataConfig>("[plot]\nwidth = 3\n").is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strata.toml");
        std::fs::write(&path, "[layers]\nnull_response = \"distinct\"\n").unwrap();
        let config = StrataConfig::load(&path).unwrap();
        assert_eq!(config.layers.null_response, "distinct");
    }

    #[test]
    fn load_missing_file_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = StrataConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));
    }
}
