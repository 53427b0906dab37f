//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result};

use crate::config::*;

use strata_io::{Compression, ReaderConfig, WriterConfig};
use strata_layers::{LayerConfig, NullResponse, SelectionMode};
use strata_wavelet::TransformConfig;

/// Builds a [`ReaderConfig`] from the TOML I/O configuration.
pub fn build_reader_config(io: &IoConfig) -> Result<ReaderConfig> {
    let cfg = ReaderConfig::default()
        .with_depth_column(&io.depth_column)
        .with_value_column(&io.value_column);
    cfg.validate().context("invalid [io] column settings")?;
    Ok(cfg)
}

/// Builds a [`WriterConfig`] from the TOML I/O configuration.
pub fn build_writer_config(io: &IoConfig) -> Result<WriterConfig> {
    let compression = Compression::from_name(&io.compression).context("invalid [io].compression")?;
    let cfg = WriterConfig::default()
        .with_compression(compression)
        .with_row_group_size(io.row_group_size);
    cfg.validate().context("invalid [io] writer settings")?;
    Ok(cfg)
}

/// Builds a [`TransformConfig`] from the TOML transform configuration.
pub fn build_transform_config(transform: &TransformToml) -> Result<TransformConfig> {
    let mut cfg = TransformConfig::new()
        .with_first_width(transform.first_width)
        .with_width_step(transform.width_step)
        .with_parallel(transform.parallel);
    if let Some(max) = transform.max_width {
        cfg = cfg.with_max_width(max);
    }
    cfg.validate().context("invalid [transform] settings")?;
    Ok(cfg)
}

/// Builds a [`LayerConfig`] from the TOML layers configuration.
pub fn build_layer_config(layers: &LayersToml) -> Result<LayerConfig> {
    let null_response =
        NullResponse::from_name(&layers.null_response).context("invalid [layers].null_response")?;
    let cfg = LayerConfig::new()
        .with_zero_tolerance(layers.zero_tolerance)
        .with_null_response(null_response);
    cfg.validate().context("invalid [layers] settings")?;
    Ok(cfg)
}

/// Resolves the selection mode and value, preferring command-line overrides.
pub fn resolve_selection(
    select: &SelectToml,
    mode: Option<&str>,
    value: Option<f64>,
) -> Result<(SelectionMode, f64)> {
    let name = mode.unwrap_or(&select.mode);
    let mode = SelectionMode::from_name(name).context("invalid selection mode")?;
    Ok((mode, value.unwrap_or(select.value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_convert() {
        let config = StrataConfig::default();
        let reader = build_reader_config(&config.io).unwrap();
        assert_eq!(reader, ReaderConfig::default());

        let writer = build_writer_config(&config.io).unwrap();
        assert_eq!(writer.compression(), Compression::Snappy);
        assert_eq!(writer.row_group_size(), 1_000_000);

        let transform = build_transform_config(&config.transform).unwrap();
        assert_eq!(transform.first_width(), 8);
        assert_eq!(transform.width_step(), 4);
        assert_eq!(transform.max_width(), None);
        assert!(transform.parallel());

        let layers = build_layer_config(&config.layers).unwrap();
        assert_eq!(layers.null_response(), NullResponse::Merge);
        assert_eq!(layers.zero_tolerance(), 1e-9);
    }

    #[test]
    fn custom_values_convert() {
        let io = IoConfig {
            depth_column: "md".into(),
            value_column: "gr".into(),
            compression: "zstd".into(),
            row_group_size: 4096,
            ..IoConfig::default()
        };
        let reader = build_reader_config(&io).unwrap();
        assert_eq!(reader.depth_column(), "md");
        assert_eq!(reader.value_column(), "gr");
        let writer = build_writer_config(&io).unwrap();
        assert_eq!(writer.compression(), Compression::Zstd);
        assert_eq!(writer.row_group_size(), 4096);

        let transform = build_transform_config(&TransformToml {
            first_width: 4,
            width_step: 2,
            max_width: Some(40),
            parallel: false,
        })
        .unwrap();
        assert_eq!(transform.first_width(), 4);
        assert_eq!(transform.max_width(), Some(40));
        assert!(!transform.parallel());

        let layers = build_layer_config(&LayersToml {
            zero_tolerance: 0.0,
            null_response: "distinct".into(),
        })
        .unwrap();
        assert_eq!(layers.null_response(), NullResponse::Distinct);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let io = IoConfig {
            compression: "brotli".into(),
            ..IoConfig::default()
        };
        assert!(build_writer_config(&io).is_err());

        let io = IoConfig {
            value_column: "depth".into(),
            ..IoConfig::default()
        };
        assert!(build_reader_config(&io).is_err());

        let layers = LayersToml {
            null_response: "ignore".into(),
            ..LayersToml::default()
        };
        assert!(build_layer_config(&layers).is_err());

        let layers = LayersToml {
            zero_tolerance: 1.5,
            ..LayersToml::default()
        };
        assert!(build_layer_config(&layers).is_err());

        let transform = TransformToml {
            width_step: 3,
            ..TransformToml::default()
        };
        let err = build_transform_config(&transform).unwrap_err();
        assert!(format!("{err:#}").contains("must be even"));
    }

    #[test]
    fn selection_overrides() {
        let select = SelectToml::default();
        let (mode, value) = resolve_selection(&select, None, None).unwrap();
        assert_eq!(mode, SelectionMode::TopCount);
        assert_eq!(value, 5.0);

        let (mode, value) = resolve_selection(&select, Some("max_thickness"), Some(3.0)).unwrap();
        assert_eq!(mode, SelectionMode::MaxThickness);
        assert_eq!(value, 3.0);

        assert!(resolve_selection(&select, Some("biggest"), None).is_err());
    }
}
