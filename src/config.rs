use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub reassembly: ReassemblyConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Geometry thresholds for rebuilding text from positioned fragments.
#[derive(Debug, Deserialize, Clone)]
pub struct ReassemblyConfig {
    /// Vertical delta beyond which two fragments sit on different lines.
    #[serde(default = "default_line_break_threshold")]
    pub line_break_threshold: f64,
    /// Horizontal gap (from the previous fragment's right edge) beyond which
    /// a space is inserted within the same line.
    #[serde(default = "default_word_gap_threshold")]
    pub word_gap_threshold: f64,
}

impl Default for ReassemblyConfig {
    fn default() -> Self {
        Self {
            line_break_threshold: default_line_break_threshold(),
            word_gap_threshold: default_word_gap_threshold(),
        }
    }
}

fn default_line_break_threshold() -> f64 {
    5.0
}
fn default_word_gap_threshold() -> f64 {
    50.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Maximum accepted input size in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_max_key_points")]
    pub max_key_points: usize,
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
    /// Characters of leading page text carried into the summary.
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            max_key_points: default_max_key_points(),
            max_tags: default_max_tags(),
            summary_chars: default_summary_chars(),
        }
    }
}

fn default_max_file_bytes() -> u64 {
    50 * 1024 * 1024
}
fn default_max_key_points() -> usize {
    15
}
fn default_max_tags() -> usize {
    8
}
fn default_summary_chars() -> usize {
    500
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExportConfig {
    /// Directory for exported notes files. Defaults to the input's directory.
    #[serde(default)]
    pub out_dir: Option<std::path::PathBuf>,
}

/// Load configuration from a TOML file. Every field has a default, so a
/// missing file yields `Config::default()` only when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        None => Config::default(),
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .with_context(|| format!("Failed to read config file: {}", p.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse config file")?
        }
    };

    if config.reassembly.line_break_threshold <= 0.0 {
        anyhow::bail!("reassembly.line_break_threshold must be > 0");
    }
    if config.reassembly.word_gap_threshold <= 0.0 {
        anyhow::bail!("reassembly.word_gap_threshold must be > 0");
    }
    if config.pipeline.max_file_bytes == 0 {
        anyhow::bail!("pipeline.max_file_bytes must be > 0");
    }
    if config.pipeline.max_key_points == 0 {
        anyhow::bail!("pipeline.max_key_points must be >= 1");
    }
    if config.pipeline.max_tags == 0 {
        anyhow::bail!("pipeline.max_tags must be >= 1");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.reassembly.line_break_threshold, 5.0);
        assert_eq!(config.reassembly.word_gap_threshold, 50.0);
        assert_eq!(config.pipeline.max_file_bytes, 50 * 1024 * 1024);
        assert_eq!(config.pipeline.max_key_points, 15);
        assert_eq!(config.pipeline.max_tags, 8);
        assert_eq!(config.pipeline.summary_chars, 500);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[reassembly]\nline_break_threshold = 7.5").unwrap();
        let config = load_config(Some(f.path())).unwrap();
        assert_eq!(config.reassembly.line_break_threshold, 7.5);
        assert_eq!(config.reassembly.word_gap_threshold, 50.0);
    }

    #[test]
    fn rejects_zero_thresholds() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[reassembly]\nword_gap_threshold = 0.0").unwrap();
        assert!(load_config(Some(f.path())).is_err());
    }

    #[test]
    fn rejects_zero_limits() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[pipeline]\nmax_key_points = 0").unwrap();
        assert!(load_config(Some(f.path())).is_err());
    }
}
