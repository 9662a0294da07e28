//! Configuration management for segdir.
//!
//! Loads configuration from ${SEGDIR_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geometry::Align;
use crate::scroll::ScrollBehavior;

/// Returns the default config template (with comments).
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for segdir configuration and log directories.
    //!
    //! SEGDIR_HOME resolution order:
    //! 1. SEGDIR_HOME environment variable (if set)
    //! 2. ~/.config/segdir (default)
    //! 3. ./.segdir when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the segdir home directory.
    pub fn segdir_home() -> PathBuf {
        if let Ok(home) = std::env::var("SEGDIR_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".segdir"),
            |h| h.join(".config").join("segdir"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        segdir_home().join("config.toml")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        segdir_home().join("logs")
    }
}

/// Main configuration structure.
///
/// The presentation keys mirror the attributes of the directory widget:
/// alignment on both axes and the scroll animation style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Horizontal alignment of the active segment in its container.
    pub align_x: Align,

    /// Vertical alignment of the active segment in its container.
    pub align_y: Align,

    /// Scroll animation used after the first user selection.
    pub behavior: ScrollBehavior,

    /// Panel width in columns (0 = container width).
    pub segment_width: u16,

    /// Columns between marks.
    pub mark_gap: u16,

    /// Per-tick easing factor for smooth scrolling.
    pub smooth_speed: f64,

    /// Fallback log filter when SEGDIR_LOG is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            align_x: Align::Center,
            align_y: Align::Start,
            behavior: ScrollBehavior::Smooth,
            segment_width: 0,
            mark_gap: Self::DEFAULT_MARK_GAP,
            smooth_speed: Self::DEFAULT_SMOOTH_SPEED,
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    const DEFAULT_MARK_GAP: u16 = 1;
    const DEFAULT_SMOOTH_SPEED: f64 = 0.35;
    const DEFAULT_LOG_LEVEL: &str = "info";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Uses the embedded template for structure/comments and writes the
    /// values of `Config::default()` into it.
    ///
    /// # Errors
    /// Returns an error if serialization or template parsing fails.
    pub fn generate() -> Result<String> {
        use toml_edit::{DocumentMut, Item};

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        // Flat config: every key is a scalar, comments on the template keys survive.
        for (key, value) in generated_doc.iter() {
            if let Item::Value(v) = value {
                let table = doc.as_table_mut();
                let decor = table
                    .get(key)
                    .and_then(Item::as_value)
                    .map(|existing| existing.decor().clone());
                let mut v = v.clone();
                if let Some(decor) = decor {
                    *v.decor_mut() = decor;
                }
                table[key] = Item::Value(v);
            }
        }

        Ok(doc.to_string())
    }

    /// Smooth-scroll speed clamped to a usable range.
    pub fn effective_smooth_speed(&self) -> f64 {
        if self.smooth_speed.is_finite() {
            self.smooth_speed.clamp(0.05, 0.95)
        } else {
            Self::DEFAULT_SMOOTH_SPEED
        }
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}
