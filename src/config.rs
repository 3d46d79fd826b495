//! Runtime configuration for the diff subsystem: the `diff_opts.*`
//! table, plus a set of legacy options kept for backward compatibility.
//!
//! A `serde`-derived file struct with `#[serde(default)]` fields, loaded
//! with `toml::from_str`, falling back to defaults rather than failing
//! hard on a missing file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::state::{Layout, Orientation};

/// Errors loading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be parsed as TOML.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },
    /// A field failed validation after parsing.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What to do with a new-file diff's placeholder window/buffer on
/// reject.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OnNewFileReject {
    /// Leave the empty placeholder buffer in place.
    KeepEmpty,
    /// Close the placeholder window outright.
    CloseWindow,
}

impl Default for OnNewFileReject {
    fn default() -> Self {
        OnNewFileReject::KeepEmpty
    }
}

/// Diff-specific options.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DiffOpts {
    /// Split orientation, or a unified inline buffer:
    /// `"vertical"` | `"horizontal"` | `"inline"`.
    pub layout: String,
    /// Open each diff in a newly-created editor tab.
    pub open_in_new_tab: bool,
    /// After opening a diff, return focus to the assistant terminal.
    pub keep_terminal_focus: bool,
    /// When opening in a new tab, suppress re-embedding the assistant
    /// terminal there.
    pub hide_terminal_in_new_tab: bool,
    /// On reject of a new-file diff, keep the empty placeholder or
    /// close its window.
    pub on_new_file_reject: OnNewFileReject,
    /// Whether to equalize window widths after building a split layout.
    pub equalize_windows: bool,
    /// Delay, in milliseconds, before a saved diff's buffers are
    /// reloaded from disk. A heuristic standing in for proper
    /// disk-write-ordering guarantees; see `DESIGN.md`.
    pub reload_delay_ms: u64,
}

impl Default for DiffOpts {
    fn default() -> Self {
        Self {
            layout: "vertical".to_string(),
            open_in_new_tab: false,
            keep_terminal_focus: false,
            hide_terminal_in_new_tab: false,
            on_new_file_reject: OnNewFileReject::KeepEmpty,
            equalize_windows: true,
            reload_delay_ms: 100,
        }
    }
}

impl DiffOpts {
    /// Parse `layout` into a `Layout`, falling back to the default
    /// orientation if the string is not recognized (validated earlier
    /// by [`Config::validate`]).
    pub fn layout(&self) -> Layout {
        Layout::parse(&self.layout).unwrap_or(Layout::Split {
            orientation: Orientation::Vertical,
        })
    }
}

/// Legacy options kept for backward compatibility: two of them have
/// defined mappings onto `diff_opts`, the rest are accepted but
/// ignored.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LegacyOpts {
    /// Maps to `diff_opts.layout`: `true` -> `"vertical"`, `false` ->
    /// `"horizontal"`.
    pub vertical_split: Option<bool>,
    /// Maps to the negation of `diff_opts.open_in_new_tab`.
    pub open_in_current_tab: Option<bool>,
    /// Accepted, not mapped to anything.
    pub auto_close_on_accept: Option<bool>,
    /// Accepted, not mapped to anything.
    pub show_diff_stats: Option<bool>,
}

/// The parsed, validated configuration file.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Diff rendering options.
    pub diff_opts: DiffOpts,
    /// Legacy backward-compatibility options.
    pub legacy: LegacyOpts,
}

impl Config {
    /// Load and validate a config file at `path`. A missing file yields
    /// `Config::default()`; a present-but-unparseable file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Ok(content) = fs::read_to_string(path) else {
            return Ok(Self::default());
        };
        Self::parse(&content, path)
    }

    /// Parse config content directly, skipping the filesystem (used by
    /// callers that already have the file contents, and by tests).
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new("<memory>"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_legacy_aliases();
        config.validate()?;
        Ok(config)
    }

    fn apply_legacy_aliases(&mut self) {
        if let Some(vertical) = self.legacy.vertical_split {
            self.diff_opts.layout = if vertical { "vertical" } else { "horizontal" }.to_string();
        }
        if let Some(current_tab) = self.legacy.open_in_current_tab {
            self.diff_opts.open_in_new_tab = !current_tab;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if Layout::parse(&self.diff_opts.layout).is_none() {
            return Err(ConfigError::Invalid(format!(
                "diff_opts.layout must be \"vertical\", \"horizontal\" or \"inline\", got {:?}",
                self.diff_opts.layout
            )));
        }
        Ok(())
    }
}
