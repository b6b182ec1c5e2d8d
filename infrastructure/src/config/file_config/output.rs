//! `[output]` section: how command results are printed.

use rally_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// Raw output configuration from TOML
///
/// `--output` on the command line wins over `format`. `color` only affects
/// the text renderer; JSON is never colored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Default format when `--output` is not given
    pub format: Option<OutputFormat>,
    /// Color headers and statuses in text output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

impl FileOutputConfig {
    /// Pick the format: command line first, then this section, then text.
    pub fn resolve_format(&self, requested: Option<OutputFormat>) -> OutputFormat {
        requested.or(self.format).unwrap_or_default()
    }

    /// Whether the text renderer should emit ANSI colors for `format`.
    pub fn colored_for(&self, format: OutputFormat) -> bool {
        self.color && format == OutputFormat::Text
    }
}
