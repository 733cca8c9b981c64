//! Configuration file support
//!
//! Loads settings from ~/.pyhl.conf (or %USERPROFILE%\.pyhl.conf on Windows)
//!
//! Format: simple key=value pairs, one per line
//! Lines starting with # are comments
//!
//! Example:
//! ```text
//! # pyhl configuration
//! debounce-ms = 50
//! indent-width = 4
//! theme = Dark
//! theme-file = ~/.config/pyhl/night.toml
//! auto-pair = true
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::assists::{EditAssists, DEFAULT_INDENT_WIDTH};
use crate::error::{HighlightError, Result};
use crate::scheduler::DEFAULT_DEBOUNCE_MS;

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Quiet period before a re-highlight, in milliseconds
    pub debounce_ms: u64,
    /// Columns per indent level
    pub indent_width: usize,
    /// Name of the active theme
    pub theme: String,
    /// Optional TOML theme to load at startup
    pub theme_file: Option<PathBuf>,
    /// Whether brackets and quotes are auto-closed
    pub auto_pair: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            indent_width: DEFAULT_INDENT_WIDTH,
            theme: "Light".to_string(),
            theme_file: None,
            auto_pair: true,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".pyhl.conf"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".pyhl.conf"))
        }
    }

    /// Load configuration from the default file, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                warn!(error = %e, path = %path.display(), "ignoring unreadable config");
                Config::default()
            }),
            _ => Config::default(),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_str_contents(&contents)
    }

    /// Parse config file contents; a line that is not `key = value` is an error
    pub fn from_str_contents(contents: &str) -> Result<Self> {
        let mut config = Config::default();
        config.apply(&Self::parse(contents)?);
        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn assists(&self) -> EditAssists {
        EditAssists::new(self.indent_width, self.auto_pair)
    }

    /// Parse config file contents into key-value pairs
    fn parse(contents: &str) -> Result<HashMap<String, String>> {
        let mut settings = HashMap::new();

        for (n, line) in contents.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(HighlightError::Config(format!("line {}: expected `key = value`, got '{}'", n + 1, line)));
            };
            settings.insert(key.trim().to_lowercase(), value.trim().to_string());
        }

        Ok(settings)
    }

    /// Apply settings from parsed config
    fn apply(&mut self, settings: &HashMap<String, String>) {
        if let Some(value) = settings.get("debounce-ms") {
            match value.parse::<u64>() {
                Ok(n) => self.debounce_ms = n.clamp(10, 1000),
                Err(_) => warn!(value = %value, "invalid debounce-ms"),
            }
        }

        if let Some(value) = settings.get("indent-width") {
            match value.parse::<usize>() {
                Ok(n) => self.indent_width = n.clamp(1, 16),
                Err(_) => warn!(value = %value, "invalid indent-width"),
            }
        }

        if let Some(value) = settings.get("theme") {
            if !value.is_empty() {
                self.theme = value.clone();
            }
        }

        if let Some(value) = settings.get("theme-file") {
            self.theme_file = (!value.is_empty()).then(|| expand_home(value));
        }

        if let Some(value) = settings.get("auto-pair") {
            self.auto_pair = parse_bool(value);
        }
    }

    /// Render the settings in config file format
    pub fn to_contents(&self) -> String {
        let mut contents = format!(
            "# pyhl configuration\n\
             # Generated automatically\n\n\
             debounce-ms = {}\n\
             indent-width = {}\n\
             theme = {}\n\
             auto-pair = {}\n",
            self.debounce_ms, self.indent_width, self.theme, self.auto_pair
        );
        if let Some(path) = &self.theme_file {
            contents.push_str(&format!("theme-file = {}\n", path.display()));
        }
        contents
    }

    /// Save current configuration to the default file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            fs::write(path, self.to_contents())?;
        }
        Ok(())
    }
}

/// Parse a boolean value from string
fn parse_bool(s: &str) -> bool {
    let s = s.to_lowercase();
    matches!(s.as_str(), "true" | "yes" | "on" | "1")
}

/// Expand a leading `~/` to the home directory
fn expand_home(value: &str) -> PathBuf {
    match (value.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(value),
    }
}
