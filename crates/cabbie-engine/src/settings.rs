//! Group/key settings store.
//!
//! The settings file is plain text:
//!
//! ```text
//! # comment
//! [handling]
//! grip = 400
//! brake_per_sec = 320   # trailing comments are fine
//! ```
//!
//! Entries before the first `[group]` header belong to the default group
//! `""`. Keys are looked up either relative to the current group (`"grip"`)
//! or with an explicit group (`"handling/grip"`).
//!
//! Missing keys are not errors: lookups return an empty string, zero, or an
//! empty vector. Callers that need a real default check [`Settings::contains`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// SettingsError
// ---------------------------------------------------------------------------

/// Errors raised while loading settings or switching groups.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// [`Settings::set_group`] was asked for a group that does not exist.
    #[error("settings group {0:?} not found")]
    UnknownGroup(String),
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

type Group = HashMap<String, String>;

/// Parsed settings, grouped by section.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    groups: HashMap<String, Group>,
    current_group: String,
}

impl Default for Settings {
    fn default() -> Self {
        let mut groups = HashMap::new();
        groups.insert(String::new(), Group::new());
        Self {
            groups,
            current_group: String::new(),
        }
    }
}

impl Settings {
    /// Read and parse a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::parse(&text);
        tracing::info!(path = %path.display(), groups = settings.groups.len(), "loaded settings");
        Ok(settings)
    }

    /// Parse settings text. Malformed lines are logged and skipped.
    pub fn parse(text: &str) -> Self {
        let mut settings = Self::default();
        let mut group_name = String::new();

        for (line_no, raw) in text.lines().enumerate() {
            let line = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
                group_name = line[1..line.len() - 1].trim().to_owned();
                settings.groups.entry(group_name.clone()).or_default();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!(line = line_no + 1, text = line, "unrecognised settings line");
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                tracing::warn!(line = line_no + 1, key, value, "invalid setting, skipped");
                continue;
            }

            settings
                .groups
                .entry(group_name.clone())
                .or_default()
                .insert(key.to_owned(), value.to_owned());
        }

        settings
    }

    /// Make `name` the group used for keys without a `group/` prefix.
    pub fn set_group(&mut self, name: &str) -> Result<(), SettingsError> {
        if !self.groups.contains_key(name) {
            tracing::warn!(group = name, "settings group not found");
            return Err(SettingsError::UnknownGroup(name.to_owned()));
        }
        self.current_group = name.to_owned();
        Ok(())
    }

    pub fn current_group(&self) -> &str {
        &self.current_group
    }

    /// Store a value, creating the group if needed. Used for overrides.
    pub fn set(&mut self, group: &str, key: &str, value: impl Into<String>) {
        self.groups
            .entry(group.to_owned())
            .or_default()
            .insert(key.to_owned(), value.into());
    }

    /// Split `"group/key"` into its parts, falling back to the current group.
    fn resolve<'a>(&'a self, name: &'a str) -> (&'a str, &'a str) {
        match name.find('/') {
            Some(pos) if pos > 0 => (&name[..pos], &name[pos + 1..]),
            _ => (self.current_group.as_str(), name),
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        let (group, key) = self.resolve(name);
        self.groups
            .get(group)
            .and_then(|g| g.get(key))
            .map(String::as_str)
    }

    /// Whether a value is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// The raw value, or `""` if missing.
    pub fn get_string(&self, name: &str) -> &str {
        self.lookup(name).unwrap_or("")
    }

    /// Integer value of the first token, or `0`. A float token is truncated.
    pub fn get_int(&self, name: &str) -> i64 {
        let Some(token) = self.get_string(name).split_whitespace().next() else {
            return 0;
        };
        token
            .parse::<i64>()
            .ok()
            .or_else(|| token.parse::<f64>().ok().map(|v| v as i64))
            .unwrap_or(0)
    }

    /// Float value of the first token, or `0.0`.
    pub fn get_float(&self, name: &str) -> f64 {
        self.get_string(name)
            .split_whitespace()
            .next()
            .and_then(|token| token.parse().ok())
            .unwrap_or(0.0)
    }

    /// Whitespace-separated tokens.
    pub fn get_string_vec(&self, name: &str) -> Vec<String> {
        self.get_string(name)
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }

    /// Whitespace-separated floats. Tokens that do not parse are dropped.
    pub fn get_float_vec(&self, name: &str) -> Vec<f64> {
        self.get_string(name)
            .split_whitespace()
            .filter_map(|token| token.parse().ok())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
