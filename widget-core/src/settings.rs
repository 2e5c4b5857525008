use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::SettingsError;

/// Default settings file name, resolved against the server's working directory.
pub const DEFAULT_SETTINGS_FILE: &str = ".env.local";

/// Ordered `KEY=VALUE` entries read from a plain-text settings file.
///
/// No quoting or escaping: whatever follows the first `=` is the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: Vec<(String, String)>,
}

impl Settings {
    pub fn parse(contents: &str) -> Self {
        let mut settings = Settings::default();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (line, ""),
            };

            if key.is_empty() {
                debug!(line, "skipping settings line without a key");
                continue;
            }

            settings.set(key, value);
        }

        settings
    }

    /// Read and parse the settings file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(SettingsError::NotFound(path.to_path_buf()))
            }
            Err(source) => Err(SettingsError::Io { path: path.to_path_buf(), source }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Insert or replace `key`. Later duplicates in a file win, like the last
    /// assignment in a shell env file.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize back to the `KEY=VALUE` format.
    pub fn render(&self) -> String {
        let mut out = String::from("# Weather widget settings\n");
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        fs::write(path, self.render())
            .map_err(|source| SettingsError::Io { path: PathBuf::from(path), source })
    }
}
