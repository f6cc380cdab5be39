//! Named key-value entries on disk (XDG config or ~/.config/ladder-snake).

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "ladder-snake";

/// Config directory: $XDG_CONFIG_HOME/ladder-snake, else ~/.config/ladder-snake, else ./ladder-snake.
pub fn default_config_dir() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(APP_DIR)
}

/// One small file per key under a directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Trimmed value; None when missing or unreadable.
    pub fn get(&self, key: &str) -> Option<String> {
        let raw = fs::read_to_string(self.path_for(key)).ok()?;
        Some(raw.trim().to_string())
    }

    /// Write a value, creating the directory if needed.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.path_for(key);
        fs::write(&path, format!("{}\n", value))
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
