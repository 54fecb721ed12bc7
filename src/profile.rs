//! Player profile: preferred settings and best score, persisted as JSON
//! (XDG config or ~/.config/tetris2048).

use crate::config::Difficulty;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DIR_NAME: &str = "tetris2048";
const FILENAME: &str = "profile.json";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile io error: {0}")]
    Io(#[from] io::Error),
    #[error("profile is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub high_score: u32,
    /// Row-clear flash on/off.
    #[serde(default = "default_animations")]
    pub animations: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            version: default_version(),
            difficulty: Difficulty::default(),
            high_score: 0,
            animations: default_animations(),
        }
    }
}

fn default_version() -> u32 {
    1
}

fn default_animations() -> bool {
    true
}

impl Profile {
    /// Keep `score` if it beats the stored best. Returns true on a new record.
    pub fn record_score(&mut self, score: u32) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }
}

/// Where the profile lives on disk.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_CONFIG_HOME/tetris2048/profile.json`, falling back to `~/.config`, then `.`.
    pub fn from_env() -> Self {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::at(base.join(DIR_NAME).join(FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the profile. A missing file is a fresh profile, not an error.
    pub fn load(&self) -> Result<Profile, ProfileError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Profile::default()),
            Err(e) => return Err(e.into()),
        };
        let mut profile: Profile = serde_json::from_slice(&bytes)?;
        profile.version = default_version();
        Ok(profile)
    }

    /// Write the profile, creating the config directory if needed.
    pub fn save(&self, profile: &Profile) -> Result<(), ProfileError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(profile)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
