//! Shared leaderboard over a simple HTTP endpoint, with a local JSON
//! cache and built-in defaults so the game works fully offline.
//!
//! Every failure here degrades instead of propagating: remote errors fall
//! back to the cache, cache errors fall back to the defaults, and submits
//! that cannot reach the server still land in the cache.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::constants::{LEADERBOARD_MAX_ENTRIES, LEADERBOARD_NAME_MAX_CHARS};

/// Endpoint override; unset means offline mode.
const URL_ENV_VAR: &str = "WARDKEEPER_LEADERBOARD_URL";
const CACHE_FILE: &str = "leaderboard.json";

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("no leaderboard endpoint configured")]
    NotConfigured,
    #[error("http error: {0}")]
    Http(#[from] Box<ureq::Error>),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub round: u32,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, round: u32) -> Self {
        Self {
            name: name.into(),
            round,
        }
    }
}

/// The board shown when neither the server nor the cache is reachable.
pub fn default_entries() -> Vec<ScoreEntry> {
    vec![
        ScoreEntry::new("Fish", 20),
        ScoreEntry::new("Marz", 18),
        ScoreEntry::new("Cassie", 5),
        ScoreEntry::new("Marz Marz", 5),
        ScoreEntry::new("Gamebad", 4),
    ]
}

/// Trims and length-limits a submitted name. Names that trim to nothing
/// are rejected; those entries are never written.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(LEADERBOARD_NAME_MAX_CHARS).collect())
}

/// Highest round first; ties keep insertion order. The board never shows
/// more than the entry cap.
pub fn sort_and_truncate(entries: &mut Vec<ScoreEntry>) {
    entries.sort_by(|a, b| b.round.cmp(&a.round));
    entries.truncate(LEADERBOARD_MAX_ENTRIES);
}

pub struct Leaderboard {
    url: Option<String>,
    cache_path: Option<PathBuf>,
}

impl Leaderboard {
    /// Reads the endpoint from the environment and picks the platform
    /// config directory for the cache.
    pub fn new() -> Self {
        let cache_path = dirs::config_dir().map(|dir| dir.join("wardkeeper").join(CACHE_FILE));
        Self {
            url: std::env::var(URL_ENV_VAR).ok(),
            cache_path,
        }
    }

    /// Explicit wiring, used by tests.
    pub fn with_paths(url: Option<String>, cache_path: Option<PathBuf>) -> Self {
        Self { url, cache_path }
    }

    /// Current board: server, then cache, then defaults.
    pub fn load(&self) -> Vec<ScoreEntry> {
        let mut entries = match self.fetch_remote() {
            Ok(entries) => {
                self.write_cache(&entries);
                entries
            }
            Err(LeaderboardError::NotConfigured) => self.read_cache().unwrap_or_else(default_entries),
            Err(err) => {
                log::warn!("leaderboard fetch failed: {err}");
                self.read_cache().unwrap_or_else(default_entries)
            }
        };
        sort_and_truncate(&mut entries);
        entries
    }

    /// Records a finished run and returns the updated board. Blank names
    /// drop the submission; network trouble only costs the upload.
    pub fn submit(&self, raw_name: &str, round: u32) -> Vec<ScoreEntry> {
        let Some(name) = normalize_name(raw_name) else {
            return self.load();
        };
        let mut entries = self.load();
        entries.push(ScoreEntry::new(name, round));
        sort_and_truncate(&mut entries);
        self.write_cache(&entries);
        if let Err(err) = self.push_remote(&entries) {
            match err {
                LeaderboardError::NotConfigured => {}
                other => log::warn!("leaderboard submit failed: {other}"),
            }
        }
        entries
    }

    fn fetch_remote(&self) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        let url = self.url.as_deref().ok_or(LeaderboardError::NotConfigured)?;
        let entries: Vec<ScoreEntry> = ureq::get(url)
            .query("action", "read")
            .call()
            .map_err(Box::new)?
            .into_json()?;
        Ok(entries)
    }

    /// The write endpoint takes the whole board as a JSON array, not a
    /// single entry.
    fn push_remote(&self, entries: &[ScoreEntry]) -> Result<(), LeaderboardError> {
        let url = self.url.as_deref().ok_or(LeaderboardError::NotConfigured)?;
        ureq::post(url)
            .query("action", "write")
            .send_json(entries)
            .map_err(Box::new)?;
        Ok(())
    }

    fn read_cache(&self) -> Option<Vec<ScoreEntry>> {
        let path = self.cache_path.as_ref()?;
        let raw = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(entries) => Some(entries),
            Err(err) => {
                log::warn!("leaderboard cache unreadable: {err}");
                None
            }
        }
    }

    fn write_cache(&self, entries: &[ScoreEntry]) {
        let Some(path) = self.cache_path.as_ref() else {
            return;
        };
        let result = path
            .parent()
            .map(fs::create_dir_all)
            .transpose()
            .and_then(|_| serde_json::to_string_pretty(entries).map_err(std::io::Error::other))
            .and_then(|raw| fs::write(path, raw));
        if let Err(err) = result {
            log::warn!("leaderboard cache write failed: {err}");
        }
    }
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new()
    }
}
