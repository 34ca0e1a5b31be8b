use crate::error::CatalogError;
use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const EMBEDDED_CATALOG: &str = include_str!("resources/passwords.json");

const APP_DIR: &str = "password-prowler";
const CATALOG_FILE_NAME: &str = "passwords.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown difficulty '{0}' (expected easy, medium or hard)")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "e" | "1" => Ok(Self::Easy),
            "medium" | "m" | "2" => Ok(Self::Medium),
            "hard" | "h" | "3" => Ok(Self::Hard),
            _ => Err(ParseDifficultyError(s.trim().to_string())),
        }
    }
}

/// One candidate password with the hints and trivia that go with it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecretEntry {
    pub password: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub facts: Vec<String>,
}

impl SecretEntry {
    /// Password length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.password.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.password.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    passwords: Vec<SecretEntry>,
}

/// Where secrets come from. The session asks for one entry per round.
pub trait PasswordCatalog {
    fn entries_for(&self, tier: Difficulty) -> Vec<&SecretEntry>;

    /// Pick a random entry of `tier`, preferring ones whose password is not
    /// in `excluding`. Once every entry of the tier has been used, entries
    /// are reused. Returns `None` only when the tier has no entries at all.
    fn pick_one(&mut self, tier: Difficulty, excluding: &HashSet<String>) -> Option<SecretEntry>;
}

/// In-memory catalog with its own random source.
#[derive(Debug)]
pub struct Catalog<R = ThreadRng> {
    entries: Vec<SecretEntry>,
    rng: R,
}

impl Catalog<ThreadRng> {
    #[must_use]
    pub fn from_entries(entries: Vec<SecretEntry>) -> Self {
        Self::with_rng(entries, rand::rng())
    }

    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is malformed or an entry has an empty password.
    pub fn from_json_str(data: &str) -> Result<Self, CatalogError> {
        parse_catalog(data).map(Self::from_entries)
    }

    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or its contents are invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        load_catalog_from_file(path).map(Self::from_entries)
    }

    /// # Errors
    ///
    /// Only fails if the bundled resource is broken.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json_str(EMBEDDED_CATALOG)
    }
}

impl<R: Rng> Catalog<R> {
    pub fn with_rng(entries: Vec<SecretEntry>, rng: R) -> Self {
        Self { entries, rng }
    }

    #[must_use]
    pub fn entries(&self) -> &[SecretEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: Rng> PasswordCatalog for Catalog<R> {
    fn entries_for(&self, tier: Difficulty) -> Vec<&SecretEntry> {
        self.entries.iter().filter(|e| e.difficulty == tier).collect()
    }

    fn pick_one(&mut self, tier: Difficulty, excluding: &HashSet<String>) -> Option<SecretEntry> {
        let pool: Vec<&SecretEntry> = self
            .entries
            .iter()
            .filter(|e| e.difficulty == tier)
            .collect();
        let fresh: Vec<&SecretEntry> = pool
            .iter()
            .copied()
            .filter(|e| !excluding.contains(&e.password))
            .collect();

        let candidates = if fresh.is_empty() {
            log::debug!("All {tier} passwords used this session, reusing");
            &pool
        } else {
            &fresh
        };

        candidates.choose(&mut self.rng).map(|e| (*e).clone())
    }
}

/// # Errors
///
/// Returns `CatalogError::Parse` for malformed JSON and
/// `CatalogError::EmptyPassword` for an entry with no password.
pub fn parse_catalog(data: &str) -> Result<Vec<SecretEntry>, CatalogError> {
    let file: CatalogFile = serde_json::from_str(data)?;
    if let Some(index) = file.passwords.iter().position(SecretEntry::is_empty) {
        return Err(CatalogError::EmptyPassword { index });
    }
    Ok(file.passwords)
}

/// # Errors
///
/// Returns `CatalogError::Io` if the file cannot be read, otherwise see [`parse_catalog`].
pub fn load_catalog_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<SecretEntry>, CatalogError> {
    let data = fs::read_to_string(path)?;
    parse_catalog(&data)
}

/// Per-user catalog location, e.g. `~/.local/share/password-prowler/passwords.json`.
#[must_use]
pub fn default_catalog_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR).join(CATALOG_FILE_NAME))
}
