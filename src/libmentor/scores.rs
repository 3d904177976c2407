use log::{debug, error, info, warn};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Subject that absorbs a legacy bare total once the user earns a subject score.
pub const LEGACY_SUBJECT: &str = "legacy";

/// Per-user entry of the score file. Old files stored a bare number per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreEntry {
    Total(u64),
    BySubject(BTreeMap<String, u64>),
}

impl ScoreEntry {
    pub fn total(&self) -> u64 {
        match self {
            ScoreEntry::Total(total) => *total,
            ScoreEntry::BySubject(subjects) => subjects.values().sum(),
        }
    }

    fn into_subjects(self) -> BTreeMap<String, u64> {
        match self {
            ScoreEntry::BySubject(subjects) => subjects,
            ScoreEntry::Total(0) => BTreeMap::new(),
            ScoreEntry::Total(total) => BTreeMap::from([(LEGACY_SUBJECT.to_string(), total)]),
        }
    }
}

/// user -> subject -> points. Users keep the order they appear in the file,
/// new users go last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    users: Vec<(String, ScoreEntry)>,
}

impl Serialize for ScoreBoard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.users.iter().map(|(user, entry)| (user, entry)))
    }
}

impl<'de> Deserialize<'de> for ScoreBoard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // serde_json's `preserve_order` keeps the object in file order.
        let object = Map::<String, Value>::deserialize(deserializer)?;
        let mut users = Vec::with_capacity(object.len());
        for (user, value) in object {
            let entry = ScoreEntry::deserialize(value).map_err(de::Error::custom)?;
            users.push((user, entry));
        }
        Ok(Self { users })
    }
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn find(&self, user: &str) -> Option<&ScoreEntry> {
        self.users
            .iter()
            .find(|(name, _)| name == user)
            .map(|(_, entry)| entry)
    }

    #[cfg(test)]
    pub fn entry(&self, user: &str) -> Option<&ScoreEntry> {
        self.find(user)
    }

    pub fn subject_score(&self, user: &str, subject: &str) -> u64 {
        match self.find(user) {
            Some(ScoreEntry::BySubject(subjects)) => subjects.get(subject).copied().unwrap_or(0),
            _ => 0,
        }
    }

    /// Adds `delta` to `user`/`subject`, creating both as needed. An existing
    /// user keeps their place on the board.
    pub fn merge(mut self, user: &str, subject: &str, delta: u64) -> Self {
        let idx = match self.users.iter().position(|(name, _)| name == user) {
            Some(idx) => idx,
            None => {
                self.users
                    .push((user.to_string(), ScoreEntry::BySubject(BTreeMap::new())));
                self.users.len() - 1
            }
        };
        let (_, entry) = &mut self.users[idx];
        let mut subjects = std::mem::replace(entry, ScoreEntry::Total(0)).into_subjects();
        let points = subjects.entry(subject.to_string()).or_insert(0);
        *points = points.saturating_add(delta);
        *entry = ScoreEntry::BySubject(subjects);
        self
    }

    /// Copy with every legacy bare total turned into a subject map.
    pub fn normalized(&self) -> Self {
        let users = self
            .users
            .iter()
            .map(|(user, entry)| {
                let subjects = entry.clone().into_subjects();
                (user.clone(), ScoreEntry::BySubject(subjects))
            })
            .collect();
        Self { users }
    }

    /// Users with their summed totals, highest first. The sort is stable, so
    /// equal totals keep the board's order.
    pub fn rank(&self) -> Vec<(String, u64)> {
        let mut ranking: Vec<(String, u64)> = self
            .users
            .iter()
            .map(|(user, entry)| (user.clone(), entry.total()))
            .collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1));
        ranking
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("score file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON score file on disk.
#[derive(Debug, Clone)]
pub struct ScoreStore {
    path: PathBuf,
}

impl ScoreStore {
    pub const FILE_NAME: &'static str = "scores.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored board, or an empty one when nothing usable is on disk.
    pub fn load(&self) -> ScoreBoard {
        match self.try_load() {
            Ok(board) => board,
            Err(StoreError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                debug!("[Scores] No score file at {:?} yet", self.path);
                ScoreBoard::new()
            }
            Err(err) => {
                warn!("[Scores] Ignoring unreadable score file {:?}: {}", self.path, err);
                ScoreBoard::new()
            }
        }
    }

    fn try_load(&self) -> Result<ScoreBoard, StoreError> {
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Writes the board, always in the subject-map shape. On failure the
    /// previous file is left as it was.
    pub fn save(&self, board: &ScoreBoard) -> bool {
        let now = Instant::now();
        match self.try_save(board) {
            Ok(()) => {
                debug!(
                    "[Scores] Saving to {:?} took {} ms.",
                    self.path,
                    now.elapsed().as_millis()
                );
                true
            }
            Err(err) => {
                error!("[Scores] Failed to save {:?}: {}", self.path, err);
                false
            }
        }
    }

    fn try_save(&self, board: &ScoreBoard) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&board.normalized())?;
        let staging = self.staging_path();
        fs::write(&staging, json)?;
        if let Err(err) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| Self::FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Load, add `delta` for `user`/`subject`, save. Returns the new board
    /// and whether it reached the disk.
    pub fn record(&self, user: &str, subject: &str, delta: u64) -> (ScoreBoard, bool) {
        let board = self.load().merge(user, subject, delta);
        let saved = self.save(&board);
        if saved {
            info!("[Scores] {} +{} in {}", user, delta, subject);
        }
        (board, saved)
    }
}
