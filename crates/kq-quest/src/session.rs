//! Per-visitor session state and where it is kept.
//!
//! A [`SessionState`] is created on the first visit, mutated on every
//! submitted choice, and dropped once it has been idle longer than the
//! configured lifetime. Stores only persist it; expiry is decided by the
//! caller through [`SessionState::is_expired`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use kq_core::{Category, ChoiceKey, TimeOfDay};
use serde::{Deserialize, Serialize};

use crate::csrf::CsrfToken;
use crate::error::{QuestError, QuestResult};

/// Minimum length of a session id.
pub const MIN_SESSION_ID_LEN: usize = 16;

/// Whether `id` is at least 16 lowercase hex characters.
pub fn is_valid_session_id(id: &str) -> bool {
    id.len() >= MIN_SESSION_ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// A fresh random session id (32 lowercase hex characters).
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Accumulated state for one visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Session id, also used as the visitor's user id.
    pub user_id: String,
    /// Running experience total.
    pub total_exp: u64,
    /// Most recent choice keys, oldest first.
    pub history: Vec<String>,
    /// Consecutive combos completed.
    pub combo_streak: u32,
    /// Best combo streak so far.
    pub max_combo: u32,
    /// Consecutive stay choices, not bounded by the history length.
    pub stay_streak: u32,
    /// Title ids in the order they were earned.
    pub titles_earned: Vec<String>,
    /// Times the scene page was shown.
    pub visit_count: u32,
    /// Total stay choices.
    pub stay_count: u32,
    /// Choices per key.
    pub action_counts: BTreeMap<String, u32>,
    /// Choices per local time of day.
    pub time_counts: BTreeMap<TimeOfDay, u32>,
    /// Exp from the most recent choice.
    pub last_exp: Option<u32>,
    /// Current anti-forgery token.
    pub csrf: Option<CsrfToken>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last time the session was loaded or saved by a handler.
    pub last_seen: DateTime<Utc>,
}

impl SessionState {
    /// A new, empty session.
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            total_exp: 0,
            history: Vec::new(),
            combo_streak: 0,
            max_combo: 0,
            stay_streak: 0,
            titles_earned: Vec::new(),
            visit_count: 0,
            stay_count: 0,
            action_counts: BTreeMap::new(),
            time_counts: BTreeMap::new(),
            last_exp: None,
            csrf: None,
            created_at: now,
            last_seen: now,
        }
    }

    /// Whether the session has been idle longer than `lifetime` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, lifetime: Duration) -> bool {
        let lifetime = chrono::Duration::from_std(lifetime).unwrap_or(chrono::Duration::MAX);
        now.signed_duration_since(self.last_seen) > lifetime
    }

    /// Mark the session as used at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
    }

    /// Append a choice to the history, keeping at most `history_len`
    /// entries, and bump the per-action and time-of-day counters.
    pub fn record_choice(&mut self, choice: &ChoiceKey, time: TimeOfDay, history_len: usize) {
        self.history.push(choice.to_string());
        if self.history.len() > history_len {
            let excess = self.history.len() - history_len;
            self.history.drain(..excess);
        }

        *self.action_counts.entry(choice.to_string()).or_default() += 1;
        *self.time_counts.entry(time).or_default() += 1;

        match choice.category() {
            Category::Stay => {
                self.stay_count += 1;
                self.stay_streak += 1;
            }
            Category::Out => self.stay_streak = 0,
        }
    }

    /// Advance or reset the combo streak.
    pub fn record_combo(&mut self, matched: bool) {
        if matched {
            self.combo_streak += 1;
            self.max_combo = self.max_combo.max(self.combo_streak);
        } else {
            self.combo_streak = 0;
        }
    }

    /// Add a reward to the running total.
    pub fn add_exp(&mut self, exp: u32) {
        self.total_exp = self.total_exp.saturating_add(u64::from(exp));
        self.last_exp = Some(exp);
    }

    /// How many times `key` was chosen.
    pub fn action_count(&self, key: &str) -> u32 {
        self.action_counts.get(key).copied().unwrap_or(0)
    }

    /// How many choices were made during `time`.
    pub fn time_count(&self, time: TimeOfDay) -> u32 {
        self.time_counts.get(&time).copied().unwrap_or(0)
    }

    /// Whether a title has been earned.
    pub fn has_title(&self, id: &str) -> bool {
        self.titles_earned.iter().any(|t| t == id)
    }
}

/// Somewhere sessions live between requests.
pub trait SessionStore {
    /// Load a session by id.
    fn load(&self, id: &str) -> QuestResult<Option<SessionState>>;

    /// Save a session, replacing any previous state.
    fn save(&mut self, session: &SessionState) -> QuestResult<()>;

    /// Forget a session. Removing a missing session is not an error.
    fn remove(&mut self, id: &str) -> QuestResult<()>;
}

/// In-process store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: HashMap<String, SessionState>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, id: &str) -> QuestResult<Option<SessionState>> {
        Ok(self.sessions.get(id).cloned())
    }

    fn save(&mut self, session: &SessionState) -> QuestResult<()> {
        self.sessions
            .insert(session.user_id.clone(), session.clone());
        Ok(())
    }

    fn remove(&mut self, id: &str) -> QuestResult<()> {
        self.sessions.remove(id);
        Ok(())
    }
}

/// One pretty-printed JSON file per session: `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// A store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory sessions are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> QuestResult<PathBuf> {
        if !is_valid_session_id(id) {
            return Err(QuestError::InvalidSessionId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }
}

impl SessionStore for FileStore {
    fn load(&self, id: &str) -> QuestResult<Option<SessionState>> {
        let path = self.path_for(id)?;
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str(&json) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                tracing::warn!(session = id, error = %err, "dropping corrupt session file");
                fs::remove_file(&path)?;
                Ok(None)
            }
        }
    }

    fn save(&mut self, session: &SessionState) -> QuestResult<()> {
        let path = self.path_for(&session.user_id)?;
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(session)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, id: &str) -> QuestResult<()> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Load a session, treating expired ones as absent and deleting them.
pub fn load_active<S: SessionStore + ?Sized>(
    store: &mut S,
    id: &str,
    now: DateTime<Utc>,
    lifetime: Duration,
) -> QuestResult<Option<SessionState>> {
    let Some(session) = store.load(id)? else {
        return Ok(None);
    };
    if session.is_expired(now, lifetime) {
        tracing::debug!(session = id, "session expired");
        store.remove(id)?;
        return Ok(None);
    }
    Ok(Some(session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap()
    }

    fn key(s: &str) -> ChoiceKey {
        ChoiceKey::parse(s).unwrap()
    }

    const ID: &str = "0123456789abcdef";

    #[test]
    fn session_id_format() {
        assert!(is_valid_session_id(ID));
        assert!(is_valid_session_id(&new_session_id()));
        assert!(!is_valid_session_id("0123456789abcde"));
        assert!(!is_valid_session_id("0123456789ABCDEF"));
        assert!(!is_valid_session_id("../../etc/passwd0000"));
    }

    #[test]
    fn history_is_trimmed_to_len() {
        let mut s = SessionState::new(ID, now());
        for _ in 0..12 {
            s.record_choice(&key("stay_tea"), TimeOfDay::Noon, 10);
        }
        s.record_choice(&key("out_walk"), TimeOfDay::Noon, 10);
        assert_eq!(s.history.len(), 10);
        assert_eq!(s.history.last().map(String::as_str), Some("out_walk"));
        assert_eq!(s.action_count("stay_tea"), 12);
        assert_eq!(s.time_count(TimeOfDay::Noon), 13);
    }

    #[test]
    fn stay_streak_resets_on_outing() {
        let mut s = SessionState::new(ID, now());
        for _ in 0..4 {
            s.record_choice(&key("stay_nap"), TimeOfDay::Night, 10);
        }
        assert_eq!(s.stay_streak, 4);
        assert_eq!(s.stay_count, 4);
        s.record_choice(&key("out_sky"), TimeOfDay::Night, 10);
        assert_eq!(s.stay_streak, 0);
        assert_eq!(s.stay_count, 4);
    }

    #[test]
    fn combo_streak_and_max() {
        let mut s = SessionState::new(ID, now());
        s.record_combo(true);
        s.record_combo(true);
        s.record_combo(false);
        s.record_combo(true);
        assert_eq!(s.combo_streak, 1);
        assert_eq!(s.max_combo, 2);
    }

    #[test]
    fn expiry_uses_last_seen() {
        let mut s = SessionState::new(ID, now());
        let day = Duration::from_secs(86_400);
        assert!(!s.is_expired(now() + chrono::Duration::hours(24), day));
        assert!(s.is_expired(now() + chrono::Duration::hours(25), day));
        s.touch(now() + chrono::Duration::hours(20));
        assert!(!s.is_expired(now() + chrono::Duration::hours(25), day));
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        let s = SessionState::new(ID, now());
        store.save(&s).unwrap();
        assert_eq!(store.load(ID).unwrap(), Some(s));
        store.remove(ID).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("sessions"));
        let mut s = SessionState::new(ID, now());
        s.record_choice(&key("stay_read"), TimeOfDay::Evening, 10);
        s.add_exp(75);
        store.save(&s).unwrap();

        let loaded = store.load(ID).unwrap().unwrap();
        assert_eq!(loaded, s);
        store.remove(ID).unwrap();
        assert!(store.load(ID).unwrap().is_none());
        store.remove(ID).unwrap();
    }

    #[test]
    fn file_store_drops_corrupt_session() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());
        let path = dir.path().join(format!("{ID}.json"));
        fs::write(&path, "{not json").unwrap();

        assert!(store.load(ID).unwrap().is_none());
        assert!(!path.exists());

        store.save(&SessionState::new(ID, now())).unwrap();
        assert!(store.load(ID).unwrap().is_some());
    }

    #[test]
    fn file_store_rejects_bad_ids() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.load("../escape"),
            Err(QuestError::InvalidSessionId(_))
        ));
    }

    #[test]
    fn load_active_drops_expired() {
        let mut store = MemoryStore::new();
        store.save(&SessionState::new(ID, now())).unwrap();
        let day = Duration::from_secs(86_400);

        let later = now() + chrono::Duration::hours(1);
        assert!(load_active(&mut store, ID, later, day).unwrap().is_some());

        let much_later = now() + chrono::Duration::days(2);
        assert!(load_active(&mut store, ID, much_later, day).unwrap().is_none());
        assert!(store.is_empty());
    }
}
