//! Rolling daily statistics in a single JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use kq_core::{Difficulty, Opi};
use serde::{Deserialize, Serialize};

use crate::error::QuestResult;

/// Counters for one local date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    /// Scene views.
    pub visits: u32,
    /// Sum of the OPI over all visits.
    pub opi_total: u64,
    /// Visits per difficulty.
    pub difficulties: BTreeMap<Difficulty, u32>,
    /// Distinct visitors, in first-seen order.
    pub unique_users: Vec<String>,
}

impl Default for DailyStats {
    fn default() -> Self {
        Self {
            visits: 0,
            opi_total: 0,
            difficulties: Difficulty::all().iter().map(|&d| (d, 0)).collect(),
            unique_users: Vec::new(),
        }
    }
}

impl DailyStats {
    /// Count one visit.
    pub fn record(&mut self, opi: Opi, difficulty: Difficulty, user_id: &str) {
        self.visits += 1;
        self.opi_total += u64::from(opi.value());
        *self.difficulties.entry(difficulty).or_default() += 1;
        if !self.unique_users.iter().any(|u| u == user_id) {
            self.unique_users.push(user_id.to_string());
        }
    }

    /// Mean OPI over the day's visits.
    pub fn average_opi(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.opi_total as f64 / f64::from(self.visits))
    }

    /// Visits at a difficulty.
    pub fn count(&self, difficulty: Difficulty) -> u32 {
        self.difficulties.get(&difficulty).copied().unwrap_or(0)
    }
}

/// The statistics file.
#[derive(Debug, Clone)]
pub struct StatsLog {
    path: PathBuf,
    retention_days: u64,
}

impl StatsLog {
    /// A log stored at `path`, keeping 30 days.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retention_days: 30,
        }
    }

    /// Set how many days back entries are kept.
    pub fn with_retention_days(mut self, days: u64) -> Self {
        self.retention_days = days;
        self
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored day. A missing or unreadable file reads as empty; the
    /// next [`record`](Self::record) overwrites it.
    pub fn load(&self) -> QuestResult<BTreeMap<NaiveDate, DailyStats>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str(&json) {
            Ok(days) => Ok(days),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "ignoring corrupt statistics file"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    /// Count a visit on `date` and drop days older than the retention window.
    pub fn record(
        &self,
        opi: Opi,
        difficulty: Difficulty,
        user_id: &str,
        date: NaiveDate,
    ) -> QuestResult<()> {
        let mut days = self.load()?;
        days.entry(date)
            .or_default()
            .record(opi, difficulty, user_id);

        if let Some(cutoff) = date.checked_sub_days(Days::new(self.retention_days)) {
            days.retain(|day, _| *day >= cutoff);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&days)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_counters() {
        let mut day = DailyStats::default();
        assert_eq!(day.average_opi(), None);
        day.record(Opi::new(80), Difficulty::Hell, "aaaa");
        day.record(Opi::new(20), Difficulty::Peace, "bbbb");
        day.record(Opi::new(50), Difficulty::Warning, "aaaa");
        assert_eq!(day.visits, 3);
        assert_eq!(day.opi_total, 150);
        assert_eq!(day.average_opi(), Some(50.0));
        assert_eq!(day.count(Difficulty::Hell), 1);
        assert_eq!(day.count(Difficulty::Calm), 0);
        assert_eq!(day.unique_users, ["aaaa", "bbbb"]);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = StatsLog::new(dir.path().join("statistics.json"));
        assert!(log.load().unwrap().is_empty());
    }

    #[test]
    fn record_persists_and_accumulates() {
        let dir = TempDir::new().unwrap();
        let log = StatsLog::new(dir.path().join("nested/statistics.json"));
        let today = date(2025, 3, 5);
        log.record(Opi::new(40), Difficulty::Calm, "u1", today).unwrap();
        log.record(Opi::new(60), Difficulty::Warning, "u1", today).unwrap();

        let days = log.load().unwrap();
        let stats = &days[&today];
        assert_eq!(stats.visits, 2);
        assert_eq!(stats.unique_users.len(), 1);
        assert_eq!(stats.count(Difficulty::Warning), 1);
    }

    #[test]
    fn corrupt_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let log = StatsLog::new(dir.path().join("statistics.json"));
        fs::write(log.path(), "{garbage").unwrap();
        assert!(log.load().unwrap().is_empty());

        log.record(Opi::new(40), Difficulty::Calm, "u", date(2025, 3, 5)).unwrap();
        assert_eq!(log.load().unwrap()[&date(2025, 3, 5)].visits, 1);
    }

    #[test]
    fn old_days_are_pruned() {
        let dir = TempDir::new().unwrap();
        let log = StatsLog::new(dir.path().join("statistics.json"));
        log.record(Opi::new(10), Difficulty::Peace, "u", date(2025, 1, 1)).unwrap();
        log.record(Opi::new(10), Difficulty::Peace, "u", date(2025, 1, 31)).unwrap();
        log.record(Opi::new(10), Difficulty::Peace, "u", date(2025, 2, 1)).unwrap();

        let days: Vec<NaiveDate> = log.load().unwrap().into_keys().collect();
        assert_eq!(days, [date(2025, 1, 31), date(2025, 2, 1)]);
    }

    #[test]
    fn file_is_keyed_by_iso_date() {
        let dir = TempDir::new().unwrap();
        let log = StatsLog::new(dir.path().join("statistics.json"));
        log.record(Opi::new(90), Difficulty::Hell, "u", date(2025, 3, 5)).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(log.path()).unwrap()).unwrap();
        assert_eq!(raw["2025-03-05"]["difficulties"]["hell"], 1);
        assert_eq!(raw["2025-03-05"]["visits"], 1);
    }
}
