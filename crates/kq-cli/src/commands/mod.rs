pub mod cache;
pub mod opi;
pub mod play;
pub mod scene;
pub mod stats;
pub mod status;

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use kq_core::Difficulty;
use kq_opi::{FetchOutcome, FileCache, OpiConfig, OpiProvider};
use kq_quest::{FileStore, QuestApp, QuestConfig, StatsLog};
use serde::{Deserialize, Serialize};

/// Settings shared by every command.
pub struct Context {
    pub data_dir: PathBuf,
    pub seed: Option<u64>,
    pub utc_offset_hours: i32,
    pub opi_url: Option<String>,
    pub opi_key: Option<String>,
    pub no_cache: bool,
}

/// The form the last scene would have posted back.
#[derive(Debug, Serialize, Deserialize)]
pub struct Pending {
    pub session_id: String,
    pub csrf_token: String,
    pub opi: u8,
}

impl Context {
    fn opi_config(&self) -> OpiConfig {
        let mut config = OpiConfig::default().with_utc_offset_hours(self.utc_offset_hours);
        if let Some(url) = &self.opi_url {
            config = config.with_endpoint(url.clone());
        }
        if let Some(key) = &self.opi_key {
            config = config.with_api_key(key.clone());
        }
        config
    }

    fn quest_config(&self) -> QuestConfig {
        let config = QuestConfig::default().with_utc_offset_hours(self.utc_offset_hours);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    pub fn cache(&self) -> FileCache {
        if self.no_cache {
            FileCache::disabled()
        } else {
            FileCache::new(self.data_dir.join("cache"))
        }
    }

    pub fn stats_log(&self) -> StatsLog {
        StatsLog::new(self.data_dir.join("statistics.json"))
    }

    pub fn app(&self) -> QuestApp<FileStore> {
        QuestApp::new(
            self.quest_config(),
            FileStore::new(self.data_dir.join("sessions")),
        )
        .with_stats(self.stats_log())
    }

    /// The OPI for `now`, cache first.
    pub async fn reading(&self, now: DateTime<Utc>) -> Result<FetchOutcome, String> {
        let provider = OpiProvider::new(self.opi_config()).map_err(|e| e.to_string())?;
        let mut rng = self.quest_config().rng();
        Ok(kq_opi::current_reading(&provider, &self.cache(), now, &mut rng).await)
    }

    fn pending_path(&self) -> PathBuf {
        self.data_dir.join("pending.json")
    }

    pub fn load_pending(&self) -> Result<Option<Pending>, String> {
        match fs::read_to_string(self.pending_path()) {
            Ok(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| format!("corrupt pending form: {e}")),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(format!("cannot read pending form: {e}")),
        }
    }

    pub fn save_pending(&self, pending: &Pending) -> Result<(), String> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| format!("cannot create {}: {e}", self.data_dir.display()))?;
        let json = serde_json::to_string_pretty(pending).map_err(|e| e.to_string())?;
        fs::write(self.pending_path(), json)
            .map_err(|e| format!("cannot write pending form: {e}"))
    }
}

/// A difficulty label in its tier color.
fn paint(difficulty: Difficulty) -> ColoredString {
    let label = difficulty.label();
    match difficulty {
        Difficulty::Hell => label.red().bold(),
        Difficulty::Warning => label.yellow().bold(),
        Difficulty::Calm => label.cyan(),
        Difficulty::Peace => label.green(),
    }
}
