//! Quest engine for Kodoku Quest.
//!
//! Turns an OPI reading into a scene (flavor text, offered choices, the
//! occasional special event), scores a submitted choice (difficulty
//! multiplier, time-of-day bonus, outing risk, stay streaks, combos, luck),
//! awards titles, and keeps per-visitor sessions. [`QuestApp`] ties it
//! together behind two handlers that mirror the game's two pages.

pub mod app;
pub mod config;
pub mod csrf;
pub mod error;
pub mod reward;
pub mod scene;
pub mod session;
pub mod stats;
pub mod tables;
pub mod titles;
pub mod validate;

pub use app::{QuestApp, ResultView, SceneView, Submission};
pub use config::QuestConfig;
pub use error::{QuestError, QuestResult};
pub use reward::{ComboPattern, ComboTable, Reward, compute_reward};
pub use scene::{Scene, generate_choices, generate_scene};
pub use session::{FileStore, MemoryStore, SessionState, SessionStore};
pub use stats::{DailyStats, StatsLog};
pub use titles::Title;
pub use validate::{Rejection, ResultForm, ValidForm};
