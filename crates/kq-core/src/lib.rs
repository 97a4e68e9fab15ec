//! Core types for Kodoku Quest: OPI readings, difficulty tiers, and actions.
//!
//! This crate defines the data model shared by the OPI provider and the
//! quest engine. It has no I/O of its own; everything here is a pure value
//! or a lookup into a static table.

/// Action catalog, choice keys, and categories.
pub mod action;
/// Difficulty tiers derived from the OPI.
pub mod difficulty;
/// Error types used throughout the crate.
pub mod error;
/// The Outing Pressure Index and its readings.
pub mod opi;
/// Time-of-day buckets for local wall-clock time.
pub mod time;

/// Re-export action types.
pub use action::{ActionChoice, Category, ChoiceKey, Risk};
/// Re-export difficulty types.
pub use difficulty::{Difficulty, classify_difficulty};
/// Re-export error types.
pub use error::{KqError, KqResult};
/// Re-export OPI types.
pub use opi::{Opi, OpiReading, OpiSource};
/// Re-export time-of-day types.
pub use time::{DEFAULT_UTC_OFFSET_HOURS, TimeOfDay, offset_from_hours};
