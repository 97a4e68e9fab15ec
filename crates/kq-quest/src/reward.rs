//! Experience scoring for a submitted choice.
//!
//! The total is the base reward scaled by the difficulty multiplier, plus a
//! set of flat bonuses:
//!
//! | bonus       | when                                        | value          |
//! |-------------|---------------------------------------------|----------------|
//! | time        | night / morning / evening                   | 20 / 15 / 10   |
//! | risk        | outing with OPI ≥ 80 / ≥ 50                  | 100 / 50       |
//! | stay streak | five or more trailing stays in the history  | 5 × streak     |
//! | lucky       | 10% chance                                  | 20..=50        |
//! | combo       | last three choices equal a pattern          | pattern bonus  |

use std::fmt;

use kq_core::action::base_reward_for;
use kq_core::{Category, ChoiceKey, Difficulty, Opi, TimeOfDay};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Trailing stays needed before the streak bonus applies.
pub const STREAK_THRESHOLD: usize = 5;
/// Streak bonus per trailing stay.
pub const STREAK_BONUS_PER_STAY: u32 = 5;
/// Chance of a lucky bonus, in percent.
pub const LUCKY_CHANCE_PERCENT: u32 = 10;

/// A sequence of three choices that earns a bonus when made in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboPattern {
    /// Display name.
    pub name: String,
    /// The choices, oldest first.
    pub keys: [String; 3],
    /// Bonus awarded on a match.
    pub bonus: u32,
}

impl ComboPattern {
    /// Create a pattern.
    pub fn new(name: impl Into<String>, keys: [&str; 3], bonus: u32) -> Self {
        Self {
            name: name.into(),
            keys: keys.map(str::to_string),
            bonus,
        }
    }

    /// Whether `recent` is exactly this pattern.
    pub fn matches(&self, recent: &[String]) -> bool {
        recent == self.keys.as_slice()
    }
}

/// The configured combo patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboTable {
    patterns: Vec<ComboPattern>,
}

impl Default for ComboTable {
    fn default() -> Self {
        Self::new(vec![
            ComboPattern::new(
                "Relaxation Chain",
                ["stay_tea", "stay_music", "stay_breath"],
                50,
            ),
            ComboPattern::new("Health Chain", ["stay_stretch", "out_walk", "stay_breath"], 60),
            ComboPattern::new("Culture Chain", ["stay_read", "stay_tea", "stay_write"], 70),
            ComboPattern::new(
                "Lifestyle Chain",
                ["stay_clean", "stay_cook", "stay_stretch"],
                65,
            ),
        ])
    }
}

impl ComboTable {
    /// A table with the given patterns, checked in order.
    pub fn new(patterns: Vec<ComboPattern>) -> Self {
        Self { patterns }
    }

    /// A table that never matches.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// The patterns, in check order.
    pub fn patterns(&self) -> &[ComboPattern] {
        &self.patterns
    }

    /// The first pattern equal to the last three history entries.
    pub fn find_match(&self, history: &[String]) -> Option<&ComboPattern> {
        if history.len() < 3 {
            return None;
        }
        let recent = &history[history.len() - 3..];
        self.patterns.iter().find(|p| p.matches(recent))
    }
}

/// Kinds of flat bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    /// Time-of-day bonus.
    Time,
    /// Going out while the OPI is high.
    Risk,
    /// Long run of stays.
    StayStreak,
    /// Random luck.
    Lucky,
    /// Completed combo.
    Combo,
}

impl fmt::Display for BonusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time => write!(f, "Time"),
            Self::Risk => write!(f, "Courage"),
            Self::StayStreak => write!(f, "Streak"),
            Self::Lucky => write!(f, "Lucky"),
            Self::Combo => write!(f, "Combo"),
        }
    }
}

/// One flat bonus in a reward breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonus {
    /// What the bonus is for.
    pub kind: BonusKind,
    /// Points awarded.
    pub value: u32,
    /// Short description.
    pub label: String,
}

impl Bonus {
    fn new(kind: BonusKind, value: u32, label: impl Into<String>) -> Self {
        Self {
            kind,
            value,
            label: label.into(),
        }
    }
}

/// The scored result of one choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    /// The scored choice.
    pub choice: String,
    /// Base reward from the catalog.
    pub base: u32,
    /// Difficulty of the submitted OPI.
    pub difficulty: Difficulty,
    /// Difficulty multiplier.
    pub multiplier: f64,
    /// Flat bonuses, in the order they were applied.
    pub bonuses: Vec<Bonus>,
    /// The combo completed by this choice, if any.
    pub combo: Option<ComboPattern>,
    /// Trailing stays in the history, this choice included.
    pub stay_streak: usize,
    /// Experience awarded.
    pub total: u32,
}

impl Reward {
    /// Base reward after the difficulty multiplier.
    pub fn scaled(&self) -> f64 {
        f64::from(self.base) * self.multiplier
    }

    /// The value of a bonus, if it was awarded.
    pub fn bonus(&self, kind: BonusKind) -> Option<u32> {
        self.bonuses.iter().find(|b| b.kind == kind).map(|b| b.value)
    }

    /// Sum of flat bonuses.
    pub fn bonus_total(&self) -> u32 {
        self.bonuses.iter().map(|b| b.value).sum()
    }
}

/// Time-of-day bonus.
pub fn time_bonus(time: TimeOfDay) -> u32 {
    match time {
        TimeOfDay::Night => 20,
        TimeOfDay::Morning => 15,
        TimeOfDay::Evening => 10,
        TimeOfDay::Noon => 0,
    }
}

/// Courage bonus for going out at a given OPI.
pub fn risk_bonus(opi: Opi) -> u32 {
    match Difficulty::classify(opi) {
        Difficulty::Hell => 100,
        Difficulty::Warning => 50,
        _ => 0,
    }
}

/// Number of consecutive stay entries at the end of `history`.
pub fn trailing_stays(history: &[String]) -> usize {
    history
        .iter()
        .rev()
        .take_while(|key| key.starts_with("stay_"))
        .count()
}

/// Score `choice` at `opi`.
///
/// `history` must already end with `choice`. The RNG is drawn from exactly
/// once or twice (lucky roll, then lucky amount), so results are
/// reproducible for a fixed seed.
pub fn compute_reward(
    choice: &ChoiceKey,
    opi: Opi,
    history: &[String],
    time: TimeOfDay,
    combos: &ComboTable,
    rng: &mut StdRng,
) -> Reward {
    let difficulty = Difficulty::classify(opi);
    let base = base_reward_for(choice);
    let multiplier = difficulty.multiplier();
    let mut bonuses = Vec::new();

    let time_value = time_bonus(time);
    if time_value > 0 {
        bonuses.push(Bonus::new(BonusKind::Time, time_value, time.as_str()));
    }

    if choice.category() == Category::Out {
        let risk = risk_bonus(opi);
        if risk > 0 {
            bonuses.push(Bonus::new(
                BonusKind::Risk,
                risk,
                format!("outing at OPI {opi}"),
            ));
        }
    }

    let stay_streak = trailing_stays(history);
    if stay_streak >= STREAK_THRESHOLD {
        let value = u32::try_from(stay_streak)
            .unwrap_or(u32::MAX)
            .saturating_mul(STREAK_BONUS_PER_STAY);
        bonuses.push(Bonus::new(
            BonusKind::StayStreak,
            value,
            format!("{stay_streak} in a row"),
        ));
    }

    if rng.random_range(1..=100) <= LUCKY_CHANCE_PERCENT {
        let value = rng.random_range(20..=50);
        bonuses.push(Bonus::new(BonusKind::Lucky, value, "lucky"));
    }

    let combo = combos.find_match(history).cloned();
    if let Some(pattern) = &combo {
        bonuses.push(Bonus::new(BonusKind::Combo, pattern.bonus, pattern.name.clone()));
    }

    let flat: u32 = bonuses.iter().map(|b| b.value).sum();
    let total = (f64::from(base) * multiplier + f64::from(flat)).trunc() as u32;

    Reward {
        choice: choice.to_string(),
        base,
        difficulty,
        multiplier,
        bonuses,
        combo,
        stay_streak,
        total,
    }
}
