//! Actions a player can choose.
//!
//! A single static catalog serves both sides of the game: the scene
//! generator draws offered choices from it and the reward engine looks up
//! base rewards in it. Keys follow the `(stay|out)_[a-z]+` form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KqError, KqResult};

/// Whether an action keeps the player inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Stay at home.
    Stay,
    /// Step outside briefly.
    Out,
}

impl Category {
    /// Key prefix, without the underscore.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stay => "stay",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated choice key such as `stay_tea`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChoiceKey {
    category: Category,
    name: String,
}

impl ChoiceKey {
    /// Parse a key of the form `(stay|out)_[a-z]+`.
    pub fn parse(input: &str) -> KqResult<Self> {
        let invalid = || KqError::InvalidChoice(input.to_string());
        let (prefix, name) = input.split_once('_').ok_or_else(invalid)?;
        let category = match prefix {
            "stay" => Category::Stay,
            "out" => Category::Out,
            _ => return Err(invalid()),
        };
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(invalid());
        }
        Ok(Self {
            category,
            name: name.to_string(),
        })
    }

    /// The category encoded in the prefix.
    pub fn category(&self) -> Category {
        self.category
    }

    /// The part after the underscore.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The catalog entry for this key, if there is one.
    pub fn action(&self) -> Option<&'static ActionChoice> {
        find_action(&self.to_string())
    }
}

impl FromStr for ChoiceKey {
    type Err = KqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ChoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category, self.name)
    }
}

/// How exposed an outing is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Risk {
    /// Doorstep-level exposure.
    Low,
    /// Brushes past other people.
    Medium,
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionChoice {
    /// Full key, e.g. `stay_tea`.
    pub key: &'static str,
    /// Stay or out.
    pub category: Category,
    /// Experience before multipliers and bonuses.
    pub base_reward: u32,
    /// Short description shown to the player.
    pub label: &'static str,
    /// Display glyph.
    pub icon: &'static str,
    /// Mood tags used to filter offered choices.
    pub tags: &'static [&'static str],
    /// Exposure level; only set for outings.
    pub risk: Option<Risk>,
}

impl ActionChoice {
    /// Whether the entry carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag)
    }

    /// Whether the entry is an outing.
    pub fn is_out(&self) -> bool {
        self.category == Category::Out
    }
}

/// Base reward for a well-formed key that is not in the catalog.
pub const UNKNOWN_BASE_REWARD: u32 = 10;

const fn stay(
    key: &'static str,
    base_reward: u32,
    label: &'static str,
    icon: &'static str,
    tags: &'static [&'static str],
) -> ActionChoice {
    ActionChoice {
        key,
        category: Category::Stay,
        base_reward,
        label,
        icon,
        tags,
        risk: None,
    }
}

const fn out(
    key: &'static str,
    base_reward: u32,
    label: &'static str,
    icon: &'static str,
    tags: &'static [&'static str],
    risk: Risk,
) -> ActionChoice {
    ActionChoice {
        key,
        category: Category::Out,
        base_reward,
        label,
        icon,
        tags,
        risk: Some(risk),
    }
}

static CATALOG: &[ActionChoice] = &[
    stay("stay_tea", 30, "Boil water for tea", "🍵", &["relax", "warm"]),
    stay("stay_nap", 40, "Fifteen-minute nap", "😴", &["relax", "refresh"]),
    stay("stay_music", 25, "Put on a favourite song", "🎵", &["mood", "relax"]),
    stay("stay_breath", 20, "Three deep breaths", "🌬️", &["mind", "calm"]),
    stay("stay_stretch", 35, "Five minutes of stretching", "🤸", &["body", "refresh"]),
    stay("stay_window", 15, "Open the window", "🪟", &["refresh", "mood"]),
    stay("stay_read", 50, "Read one page of the backlog", "📖", &["mind", "calm"]),
    stay("stay_pet", 45, "Hug a plushie", "🧸", &["warm", "nostalgic"]),
    stay("stay_cook", 60, "Cook something simple", "🍳", &["fun", "creative"]),
    stay("stay_clean", 40, "Five-minute tidy-up", "🧹", &["refresh", "mood"]),
    stay("stay_game", 35, "Admire an old save file", "🎮", &["fun", "mood"]),
    stay("stay_write", 55, "Write three lines in a journal", "✍️", &["mind", "expression"]),
    stay("stay_sofa", 25, "Sink into the sofa", "🛋️", &["relax", "rest"]),
    stay("stay_aroma", 30, "Light an aroma candle", "🕯️", &["relax", "calm"]),
    out("out_sky", 40, "Look at the sky for a minute", "🌟", &["refresh"], Risk::Low),
    out("out_door", 30, "Deep breath at the front door", "🚪", &["refresh"], Risk::Low),
    out("out_mailbox", 50, "Check the mailbox", "📬", &["refresh"], Risk::Low),
    out("out_balcony", 35, "Step onto the balcony", "🌱", &["refresh", "body"], Risk::Low),
    out("out_vending", 60, "Walk to the vending machine", "🥤", &["refresh"], Risk::Low),
    out("out_convenience", 70, "Round trip to the corner shop", "🏪", &["refresh"], Risk::Medium),
    out("out_walk", 80, "Stroll around the block", "🚶", &["body", "refresh"], Risk::Medium),
    out("out_park", 90, "Sit on a park bench", "🏞️", &["body", "refresh"], Risk::Medium),
];

/// Every action in the catalog, stay actions first.
pub fn catalog() -> &'static [ActionChoice] {
    CATALOG
}

/// Look up an action by its full key.
pub fn find_action(key: &str) -> Option<&'static ActionChoice> {
    CATALOG.iter().find(|a| a.key == key)
}

/// All actions in a category, in catalog order.
pub fn actions_in(category: Category) -> impl Iterator<Item = &'static ActionChoice> {
    CATALOG.iter().filter(move |a| a.category == category)
}

/// Base reward for a key, falling back to [`UNKNOWN_BASE_REWARD`].
pub fn base_reward_for(key: &ChoiceKey) -> u32 {
    key.action()
        .map(|a| a.base_reward)
        .unwrap_or(UNKNOWN_BASE_REWARD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_keys() {
        let key = ChoiceKey::parse("stay_tea").unwrap();
        assert_eq!(key.category(), Category::Stay);
        assert_eq!(key.name(), "tea");
        assert_eq!(key.to_string(), "stay_tea");

        let key: ChoiceKey = "out_park".parse().unwrap();
        assert_eq!(key.category(), Category::Out);
    }

    #[test]
    fn parse_rejects_malformed_keys() {
        for bad in [
            "", "stay", "stay_", "go_tea", "stay_Tea", "stay_tea2", "stay_tea_time", "STAY_tea",
            "out_ park", "_tea",
        ] {
            assert!(ChoiceKey::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn catalog_keys_are_well_formed_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for action in catalog() {
            let key = ChoiceKey::parse(action.key).unwrap();
            assert_eq!(key.category(), action.category, "{}", action.key);
            assert!(seen.insert(action.key), "duplicate {}", action.key);
            assert!(action.base_reward > 0);
            assert_eq!(action.risk.is_some(), action.is_out());
        }
    }

    #[test]
    fn relax_pool_is_large_enough() {
        let relaxing = actions_in(Category::Stay)
            .filter(|a| a.has_tag("relax") || a.has_tag("calm"))
            .count();
        // Three offered choices survive excluding the last three picks.
        assert!(relaxing >= 6, "only {relaxing} relaxing actions");
    }

    #[test]
    fn out_pool_covers_three_choices() {
        assert!(actions_in(Category::Out).count() >= 3);
    }

    #[test]
    fn unknown_key_uses_default_reward() {
        let key = ChoiceKey::parse("stay_juggle").unwrap();
        assert!(key.action().is_none());
        assert_eq!(base_reward_for(&key), UNKNOWN_BASE_REWARD);
        assert_eq!(base_reward_for(&ChoiceKey::parse("out_park").unwrap()), 90);
    }
}
