//! Scene generation: what the player sees before choosing.

use kq_core::action::actions_in;
use kq_core::{ActionChoice, Category, Difficulty, Opi, OpiReading, TimeOfDay};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::session::SessionState;
use crate::tables::{self, BUSY_MORNING_LINE, COMBO_STREAK_LINE, QUIET_NIGHT_LINE};

/// At or above this OPI only relaxing stay choices are offered.
pub const RELAX_ONLY_FROM: u8 = 70;
/// Outings are offered only at or below this OPI.
pub const OUTINGS_UP_TO: u8 = 49;
/// Below this OPI three outings are offered instead of two.
pub const WIDE_OUTINGS_BELOW: u8 = 30;
/// Stay choices offered per scene.
pub const STAY_CHOICES: usize = 3;
/// History entries a stay choice must not repeat.
pub const RECENT_WINDOW: usize = 3;

/// An action offered in a scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferedChoice {
    /// The catalog entry.
    pub action: &'static ActionChoice,
    /// Bonus advertised next to the choice.
    pub bonus_hint: Option<u32>,
}

/// Stay and outing choices for one scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Choices {
    /// Stay-at-home choices.
    pub stay: Vec<OfferedChoice>,
    /// Outing choices; empty when the OPI is above 49.
    pub out: Vec<OfferedChoice>,
}

/// A rare banner shown on top of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpecialEvent {
    /// Banner icon.
    pub icon: &'static str,
    /// Banner text.
    pub text: &'static str,
}

/// Everything the scene page displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    /// Difficulty of the current OPI.
    pub difficulty: Difficulty,
    /// Local time of day.
    pub time_of_day: TimeOfDay,
    /// Main flavor line.
    pub message: String,
    /// Extra line when the OPI came from the fallback.
    pub offline_message: Option<String>,
    /// Offered choices.
    pub choices: Choices,
    /// Banner, roughly one scene in ten.
    pub special_event: Option<SpecialEvent>,
}

/// Pick the choices offered at `opi`.
///
/// Stay choices avoid anything in the last three `history` entries and, at
/// high OPI, are limited to actions tagged `relax` or `calm`.
pub fn generate_choices(opi: Opi, history: &[String], rng: &mut StdRng) -> Choices {
    let recent = &history[history.len().saturating_sub(RECENT_WINDOW)..];
    let relax_only = opi.value() >= RELAX_ONLY_FROM;

    let mut stay: Vec<&'static ActionChoice> = actions_in(Category::Stay)
        .filter(|a| !relax_only || a.has_tag("relax") || a.has_tag("calm"))
        .filter(|a| !recent.iter().any(|key| key == a.key))
        .collect();
    stay.shuffle(rng);
    stay.truncate(STAY_CHOICES);
    let stay = stay
        .into_iter()
        .map(|action| {
            let bonus_hint = if rng.random_range(1..=3) == 1 {
                Some(rng.random_range(10..=30))
            } else {
                None
            };
            OfferedChoice { action, bonus_hint }
        })
        .collect();

    let out = if opi.value() <= OUTINGS_UP_TO {
        let count = if opi.value() < WIDE_OUTINGS_BELOW { 3 } else { 2 };
        let mut pool: Vec<&'static ActionChoice> = actions_in(Category::Out).collect();
        pool.shuffle(rng);
        pool.into_iter()
            .take(count)
            .map(|action| OfferedChoice {
                action,
                bonus_hint: None,
            })
            .collect()
    } else {
        Vec::new()
    };

    Choices { stay, out }
}

/// Pick the main flavor line.
pub fn scene_message(
    opi: Opi,
    time: TimeOfDay,
    combo_streak: u32,
    rng: &mut StdRng,
) -> String {
    let mut candidates: Vec<&str> = tables::scene_lines(opi.difficulty()).to_vec();
    if time == TimeOfDay::Night && opi.value() < 40 {
        candidates.push(QUIET_NIGHT_LINE);
    }
    if time == TimeOfDay::Morning && opi.value() > 70 {
        candidates.push(BUSY_MORNING_LINE);
    }
    if combo_streak >= 3 {
        candidates.push(COMBO_STREAK_LINE);
    }
    tables::pick(&candidates, rng)
        .replace("{opi}", &opi.to_string())
        .replace("{streak}", &combo_streak.to_string())
}

/// Roll for a special event (one in ten).
pub fn roll_special_event(rng: &mut StdRng) -> Option<SpecialEvent> {
    if rng.random_range(1..=10) != 1 {
        return None;
    }
    let (icon, text) = tables::SPECIAL_EVENTS[rng.random_range(0..tables::SPECIAL_EVENTS.len())];
    Some(SpecialEvent { icon, text })
}

/// Build the full scene for a reading.
pub fn generate_scene(
    reading: &OpiReading,
    session: &SessionState,
    time: TimeOfDay,
    rng: &mut StdRng,
) -> Scene {
    let opi = reading.value;
    let message = scene_message(opi, time, session.combo_streak, rng);
    let offline_message = reading
        .is_offline()
        .then(|| tables::pick(tables::OFFLINE_LINES, rng).to_string());
    let choices = generate_choices(opi, &session.history, rng);
    let special_event = roll_special_event(rng);

    Scene {
        difficulty: opi.difficulty(),
        time_of_day: time,
        message,
        offline_message,
        choices,
        special_event,
    }
}
