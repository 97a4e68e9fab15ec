//! Flavor text tables.
//!
//! Lines may contain `{opi}` (replaced with the current index) or `{streak}`
//! (replaced with the combo streak).

use kq_core::Difficulty;
use rand::Rng;
use rand::rngs::StdRng;

/// Scene lines for a mayhem-tier OPI.
pub const HELL_LINES: &[&str] = &[
    "Romance encounters are spawning everywhere outside.\nToday your room is a cheat code.",
    "The sunshine concentration out there is critical.\nUse your tea as a shield.",
    "Today's hero does not touch the doorknob.",
    "When the world's soundtrack is loud,\nturn down the volume of your heart, not your ears.",
    "OPI {opi}. Full-blown chaos.\nStaying in is the strategically correct answer.",
    "The more crowded it gets outside,\nthe more your room is worth.",
    "Anyone heading out today is not brave, just reckless.\nYou are the sage.",
];

/// Scene lines for an on-guard-tier OPI.
pub const WARNING_LINES: &[&str] = &[
    "\"Moderately crowded\" hits the nerves hardest.\nFortify the futon.",
    "Society is saying \"come on out\".\nNope (instant reply).",
    "Days that are sort of easy to go out\nare sort of easy to regret.",
    "Your room is your kingdom.\nKings do not queue.",
    "OPI {opi}. Alert level.\nHave the courage not to push it.",
    "Do you really need to match\nthe outside world's idea of normal?",
];

/// Scene lines for a breeze-tier OPI.
pub const CALM_LINES: &[&str] = &[
    "The city's soundtrack is quiet.\nOpen the window and win.",
    "The courage to stay in is rarer than the courage to go out.",
    "The streets are empty. You could be the star,\nbut you are free not to be.",
    "OPI {opi}. Breeze mode.\nEvery choice is correct.",
    "A quiet day is a good day\nfor a conversation with yourself.",
];

/// Scene lines for a stillness-tier OPI.
pub const PEACE_LINES: &[&str] = &[
    "The world is asleep.\nStaying in is total victory.",
    "Stillness is a talent.\nYou are in the best stadium on earth: your room.",
    "Doing nothing is not losing.\nIt is a recovery command.",
    "OPI {opi}. Total silence.\nPeace on a cosmic scale.",
    "Right now, you may be\nthe calmest person in the world.",
];

/// Extra candidate at night when the OPI is low.
pub const QUIET_NIGHT_LINE: &str = "The quiet of night is special.\nTonight you rule the city.";

/// Extra candidate in the morning when the OPI is high.
pub const BUSY_MORNING_LINE: &str =
    "The outside world is at full throttle this morning.\nWelcome to the shelter called your room.";

/// Extra candidate once the combo streak reaches three.
pub const COMBO_STREAK_LINE: &str = "Stay-at-home streak number {streak}.\nYou are already a legend.";

/// Shown when the OPI came from the fallback.
pub const OFFLINE_LINES: &[&str] = &[
    "Whoever is on the other side of the signal is alone too.\nToday is an SS-rank stay-in.",
    "Reality has lost consistency.\nSpeaking meta-ly: go to sleep.",
    "No need to hurry.\nSolitude will wait for you.",
    "Can't get the data?\nThen trust the data in your heart.",
    "Being offline is the best proof\nthat you are living in the now.",
];

/// Possible special events: `(icon, text)`.
pub const SPECIAL_EVENTS: &[(&str, &str)] = &[
    ("🎁", "Lucky! Bonus EXP ×1.5 today"),
    ("⭐", "A special day. +50 XP on every choice"),
    ("🌈", "Rare event! Titles are deluxe today"),
    ("🎉", "Congratulations! You are well on the way to stay-at-home mastery"),
];

/// Result lines per difficulty.
pub fn result_lines(difficulty: Difficulty) -> &'static [&'static str] {
    match difficulty {
        Difficulty::Hell => &[
            "You chose to stay in during hell-tier conditions. Supremely cool!",
            "Solitude wins! What judgement!",
            "A mind that does not bend to outing pressure. Respect!",
        ],
        Difficulty::Warning => &[
            "A wise call on an alert-level day!",
            "This choice, in this situation. Well played!",
            "Dodging the risk like that. Splendid!",
        ],
        Difficulty::Calm => &[
            "You made good use of a calm hour!",
            "Choosing to look after yourself. Wonderful!",
            "Looks like that was a comfortable moment!",
        ],
        Difficulty::Peace => &[
            "You savoured a peaceful moment!",
            "Glad you could spend it with a quiet mind!",
            "A relaxing moment. The best!",
        ],
    }
}

/// Result line for any outing, regardless of difficulty.
pub const OUTING_RESULT_LINE: &str = "The courage to step outside is wonderful! Just don't overdo it!";

/// Encouragement by running total: `(upper bound exclusive, line)`.
pub const ENCOURAGEMENT: &[(u64, &str)] = &[
    (500, "A good start! Keep going at your own pace."),
    (1_500, "You are growing steadily!"),
    (3_000, "Wonderful! Your style is taking shape."),
    (5_000, "Magnificent! A true master of staying in!"),
];

/// Encouragement once past every bound in [`ENCOURAGEMENT`].
pub const LEGENDARY_ENCOURAGEMENT: &str = "You have reached legendary status. Flawless!";

/// Scene lines for a difficulty.
pub fn scene_lines(difficulty: Difficulty) -> &'static [&'static str] {
    match difficulty {
        Difficulty::Hell => HELL_LINES,
        Difficulty::Warning => WARNING_LINES,
        Difficulty::Calm => CALM_LINES,
        Difficulty::Peace => PEACE_LINES,
    }
}

/// Encouragement line for a running total.
pub fn encouragement(total_exp: u64) -> &'static str {
    ENCOURAGEMENT
        .iter()
        .find(|(bound, _)| total_exp < *bound)
        .map(|(_, line)| *line)
        .unwrap_or(LEGENDARY_ENCOURAGEMENT)
}

/// Pick a random line.
pub fn pick<'a>(lines: &[&'a str], rng: &mut StdRng) -> &'a str {
    lines[rng.random_range(0..lines.len())]
}
