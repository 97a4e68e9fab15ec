//! Titles earned by reaching milestones. Each is awarded at most once.

use kq_core::TimeOfDay;

use crate::session::SessionState;

/// What it takes to earn a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleRule {
    /// Total stay choices.
    StayCount(u32),
    /// Times one particular action was chosen.
    ActionCount(&'static str, u32),
    /// Current combo streak.
    ComboStreak(u32),
    /// Running experience total.
    TotalExp(u64),
    /// Choices made during a time of day.
    TimeOfDayCount(TimeOfDay, u32),
    /// Consecutive stay choices.
    StayStreak(u32),
}

impl TitleRule {
    /// Whether `session` satisfies the rule.
    pub fn is_met(self, session: &SessionState) -> bool {
        match self {
            Self::StayCount(n) => session.stay_count >= n,
            Self::ActionCount(key, n) => session.action_count(key) >= n,
            Self::ComboStreak(n) => session.combo_streak >= n,
            Self::TotalExp(n) => session.total_exp >= n,
            Self::TimeOfDayCount(time, n) => session.time_count(time) >= n,
            Self::StayStreak(n) => session.stay_streak >= n,
        }
    }
}

/// A title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    /// Stable id stored in the session.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Badge icon.
    pub icon: &'static str,
    /// Award condition.
    pub rule: TitleRule,
}

static TITLES: &[Title] = &[
    Title {
        id: "first_stay",
        name: "First Day In",
        icon: "🏠",
        rule: TitleRule::StayCount(1),
    },
    Title {
        id: "tea_master",
        name: "Tea Ceremony, First Dan",
        icon: "🍵",
        rule: TitleRule::ActionCount("stay_tea", 5),
    },
    Title {
        id: "nap_king",
        name: "Nap Virtuoso",
        icon: "😴",
        rule: TitleRule::ActionCount("stay_nap", 10),
    },
    Title {
        id: "combo_beginner",
        name: "Combo Novice",
        icon: "🔗",
        rule: TitleRule::ComboStreak(3),
    },
    Title {
        id: "combo_master",
        name: "Combo Master",
        icon: "⚡",
        rule: TitleRule::ComboStreak(10),
    },
    Title {
        id: "exp_1000",
        name: "1K EXP",
        icon: "🌟",
        rule: TitleRule::TotalExp(1_000),
    },
    Title {
        id: "exp_5000",
        name: "5K EXP",
        icon: "💫",
        rule: TitleRule::TotalExp(5_000),
    },
    Title {
        id: "night_owl",
        name: "Night Owl",
        icon: "🌙",
        rule: TitleRule::TimeOfDayCount(TimeOfDay::Night, 5),
    },
    Title {
        id: "early_bird",
        name: "Early Bird",
        icon: "🌅",
        rule: TitleRule::TimeOfDayCount(TimeOfDay::Morning, 5),
    },
    Title {
        id: "hermit",
        name: "Solitary Hermit",
        icon: "🏔️",
        rule: TitleRule::StayStreak(20),
    },
];

/// Every title, in award order.
pub fn all_titles() -> &'static [Title] {
    TITLES
}

/// Look up a title by id.
pub fn find_title(id: &str) -> Option<&'static Title> {
    TITLES.iter().find(|t| t.id == id)
}

/// Award every title the session now qualifies for and has not yet earned.
/// Returns the newly earned titles in table order.
pub fn award_titles(session: &mut SessionState) -> Vec<&'static Title> {
    let current: &SessionState = session;
    let earned: Vec<&'static Title> = TITLES
        .iter()
        .filter(|t| !current.has_title(t.id) && t.rule.is_met(current))
        .collect();
    for title in &earned {
        session.titles_earned.push(title.id.to_string());
    }
    earned
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kq_core::ChoiceKey;

    fn session() -> SessionState {
        SessionState::new("0123456789abcdef", Utc::now())
    }

    fn choose(s: &mut SessionState, key: &str, time: TimeOfDay) {
        s.record_choice(&ChoiceKey::parse(key).unwrap(), time, 10);
    }

    fn ids(titles: &[&Title]) -> Vec<&'static str> {
        titles.iter().map(|t| t.id).collect()
    }

    #[test]
    fn ids_are_unique() {
        for (i, a) in TITLES.iter().enumerate() {
            assert!(TITLES[i + 1..].iter().all(|b| b.id != a.id), "{}", a.id);
        }
    }

    #[test]
    fn first_stay_awarded_once() {
        let mut s = session();
        choose(&mut s, "stay_read", TimeOfDay::Noon);
        assert_eq!(ids(&award_titles(&mut s)), ["first_stay"]);
        choose(&mut s, "stay_read", TimeOfDay::Noon);
        assert!(award_titles(&mut s).is_empty());
        assert_eq!(s.titles_earned, ["first_stay"]);
    }

    #[test]
    fn outing_alone_earns_nothing() {
        let mut s = session();
        choose(&mut s, "out_sky", TimeOfDay::Noon);
        assert!(award_titles(&mut s).is_empty());
    }

    #[test]
    fn tea_master_after_five_teas() {
        let mut s = session();
        for _ in 0..4 {
            choose(&mut s, "stay_tea", TimeOfDay::Noon);
        }
        award_titles(&mut s);
        assert!(!s.has_title("tea_master"));
        choose(&mut s, "stay_tea", TimeOfDay::Noon);
        assert_eq!(ids(&award_titles(&mut s)), ["tea_master"]);
    }

    #[test]
    fn exp_titles_can_arrive_together() {
        let mut s = session();
        s.add_exp(6_000);
        assert_eq!(ids(&award_titles(&mut s)), ["exp_1000", "exp_5000"]);
    }

    #[test]
    fn time_of_day_titles() {
        let mut s = session();
        for _ in 0..5 {
            choose(&mut s, "out_door", TimeOfDay::Night);
            choose(&mut s, "out_door", TimeOfDay::Morning);
        }
        assert_eq!(ids(&award_titles(&mut s)), ["night_owl", "early_bird"]);
    }

    #[test]
    fn hermit_counts_past_history_length() {
        let mut s = session();
        for _ in 0..19 {
            choose(&mut s, "stay_sofa", TimeOfDay::Noon);
        }
        award_titles(&mut s);
        assert!(!s.has_title("hermit"));
        choose(&mut s, "stay_sofa", TimeOfDay::Noon);
        assert!(ids(&award_titles(&mut s)).contains(&"hermit"));
        assert_eq!(s.history.len(), 10);
    }

    #[test]
    fn combo_titles_follow_streak() {
        let mut s = session();
        for _ in 0..3 {
            s.record_combo(true);
        }
        assert_eq!(ids(&award_titles(&mut s)), ["combo_beginner"]);
        assert_eq!(find_title("combo_master").map(|t| t.icon), Some("⚡"));
    }
}
