//! Request handlers.
//!
//! [`QuestApp::show_scene`] backs the scene page and
//! [`QuestApp::submit_result`] backs the result form. Both take the current
//! instant explicitly and draw randomness from the app's own RNG, so a
//! seeded app replays identically.

use chrono::{DateTime, Utc};
use kq_core::{ActionChoice, Category, ChoiceKey, OpiReading, TimeOfDay};
use rand::rngs::StdRng;

use crate::config::QuestConfig;
use crate::csrf;
use crate::error::QuestResult;
use crate::reward::{Reward, compute_reward};
use crate::scene::{Scene, generate_scene};
use crate::session::{
    SessionState, SessionStore, is_valid_session_id, load_active, new_session_id,
};
use crate::stats::StatsLog;
use crate::tables::{self, OUTING_RESULT_LINE};
use crate::titles::{Title, award_titles};
use crate::validate::{Rejection, ResultForm, validate_fields, validate_session_id};

/// What the scene page renders.
#[derive(Debug, Clone)]
pub struct SceneView {
    /// Session id to post back.
    pub session_id: String,
    /// Visits so far, this one included.
    pub visit_count: u32,
    /// Running experience total.
    pub total_exp: u64,
    /// Current combo streak.
    pub combo_streak: u32,
    /// Anti-forgery token to post back.
    pub csrf_token: String,
    /// The reading the scene was built from.
    pub reading: OpiReading,
    /// The generated scene.
    pub scene: Scene,
}

/// What the result page renders.
#[derive(Debug, Clone)]
pub struct ResultView {
    /// The submitted choice.
    pub choice: ChoiceKey,
    /// Catalog entry, if the key is known.
    pub action: Option<&'static ActionChoice>,
    /// Score breakdown.
    pub reward: Reward,
    /// Headline message.
    pub message: String,
    /// Encouragement for the running total.
    pub encouragement: &'static str,
    /// Titles earned by this choice.
    pub new_titles: Vec<&'static Title>,
    /// Running experience total.
    pub total_exp: u64,
    /// Current combo streak.
    pub combo_streak: u32,
    /// Best combo streak.
    pub max_combo: u32,
    /// Titles earned so far.
    pub titles_count: usize,
    /// Remembered history, oldest first.
    pub history: Vec<String>,
}

/// Outcome of a result submission.
#[derive(Debug, Clone)]
pub enum Submission {
    /// The choice was scored.
    Accepted(Box<ResultView>),
    /// The form was turned away; nothing was changed.
    Rejected(Rejection),
}

impl Submission {
    /// The result, if accepted.
    pub fn accepted(&self) -> Option<&ResultView> {
        match self {
            Self::Accepted(view) => Some(view),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection, if any.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(r) => Some(*r),
        }
    }

    /// Redirect location for a rejection.
    pub fn redirect(&self) -> Option<String> {
        self.rejection().map(Rejection::location)
    }
}

/// The game, over some session store.
pub struct QuestApp<S: SessionStore> {
    config: QuestConfig,
    store: S,
    stats: Option<StatsLog>,
    rng: StdRng,
}

impl<S: SessionStore> QuestApp<S> {
    /// Create an app. Statistics are off until [`with_stats`](Self::with_stats).
    pub fn new(config: QuestConfig, store: S) -> Self {
        let rng = config.rng();
        Self {
            config,
            store,
            stats: None,
            rng,
        }
    }

    /// Record daily statistics to `log`, using the configured retention.
    pub fn with_stats(mut self, log: StatsLog) -> Self {
        self.stats = Some(log.with_retention_days(self.config.stats_retention_days));
        self
    }

    /// The configuration.
    pub fn config(&self) -> &QuestConfig {
        &self.config
    }

    /// The session store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The statistics log, if enabled.
    pub fn stats(&self) -> Option<&StatsLog> {
        self.stats.as_ref()
    }

    /// Load a live session without touching it.
    pub fn session(&mut self, id: &str, now: DateTime<Utc>) -> QuestResult<Option<SessionState>> {
        if !is_valid_session_id(id) {
            return Ok(None);
        }
        load_active(&mut self.store, id, now, self.config.session_lifetime)
    }

    /// Show the scene page.
    ///
    /// Resumes the session named by `session_id` if it is live, otherwise
    /// starts a new one. Counts the visit, issues an anti-forgery token,
    /// generates the scene, records statistics and saves the session.
    pub fn show_scene(
        &mut self,
        session_id: Option<&str>,
        reading: &OpiReading,
        now: DateTime<Utc>,
    ) -> QuestResult<SceneView> {
        let existing = match session_id {
            Some(id) => self.session(id, now)?,
            None => None,
        };
        let mut session = existing.unwrap_or_else(|| {
            let session = SessionState::new(new_session_id(), now);
            tracing::info!(session = %session.user_id, "new session");
            session
        });

        session.visit_count += 1;
        session.touch(now);
        let csrf_token = csrf::issue(&mut session, now, self.config.csrf_lifetime);

        let local = self.config.local(now);
        let time = TimeOfDay::of(&local);
        let scene = generate_scene(reading, &session, time, &mut self.rng);

        if let Some(stats) = &self.stats
            && let Err(err) = stats.record(
                reading.value,
                scene.difficulty,
                &session.user_id,
                local.date_naive(),
            )
        {
            tracing::warn!(error = %err, "failed to record statistics");
        }
        self.store.save(&session)?;

        tracing::debug!(
            session = %session.user_id,
            opi = reading.value.value(),
            source = %reading.source,
            difficulty = %scene.difficulty,
            "scene generated"
        );

        Ok(SceneView {
            session_id: session.user_id.clone(),
            visit_count: session.visit_count,
            total_exp: session.total_exp,
            combo_streak: session.combo_streak,
            csrf_token,
            reading: reading.clone(),
            scene,
        })
    }

    /// Handle a submitted choice.
    ///
    /// Checks run in order: session id format, session exists and the
    /// anti-forgery token matches, choice format, OPI range. Any failure
    /// returns [`Submission::Rejected`] without touching the session.
    pub fn submit_result(
        &mut self,
        form: &ResultForm,
        now: DateTime<Utc>,
    ) -> QuestResult<Submission> {
        let id = match validate_session_id(form.session_id.as_deref()) {
            Ok(id) => id,
            Err(rejection) => return Ok(reject(rejection)),
        };
        let Some(mut session) = self.session(id, now)? else {
            return Ok(reject(Rejection::Csrf));
        };
        if !csrf::verify(
            &session,
            form.csrf_token.as_deref(),
            now,
            self.config.csrf_lifetime,
        ) {
            return Ok(reject(Rejection::Csrf));
        }
        let valid = match validate_fields(form) {
            Ok(valid) => valid,
            Err(rejection) => return Ok(reject(rejection)),
        };

        let time = TimeOfDay::of(&self.config.local(now));
        session.record_choice(&valid.choice, time, self.config.history_len);
        let reward = compute_reward(
            &valid.choice,
            valid.opi,
            &session.history,
            time,
            &self.config.combos,
            &mut self.rng,
        );
        session.record_combo(reward.combo.is_some());
        session.add_exp(reward.total);
        let new_titles = award_titles(&mut session);
        let message = result_message(&reward, valid.choice.category(), &mut self.rng);
        session.touch(now);
        self.store.save(&session)?;

        tracing::info!(
            session = %session.user_id,
            choice = %valid.choice,
            opi = valid.opi.value(),
            exp = reward.total,
            total_exp = session.total_exp,
            combo = session.combo_streak,
            "choice scored"
        );

        Ok(Submission::Accepted(Box::new(ResultView {
            action: valid.choice.action(),
            choice: valid.choice,
            reward,
            message,
            encouragement: tables::encouragement(session.total_exp),
            new_titles,
            total_exp: session.total_exp,
            combo_streak: session.combo_streak,
            max_combo: session.max_combo,
            titles_count: session.titles_earned.len(),
            history: session.history,
        })))
    }
}

fn reject(rejection: Rejection) -> Submission {
    tracing::warn!(code = rejection.code(), "submission rejected");
    Submission::Rejected(rejection)
}

/// Headline for a scored choice: per difficulty, replaced for outings,
/// prefixed on a combo.
pub fn result_message(reward: &Reward, category: Category, rng: &mut StdRng) -> String {
    let line = match category {
        Category::Out => OUTING_RESULT_LINE,
        Category::Stay => tables::pick(tables::result_lines(reward.difficulty), rng),
    };
    match &reward.combo {
        Some(combo) => format!("[{} complete!] {line}", combo.name),
        None => line.to_string(),
    }
}
