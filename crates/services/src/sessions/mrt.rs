use std::sync::Arc;

use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::repository::{ResultsRepository, SessionResults, WriteOutcome};
use trainer_core::config::TrainerConfig;
use trainer_core::model::{ChosenSet, RoundState, ShapeLogEntry};
use trainer_core::mrt::{AnswerOutcome, MrtEngine};
use trainer_core::timer::SessionTimer;

use crate::error::SessionError;
use crate::router::StageRouter;

/// One participant's MRT session: engine, countdown and answer log.
#[derive(Debug)]
pub struct MrtSession {
    engine: MrtEngine<StdRng>,
    timer: SessionTimer,
    chosen_set: ChosenSet,
    log: Vec<ShapeLogEntry>,
    /// Correct count still waiting for a successful write.
    pending_save: Option<u32>,
    saved: Option<WriteOutcome>,
}

impl MrtSession {
    #[must_use]
    pub fn engine(&self) -> &MrtEngine<StdRng> {
        &self.engine
    }

    #[must_use]
    pub fn current_round(&self) -> Option<&RoundState> {
        self.engine.current_round()
    }

    #[must_use]
    pub fn chosen_set(&self) -> ChosenSet {
        self.chosen_set
    }

    #[must_use]
    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    #[must_use]
    pub fn log(&self) -> &[ShapeLogEntry] {
        &self.log
    }

    /// Outcome of the results write, once it happened.
    #[must_use]
    pub fn saved(&self) -> Option<&WriteOutcome> {
        self.saved.as_ref()
    }

    /// Correct count of a save that was due but has not been written yet.
    #[must_use]
    pub fn pending_save(&self) -> Option<u32> {
        self.pending_save
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.saved.is_some()
    }
}

/// Result of answering a single round.
#[derive(Debug, Clone, PartialEq)]
pub struct MrtAnswer {
    pub outcome: AnswerOutcome,
    pub entry: ShapeLogEntry,
    /// Present on the answer that wrote the session results.
    pub saved: Option<WriteOutcome>,
}

/// Orchestrates MRT session start, timed answering and results persistence.
#[derive(Clone)]
pub struct MrtSessionService {
    config: Arc<TrainerConfig>,
    results: Arc<dyn ResultsRepository>,
    router: Arc<dyn StageRouter>,
    seed: Option<u64>,
}

impl MrtSessionService {
    #[must_use]
    pub fn new(
        config: Arc<TrainerConfig>,
        results: Arc<dyn ResultsRepository>,
        router: Arc<dyn StageRouter>,
    ) -> Self {
        Self {
            config,
            results,
            router,
            seed: None,
        }
    }

    /// Seed every random choice the sessions make.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Choose the asset pool from the previous session and present the first round.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if prior results cannot be read or the pool
    /// cannot produce rounds.
    pub async fn start_session(&self) -> Result<MrtSession, SessionError> {
        let prior = self.results.read_prior_set().await?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let chosen_set = ChosenSet::from_prior(prior, &mut rng);
        info!("previous set {prior:?}, chosen set {chosen_set}");

        let mut engine = MrtEngine::new(self.config.catalog(chosen_set), rng)?
            .with_rounds_before_save(self.config.rounds_before_save);
        engine.start_round()?;

        Ok(MrtSession {
            engine,
            timer: SessionTimer::new(self.config.countdown_secs),
            chosen_set,
            log: Vec::new(),
            pending_save: None,
            saved: None,
        })
    }

    /// Answer the active round, log its time and save when due.
    ///
    /// A save that failed earlier is retried with this answer. The next round
    /// is presented only after the save attempt, and not at all once saved.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` once results are saved, `SessionError::Round`
    /// for an invalid answer and `SessionError::Storage` if the save fails.
    pub async fn answer(
        &self,
        session: &mut MrtSession,
        option_index: usize,
    ) -> Result<MrtAnswer, SessionError> {
        if session.is_complete() {
            return Err(SessionError::Completed);
        }
        let outcome = session.engine.submit_answer(option_index)?;
        let entry = session.timer.log_shape_time(&outcome.event);
        session.log.push(entry.clone());

        let due = match outcome.save_due {
            Some(correct) => Some(correct),
            None if outcome.exhausted => {
                warn!("shapes ran out before the save threshold; saving early");
                session.engine.interrupt()
            }
            None => None,
        };
        if due.is_some() {
            session.pending_save = due;
        }

        let saved = self.flush(session).await;
        if !session.is_complete() {
            session.engine.start_round()?;
        }

        Ok(MrtAnswer {
            outcome,
            entry,
            saved: saved?,
        })
    }

    /// Advance the countdown; on expiry the session is saved with its current score.
    ///
    /// Once the countdown has run out, every tick retries a save that has not
    /// been written yet.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the forced save fails.
    pub async fn tick(
        &self,
        session: &mut MrtSession,
        dt: f32,
    ) -> Result<Option<WriteOutcome>, SessionError> {
        if session.timer.tick(dt) {
            info!("MRT time expired");
            if let Some(correct) = session.engine.interrupt() {
                session.pending_save = Some(correct);
            }
        }
        if !session.timer.is_expired() {
            return Ok(None);
        }
        self.flush(session).await
    }

    /// Write the pending save, if any. The pending count survives a failed write.
    async fn flush(&self, session: &mut MrtSession) -> Result<Option<WriteOutcome>, SessionError> {
        let Some(correct_count) = session.pending_save else {
            return Ok(None);
        };
        let results = SessionResults {
            correct_count,
            chosen_set: session.chosen_set,
            log: session.log.clone(),
        };
        let outcome = match self.results.write_results(&results).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("saving {correct_count} correct answers failed, will retry: {err}");
                return Err(err.into());
            }
        };
        info!(
            "saved {correct_count} correct answers, {} session(s) recorded",
            outcome.sessions_recorded
        );
        self.router.request(outcome.next_stage);
        session.pending_save = None;
        session.saved = Some(outcome.clone());
        Ok(Some(outcome))
    }
}
