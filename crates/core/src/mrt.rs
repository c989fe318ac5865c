//! Mental rotation test round engine.
//!
//! Each round shows one orientation of a shape and asks the participant to
//! find the same shape at a different orientation among four options.

use log::debug;
use rand::Rng;
use thiserror::Error;

use crate::catalog::ShapeCatalog;
use crate::model::{
    AnswerEvent, AnswerResult, DISTRACTOR_COUNT, OPTION_COUNT, ROUNDS_BEFORE_SAVE, RoundState,
    SessionScore, ShapeAsset,
};
use crate::sequencer::PuzzleSequencer;
use crate::shuffle::{fisher_yates, pick};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoundError {
    #[error("at least {required} shapes are needed to build a round, found {found}")]
    TooFewShapes { required: usize, found: usize },

    #[error("shape `{shape}` needs at least 2 distinct orientations, found {found}")]
    SingleVariant { shape: String, found: usize },

    #[error("shape `{0}` is not in the catalog")]
    UnknownShape(String),

    #[error("no round is active")]
    NoActiveRound,

    #[error("option index {index} is out of range (expected 0..{OPTION_COUNT})")]
    OptionOutOfRange { index: usize },
}

/// Check that every round the catalog can produce is well formed.
///
/// # Errors
///
/// Returns `RoundError::TooFewShapes` with fewer than four groups and
/// `RoundError::SingleVariant` for a group without two distinct orientations.
pub fn validate_catalog(catalog: &ShapeCatalog) -> Result<(), RoundError> {
    if catalog.len() < OPTION_COUNT {
        return Err(RoundError::TooFewShapes {
            required: OPTION_COUNT,
            found: catalog.len(),
        });
    }
    for group in catalog.groups() {
        let found = group.distinct_variants();
        if found < 2 {
            return Err(RoundError::SingleVariant {
                shape: group.name().to_owned(),
                found,
            });
        }
    }
    Ok(())
}

/// Build one round for `shape`.
///
/// # Errors
///
/// Fails fast on the same preconditions as [`validate_catalog`].
pub fn build_round<R: Rng + ?Sized>(
    catalog: &ShapeCatalog,
    shape: &str,
    rng: &mut R,
) -> Result<RoundState, RoundError> {
    let group = catalog
        .get(shape)
        .ok_or_else(|| RoundError::UnknownShape(shape.to_owned()))?;
    let single_variant = || RoundError::SingleVariant {
        shape: shape.to_owned(),
        found: group.distinct_variants(),
    };

    let target = pick(group.variants(), rng).cloned().ok_or_else(single_variant)?;

    // Uniform over the other orientations; equivalent to re-sampling until the
    // identity differs, but always terminates.
    let others: Vec<&ShapeAsset> = group.variants().iter().filter(|v| **v != target).collect();
    let correct = pick(&others, rng)
        .map(|v| (*v).clone())
        .ok_or_else(single_variant)?;

    let mut other_shapes: Vec<String> = catalog
        .names()
        .into_iter()
        .filter(|name| name != shape)
        .collect();
    if other_shapes.len() < DISTRACTOR_COUNT {
        return Err(RoundError::TooFewShapes {
            required: OPTION_COUNT,
            found: catalog.len(),
        });
    }
    fisher_yates(&mut other_shapes, rng);

    let mut distractors = Vec::with_capacity(DISTRACTOR_COUNT);
    for name in other_shapes.iter().take(DISTRACTOR_COUNT) {
        let wrong = catalog
            .get(name)
            .and_then(|g| pick(g.variants(), rng))
            .cloned()
            .ok_or_else(|| RoundError::UnknownShape(name.clone()))?;
        distractors.push(wrong);
    }
    let [d0, d1, d2]: [ShapeAsset; DISTRACTOR_COUNT] =
        distractors
            .try_into()
            .map_err(|_| RoundError::TooFewShapes {
                required: OPTION_COUNT,
                found: catalog.len(),
            })?;

    let mut options = [correct.clone(), d0.clone(), d1.clone(), d2.clone()];
    fisher_yates(&mut options, rng);

    Ok(RoundState::new(
        shape.to_owned(),
        target,
        correct,
        [d0, d1, d2],
        options,
    ))
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    AwaitingRound,
    RoundActive,
    Exhausted,
}

#[derive(Debug, Clone)]
enum EngineState {
    AwaitingRound,
    RoundActive(RoundState),
    Exhausted,
}

/// Everything a single answer produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub result: AnswerResult,
    /// Forward to the timing collaborator.
    pub event: AnswerEvent,
    /// Correct count to persist. Present exactly once per session, on the
    /// answer that reaches the save threshold. The engine then waits in
    /// `AwaitingRound` until the caller has saved and calls `start_round`.
    pub save_due: Option<u32>,
    /// True when no further round could be started. Always false alongside
    /// `save_due`.
    pub exhausted: bool,
}

/// Owns the score, the shape queue and the active round for one session.
pub struct MrtEngine<R> {
    catalog: ShapeCatalog,
    sequencer: PuzzleSequencer,
    rng: R,
    state: EngineState,
    score: SessionScore,
    rounds_before_save: u32,
    save_triggered: bool,
}

impl<R: Rng> MrtEngine<R> {
    /// Validate the catalog and shuffle the shape queue.
    ///
    /// No round is active until [`MrtEngine::start_round`] is called.
    ///
    /// # Errors
    ///
    /// Returns `RoundError` if the catalog cannot produce valid rounds.
    pub fn new(catalog: ShapeCatalog, mut rng: R) -> Result<Self, RoundError> {
        validate_catalog(&catalog)?;
        let sequencer = PuzzleSequencer::initialize(&catalog, &mut rng);
        Ok(Self {
            catalog,
            sequencer,
            rng,
            state: EngineState::AwaitingRound,
            score: SessionScore::new(),
            rounds_before_save: ROUNDS_BEFORE_SAVE,
            save_triggered: false,
        })
    }

    #[must_use]
    pub fn with_rounds_before_save(mut self, rounds: u32) -> Self {
        self.rounds_before_save = rounds;
        self
    }

    /// Present the next shape.
    ///
    /// Returns the already active round if one exists, and `None` once the
    /// queue is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `RoundError` if the round cannot be built from the catalog.
    pub fn start_round(&mut self) -> Result<Option<&RoundState>, RoundError> {
        if matches!(self.state, EngineState::AwaitingRound) {
            match self.sequencer.next() {
                Some(shape) => {
                    let round = build_round(&self.catalog, &shape, &mut self.rng)?;
                    debug!(
                        "round for `{}`: target {}, correct {}",
                        round.shape(),
                        round.target(),
                        round.correct()
                    );
                    self.state = EngineState::RoundActive(round);
                }
                None => {
                    debug!("all shapes completed");
                    self.state = EngineState::Exhausted;
                }
            }
        }
        Ok(self.current_round())
    }

    /// Check the option at `index`, record the score and move to the next round.
    ///
    /// The answer that makes a save due leaves the next round unstarted.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::NoActiveRound` without an active round and
    /// `RoundError::OptionOutOfRange` for an index outside `0..4`; neither
    /// changes the score.
    pub fn submit_answer(&mut self, index: usize) -> Result<AnswerOutcome, RoundError> {
        let EngineState::RoundActive(round) = &self.state else {
            return Err(RoundError::NoActiveRound);
        };
        let chosen = round
            .options()
            .get(index)
            .cloned()
            .ok_or(RoundError::OptionOutOfRange { index })?;
        let is_correct = round.is_correct(index);
        let event = AnswerEvent {
            shape_name: round.shape().to_owned(),
            chosen,
            is_correct,
        };

        self.score.record(is_correct);
        let save_due = if !self.save_triggered
            && self.score.rounds_completed() >= self.rounds_before_save
        {
            self.save_triggered = true;
            Some(self.score.correct_count())
        } else {
            None
        };

        self.state = EngineState::AwaitingRound;
        if save_due.is_none() {
            self.start_round()?;
        }

        Ok(AnswerOutcome {
            result: AnswerResult { is_correct },
            event,
            save_due,
            exhausted: self.is_exhausted(),
        })
    }

    /// Cancel the active round after the session clock expires.
    ///
    /// Returns the correct count to persist if the session has not been
    /// saved yet.
    pub fn interrupt(&mut self) -> Option<u32> {
        if matches!(self.state, EngineState::RoundActive(_)) {
            self.state = EngineState::AwaitingRound;
        }
        if self.save_triggered {
            return None;
        }
        self.save_triggered = true;
        Some(self.score.correct_count())
    }

    #[must_use]
    pub fn current_round(&self) -> Option<&RoundState> {
        match &self.state {
            EngineState::RoundActive(round) => Some(round),
            _ => None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> EnginePhase {
        match self.state {
            EngineState::AwaitingRound => EnginePhase::AwaitingRound,
            EngineState::RoundActive(_) => EnginePhase::RoundActive,
            EngineState::Exhausted => EnginePhase::Exhausted,
        }
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, EngineState::Exhausted)
    }

    #[must_use]
    pub fn score(&self) -> SessionScore {
        self.score
    }

    #[must_use]
    pub fn save_triggered(&self) -> bool {
        self.save_triggered
    }

    #[must_use]
    pub fn catalog(&self) -> &ShapeCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn remaining_shapes(&self) -> usize {
        self.sequencer.remaining()
    }
}

impl<R> std::fmt::Debug for MrtEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MrtEngine")
            .field("shapes", &self.catalog.len())
            .field("remaining", &self.sequencer.remaining())
            .field("state", &self.state)
            .field("score", &self.score)
            .field("save_triggered", &self.save_triggered)
            .finish_non_exhaustive()
    }
}
