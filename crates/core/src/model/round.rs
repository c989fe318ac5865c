use crate::model::ShapeAsset;

/// Answer options shown per round.
pub const OPTION_COUNT: usize = 4;

/// Wrong options shown per round.
pub const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;

/// Rounds answered before results are persisted.
pub const ROUNDS_BEFORE_SAVE: u32 = 6;

//
// ─── ROUND STATE ───────────────────────────────────────────────────────────────
//

/// A single mental-rotation question.
///
/// `target` is the displayed orientation; `correct` is the same shape at a
/// different orientation and appears exactly once in `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    shape: String,
    target: ShapeAsset,
    correct: ShapeAsset,
    distractors: [ShapeAsset; DISTRACTOR_COUNT],
    options: [ShapeAsset; OPTION_COUNT],
}

impl RoundState {
    pub(crate) fn new(
        shape: String,
        target: ShapeAsset,
        correct: ShapeAsset,
        distractors: [ShapeAsset; DISTRACTOR_COUNT],
        options: [ShapeAsset; OPTION_COUNT],
    ) -> Self {
        Self {
            shape,
            target,
            correct,
            distractors,
            options,
        }
    }

    #[must_use]
    pub fn shape(&self) -> &str {
        &self.shape
    }

    #[must_use]
    pub fn target(&self) -> &ShapeAsset {
        &self.target
    }

    #[must_use]
    pub fn correct(&self) -> &ShapeAsset {
        &self.correct
    }

    #[must_use]
    pub fn distractors(&self) -> &[ShapeAsset; DISTRACTOR_COUNT] {
        &self.distractors
    }

    #[must_use]
    pub fn options(&self) -> &[ShapeAsset; OPTION_COUNT] {
        &self.options
    }

    /// Position of the correct answer among the displayed options.
    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.options
            .iter()
            .position(|option| option == &self.correct)
            .unwrap_or(0)
    }

    /// Identity check of the option at `index` against the correct answer.
    #[must_use]
    pub fn is_correct(&self, index: usize) -> bool {
        self.options
            .get(index)
            .is_some_and(|option| option == &self.correct)
    }
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerResult {
    pub is_correct: bool,
}

/// What the timing collaborator receives for each submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerEvent {
    pub shape_name: String,
    pub chosen: ShapeAsset,
    pub is_correct: bool,
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Running score for one MRT session. Never reset mid-session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionScore {
    correct_count: u32,
    rounds_completed: u32,
}

impl SessionScore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, is_correct: bool) {
        self.rounds_completed = self.rounds_completed.saturating_add(1);
        if is_correct {
            self.correct_count = self.correct_count.saturating_add(1);
        }
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }
}
