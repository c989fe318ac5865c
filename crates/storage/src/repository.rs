use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use trainer_core::Clock;
use trainer_core::model::{ChosenSet, ShapeLogEntry, Stage};

use crate::results_file::CsvResultsRepository;

/// Errors surfaced by results backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),
}

/// Completed sessions after which the results are archived.
pub const SESSIONS_PER_ARCHIVE: u32 = 2;

/// Everything one MRT session writes.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResults {
    pub correct_count: u32,
    pub chosen_set: ChosenSet,
    pub log: Vec<ShapeLogEntry>,
}

/// What a write did and where the participant goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Sessions now recorded in the current results, this one included.
    pub sessions_recorded: u32,
    /// Location of the archived results, for backends that archive to disk.
    pub archived_as: Option<PathBuf>,
    pub next_stage: Stage,
}

/// Session count after writing on top of a stored count.
///
/// Only a record of exactly one prior session is continued; anything else
/// belongs to a new participant and starts over.
#[must_use]
pub fn sessions_after_write(prior_sessions: Option<i64>) -> u32 {
    if prior_sessions == Some(1) { 2 } else { 1 }
}

#[must_use]
pub fn stage_after_write(sessions_recorded: u32) -> Stage {
    if sessions_recorded >= SESSIONS_PER_ARCHIVE {
        Stage::Final
    } else {
        Stage::Intermediate
    }
}

/// Persistence contract for MRT session results.
#[async_trait]
pub trait ResultsRepository: Send + Sync {
    /// Set index recorded by the last session, if any was recorded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if existing results cannot be read.
    async fn read_prior_set(&self) -> Result<Option<i64>, StorageError>;

    /// Record one session, archiving once enough sessions are stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the results cannot be written or archived.
    async fn write_results(&self, results: &SessionResults) -> Result<WriteOutcome, StorageError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    sessions: Option<i64>,
    prior_set: Option<i64>,
    current: Vec<SessionResults>,
    archived: Vec<Vec<SessionResults>>,
}

/// In-memory results backend for tests and dry runs.
#[derive(Clone, Default)]
pub struct InMemoryResultsRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryResultsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions written since the last archive.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn current(&self) -> Result<Vec<SessionResults>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.current.clone())
    }

    /// Archived batches, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn archived(&self) -> Result<Vec<Vec<SessionResults>>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.archived.clone())
    }
}

#[async_trait]
impl ResultsRepository for InMemoryResultsRepository {
    async fn read_prior_set(&self) -> Result<Option<i64>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.prior_set)
    }

    async fn write_results(&self, results: &SessionResults) -> Result<WriteOutcome, StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let sessions = sessions_after_write(guard.sessions);
        if sessions == 1 {
            guard.current.clear();
        }
        guard.current.push(results.clone());
        guard.sessions = Some(i64::from(sessions));
        guard.prior_set = Some(i64::from(results.chosen_set.index()));

        if sessions >= SESSIONS_PER_ARCHIVE {
            let batch = std::mem::take(&mut guard.current);
            guard.archived.push(batch);
            guard.sessions = None;
            guard.prior_set = None;
        }

        Ok(WriteOutcome {
            sessions_recorded: sessions,
            archived_as: None,
            next_stage: stage_after_write(sessions),
        })
    }
}

/// Aggregates the results backend behind a trait object.
#[derive(Clone)]
pub struct Storage {
    pub results: Arc<dyn ResultsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            results: Arc::new(InMemoryResultsRepository::new()),
        }
    }

    /// Results stored as `TestTimes.csv` under `dir`.
    #[must_use]
    pub fn results_file(dir: impl AsRef<Path>, clock: Clock) -> Self {
        Self {
            results: Arc::new(CsvResultsRepository::new(dir.as_ref()).with_clock(clock)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainer_core::model::ShapeAsset;

    fn results(correct_count: u32, chosen_set: ChosenSet) -> SessionResults {
        SessionResults {
            correct_count,
            chosen_set,
            log: vec![ShapeLogEntry {
                shape_name: "L01".into(),
                seconds: 2.5,
                is_correct: true,
                chosen: ShapeAsset::new("L01_b"),
            }],
        }
    }

    #[test]
    fn only_a_single_prior_session_is_continued() {
        assert_eq!(sessions_after_write(None), 1);
        assert_eq!(sessions_after_write(Some(0)), 1);
        assert_eq!(sessions_after_write(Some(1)), 2);
        assert_eq!(sessions_after_write(Some(2)), 1);
        assert_eq!(stage_after_write(1), Stage::Intermediate);
        assert_eq!(stage_after_write(2), Stage::Final);
    }

    #[tokio::test]
    async fn in_memory_archives_after_two_sessions() {
        let repo = InMemoryResultsRepository::new();
        assert_eq!(repo.read_prior_set().await.unwrap(), None);

        let first = repo.write_results(&results(4, ChosenSet::Set1)).await.unwrap();
        assert_eq!(first.sessions_recorded, 1);
        assert_eq!(first.next_stage, Stage::Intermediate);
        assert_eq!(repo.read_prior_set().await.unwrap(), Some(1));

        let second = repo.write_results(&results(5, ChosenSet::Set0)).await.unwrap();
        assert_eq!(second.sessions_recorded, 2);
        assert_eq!(second.next_stage, Stage::Final);
        assert_eq!(repo.read_prior_set().await.unwrap(), None);

        let archived = repo.archived().unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].len(), 2);
        assert!(repo.current().unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_in_memory_uses_trait_object() {
        let storage = Storage::in_memory();
        let outcome = storage
            .results
            .write_results(&results(1, ChosenSet::Set0))
            .await
            .unwrap();
        assert_eq!(outcome.archived_as, None);
        assert_eq!(storage.results.read_prior_set().await.unwrap(), Some(0));
    }
}
