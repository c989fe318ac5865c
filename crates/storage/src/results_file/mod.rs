//! Results stored as a `TestTimes.csv` file in a data directory.

use async_trait::async_trait;
use log::info;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use trainer_core::Clock;

use crate::repository::{
    ResultsRepository, SESSIONS_PER_ARCHIVE, SessionResults, StorageError, WriteOutcome,
    sessions_after_write, stage_after_write,
};

mod format;

pub use format::{
    CORRECT_ANSWERS_KEY, HEADER, RESULTS_FILE_NAME, ROUNDS_COMPLETED_KEY, SET_COMPLETED_KEY,
    archive_file_name, format_session, last_record,
};

#[derive(Debug, Clone)]
pub struct CsvResultsRepository {
    dir: PathBuf,
    clock: Clock,
}

impl CsvResultsRepository {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            clock: Clock::default(),
        }
    }

    /// Clock used to stamp archived files.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn results_path(&self) -> PathBuf {
        self.dir.join(RESULTS_FILE_NAME)
    }

    async fn read_contents(&self) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.results_path()).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ResultsRepository for CsvResultsRepository {
    async fn read_prior_set(&self) -> Result<Option<i64>, StorageError> {
        let contents = self.read_contents().await?;
        Ok(contents.and_then(|c| last_record(&c, SET_COMPLETED_KEY)))
    }

    async fn write_results(&self, results: &SessionResults) -> Result<WriteOutcome, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.results_path();

        let prior = self
            .read_contents()
            .await?
            .and_then(|c| last_record(&c, ROUNDS_COMPLETED_KEY));
        let sessions = sessions_after_write(prior);
        let append = sessions > 1;
        let block = format_session(results, sessions, !append);

        if append {
            let mut file = tokio::fs::OpenOptions::new()
                .append(true)
                .open(&path)
                .await?;
            file.write_all(block.as_bytes()).await?;
            file.flush().await?;
        } else {
            tokio::fs::write(&path, block).await?;
        }
        info!("results saved at {}", path.display());

        let archived_as = if sessions >= SESSIONS_PER_ARCHIVE {
            let archived = self.dir.join(archive_file_name(&self.clock.archive_stamp()));
            tokio::fs::rename(&path, &archived).await?;
            info!("results archived as {}", archived.display());
            Some(archived)
        } else {
            None
        };

        Ok(WriteOutcome {
            sessions_recorded: sessions,
            archived_as,
            next_stage: stage_after_write(sessions),
        })
    }
}
