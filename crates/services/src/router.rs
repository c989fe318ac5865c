use std::sync::Mutex;

use log::info;
use trainer_core::model::Stage;

/// Receives stage transitions requested by sessions.
pub trait StageRouter: Send + Sync {
    fn request(&self, stage: Stage);
}

/// Router that only remembers what was requested.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    requested: Mutex<Vec<Stage>>,
}

impl RecordingRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn requested(&self) -> Vec<Stage> {
        self.requested
            .lock()
            .map(|stages| stages.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn last(&self) -> Option<Stage> {
        self.requested().last().copied()
    }
}

impl StageRouter for RecordingRouter {
    fn request(&self, stage: Stage) {
        info!("stage requested: {stage:?} -> {stage}");
        if let Ok(mut stages) = self.requested.lock() {
            stages.push(stage);
        }
    }
}
