use std::path::Path;
use std::sync::Arc;

use storage::repository::Storage;
use trainer_core::config::TrainerConfig;

use crate::Clock;
use crate::router::StageRouter;
use crate::sessions::{MrtSessionService, UnwrapSessionService};

/// Assembles the session services around one storage backend and router.
#[derive(Clone)]
pub struct AppServices {
    config: Arc<TrainerConfig>,
    mrt: Arc<MrtSessionService>,
    unwrap: Arc<UnwrapSessionService>,
}

impl AppServices {
    #[must_use]
    pub fn new(
        config: TrainerConfig,
        storage: &Storage,
        router: Arc<dyn StageRouter>,
        seed: Option<u64>,
    ) -> Self {
        let config = Arc::new(config);
        let mrt = Arc::new(
            MrtSessionService::new(
                Arc::clone(&config),
                Arc::clone(&storage.results),
                Arc::clone(&router),
            )
            .with_seed(seed),
        );
        let unwrap = Arc::new(UnwrapSessionService::new(Arc::clone(&config), router));
        Self {
            config,
            mrt,
            unwrap,
        }
    }

    /// Build services that keep results as `TestTimes.csv` under `data_dir`.
    #[must_use]
    pub fn with_results_file(
        config: TrainerConfig,
        data_dir: &Path,
        clock: Clock,
        router: Arc<dyn StageRouter>,
        seed: Option<u64>,
    ) -> Self {
        Self::new(config, &Storage::results_file(data_dir, clock), router, seed)
    }

    #[must_use]
    pub fn config(&self) -> Arc<TrainerConfig> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn mrt_sessions(&self) -> Arc<MrtSessionService> {
        Arc::clone(&self.mrt)
    }

    #[must_use]
    pub fn unwrap_sessions(&self) -> Arc<UnwrapSessionService> {
        Arc::clone(&self.unwrap)
    }
}
