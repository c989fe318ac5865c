//! Trainer configuration: asset pools, session constants and the unwrap scene.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ShapeCatalog;
use crate::model::{ChosenSet, ROUNDS_BEFORE_SAVE};
use crate::mrt::{RoundError, validate_catalog};
use crate::timer::DEFAULT_COUNTDOWN_SECS;
use crate::unwrap::{UnwrapConfig, UnwrapError, UnwrapMachine, UnwrapScene};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("asset pool {set} cannot produce rounds: {source}")]
    InvalidPool { set: ChosenSet, source: RoundError },

    #[error("countdown must be a positive number of seconds, got {0}")]
    InvalidCountdown(f32),

    #[error("rounds before save must be at least 1")]
    ZeroRoundsBeforeSave,

    #[error(transparent)]
    Scene(#[from] UnwrapError),
}

/// The two asset pools sessions alternate between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPools {
    pub set0: Vec<String>,
    pub set1: Vec<String>,
}

impl AssetPools {
    #[must_use]
    pub fn names(&self, set: ChosenSet) -> &[String] {
        match set {
            ChosenSet::Set0 => &self.set0,
            ChosenSet::Set1 => &self.set1,
        }
    }
}

impl Default for AssetPools {
    fn default() -> Self {
        Self {
            set0: demo_pool("L"),
            set1: demo_pool("M"),
        }
    }
}

/// Eight shapes with three orientations each, e.g. `L01_a`, `L01_b`, `L01_c`.
fn demo_pool(prefix: &str) -> Vec<String> {
    (1..=8)
        .flat_map(|shape| {
            ["a", "b", "c"]
                .into_iter()
                .map(move |orientation| format!("{prefix}{shape:02}_{orientation}"))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub pools: AssetPools,
    pub rounds_before_save: u32,
    pub countdown_secs: f32,
    pub unwrap: UnwrapConfig,
    pub scene: UnwrapScene,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            pools: AssetPools::default(),
            rounds_before_save: ROUNDS_BEFORE_SAVE,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            unwrap: UnwrapConfig::default(),
            scene: UnwrapScene::default(),
        }
    }
}

impl TrainerConfig {
    /// Catalog built from the pool for `set`.
    #[must_use]
    pub fn catalog(&self, set: ChosenSet) -> ShapeCatalog {
        ShapeCatalog::from_names(self.pools.names(set))
    }

    /// Check every value a session depends on before it starts.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.countdown_secs.is_nan() || self.countdown_secs <= 0.0 {
            return Err(ConfigError::InvalidCountdown(self.countdown_secs));
        }
        if self.rounds_before_save == 0 {
            return Err(ConfigError::ZeroRoundsBeforeSave);
        }
        for set in [ChosenSet::Set0, ChosenSet::Set1] {
            validate_catalog(&self.catalog(set))
                .map_err(|source| ConfigError::InvalidPool { set, source })?;
        }
        UnwrapMachine::new(self.scene.clone(), self.unwrap.clone())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TrainerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.catalog(ChosenSet::Set0).len(), 8);
        assert_eq!(config.catalog(ChosenSet::Set1).asset_count(), 24);
        assert!(config.pools.set0.contains(&"L03_b".to_string()));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{ "countdown_secs": 90.0, "unwrap": { "move_duration": 1.0 } }"#;
        let config: TrainerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.countdown_secs, 90.0);
        assert_eq!(config.unwrap.move_duration, 1.0);
        assert_eq!(config.unwrap.activation_threshold, 0.1);
        assert_eq!(config.rounds_before_save, ROUNDS_BEFORE_SAVE);
        assert_eq!(config.pools, AssetPools::default());
    }

    #[test]
    fn pool_with_too_few_shapes_is_rejected() {
        let mut config = TrainerConfig::default();
        config.pools.set1 = vec!["A_1".into(), "A_2".into(), "B_1".into(), "B_2".into()];
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidPool {
                set: ChosenSet::Set1,
                source: RoundError::TooFewShapes {
                    required: 4,
                    found: 2
                },
            })
        );
    }

    #[test]
    fn bad_scalars_are_rejected() {
        let mut config = TrainerConfig::default();
        config.countdown_secs = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidCountdown(0.0)));

        let mut config = TrainerConfig::default();
        config.rounds_before_save = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroRoundsBeforeSave));

        let mut config = TrainerConfig::default();
        config.unwrap.move_duration = -1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Scene(UnwrapError::InvalidDuration(-1.0)))
        );
    }
}
