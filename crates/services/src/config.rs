use std::path::Path;

use log::info;
use trainer_core::config::TrainerConfig;

use crate::error::ConfigLoadError;

/// Load and validate the trainer configuration.
///
/// Without a path the built-in defaults are used. Fields missing from the
/// file fall back to their defaults.
///
/// # Errors
///
/// Returns `ConfigLoadError` if the file cannot be read, is not valid JSON,
/// or describes a configuration sessions cannot run with.
pub fn load_config(path: Option<&Path>) -> Result<TrainerConfig, ConfigLoadError> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            info!("loaded config from {}", path.display());
            serde_json::from_str(&raw)?
        }
        None => TrainerConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config, TrainerConfig::default());
    }

    #[test]
    fn file_overrides_and_validation() {
        let dir = std::env::temp_dir().join(format!("trainer-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let good = dir.join("good.json");
        std::fs::write(&good, r#"{ "countdown_secs": 60.0, "rounds_before_save": 3 }"#).unwrap();
        let config = load_config(Some(good.as_path())).unwrap();
        assert_eq!(config.countdown_secs, 60.0);
        assert_eq!(config.rounds_before_save, 3);

        let invalid = dir.join("invalid.json");
        std::fs::write(&invalid, r#"{ "rounds_before_save": 0 }"#).unwrap();
        assert!(matches!(
            load_config(Some(invalid.as_path())),
            Err(ConfigLoadError::Invalid(_))
        ));

        let garbled = dir.join("garbled.json");
        std::fs::write(&garbled, "{ not json").unwrap();
        assert!(matches!(
            load_config(Some(garbled.as_path())),
            Err(ConfigLoadError::Parse(_))
        ));

        assert!(matches!(
            load_config(Some(dir.join("missing.json").as_path())),
            Err(ConfigLoadError::Read { .. })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
