#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod router;
pub mod sessions;

pub use trainer_core::Clock;

pub use app_services::AppServices;
pub use config::load_config;
pub use error::{ConfigLoadError, SessionError};
pub use router::{RecordingRouter, StageRouter};
pub use sessions::{MrtAnswer, MrtSession, MrtSessionService, UnwrapSession, UnwrapSessionService};
