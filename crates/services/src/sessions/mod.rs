mod mrt;
mod unwrap;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use mrt::{MrtAnswer, MrtSession, MrtSessionService};
pub use unwrap::{UnwrapSession, UnwrapSessionService};
