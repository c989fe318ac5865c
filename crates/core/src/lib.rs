#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod geometry;
pub mod media;
pub mod model;
pub mod mrt;
pub mod sequencer;
pub mod shuffle;
pub mod time;
pub mod timer;
pub mod trigger;
pub mod unwrap;

pub use glam::{Quat, Vec3};
pub use time::Clock;
