//! Shape-unwrapping challenge: trace each shape's edges in order, watch it
//! unwrap, then assemble the snowman from traced parts.

mod machine;
mod scene;

use thiserror::Error;

pub use machine::{Guide, InputSample, UnwrapEvent, UnwrapMachine, UnwrapPhase};
pub use scene::{ShapeSpec, UnwrapConfig, UnwrapScene};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum UnwrapError {
    #[error("shape `{shape}` has no edges to trace")]
    NoEdges { shape: String },

    #[error("part move duration must be a non-negative number, got {0}")]
    InvalidDuration(f32),
}
