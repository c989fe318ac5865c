mod chosen_set;
mod log;
mod progress;
mod round;
mod shape;
mod stage;

pub use chosen_set::ChosenSet;
pub use log::ShapeLogEntry;
pub use progress::{EdgeProgress, SnowmanProgress};
pub use round::{
    AnswerEvent, AnswerResult, DISTRACTOR_COUNT, OPTION_COUNT, ROUNDS_BEFORE_SAVE, RoundState,
    SessionScore,
};
pub use shape::{SHAPE_NAME_SEPARATOR, ShapeAsset, ShapeGroup};
pub use stage::Stage;
