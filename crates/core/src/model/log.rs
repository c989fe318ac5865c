use crate::model::ShapeAsset;

/// One timed MRT answer as written to the results file.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeLogEntry {
    pub shape_name: String,
    pub seconds: f32,
    pub is_correct: bool,
    pub chosen: ShapeAsset,
}

impl ShapeLogEntry {
    #[must_use]
    pub fn correctness_label(&self) -> &'static str {
        if self.is_correct { "Correct" } else { "Incorrect" }
    }
}
