use std::fmt;

/// Named stage transitions requested by the session engines.
///
/// The scene layer treats these as opaque triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// First MRT session saved; continue to the unwrap challenge.
    Intermediate,
    /// Second MRT session saved; the participant is finished.
    Final,
    /// Begin (or return to) the mental rotation test.
    StartMrt,
}

impl Stage {
    #[must_use]
    pub fn scene_name(self) -> &'static str {
        match self {
            Stage::Intermediate => "UnwrapScene",
            Stage::Final => "EndScene",
            Stage::StartMrt => "MRTScene",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scene_name())
    }
}
