use crate::model::Stage;

/// Collider tag carried by the participant's body.
pub const PLAYER_TAG: &str = "Player";

/// Scene volumes that react when the participant walks into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityTrigger {
    /// Shows the edge guides again during the final challenge.
    GuideZone,
    /// Starts the mental rotation test from the lobby.
    StartButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    RevealGuide,
    RequestStage(Stage),
}

impl ProximityTrigger {
    /// Action for a collider with `tag` entering the volume, if any.
    #[must_use]
    pub fn on_enter(self, tag: &str) -> Option<TriggerAction> {
        if tag != PLAYER_TAG {
            return None;
        }
        Some(match self {
            ProximityTrigger::GuideZone => TriggerAction::RevealGuide,
            ProximityTrigger::StartButton => TriggerAction::RequestStage(Stage::StartMrt),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_player_activates_triggers() {
        assert_eq!(ProximityTrigger::GuideZone.on_enter("Hand"), None);
        assert_eq!(
            ProximityTrigger::GuideZone.on_enter(PLAYER_TAG),
            Some(TriggerAction::RevealGuide)
        );
        assert_eq!(
            ProximityTrigger::StartButton.on_enter(PLAYER_TAG),
            Some(TriggerAction::RequestStage(Stage::StartMrt))
        );
    }
}
