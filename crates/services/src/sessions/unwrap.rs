use std::sync::Arc;

use log::info;
use trainer_core::Vec3;
use trainer_core::config::TrainerConfig;
use trainer_core::media::MediaPlayer;
use trainer_core::model::Stage;
use trainer_core::timer::SessionTimer;
use trainer_core::trigger::{ProximityTrigger, TriggerAction};
use trainer_core::unwrap::{InputSample, UnwrapEvent, UnwrapMachine};

use crate::error::SessionError;
use crate::router::StageRouter;

/// One run of the unwrap challenge with its countdown.
#[derive(Debug)]
pub struct UnwrapSession {
    machine: UnwrapMachine,
    timer: SessionTimer,
    routed: Option<Stage>,
}

impl UnwrapSession {
    #[must_use]
    pub fn machine(&self) -> &UnwrapMachine {
        &self.machine
    }

    #[must_use]
    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    /// Stage this session handed to the router, if any.
    #[must_use]
    pub fn routed(&self) -> Option<Stage> {
        self.routed
    }

    /// Full-pressure input aimed from `origin` at the centre of the edge to
    /// trace next. Idle while no edge is waiting.
    #[must_use]
    pub fn aim_at_next_edge(&self, origin: Vec3) -> InputSample {
        self.machine
            .current_edge_bounds()
            .map_or_else(InputSample::idle, |edge| {
                InputSample::aimed_at(origin, edge.center())
            })
    }

    /// Forward an external grab or physics move of the active shape.
    pub fn move_active_shape(&mut self, position: Vec3) -> bool {
        self.machine.move_active_shape(position)
    }

    pub fn teleport_shape_back(&mut self) -> bool {
        self.machine.teleport_shape_back()
    }
}

/// Drives unwrap sessions and forwards their stage requests.
#[derive(Clone)]
pub struct UnwrapSessionService {
    config: Arc<TrainerConfig>,
    router: Arc<dyn StageRouter>,
}

impl UnwrapSessionService {
    #[must_use]
    pub fn new(config: Arc<TrainerConfig>, router: Arc<dyn StageRouter>) -> Self {
        Self { config, router }
    }

    /// Build the machine from the configured scene and spawn the first shape.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Unwrap` if the scene is unusable.
    pub fn start_session(
        &self,
        media: &mut dyn MediaPlayer,
    ) -> Result<(UnwrapSession, Vec<UnwrapEvent>), SessionError> {
        let mut machine = UnwrapMachine::new(self.config.scene.clone(), self.config.unwrap.clone())?;
        let events = machine.start(media);
        let session = UnwrapSession {
            machine,
            timer: SessionTimer::new(self.config.countdown_secs),
            routed: None,
        };
        Ok((session, events))
    }

    /// Advance the countdown and the machine by one frame.
    pub fn tick(
        &self,
        session: &mut UnwrapSession,
        dt: f32,
        input: &InputSample,
        player: Vec3,
        media: &mut dyn MediaPlayer,
    ) -> Vec<UnwrapEvent> {
        if session.timer.tick(dt) {
            info!("unwrap time expired");
            self.route(session, Stage::StartMrt);
        }
        let events = session.machine.tick(dt, input, player, media);
        for event in &events {
            if let UnwrapEvent::StageRequested(stage) = event {
                self.route(session, *stage);
            }
        }
        events
    }

    /// React to a collider tagged `tag` entering `trigger`.
    pub fn on_trigger_enter(
        &self,
        session: &mut UnwrapSession,
        trigger: ProximityTrigger,
        tag: &str,
    ) -> Option<TriggerAction> {
        let action = trigger.on_enter(tag)?;
        match action {
            TriggerAction::RevealGuide => session.machine.set_hide_guide(false),
            TriggerAction::RequestStage(stage) => self.route(session, stage),
        }
        Some(action)
    }

    fn route(&self, session: &mut UnwrapSession, stage: Stage) {
        if session.routed.is_some() {
            return;
        }
        session.routed = Some(stage);
        self.router.request(stage);
    }
}
