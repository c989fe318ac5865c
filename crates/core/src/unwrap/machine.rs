use glam::{Quat, Vec3};
use log::{debug, info, warn};

use super::UnwrapError;
use super::scene::{ShapeSpec, UnwrapConfig, UnwrapScene};
use crate::geometry::{Aabb, Ray, face_horizontally, raycast};
use crate::media::MediaPlayer;
use crate::model::{EdgeProgress, SnowmanProgress, Stage};

//
// ─── INPUT / OUTPUT ────────────────────────────────────────────────────────────
//

/// Controller state sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample {
    /// Trigger pressure in `[0, 1]`.
    pub trigger: f32,
    pub origin: Vec3,
    pub direction: Vec3,
}

impl InputSample {
    #[must_use]
    pub fn idle() -> Self {
        Self {
            trigger: 0.0,
            origin: Vec3::ZERO,
            direction: Vec3::Z,
        }
    }

    /// Full trigger pressure with the controller aimed from `origin` at `target`.
    #[must_use]
    pub fn aimed_at(origin: Vec3, target: Vec3) -> Self {
        Self {
            trigger: 1.0,
            origin,
            direction: target - origin,
        }
    }
}

/// Observable effects of a tick, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum UnwrapEvent {
    ShapeSpawned { name: String },
    EdgeLit { shape: String, edge: usize },
    ShapeRemoved { name: String },
    UnwrapClipStarted { clip: String },
    /// All standard shapes done; guides are hidden and the guide podium appears.
    FinalChallengeStarted,
    PartArrived { name: String },
    PartRevealed { index: usize, name: String },
    FinaleStarted { clip: String },
    StageRequested(Stage),
}

/// Marker pointing at the next edge to trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub position: Vec3,
    pub rotation: Quat,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnwrapPhase {
    StandardShapes,
    FinalChallenge,
    Done,
}

//
// ─── RESUMABLE STATE ───────────────────────────────────────────────────────────
//

/// Waiting for a one-shot clip: first for it to start, then for it to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaWait {
    Starting,
    Playing,
}

impl MediaWait {
    /// Returns true once the clip has started and stopped again.
    fn poll(&mut self, media: &dyn MediaPlayer) -> bool {
        match self {
            MediaWait::Starting => {
                if media.is_playing() {
                    *self = MediaWait::Playing;
                }
                false
            }
            MediaWait::Playing => !media.is_playing(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PartMove {
    start: Vec3,
    target: Vec3,
    elapsed: f32,
    duration: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StandardStep {
    Tracing,
    Unwrapping(MediaWait),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SnowmanStep {
    Tracing,
    Moving(PartMove),
    Finale(MediaWait),
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    NotStarted,
    Standard(StandardStep),
    Snowman {
        progress: SnowmanProgress,
        step: SnowmanStep,
    },
    Done {
        progress: SnowmanProgress,
    },
}

#[derive(Debug, Clone)]
struct ActiveShape {
    name: String,
    position: Vec3,
    edges: Vec<Aabb>,
    lit: Vec<bool>,
    progress: EdgeProgress,
}

impl ActiveShape {
    fn spawn(index: usize, spec: &ShapeSpec, position: Vec3) -> Self {
        Self {
            name: spec.name.clone(),
            position,
            edges: spec.edges.clone(),
            lit: vec![false; spec.edges.len()],
            progress: EdgeProgress::new(index, spec.edges.len()),
        }
    }

    fn world_edge(&self, index: usize) -> Option<Aabb> {
        self.edges.get(index).map(|e| e.translated(self.position))
    }

    /// Level-triggered: true on every tick the conditions hold.
    fn check_hit(&self, input: &InputSample, config: &UnwrapConfig) -> bool {
        if input.trigger <= config.activation_threshold {
            return false;
        }
        let Some(ray) = Ray::new(input.origin, input.direction) else {
            return false;
        };
        let Some(current) = self.progress.current_edge().and_then(|i| self.world_edge(i)) else {
            return false;
        };
        let enabled = self
            .edges
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.lit[*i])
            .map(|(i, edge)| (i, edge.translated(self.position)));
        raycast(&ray, enabled, config.max_ray_distance)
            .is_some_and(|hit| current.contains(hit.point))
    }

    /// Light the current edge and disable its collider before anything else
    /// can observe it.
    fn complete_current_edge(&mut self) -> Option<usize> {
        let index = self.progress.current_edge()?;
        self.lit[index] = true;
        self.progress.advance();
        Some(index)
    }
}

//
// ─── STATE MACHINE ─────────────────────────────────────────────────────────────
//

/// Drives the edge-tracing challenge: standard shapes in order, then the
/// snowman assembly.
///
/// Call [`UnwrapMachine::start`] once, then [`UnwrapMachine::tick`] every
/// frame. Waiting on media or movement never blocks; the machine stores
/// where it stopped and resumes on the next tick.
#[derive(Debug, Clone)]
pub struct UnwrapMachine {
    scene: UnwrapScene,
    config: UnwrapConfig,
    phase: Phase,
    shape_index: usize,
    active: Option<ActiveShape>,
    completed_shapes: usize,
    edge_clip: usize,
    hide_guide: bool,
    guide: Option<Guide>,
    revealed_parts: Vec<bool>,
}

impl UnwrapMachine {
    /// # Errors
    ///
    /// Returns `UnwrapError::NoEdges` if any shape or part has no edges.
    pub fn new(scene: UnwrapScene, config: UnwrapConfig) -> Result<Self, UnwrapError> {
        if let Some(spec) = scene
            .shapes
            .iter()
            .chain(&scene.snowman_parts)
            .find(|spec| spec.edges.is_empty())
        {
            return Err(UnwrapError::NoEdges {
                shape: spec.name.clone(),
            });
        }
        if config.move_duration.is_nan() || config.move_duration < 0.0 {
            return Err(UnwrapError::InvalidDuration(config.move_duration));
        }
        let parts = scene.snowman_parts.len();
        Ok(Self {
            scene,
            config,
            phase: Phase::NotStarted,
            shape_index: 0,
            active: None,
            completed_shapes: 0,
            edge_clip: 0,
            hide_guide: false,
            guide: None,
            revealed_parts: vec![false; parts],
        })
    }

    /// Spawn the first shape and its guide. Later calls do nothing.
    pub fn start(&mut self, media: &mut dyn MediaPlayer) -> Vec<UnwrapEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::NotStarted {
            return events;
        }
        if self.scene.shapes.is_empty() {
            self.start_final_challenge(media, &mut events);
        } else {
            self.phase = Phase::Standard(StandardStep::Tracing);
            self.spawn_standard_shape(media, &mut events);
        }
        events
    }

    /// Advance by one frame.
    ///
    /// `dt` is the frame time in seconds, `player` the position the guide
    /// should face.
    pub fn tick(
        &mut self,
        dt: f32,
        input: &InputSample,
        player: Vec3,
        media: &mut dyn MediaPlayer,
    ) -> Vec<UnwrapEvent> {
        let mut events = Vec::new();
        match self.phase.clone() {
            Phase::NotStarted | Phase::Done { .. } => {}
            Phase::Standard(StandardStep::Tracing) => {
                self.process_standard(input, media, &mut events);
            }
            Phase::Standard(StandardStep::Unwrapping(mut wait)) => {
                if wait.poll(media) {
                    self.completed_shapes += 1;
                    self.finish_unwrap(media, &mut events);
                } else {
                    self.phase = Phase::Standard(StandardStep::Unwrapping(wait));
                }
            }
            Phase::Snowman { progress, step } => match step {
                SnowmanStep::Tracing => self.process_snowman(input, progress, media, &mut events),
                SnowmanStep::Moving(part_move) => {
                    self.advance_part_move(dt, part_move, progress, media, &mut events);
                }
                SnowmanStep::Finale(mut wait) => {
                    if wait.poll(media) {
                        self.finish(progress, &mut events);
                    } else {
                        self.phase = Phase::Snowman {
                            progress,
                            step: SnowmanStep::Finale(wait),
                        };
                    }
                }
            },
        }
        self.refresh_guide(player);
        events
    }

    /// Put the active shape back at the spawn point.
    ///
    /// Edge progress is untouched. Returns false when no shape is active.
    pub fn teleport_shape_back(&mut self) -> bool {
        match self.active.as_mut() {
            Some(shape) => {
                shape.position = self.config.spawn_point;
                debug!("teleported `{}` back to spawn", shape.name);
                true
            }
            None => {
                warn!("teleport requested with no active shape");
                false
            }
        }
    }

    /// Reposition the active shape (e.g. after the participant grabbed it).
    pub fn move_active_shape(&mut self, position: Vec3) -> bool {
        match self.active.as_mut() {
            Some(shape) => {
                shape.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_hide_guide(&mut self, hide: bool) {
        self.hide_guide = hide;
    }

    #[must_use]
    pub fn hide_guide(&self) -> bool {
        self.hide_guide
    }

    #[must_use]
    pub fn guide(&self) -> Option<&Guide> {
        self.guide.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> UnwrapPhase {
        match self.phase {
            Phase::NotStarted | Phase::Standard(_) => UnwrapPhase::StandardShapes,
            Phase::Snowman { .. } => UnwrapPhase::FinalChallenge,
            Phase::Done { .. } => UnwrapPhase::Done,
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done { .. })
    }

    #[must_use]
    pub fn edge_progress(&self) -> Option<EdgeProgress> {
        self.active.as_ref().map(|shape| shape.progress)
    }

    #[must_use]
    pub fn snowman_progress(&self) -> Option<&SnowmanProgress> {
        match &self.phase {
            Phase::Snowman { progress, .. } | Phase::Done { progress } => Some(progress),
            _ => None,
        }
    }

    #[must_use]
    pub fn active_shape_name(&self) -> Option<&str> {
        self.active.as_ref().map(|shape| shape.name.as_str())
    }

    #[must_use]
    pub fn active_shape_position(&self) -> Option<Vec3> {
        self.active.as_ref().map(|shape| shape.position)
    }

    /// World-space bounds of the edge that must be hit next.
    #[must_use]
    pub fn current_edge_bounds(&self) -> Option<Aabb> {
        let shape = self.active.as_ref()?;
        shape.world_edge(shape.progress.current_edge()?)
    }

    /// Lit state of each edge on the active shape.
    #[must_use]
    pub fn lit_edges(&self) -> Option<&[bool]> {
        self.active.as_ref().map(|shape| shape.lit.as_slice())
    }

    #[must_use]
    pub fn revealed_parts(&self) -> &[bool] {
        &self.revealed_parts
    }

    #[must_use]
    pub fn completed_shapes(&self) -> usize {
        self.completed_shapes
    }

    #[must_use]
    pub fn edge_clip_index(&self) -> usize {
        self.edge_clip
    }

    #[must_use]
    pub fn config(&self) -> &UnwrapConfig {
        &self.config
    }

    // ── standard shapes ──

    fn process_standard(
        &mut self,
        input: &InputSample,
        media: &mut dyn MediaPlayer,
        events: &mut Vec<UnwrapEvent>,
    ) {
        let Some((shape_name, edge, complete)) = self.register_hit(input) else {
            return;
        };
        events.push(UnwrapEvent::EdgeLit {
            shape: shape_name.clone(),
            edge,
        });

        if !complete {
            self.advance_edge_clip(media);
            self.spawn_guide();
            return;
        }

        self.active = None;
        self.guide = None;
        events.push(UnwrapEvent::ShapeRemoved { name: shape_name });
        self.edge_clip += 1;
        debug!("edge clip cursor at {}", self.edge_clip);

        match self.scene.unwrap_clips.get(self.completed_shapes).cloned() {
            Some(clip) => {
                media.set_looping(false);
                media.set_clip(&clip);
                media.play();
                events.push(UnwrapEvent::UnwrapClipStarted { clip });
                self.phase = Phase::Standard(StandardStep::Unwrapping(MediaWait::Starting));
            }
            None => {
                warn!(
                    "no unwrap clip for completed shape {}; skipping playback",
                    self.completed_shapes
                );
                self.finish_unwrap(media, events);
            }
        }
    }

    fn finish_unwrap(&mut self, media: &mut dyn MediaPlayer, events: &mut Vec<UnwrapEvent>) {
        self.shape_index += 1;
        if self.shape_index < self.scene.shapes.len() {
            self.phase = Phase::Standard(StandardStep::Tracing);
            self.spawn_standard_shape(media, events);
            media.set_looping(true);
        } else {
            self.start_final_challenge(media, events);
        }
    }

    fn spawn_standard_shape(&mut self, media: &mut dyn MediaPlayer, events: &mut Vec<UnwrapEvent>) {
        let Some(spec) = self.scene.shapes.get(self.shape_index) else {
            return;
        };
        let shape = ActiveShape::spawn(self.shape_index, spec, self.config.spawn_point);
        events.push(UnwrapEvent::ShapeSpawned {
            name: shape.name.clone(),
        });
        self.active = Some(shape);
        self.show_edge_clip(media);
        self.spawn_guide();
    }

    // ── snowman ──

    fn start_final_challenge(&mut self, media: &mut dyn MediaPlayer, events: &mut Vec<UnwrapEvent>) {
        info!("standard shapes complete; starting snowman challenge");
        self.hide_guide = true;
        let progress = SnowmanProgress::new(self.scene.snowman_parts.len());
        events.push(UnwrapEvent::FinalChallengeStarted);
        if progress.is_complete() {
            self.start_finale(progress, media, events);
            return;
        }
        self.phase = Phase::Snowman {
            progress,
            step: SnowmanStep::Tracing,
        };
        self.spawn_snowman_part(0, media, events);
    }

    fn spawn_snowman_part(
        &mut self,
        index: usize,
        media: &mut dyn MediaPlayer,
        events: &mut Vec<UnwrapEvent>,
    ) {
        let Some(spec) = self.scene.snowman_parts.get(index) else {
            return;
        };
        media.set_looping(true);
        self.show_edge_clip(media);
        let part = ActiveShape::spawn(index, spec, self.config.spawn_point);
        events.push(UnwrapEvent::ShapeSpawned {
            name: part.name.clone(),
        });
        self.active = Some(part);
        self.spawn_guide();
    }

    fn process_snowman(
        &mut self,
        input: &InputSample,
        progress: SnowmanProgress,
        media: &mut dyn MediaPlayer,
        events: &mut Vec<UnwrapEvent>,
    ) {
        let Some((part_name, edge, complete)) = self.register_hit(input) else {
            return;
        };
        events.push(UnwrapEvent::EdgeLit {
            shape: part_name,
            edge,
        });

        if !complete {
            self.spawn_guide();
            return;
        }

        self.guide = None;
        if progress.part_index < self.config.clip_advancing_parts {
            self.advance_edge_clip(media);
        }
        let start = self
            .active
            .as_ref()
            .map_or(self.config.spawn_point, |part| part.position);
        self.phase = Phase::Snowman {
            progress,
            step: SnowmanStep::Moving(PartMove {
                start,
                target: self.config.desk_point,
                elapsed: 0.0,
                duration: self.config.move_duration,
            }),
        };
    }

    fn advance_part_move(
        &mut self,
        dt: f32,
        mut part_move: PartMove,
        mut progress: SnowmanProgress,
        media: &mut dyn MediaPlayer,
        events: &mut Vec<UnwrapEvent>,
    ) {
        if part_move.elapsed < part_move.duration {
            let t = part_move.elapsed / part_move.duration;
            self.move_active_shape(part_move.start.lerp(part_move.target, t));
            part_move.elapsed += dt.max(0.0);
            self.phase = Phase::Snowman {
                progress,
                step: SnowmanStep::Moving(part_move),
            };
            return;
        }

        let name = self
            .active
            .take()
            .map(|part| part.name)
            .unwrap_or_default();
        events.push(UnwrapEvent::PartArrived { name: name.clone() });

        let index = progress.part_index;
        if let Some(revealed) = self.revealed_parts.get_mut(index) {
            *revealed = true;
        }
        events.push(UnwrapEvent::PartRevealed {
            index,
            name: name.clone(),
        });
        progress.complete_part(name);
        self.hide_guide = true;

        if progress.is_complete() {
            self.start_finale(progress, media, events);
        } else {
            let next = progress.part_index;
            self.phase = Phase::Snowman {
                progress,
                step: SnowmanStep::Tracing,
            };
            self.spawn_snowman_part(next, media, events);
        }
    }

    fn start_finale(
        &mut self,
        progress: SnowmanProgress,
        media: &mut dyn MediaPlayer,
        events: &mut Vec<UnwrapEvent>,
    ) {
        match self.scene.unwrap_clips.get(self.completed_shapes).cloned() {
            Some(clip) => {
                media.set_looping(false);
                media.set_clip(&clip);
                media.play();
                events.push(UnwrapEvent::FinaleStarted { clip });
                self.phase = Phase::Snowman {
                    progress,
                    step: SnowmanStep::Finale(MediaWait::Starting),
                };
            }
            None => {
                warn!(
                    "no finale clip at index {}; finishing without playback",
                    self.completed_shapes
                );
                self.finish(progress, events);
            }
        }
    }

    fn finish(&mut self, progress: SnowmanProgress, events: &mut Vec<UnwrapEvent>) {
        info!("unwrap challenge complete");
        self.phase = Phase::Done { progress };
        events.push(UnwrapEvent::StageRequested(Stage::StartMrt));
    }

    // ── shared ──

    /// Detect and apply at most one edge hit. Returns the shape name, the
    /// edge index and whether the shape is now complete.
    fn register_hit(&mut self, input: &InputSample) -> Option<(String, usize, bool)> {
        let shape = self.active.as_mut()?;
        if shape.progress.is_complete() || !shape.check_hit(input, &self.config) {
            return None;
        }
        let edge = shape.complete_current_edge()?;
        Some((shape.name.clone(), edge, shape.progress.is_complete()))
    }

    fn advance_edge_clip(&mut self, media: &mut dyn MediaPlayer) {
        self.edge_clip += 1;
        debug!("edge clip cursor at {}", self.edge_clip);
        self.show_edge_clip(media);
    }

    fn show_edge_clip(&self, media: &mut dyn MediaPlayer) {
        match self.scene.edge_clips.get(self.edge_clip) {
            Some(clip) => media.set_clip(clip),
            None => warn!("no edge clip at index {}", self.edge_clip),
        }
    }

    fn spawn_guide(&mut self) {
        self.guide = self.current_edge_bounds().map(|bounds| Guide {
            position: bounds.center(),
            rotation: Quat::IDENTITY,
            visible: !self.hide_guide,
        });
    }

    fn refresh_guide(&mut self, player: Vec3) {
        let Some(bounds) = self.current_edge_bounds() else {
            self.guide = None;
            return;
        };
        let pitch = self.config.guide_pitch_correction_deg;
        let hide = self.hide_guide;
        if let Some(guide) = self.guide.as_mut() {
            guide.position = bounds.center();
            if let Some(rotation) = face_horizontally(guide.position, player, pitch) {
                guide.rotation = rotation;
            }
            guide.visible = !hide;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::SimulatedPlayer;

    const DT: f32 = 0.5;

    fn scene(shapes: &[(&str, usize)], parts: &[(&str, usize)]) -> UnwrapScene {
        let shapes: Vec<_> = shapes
            .iter()
            .map(|(name, edges)| ShapeSpec::with_row_of_edges(*name, *edges))
            .collect();
        let snowman_parts: Vec<_> = parts
            .iter()
            .map(|(name, edges)| ShapeSpec::with_row_of_edges(*name, *edges))
            .collect();
        let edge_clips = (0..32).map(|i| format!("edge_{i}")).collect();
        let unwrap_clips = shapes
            .iter()
            .map(|s| format!("unwrap_{}", s.name))
            .chain(std::iter::once("finale".to_string()))
            .collect();
        UnwrapScene {
            shapes,
            snowman_parts,
            edge_clips,
            unwrap_clips,
        }
    }

    fn machine(scene: UnwrapScene) -> UnwrapMachine {
        UnwrapMachine::new(scene, UnwrapConfig::default()).unwrap()
    }

    fn aim_at_edge(bounds: Aabb) -> InputSample {
        let center = bounds.center();
        InputSample::aimed_at(center - Vec3::Z, center)
    }

    fn aim_at_current(machine: &UnwrapMachine) -> InputSample {
        machine
            .current_edge_bounds()
            .map_or_else(InputSample::idle, aim_at_edge)
    }

    fn edge_bounds(machine: &UnwrapMachine, index: usize) -> Aabb {
        let shape = machine.active.as_ref().unwrap();
        shape.world_edge(index).unwrap()
    }

    /// Runs until done (or the tick budget runs out), always aiming at the
    /// current edge.
    fn run_to_end(
        machine: &mut UnwrapMachine,
        player: &mut SimulatedPlayer,
        max_ticks: usize,
    ) -> Vec<UnwrapEvent> {
        let mut events = machine.start(player);
        for _ in 0..max_ticks {
            if machine.is_done() {
                break;
            }
            player.advance();
            let input = aim_at_current(machine);
            events.extend(machine.tick(DT, &input, Vec3::new(0.0, 1.6, 0.0), player));
        }
        events
    }

    #[test]
    fn start_spawns_first_shape_with_visible_guide() {
        let mut machine = machine(scene(&[("cube", 3)], &[]));
        let mut player = SimulatedPlayer::new(2);
        let events = machine.start(&mut player);

        assert_eq!(
            events,
            vec![UnwrapEvent::ShapeSpawned {
                name: "cube".into()
            }]
        );
        assert_eq!(machine.phase(), UnwrapPhase::StandardShapes);
        assert_eq!(machine.edge_progress(), Some(EdgeProgress::new(0, 3)));
        let guide = machine.guide().unwrap();
        assert!(guide.visible);
        assert_eq!(guide.position, edge_bounds(&machine, 0).center());
        assert_eq!(player.clip(), Some("edge_0"));
    }

    #[test]
    fn edges_complete_strictly_in_order() {
        let mut machine = machine(scene(&[("cube", 3)], &[]));
        let mut player = SimulatedPlayer::new(2);
        machine.start(&mut player);

        let wrong = aim_at_edge(edge_bounds(&machine, 1));
        let events = machine.tick(DT, &wrong, Vec3::ZERO, &mut player);
        assert!(events.is_empty());
        assert_eq!(machine.edge_progress().unwrap().edge_index, 0);

        let right = aim_at_edge(edge_bounds(&machine, 0));
        let events = machine.tick(DT, &right, Vec3::ZERO, &mut player);
        assert_eq!(
            events,
            vec![UnwrapEvent::EdgeLit {
                shape: "cube".into(),
                edge: 0
            }]
        );
        assert_eq!(machine.edge_progress().unwrap().edge_index, 1);
        assert_eq!(machine.lit_edges(), Some(&[true, false, false][..]));
        assert_eq!(machine.guide().unwrap().position, edge_bounds(&machine, 1).center());
        assert_eq!(player.clip(), Some("edge_1"));
    }

    #[test]
    fn sustained_trigger_does_not_double_count() {
        let mut machine = machine(scene(&[("cube", 3)], &[]));
        let mut player = SimulatedPlayer::new(2);
        machine.start(&mut player);

        let held = aim_at_edge(edge_bounds(&machine, 0));
        for _ in 0..5 {
            machine.tick(DT, &held, Vec3::ZERO, &mut player);
        }
        assert_eq!(machine.edge_progress().unwrap().edge_index, 1);
    }

    #[test]
    fn weak_trigger_and_distant_aim_are_ignored() {
        let mut machine = machine(scene(&[("cube", 2)], &[]));
        let mut player = SimulatedPlayer::new(2);
        machine.start(&mut player);
        let bounds = edge_bounds(&machine, 0);

        let mut weak = aim_at_edge(bounds);
        weak.trigger = 0.1;
        machine.tick(DT, &weak, Vec3::ZERO, &mut player);

        let far = InputSample::aimed_at(bounds.center() - Vec3::Z * 20.0, bounds.center());
        machine.tick(DT, &far, Vec3::ZERO, &mut player);

        assert_eq!(machine.edge_progress().unwrap().edge_index, 0);
    }

    #[test]
    fn finished_shape_waits_for_unwrap_clip_before_next_spawn() {
        let mut machine = machine(scene(&[("cube", 1), ("pyramid", 1)], &[("base", 1)]));
        let mut player = SimulatedPlayer::new(2);
        machine.start(&mut player);

        let input = aim_at_current(&machine);
        let events = machine.tick(DT, &input, Vec3::ZERO, &mut player);
        assert!(events.contains(&UnwrapEvent::ShapeRemoved {
            name: "cube".into()
        }));
        assert!(events.contains(&UnwrapEvent::UnwrapClipStarted {
            clip: "unwrap_cube".into()
        }));
        assert!(!player.is_looping());
        assert_eq!(machine.active_shape_name(), None);

        // clip starts, plays two ticks, stops
        let mut spawned_after = None;
        for tick in 0..6 {
            player.advance();
            let events = machine.tick(DT, &InputSample::idle(), Vec3::ZERO, &mut player);
            if events.contains(&UnwrapEvent::ShapeSpawned {
                name: "pyramid".into(),
            }) {
                spawned_after = Some(tick);
                break;
            }
        }
        assert_eq!(spawned_after, Some(2));
        assert_eq!(machine.completed_shapes(), 1);
        assert!(player.is_looping());
    }

    #[test]
    fn full_run_builds_snowman_and_requests_mrt_once() {
        let mut machine = machine(scene(
            &[("cube", 4), ("pyramid", 3), ("cylinder", 2)],
            &[("base", 2), ("body", 2), ("head", 2)],
        ));
        let mut player = SimulatedPlayer::new(3);
        let events = run_to_end(&mut machine, &mut player, 500);

        assert!(machine.is_done());
        assert_eq!(machine.phase(), UnwrapPhase::Done);
        let progress = machine.snowman_progress().unwrap();
        assert_eq!(progress.part_index, progress.total_parts);
        assert_eq!(progress.completed_parts, vec!["base", "body", "head"]);
        assert_eq!(machine.revealed_parts(), &[true, true, true]);

        let stage_requests = events
            .iter()
            .filter(|e| matches!(e, UnwrapEvent::StageRequested(_)))
            .count();
        assert_eq!(stage_requests, 1);
        assert_eq!(
            events.last(),
            Some(&UnwrapEvent::StageRequested(Stage::StartMrt))
        );
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, UnwrapEvent::FinalChallengeStarted))
                .count(),
            1
        );
        assert_eq!(
            player.played(),
            ["unwrap_cube", "unwrap_pyramid", "unwrap_cylinder", "finale"]
        );
        assert_eq!(machine.edge_clip_index(), 11);

        // nothing happens after completion
        let after = machine.tick(DT, &InputSample::idle(), Vec3::ZERO, &mut player);
        assert!(after.is_empty());
    }

    #[test]
    fn completed_part_slides_to_desk_before_reveal() {
        let mut machine = machine(scene(&[], &[("base", 1), ("head", 1)]));
        let mut player = SimulatedPlayer::new(1);
        let events = machine.start(&mut player);
        assert_eq!(events[0], UnwrapEvent::FinalChallengeStarted);
        assert!(machine.hide_guide());

        let input = aim_at_current(&machine);
        machine.tick(DT, &input, Vec3::ZERO, &mut player);
        assert_eq!(machine.guide(), None);

        let spawn = machine.config().spawn_point;
        let desk = machine.config().desk_point;
        let mut positions = Vec::new();
        let mut revealed_at = None;
        for tick in 0..10 {
            let events = machine.tick(DT, &InputSample::idle(), Vec3::ZERO, &mut player);
            if events.iter().any(|e| matches!(e, UnwrapEvent::PartRevealed { .. })) {
                revealed_at = Some(tick);
                break;
            }
            positions.push(machine.active_shape_position().unwrap());
        }

        // 2s at 0.5s per tick: four interpolation samples, then arrival
        assert_eq!(revealed_at, Some(4));
        assert_eq!(positions[0], spawn);
        assert!((positions[2] - spawn.lerp(desk, 0.5)).length() < 1e-5);
        assert_eq!(machine.revealed_parts(), &[true, false]);
        assert_eq!(machine.snowman_progress().unwrap().part_index, 1);
        assert_eq!(machine.active_shape_name(), Some("head"));
    }

    #[test]
    fn teleport_restores_spawn_without_losing_progress() {
        let mut machine = machine(scene(&[("cube", 3)], &[]));
        let mut player = SimulatedPlayer::new(1);
        machine.start(&mut player);
        let input = aim_at_current(&machine);
        machine.tick(DT, &input, Vec3::ZERO, &mut player);

        assert!(machine.move_active_shape(Vec3::new(5.0, -3.0, 9.0)));
        let moved_edge = machine.current_edge_bounds().unwrap();
        assert!((moved_edge.center().z - 9.0).abs() < 1e-5);

        assert!(machine.teleport_shape_back());
        assert_eq!(
            machine.active_shape_position(),
            Some(machine.config().spawn_point)
        );
        assert_eq!(machine.edge_progress().unwrap().edge_index, 1);
    }

    #[test]
    fn teleport_without_shape_is_a_no_op() {
        let mut machine = machine(scene(&[("cube", 1)], &[]));
        assert!(!machine.teleport_shape_back());
    }

    #[test]
    fn guide_visibility_follows_flag_each_tick() {
        let mut machine = machine(scene(&[("cube", 2)], &[]));
        let mut player = SimulatedPlayer::new(1);
        machine.start(&mut player);

        machine.set_hide_guide(true);
        machine.tick(DT, &InputSample::idle(), Vec3::new(3.0, 0.0, 0.0), &mut player);
        assert!(!machine.guide().unwrap().visible);

        machine.set_hide_guide(false);
        machine.tick(DT, &InputSample::idle(), Vec3::new(3.0, 0.0, 0.0), &mut player);
        let guide = machine.guide().unwrap();
        assert!(guide.visible);
        assert_ne!(guide.rotation, Quat::IDENTITY);
        assert_eq!(machine.edge_progress().unwrap().edge_index, 0);
    }

    #[test]
    fn missing_clips_are_skipped_with_warning() {
        let mut bare = scene(&[("cube", 1), ("pyramid", 1)], &[("base", 1)]);
        bare.unwrap_clips.clear();
        bare.edge_clips.clear();
        let mut machine = machine(bare);
        let mut player = SimulatedPlayer::new(1);
        let events = run_to_end(&mut machine, &mut player, 50);

        assert!(machine.is_done());
        assert!(player.played().is_empty());
        assert_eq!(machine.completed_shapes(), 0);
        assert_eq!(
            events.last(),
            Some(&UnwrapEvent::StageRequested(Stage::StartMrt))
        );
    }

    #[test]
    fn shapes_without_edges_are_rejected() {
        let mut bad = scene(&[("cube", 1)], &[]);
        bad.snowman_parts.push(ShapeSpec::new("hat", Vec::new()));
        assert_eq!(
            UnwrapMachine::new(bad, UnwrapConfig::default()).unwrap_err(),
            UnwrapError::NoEdges {
                shape: "hat".into()
            }
        );
    }
}
