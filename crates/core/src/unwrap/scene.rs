use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::Aabb;

/// Fixed tuning for the unwrap challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnwrapConfig {
    /// Where each shape or snowman part appears.
    pub spawn_point: Vec3,
    /// Where a completed snowman part travels before it is assembled.
    pub desk_point: Vec3,
    /// Seconds a completed part takes to reach the desk.
    pub move_duration: f32,
    /// Trigger pressure must exceed this to count as a hit.
    pub activation_threshold: f32,
    pub max_ray_distance: f32,
    /// Tilt applied to the flat guide marker after it faces the player.
    pub guide_pitch_correction_deg: f32,
    /// Snowman part completions that still advance the instruction clip.
    pub clip_advancing_parts: usize,
}

impl Default for UnwrapConfig {
    fn default() -> Self {
        Self {
            spawn_point: Vec3::new(0.6, 1.9, 2.1),
            desk_point: Vec3::new(1.4, 0.8, 2.27),
            move_duration: 2.0,
            activation_threshold: 0.1,
            max_ray_distance: 10.0,
            guide_pitch_correction_deg: 90.0,
            clip_advancing_parts: 2,
        }
    }
}

/// A traceable shape: an ordered list of edge colliders in shape-local space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    pub name: String,
    pub edges: Vec<Aabb>,
}

impl ShapeSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, edges: Vec<Aabb>) -> Self {
        Self {
            name: name.into(),
            edges,
        }
    }

    /// `count` thin edge boxes laid out side by side along X.
    #[must_use]
    pub fn with_row_of_edges(name: impl Into<String>, count: usize) -> Self {
        let edges = (0..count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let x = i as f32 * 0.2;
                Aabb::from_center_size(Vec3::new(x, 0.0, 0.0), Vec3::new(0.15, 0.02, 0.02))
            })
            .collect();
        Self::new(name, edges)
    }
}

/// Content of the unwrap scene: shapes, snowman parts and media clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnwrapScene {
    pub shapes: Vec<ShapeSpec>,
    pub snowman_parts: Vec<ShapeSpec>,
    /// Looping instruction clips, advanced as edges are completed.
    pub edge_clips: Vec<String>,
    /// One-shot unwrap clip per standard shape, then the finale clip.
    pub unwrap_clips: Vec<String>,
}

impl Default for UnwrapScene {
    fn default() -> Self {
        let shapes = vec![
            ShapeSpec::with_row_of_edges("cube", 4),
            ShapeSpec::with_row_of_edges("pyramid", 3),
            ShapeSpec::with_row_of_edges("cylinder", 2),
        ];
        let snowman_parts = vec![
            ShapeSpec::with_row_of_edges("snowman_base", 2),
            ShapeSpec::with_row_of_edges("snowman_body", 2),
            ShapeSpec::with_row_of_edges("snowman_head", 2),
        ];
        let edge_clip_count = shapes.iter().map(|s| s.edges.len()).sum::<usize>() + 3;
        let edge_clips = (0..edge_clip_count).map(|i| format!("edge_{i:02}")).collect();
        let unwrap_clips = shapes
            .iter()
            .map(|s| format!("unwrap_{}", s.name))
            .chain(std::iter::once("unwrap_snowman".to_string()))
            .collect();
        Self {
            shapes,
            snowman_parts,
            edge_clips,
            unwrap_clips,
        }
    }
}
