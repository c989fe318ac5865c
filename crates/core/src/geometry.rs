use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Slack used when testing whether a ray hit point lies on a box surface.
const CONTAINS_EPSILON: f32 = 1e-4;

/// Axis-aligned box, used for shape edge colliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[must_use]
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half)
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        let lo = self.min - Vec3::splat(CONTAINS_EPSILON);
        let hi = self.max + Vec3::splat(CONTAINS_EPSILON);
        point.cmpge(lo).all() && point.cmple(hi).all()
    }

    /// Distance along `ray` to the first intersection (slab test).
    ///
    /// A ray starting inside the box hits at distance 0. An axis the ray is
    /// parallel to only constrains the origin, faces included.
    #[must_use]
    pub fn ray_distance(&self, ray: &Ray) -> Option<f32> {
        let mut t_near = 0.0_f32;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if direction == 0.0 {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }
            let inv = direction.recip();
            let (t1, t2) = ((lo - origin) * inv, (hi - origin) * inv);
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
            if t_far < t_near {
                return None;
            }
        }
        Some(t_near)
    }
}

/// A ray with a normalised direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Returns `None` for a zero-length direction.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    #[must_use]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Index of the collider that was hit, as supplied by the caller.
    pub index: usize,
    pub distance: f32,
    pub point: Vec3,
}

/// Nearest collider hit within `max_distance`.
pub fn raycast(
    ray: &Ray,
    colliders: impl IntoIterator<Item = (usize, Aabb)>,
    max_distance: f32,
) -> Option<RayHit> {
    colliders
        .into_iter()
        .filter_map(|(index, aabb)| {
            let distance = aabb.ray_distance(ray)?;
            (distance <= max_distance).then(|| RayHit {
                index,
                distance,
                point: ray.at(distance),
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Rotation that turns a flat marker at `from` to face `to`, ignoring height.
///
/// `pitch_correction_deg` tilts the marker about its local X axis. Returns
/// `None` when the two points are (almost) vertically aligned.
#[must_use]
pub fn face_horizontally(from: Vec3, to: Vec3, pitch_correction_deg: f32) -> Option<Quat> {
    let mut direction = to - from;
    direction.y = 0.0;
    if direction.length_squared() <= 0.001 {
        return None;
    }
    let yaw = direction.x.atan2(direction.z);
    Some(Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch_correction_deg.to_radians()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box_at(center: Vec3) -> Aabb {
        Aabb::from_center_size(center, Vec3::ONE)
    }

    #[test]
    fn ray_hits_box_surface_inside_bounds() {
        let aabb = unit_box_at(Vec3::new(0.0, 0.0, 5.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::Z).unwrap();
        let distance = aabb.ray_distance(&ray).unwrap();
        assert!((distance - 4.5).abs() < 1e-5);
        assert!(aabb.contains(ray.at(distance)));
    }

    #[test]
    fn ray_pointing_away_misses() {
        let aabb = unit_box_at(Vec3::new(0.0, 0.0, 5.0));
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z).unwrap();
        assert_eq!(aabb.ray_distance(&ray), None);
    }

    #[test]
    fn axis_parallel_ray_along_a_face_hits() {
        let aabb = unit_box_at(Vec3::new(0.0, 0.0, 5.0));
        let on_face = Ray::new(Vec3::new(aabb.min.x, 0.0, 0.0), Vec3::Z).unwrap();
        let distance = aabb.ray_distance(&on_face).unwrap();
        assert!((distance - 4.5).abs() < 1e-5);

        let on_edge = Ray::new(Vec3::new(aabb.max.x, aabb.min.y, 0.0), Vec3::Z).unwrap();
        assert!(aabb.ray_distance(&on_edge).is_some());

        let beside = Ray::new(Vec3::new(aabb.max.x + 0.01, 0.0, 0.0), Vec3::Z).unwrap();
        assert_eq!(aabb.ray_distance(&beside), None);
    }

    #[test]
    fn raycast_picks_nearest_within_range() {
        let near = unit_box_at(Vec3::new(0.0, 0.0, 3.0));
        let far = unit_box_at(Vec3::new(0.0, 0.0, 8.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::Z).unwrap();

        let hit = raycast(&ray, [(0, far), (1, near)], 10.0).unwrap();
        assert_eq!(hit.index, 1);

        assert!(raycast(&ray, [(0, far)], 5.0).is_none());
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_none());
    }

    #[test]
    fn marker_faces_target_on_horizontal_plane() {
        let rotation = face_horizontally(Vec3::ZERO, Vec3::new(5.0, 3.0, 0.0), 0.0).unwrap();
        let forward = rotation * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-5);

        assert!(face_horizontally(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), 90.0).is_none());
    }
}
