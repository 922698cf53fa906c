//! Collision geometry - vectors, boxes, capsules

use serde::{Deserialize, Serialize};

/// 3D vector, also used as the wire representation for positions and velocities
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn add(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn scale(&self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn dot(&self, other: &Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length_sq(&self) -> f32 {
        self.dot(self)
    }

    pub fn length(&self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn distance(&self, other: &Vec3) -> f32 {
        self.sub(other).length()
    }

    /// Normalize to unit length; zero-length vectors stay zero
    pub fn normalized(&self) -> Vec3 {
        let len = self.length();
        if len < 1e-6 {
            Vec3::ZERO
        } else {
            self.scale(1.0 / len)
        }
    }
}

/// Axis-aligned box, used for arena bounds and static map colliders
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Three independent per-axis range checks
    pub fn contains(&self, p: &Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// Fixed arena bounds; map geometry is static and externally supplied
pub const ARENA_BOUNDS: Aabb = Aabb::new(
    Vec3 {
        x: -50.0,
        y: 0.0,
        z: -50.0,
    },
    Vec3 {
        x: 50.0,
        y: 20.0,
        z: 50.0,
    },
);

/// Static map colliders (walls and cover boxes). Consumed read-only.
pub const MAP_COLLIDERS: &[Aabb] = &[
    // Central pillar
    Aabb::new(
        Vec3 {
            x: -2.0,
            y: 0.0,
            z: -2.0,
        },
        Vec3 {
            x: 2.0,
            y: 4.0,
            z: 2.0,
        },
    ),
    // Side cover blocks
    Aabb::new(
        Vec3 {
            x: -25.0,
            y: 0.0,
            z: 14.0,
        },
        Vec3 {
            x: -20.0,
            y: 2.5,
            z: 18.0,
        },
    ),
    Aabb::new(
        Vec3 {
            x: 20.0,
            y: 0.0,
            z: -18.0,
        },
        Vec3 {
            x: 25.0,
            y: 2.5,
            z: -14.0,
        },
    ),
];

/// Player capsule dimensions
pub const PLAYER_RADIUS: f32 = 0.5;
pub const PLAYER_CAPSULE_HEIGHT: f32 = 1.8;

/// Minimum distance from a point to a vertical capsule whose axis runs
/// from `base` (feet) up `height` along +Y. The projection of the point
/// onto the axis is clamped to [0,1] before measuring.
pub fn point_capsule_distance(point: &Vec3, base: &Vec3, height: f32) -> f32 {
    let axis_len = (height - 2.0 * PLAYER_RADIUS).max(0.0);
    let seg_start = Vec3::new(base.x, base.y + PLAYER_RADIUS, base.z);
    let t = if axis_len < 1e-6 {
        0.0
    } else {
        ((point.y - seg_start.y) / axis_len).clamp(0.0, 1.0)
    };
    let closest = Vec3::new(seg_start.x, seg_start.y + t * axis_len, seg_start.z);
    point.distance(&closest)
}

/// Ray-capsule intersection test against a player capsule standing at `base`.
/// Returns the ray parameter of the nearest hit, or None.
///
/// Retained for hitscan-style weapons; the live damage path resolves hits
/// with projectile-capsule sphere collision instead.
#[allow(dead_code)]
pub fn ray_capsule_intersect(
    origin: &Vec3,
    dir: &Vec3,
    base: &Vec3,
    height: f32,
    radius: f32,
) -> Option<f32> {
    let dir = dir.normalized();
    if dir == Vec3::ZERO {
        return None;
    }

    // Sample the ray and take the first point within the capsule radius.
    // Coarse but sufficient for the ranges involved; step at half-radius.
    let step = (radius * 0.5).max(0.05);
    let max_dist = ARENA_BOUNDS.max.sub(&ARENA_BOUNDS.min).length();
    let mut t = 0.0;
    while t <= max_dist {
        let p = origin.add(&dir.scale(t));
        if point_capsule_distance(&p, base, height) <= radius {
            return Some(t);
        }
        t += step;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn aabb_contains_checks_all_axes() {
        let b = Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        assert!(b.contains(&Vec3::new(0.0, 1.0, 0.0)));
        assert!(!b.contains(&Vec3::new(2.0, 1.0, 0.0)));
        assert!(!b.contains(&Vec3::new(0.0, 3.0, 0.0)));
        assert!(!b.contains(&Vec3::new(0.0, 1.0, -1.5)));
    }

    #[test]
    fn capsule_distance_beside_midsection() {
        // Point level with the capsule midsection, 2 units out on x
        let base = Vec3::new(0.0, 0.0, 0.0);
        let p = Vec3::new(2.0, 0.9, 0.0);
        assert_approx_eq!(
            point_capsule_distance(&p, &base, PLAYER_CAPSULE_HEIGHT),
            2.0,
            1e-5
        );
    }

    #[test]
    fn capsule_distance_clamps_above_head() {
        // Point directly above the capsule: distance measured to the top
        // of the axis segment, not to an extrapolated line
        let base = Vec3::new(0.0, 0.0, 0.0);
        let top_of_axis = PLAYER_CAPSULE_HEIGHT - PLAYER_RADIUS;
        let p = Vec3::new(0.0, top_of_axis + 3.0, 0.0);
        assert_approx_eq!(
            point_capsule_distance(&p, &base, PLAYER_CAPSULE_HEIGHT),
            3.0,
            1e-5
        );
    }

    #[test]
    fn capsule_distance_clamps_below_feet() {
        let base = Vec3::new(0.0, 0.0, 0.0);
        let p = Vec3::new(0.0, -2.0, 0.0);
        // Axis segment starts at y = PLAYER_RADIUS
        assert_approx_eq!(
            point_capsule_distance(&p, &base, PLAYER_CAPSULE_HEIGHT),
            2.0 + PLAYER_RADIUS,
            1e-5
        );
    }

    #[test]
    fn ray_hits_capsule_in_front() {
        let base = Vec3::new(10.0, 0.0, 0.0);
        let hit = ray_capsule_intersect(
            &Vec3::new(0.0, 1.0, 0.0),
            &Vec3::new(1.0, 0.0, 0.0),
            &base,
            PLAYER_CAPSULE_HEIGHT,
            PLAYER_RADIUS,
        );
        let t = hit.expect("ray straight at capsule should hit");
        assert!(t > 9.0 && t < 10.0, "hit at t={}", t);
    }

    #[test]
    fn ray_misses_capsule_to_the_side() {
        let base = Vec3::new(10.0, 0.0, 5.0);
        let hit = ray_capsule_intersect(
            &Vec3::new(0.0, 1.0, 0.0),
            &Vec3::new(1.0, 0.0, 0.0),
            &base,
            PLAYER_CAPSULE_HEIGHT,
            PLAYER_RADIUS,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn normalize_zero_vector_stays_zero() {
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
    }
}
