//! Spawn point selection

use crate::game::geometry::Vec3;

/// Fallback when nobody is in the arena
pub const DEFAULT_SPAWN: Vec3 = Vec3 {
    x: 0.0,
    y: 1.0,
    z: -40.0,
};

/// Fixed candidate spawn points around the arena perimeter
pub const SPAWN_POINTS: &[Vec3] = &[
    Vec3 {
        x: -40.0,
        y: 1.0,
        z: -40.0,
    },
    Vec3 {
        x: 40.0,
        y: 1.0,
        z: -40.0,
    },
    Vec3 {
        x: -40.0,
        y: 1.0,
        z: 40.0,
    },
    Vec3 {
        x: 40.0,
        y: 1.0,
        z: 40.0,
    },
    Vec3 {
        x: 0.0,
        y: 1.0,
        z: -45.0,
    },
    Vec3 {
        x: 0.0,
        y: 1.0,
        z: 45.0,
    },
    Vec3 {
        x: -45.0,
        y: 1.0,
        z: 0.0,
    },
    Vec3 {
        x: 45.0,
        y: 1.0,
        z: 0.0,
    },
];

/// Pick the candidate maximizing the minimum distance to any living player
/// (furthest-point heuristic). Ties resolve to the first candidate in list
/// order; with no living players the fixed default is returned.
pub fn select_spawn(living_positions: &[Vec3]) -> Vec3 {
    if living_positions.is_empty() {
        return DEFAULT_SPAWN;
    }

    let mut best = SPAWN_POINTS[0];
    let mut best_min_dist = f32::MIN;

    for candidate in SPAWN_POINTS {
        let min_dist = living_positions
            .iter()
            .map(|p| candidate.distance(p))
            .fold(f32::MAX, f32::min);
        if min_dist > best_min_dist {
            best_min_dist = min_dist;
            best = *candidate;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_arena_uses_default() {
        assert_eq!(select_spawn(&[]), DEFAULT_SPAWN);
    }

    #[test]
    fn three_players_pick_furthest_corner() {
        // Cluster everyone in the -x/-z quadrant; the +x/+z corner
        // candidate (index 3) has the largest minimum distance.
        let living = vec![
            Vec3::new(-40.0, 1.0, -40.0),
            Vec3::new(-30.0, 1.0, -35.0),
            Vec3::new(-35.0, 1.0, -20.0),
        ];
        assert_eq!(select_spawn(&living), SPAWN_POINTS[3]);
    }

    #[test]
    fn tie_resolves_to_first_candidate() {
        // A single player at the arena center is equidistant from the four
        // corner candidates; the perimeter midpoints are closer. First
        // corner in list order wins.
        let living = vec![Vec3::new(0.0, 1.0, 0.0)];
        assert_eq!(select_spawn(&living), SPAWN_POINTS[0]);
    }
}
