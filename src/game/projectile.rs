//! Projectile simulation - kinematics, capsule hits, damage resolution

use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::game::geometry::{
    point_capsule_distance, Vec3, ARENA_BOUNDS, MAP_COLLIDERS, PLAYER_CAPSULE_HEIGHT,
    PLAYER_RADIUS,
};
use crate::game::Player;
use crate::ws::protocol::ServerMsg;

/// Projectile muzzle speed in units per second
pub const PROJECTILE_SPEED: f32 = 60.0;

/// Projectile lifetime in seconds
pub const PROJECTILE_LIFETIME: f32 = 3.0;

/// Projectile hitbox radius
pub const PROJECTILE_RADIUS: f32 = 0.1;

/// Damage per hit
pub const HIT_DAMAGE: f32 = 25.0;

/// Active projectile
#[derive(Debug, Clone)]
pub struct Projectile {
    /// Session-scoped id composed from the shooter id
    pub id: String,
    pub owner_id: Uuid,
    pub position: Vec3,
    pub velocity: Vec3,
    pub lifetime_remaining: f32,
    pub created_at_ms: u64,
}

impl Projectile {
    /// Spawn at the reported ray origin, travelling along the normalized ray
    pub fn new(seq: u64, owner_id: Uuid, origin: Vec3, dir: Vec3, created_at_ms: u64) -> Self {
        Self {
            id: format!("{}:{}", owner_id, seq),
            owner_id,
            position: origin,
            velocity: dir.normalized().scale(PROJECTILE_SPEED),
            lifetime_remaining: PROJECTILE_LIFETIME,
            created_at_ms,
        }
    }
}

/// A registered hit, resolved into damage after the projectile pass
#[derive(Debug, Clone)]
struct Hit {
    shooter_id: Uuid,
    victim_id: Uuid,
    weapon_id: String,
}

/// Outcome of one simulation step
#[derive(Debug, Default)]
pub struct CombatOutcome {
    /// Events to broadcast, in resolution order
    pub events: Vec<ServerMsg>,
    /// Players that died this tick and need a respawn scheduled
    pub deaths: Vec<Uuid>,
}

/// Advance all projectiles by one tick and resolve hits.
///
/// Each projectile is removed at most once, by exactly one of expiry,
/// wall/bounds impact, or player hit. Removals are applied after the full
/// pass so sibling projectiles in the same tick are unaffected.
pub fn simulate(
    projectiles: &mut Vec<Projectile>,
    players: &mut HashMap<Uuid, Player>,
    now_ms: u64,
    dt: f32,
) -> CombatOutcome {
    let mut outcome = CombatOutcome::default();
    let mut hits: Vec<Hit> = Vec::new();
    let mut removed: Vec<usize> = Vec::new();

    for (idx, projectile) in projectiles.iter_mut().enumerate() {
        projectile.position = projectile.position.add(&projectile.velocity.scale(dt));
        projectile.lifetime_remaining -= dt;

        if projectile.lifetime_remaining <= 0.0 {
            removed.push(idx);
            continue;
        }

        // First qualifying victim wins; at most one per projectile per tick
        let mut hit_player = false;
        for player in players.values() {
            if !player.alive || player.id == projectile.owner_id {
                continue;
            }
            if player.is_protected(now_ms) {
                continue;
            }
            let dist = point_capsule_distance(
                &projectile.position,
                &player.position,
                PLAYER_CAPSULE_HEIGHT,
            );
            if dist < PROJECTILE_RADIUS + PLAYER_RADIUS {
                hits.push(Hit {
                    shooter_id: projectile.owner_id,
                    victim_id: player.id,
                    weapon_id: weapon_of(players, projectile.owner_id),
                });
                removed.push(idx);
                hit_player = true;
                break;
            }
        }
        if hit_player {
            continue;
        }

        // World collision: arena exit or static map collider impact
        if !ARENA_BOUNDS.contains(&projectile.position)
            || MAP_COLLIDERS.iter().any(|b| b.contains(&projectile.position))
        {
            removed.push(idx);
        }
    }

    removed.sort_unstable();
    removed.dedup();
    for idx in removed.into_iter().rev() {
        projectiles.remove(idx);
    }

    for hit in hits {
        let Some(victim) = players.get_mut(&hit.victim_id) else {
            debug!(victim_id = %hit.victim_id, "Hit victim no longer in session");
            continue;
        };
        if !victim.alive {
            // Killed by an earlier projectile this tick
            continue;
        }

        victim.health = (victim.health - HIT_DAMAGE).max(0.0);
        let killed = victim.health <= 0.0;
        let new_health = victim.health;
        if killed {
            victim.alive = false;
            victim.deaths += 1;
        }

        outcome.events.push(ServerMsg::Damage {
            victim_id: hit.victim_id,
            attacker_id: hit.shooter_id,
            damage: HIT_DAMAGE,
            weapon_id: hit.weapon_id.clone(),
            new_health,
        });

        if killed {
            match players.get_mut(&hit.shooter_id) {
                Some(shooter) => shooter.kills += 1,
                None => warn!(shooter_id = %hit.shooter_id, "Kill credit for missing shooter"),
            }
            outcome.events.push(ServerMsg::Death {
                victim_id: hit.victim_id,
                killer_id: hit.shooter_id,
                weapon_id: hit.weapon_id,
            });
            outcome.deaths.push(hit.victim_id);
        }
    }

    outcome
}

fn weapon_of(players: &HashMap<Uuid, Player>, owner_id: Uuid) -> String {
    players
        .get(&owner_id)
        .map(|p| p.weapon_id.clone())
        .unwrap_or_else(|| "rifle".to_string())
}
