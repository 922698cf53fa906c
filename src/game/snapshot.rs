//! Snapshot construction for network transmission

use std::collections::HashMap;

use uuid::Uuid;

use crate::game::lifecycle::MatchClock;
use crate::game::projectile::Projectile;
use crate::game::Player;
use crate::ws::protocol::{PlayerSnapshot, ProjectileSnapshot, ServerMsg};

/// Build the full world snapshot broadcast every tick
pub fn build(
    tick: u64,
    now_ms: u64,
    players: &HashMap<Uuid, Player>,
    projectiles: &[Projectile],
    clock: &MatchClock,
) -> ServerMsg {
    let player_snapshots: Vec<PlayerSnapshot> = players
        .values()
        .map(|p| PlayerSnapshot {
            id: p.id,
            position: p.position,
            rotation: p.rotation,
            velocity: p.velocity,
            health: p.health,
            alive: p.alive,
            weapon_id: p.weapon_id.clone(),
            kills: p.kills,
            deaths: p.deaths,
        })
        .collect();

    let projectile_snapshots: Vec<ProjectileSnapshot> = projectiles
        .iter()
        .map(|p| ProjectileSnapshot {
            id: p.id.clone(),
            owner_id: p.owner_id,
            position: p.position,
            velocity: p.velocity,
            created_at: p.created_at_ms,
            lifetime: p.lifetime_remaining,
        })
        .collect();

    ServerMsg::Snapshot {
        tick,
        timestamp: now_ms,
        players: player_snapshots,
        projectiles: projectile_snapshots,
        match_state: clock.phase.into(),
        match_time_remaining: clock.time_remaining_ms(now_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::geometry::Vec3;
    use crate::game::lifecycle::MatchPhase;
    use crate::ws::protocol::MatchStateView;
    use tokio::sync::mpsc;

    #[test]
    fn snapshot_carries_players_and_clock() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let player = Player::new(Uuid::new_v4(), "a".to_string(), Vec3::ZERO, tx);
        let players: HashMap<Uuid, Player> = [(player.id, player)].into_iter().collect();

        let clock = MatchClock {
            phase: MatchPhase::Active,
            countdown_started_ms: Some(0),
            match_start_ms: Some(0),
            match_end_ms: Some(60_000),
        };

        match build(42, 10_000, &players, &[], &clock) {
            ServerMsg::Snapshot {
                tick,
                players,
                match_state,
                match_time_remaining,
                ..
            } => {
                assert_eq!(tick, 42);
                assert_eq!(players.len(), 1);
                assert_eq!(match_state, MatchStateView::Active);
                assert_eq!(match_time_remaining, Some(50_000));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
