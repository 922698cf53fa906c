//! Match lifecycle state machine

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::game::Player;
use crate::ws::protocol::{MatchStateView, ScoreboardEntry, ServerMsg};

/// Players required before the countdown begins
pub const MIN_PLAYERS: usize = 2;

/// Countdown length
pub const COUNTDOWN_SECS: u64 = 5;
pub const COUNTDOWN_MS: u64 = COUNTDOWN_SECS * 1_000;

/// Fixed match length
pub const MATCH_DURATION_SECS: u64 = 300;
pub const MATCH_DURATION_MS: u64 = MATCH_DURATION_SECS * 1_000;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Waiting for players
    Waiting,
    /// Countdown before start
    Countdown,
    /// Match in progress
    Active,
    /// Match over; terminal for the session's lifetime
    Finished,
}

impl From<MatchPhase> for MatchStateView {
    fn from(phase: MatchPhase) -> Self {
        match phase {
            MatchPhase::Waiting => MatchStateView::Waiting,
            MatchPhase::Countdown => MatchStateView::Countdown,
            MatchPhase::Active => MatchStateView::Active,
            MatchPhase::Finished => MatchStateView::Finished,
        }
    }
}

/// Match clock: phase plus the timestamps that drive transitions
#[derive(Debug, Default)]
pub struct MatchClock {
    pub phase: MatchPhase,
    pub countdown_started_ms: Option<u64>,
    pub match_start_ms: Option<u64>,
    pub match_end_ms: Option<u64>,
}

impl Default for MatchPhase {
    fn default() -> Self {
        MatchPhase::Waiting
    }
}

impl MatchClock {
    /// Milliseconds left on the match clock while active
    pub fn time_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        if self.phase != MatchPhase::Active {
            return None;
        }
        self.match_end_ms.map(|end| end.saturating_sub(now_ms))
    }
}

/// Advance the state machine one step. Invoked once per tick with the
/// current wall-clock time; returns the events to broadcast.
pub fn advance(
    clock: &mut MatchClock,
    players: &mut HashMap<Uuid, Player>,
    now_ms: u64,
) -> Vec<ServerMsg> {
    let mut events = Vec::new();

    match clock.phase {
        MatchPhase::Waiting => {
            if players.len() >= MIN_PLAYERS {
                clock.phase = MatchPhase::Countdown;
                clock.countdown_started_ms = Some(now_ms);
                for player in players.values_mut() {
                    player.kills = 0;
                    player.deaths = 0;
                }
                events.push(ServerMsg::MatchCountdown {
                    countdown: COUNTDOWN_SECS,
                });
                info!(player_count = players.len(), "Match countdown started");
            }
        }
        MatchPhase::Countdown => {
            let started = clock.countdown_started_ms.unwrap_or(now_ms);
            if now_ms.saturating_sub(started) >= COUNTDOWN_MS {
                clock.phase = MatchPhase::Active;
                clock.match_start_ms = Some(now_ms);
                clock.match_end_ms = Some(now_ms + MATCH_DURATION_MS);
                events.push(ServerMsg::MatchStart {
                    duration: MATCH_DURATION_SECS,
                    start_time: now_ms,
                    end_time: now_ms + MATCH_DURATION_MS,
                });
                info!("Match started");
            }
        }
        MatchPhase::Active => {
            let end = clock.match_end_ms.unwrap_or(u64::MAX);
            if now_ms >= end {
                clock.phase = MatchPhase::Finished;
                let scoreboard = build_scoreboard(players);
                if let Some(winner) = scoreboard.first() {
                    events.push(ServerMsg::MatchEnd {
                        winner_id: winner.player_id,
                        winner_name: winner.player_name.clone(),
                        scoreboard,
                    });
                    info!("Match finished");
                }
            }
        }
        MatchPhase::Finished => {}
    }

    events
}

/// Sort players by kill count descending and assign 1-based placements.
/// Ties keep map iteration order (accepted non-strict tie-break). The top
/// entry is the winner even with zero kills.
pub fn build_scoreboard(players: &HashMap<Uuid, Player>) -> Vec<ScoreboardEntry> {
    let mut entries: Vec<ScoreboardEntry> = players
        .values()
        .map(|p| ScoreboardEntry {
            player_id: p.id,
            player_name: p.name.clone(),
            kills: p.kills,
            deaths: p.deaths,
            placement: 0,
        })
        .collect();

    entries.sort_by(|a, b| b.kills.cmp(&a.kills));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.placement = (i + 1) as u32;
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::geometry::Vec3;
    use tokio::sync::mpsc;

    fn new_player(name: &str, kills: u32) -> Player {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut p = Player::new(Uuid::new_v4(), name.to_string(), Vec3::ZERO, tx);
        p.kills = kills;
        p
    }

    fn arena(players: Vec<Player>) -> HashMap<Uuid, Player> {
        players.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn waits_below_min_players() {
        let mut clock = MatchClock::default();
        let mut players = arena(vec![new_player("a", 0)]);
        let events = advance(&mut clock, &mut players, 1_000);
        assert_eq!(clock.phase, MatchPhase::Waiting);
        assert!(events.is_empty());
    }

    #[test]
    fn full_transition_sequence() {
        let mut clock = MatchClock::default();
        let mut players = arena(vec![new_player("a", 3), new_player("b", 0)]);

        // Waiting -> Countdown on second player; counters reset
        let events = advance(&mut clock, &mut players, 1_000);
        assert_eq!(clock.phase, MatchPhase::Countdown);
        assert!(matches!(events[0], ServerMsg::MatchCountdown { countdown } if countdown == COUNTDOWN_SECS));
        assert!(players.values().all(|p| p.kills == 0 && p.deaths == 0));

        // Countdown holds until the window elapses
        advance(&mut clock, &mut players, 1_000 + COUNTDOWN_MS - 1);
        assert_eq!(clock.phase, MatchPhase::Countdown);

        // Countdown -> Active with a fixed end time
        let events = advance(&mut clock, &mut players, 1_000 + COUNTDOWN_MS);
        assert_eq!(clock.phase, MatchPhase::Active);
        let end_time = match &events[0] {
            ServerMsg::MatchStart { end_time, duration, .. } => {
                assert_eq!(*duration, MATCH_DURATION_SECS);
                *end_time
            }
            other => panic!("unexpected event: {:?}", other),
        };
        assert_eq!(end_time, 1_000 + COUNTDOWN_MS + MATCH_DURATION_MS);

        // Active -> Finished when the clock expires
        let events = advance(&mut clock, &mut players, end_time);
        assert_eq!(clock.phase, MatchPhase::Finished);
        assert!(matches!(events[0], ServerMsg::MatchEnd { .. }));

        // Finished is terminal
        let events = advance(&mut clock, &mut players, end_time + 60_000);
        assert_eq!(clock.phase, MatchPhase::Finished);
        assert!(events.is_empty());
    }

    #[test]
    fn countdown_never_reverts_to_waiting() {
        let mut clock = MatchClock::default();
        let mut players = arena(vec![new_player("a", 0), new_player("b", 0)]);
        advance(&mut clock, &mut players, 1_000);
        assert_eq!(clock.phase, MatchPhase::Countdown);

        // One player drops during countdown; the phase holds
        let gone = *players.keys().next().unwrap();
        players.remove(&gone);
        advance(&mut clock, &mut players, 2_000);
        assert_eq!(clock.phase, MatchPhase::Countdown);
    }

    #[test]
    fn scoreboard_orders_by_kills_with_placements() {
        let players = arena(vec![
            new_player("low", 1),
            new_player("high", 7),
            new_player("mid", 4),
        ]);
        let board = build_scoreboard(&players);
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].player_name, "high");
        assert_eq!(board[0].placement, 1);
        assert_eq!(board[1].player_name, "mid");
        assert_eq!(board[2].player_name, "low");
        assert_eq!(board[2].placement, 3);
    }

    #[test]
    fn zero_kill_leader_is_still_the_winner() {
        let mut clock = MatchClock {
            phase: MatchPhase::Active,
            countdown_started_ms: Some(0),
            match_start_ms: Some(0),
            match_end_ms: Some(10_000),
        };
        let mut players = arena(vec![new_player("a", 0), new_player("b", 0)]);
        let events = advance(&mut clock, &mut players, 10_000);
        match &events[0] {
            ServerMsg::MatchEnd { scoreboard, .. } => {
                assert_eq!(scoreboard[0].kills, 0);
                assert_eq!(scoreboard[0].placement, 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
