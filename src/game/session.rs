//! Session state and authoritative tick loop
//!
//! A session owns all per-match state. Inbound client messages mutate that
//! state at arrival time; independently, a fixed-rate tick advances the
//! match lifecycle, simulates projectiles and broadcasts a snapshot. Both
//! paths serialize through one mutex, so a session is never mutated
//! concurrently. Different sessions are fully independent.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::game::geometry::Vec3;
use crate::game::history::{HistoryFrame, PlayerPose, PositionHistory};
use crate::game::lifecycle::{self, MatchClock, MatchPhase};
use crate::game::movement::{self, Verdict};
use crate::game::projectile::{self, Projectile};
use crate::game::snapshot;
use crate::game::spawn::select_spawn;
use crate::game::{ClientTx, Player, MAX_HEALTH, RESPAWN_DELAY_MS, SPAWN_PROTECTION_MS};
use crate::util::time::{tick_delta, unix_millis, TICK_DURATION_MICROS};
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Mutable per-session state, guarded by the session mutex
struct SessionState {
    tick: u64,
    players: HashMap<Uuid, Player>,
    projectiles: Vec<Projectile>,
    projectile_seq: u64,
    clock: MatchClock,
    history: PositionHistory,
}

impl SessionState {
    fn broadcast(&self, msg: &ServerMsg) {
        for player in self.players.values() {
            player.send(msg);
        }
    }

    fn living_positions_except(&self, excluded: Uuid) -> Vec<Vec3> {
        self.players
            .values()
            .filter(|p| p.alive && p.id != excluded)
            .map(|p| p.position)
            .collect()
    }
}

/// One game session: players, projectiles, match clock, tick loop
pub struct Session {
    pub id: String,
    state: Mutex<SessionState>,
    tick_task: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    pub fn new(id: String) -> Arc<Self> {
        Arc::new(Self {
            id,
            state: Mutex::new(SessionState {
                tick: 0,
                players: HashMap::new(),
                projectiles: Vec::new(),
                projectile_seq: 0,
                clock: MatchClock::default(),
                history: PositionHistory::new(),
            }),
            tick_task: Mutex::new(None),
        })
    }

    /// Add a player: compute a spawn point, send a private welcome,
    /// announce the join to everyone else. The first join starts the
    /// tick loop.
    pub fn add_player(self: &Arc<Self>, player_id: Uuid, name: String, tx: ClientTx) {
        let first_player = {
            let mut state = self.state.lock();
            let spawn = select_spawn(&state.living_positions_except(player_id));
            let player = Player::new(player_id, name.clone(), spawn, tx);

            player.send(&ServerMsg::Welcome {
                player_id,
                player_name: name.clone(),
            });
            state.broadcast(&ServerMsg::PlayerJoin {
                player_id,
                player_name: name,
            });

            state.players.insert(player_id, player);
            state.players.len() == 1
        };

        info!(session_id = %self.id, player_id = %player_id, "Player joined session");

        if first_player {
            self.start();
        }
    }

    /// Remove a player and announce the leave. The tick loop stops when
    /// the session becomes empty; the registry sweeps the empty session
    /// after a grace delay.
    pub fn remove_player(&self, player_id: Uuid) {
        let now_empty = {
            let mut state = self.state.lock();
            if state.players.remove(&player_id).is_none() {
                return;
            }
            state.broadcast(&ServerMsg::PlayerLeave { player_id });
            state.players.is_empty()
        };

        info!(session_id = %self.id, player_id = %player_id, "Player left session");

        if now_empty {
            self.stop();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().players.is_empty()
    }

    pub fn player_count(&self) -> usize {
        self.state.lock().players.len()
    }

    /// Apply an inbound client message immediately, outside the tick
    /// boundary
    pub fn handle_client_message(&self, player_id: Uuid, msg: ClientMsg) {
        match msg {
            ClientMsg::PositionBatch { updates } => {
                let mut state = self.state.lock();
                let Some(player) = state.players.get_mut(&player_id) else {
                    debug!(session_id = %self.id, player_id = %player_id, "Movement for unknown player");
                    return;
                };
                for update in updates {
                    let dt_secs =
                        update.timestamp.saturating_sub(player.last_update_ms) as f32 / 1_000.0;
                    match movement::validate(&player.position, &update, dt_secs) {
                        Verdict::Accept | Verdict::AcceptResetBaseline => {
                            player.position = update.position;
                            player.rotation = update.rotation;
                            player.velocity = update.velocity;
                            player.last_update_ms = update.timestamp;
                        }
                        Verdict::Reject(reason) => {
                            debug!(
                                session_id = %self.id,
                                player_id = %player_id,
                                reason = ?reason,
                                "Movement update rejected"
                            );
                        }
                    }
                }
            }
            ClientMsg::Fire {
                ray_origin,
                ray_dir,
                weapon_id,
                ..
            } => {
                let mut state = self.state.lock();
                let Some(player) = state.players.get_mut(&player_id) else {
                    debug!(session_id = %self.id, player_id = %player_id, "Fire from unknown player");
                    return;
                };
                if !player.alive {
                    return;
                }
                player.weapon_id = weapon_id;

                state.projectile_seq += 1;
                let seq = state.projectile_seq;
                let projectile =
                    Projectile::new(seq, player_id, ray_origin, ray_dir, unix_millis());
                state.projectiles.push(projectile);
            }
        }
    }

    /// Run one simulation tick: advance the lifecycle, simulate
    /// projectiles while active, record history, broadcast a snapshot.
    /// Deterministic in `now_ms` for testing.
    pub fn tick(self: &Arc<Self>, now_ms: u64) {
        let deaths = {
            let mut state = self.state.lock();
            state.tick += 1;
            let tick = state.tick;

            let mut events = {
                let SessionState {
                    ref mut clock,
                    ref mut players,
                    ..
                } = *state;
                lifecycle::advance(clock, players, now_ms)
            };

            let mut deaths = Vec::new();
            if state.clock.phase == MatchPhase::Active {
                let SessionState {
                    ref mut projectiles,
                    ref mut players,
                    ..
                } = *state;
                let outcome = projectile::simulate(projectiles, players, now_ms, tick_delta());
                events.extend(outcome.events);
                deaths = outcome.deaths;
            }

            let poses: Vec<PlayerPose> = state
                .players
                .values()
                .map(|p| PlayerPose {
                    player_id: p.id,
                    position: p.position,
                    rotation: p.rotation,
                })
                .collect();
            state.history.record(HistoryFrame {
                tick,
                timestamp: now_ms,
                poses,
            });

            for event in &events {
                state.broadcast(event);
            }
            let snapshot = snapshot::build(
                tick,
                now_ms,
                &state.players,
                &state.projectiles,
                &state.clock,
            );
            state.broadcast(&snapshot);

            deaths
        };

        for victim_id in deaths {
            self.schedule_respawn(victim_id);
        }
    }

    /// One-shot respawn timer; no-ops if the player disconnected before
    /// it fires
    fn schedule_respawn(self: &Arc<Self>, player_id: Uuid) {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(RESPAWN_DELAY_MS)).await;
            session.apply_respawn(player_id);
        });
    }

    /// Restore a dead player at a fresh spawn point with full health and
    /// a new protection window
    pub(crate) fn apply_respawn(&self, player_id: Uuid) {
        let mut state = self.state.lock();
        let spawn = select_spawn(&state.living_positions_except(player_id));
        let now = unix_millis();

        let Some(player) = state.players.get_mut(&player_id) else {
            debug!(session_id = %self.id, player_id = %player_id, "Respawn for departed player");
            return;
        };
        if player.alive {
            warn!(session_id = %self.id, player_id = %player_id, "Respawn for living player");
            return;
        }

        player.health = MAX_HEALTH;
        player.alive = true;
        player.position = spawn;
        player.velocity = Vec3::ZERO;
        player.protected_until_ms = now + SPAWN_PROTECTION_MS;

        state.broadcast(&ServerMsg::Respawn {
            player_id,
            position: spawn,
        });
    }

    /// Start the fixed-rate tick loop
    pub fn start(self: &Arc<Self>) {
        let mut task = self.tick_task.lock();
        if task.is_some() {
            return;
        }

        let session = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            let mut tick_interval = interval(Duration::from_micros(TICK_DURATION_MICROS));
            tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tick_interval.tick().await;
                session.tick(unix_millis());
            }
        }));

        info!(session_id = %self.id, "Tick loop started");
    }

    /// Stop the tick loop (restarted if a player rejoins)
    pub fn stop(&self) {
        if let Some(task) = self.tick_task.lock().take() {
            task.abort();
            info!(session_id = %self.id, "Tick loop stopped");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(task) = self.tick_task.lock().take() {
            task.abort();
        }
    }
}
