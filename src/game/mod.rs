//! Game simulation modules

pub mod geometry;
pub mod history;
pub mod lifecycle;
pub mod movement;
pub mod projectile;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod spawn;

pub use registry::SessionRegistry;
pub use session::Session;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::util::time::unix_millis;
use crate::ws::protocol::{Rotation, ServerMsg};
use geometry::Vec3;

/// Maximum player health
pub const MAX_HEALTH: f32 = 100.0;

/// Invulnerability window granted on (re)spawn, in milliseconds
pub const SPAWN_PROTECTION_MS: u64 = 3_000;

/// Delay before a dead player respawns, in milliseconds
pub const RESPAWN_DELAY_MS: u64 = 3_000;

/// Outbound handle for one client; sends are best-effort and never block
pub type ClientTx = mpsc::UnboundedSender<ServerMsg>;

/// Player state in a session (authoritative for combat, client-reported
/// for movement)
#[derive(Debug)]
pub struct Player {
    pub id: Uuid,
    pub name: String,

    // Client-reported pose, subject to movement validation
    pub position: Vec3,
    pub rotation: Rotation,
    pub velocity: Vec3,

    // Combat (server-authoritative)
    pub health: f32,
    pub alive: bool,
    pub weapon_id: String,
    pub kills: u32,
    pub deaths: u32,
    /// Invulnerable to hits while now < this
    pub protected_until_ms: u64,

    /// Baseline for movement dt computation
    pub last_update_ms: u64,

    /// Outbound transport handle; the session does not own the connection
    pub tx: ClientTx,
}

impl Player {
    pub fn new(id: Uuid, name: String, spawn: Vec3, tx: ClientTx) -> Self {
        let now = unix_millis();
        Self {
            id,
            name,
            position: spawn,
            rotation: Rotation::default(),
            velocity: Vec3::ZERO,
            health: MAX_HEALTH,
            alive: true,
            weapon_id: "rifle".to_string(),
            kills: 0,
            deaths: 0,
            protected_until_ms: now + SPAWN_PROTECTION_MS,
            last_update_ms: now,
            tx,
        }
    }

    pub fn is_protected(&self, now_ms: u64) -> bool {
        now_ms < self.protected_until_ms
    }

    /// Best-effort send; a closed socket behaves like a disconnect and is
    /// handled by the normal removal path
    pub fn send(&self, msg: &ServerMsg) {
        let _ = self.tx.send(msg.clone());
    }
}
