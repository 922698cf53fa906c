//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::geometry::Vec3;

/// Client-reported view rotation (yaw around Y, pitch around X)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Rotation {
    /// Yaw in radians
    pub x: f32,
    /// Pitch in radians
    pub y: f32,
}

/// A single client movement sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementUpdate {
    pub position: Vec3,
    pub rotation: Rotation,
    pub velocity: Vec3,
    /// Client timestamp in milliseconds
    pub timestamp: u64,
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Small ordered batch of movement samples, validated in order
    PositionBatch { updates: Vec<MovementUpdate> },

    /// Fire a projectile along the reported view ray
    Fire {
        timestamp: u64,
        ray_origin: Vec3,
        ray_dir: Vec3,
        weapon_id: String,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Sent privately to a newly joined client
    Welcome {
        player_id: Uuid,
        player_name: String,
    },

    /// Full world state, broadcast every tick to all members
    Snapshot {
        tick: u64,
        timestamp: u64,
        players: Vec<PlayerSnapshot>,
        projectiles: Vec<ProjectileSnapshot>,
        match_state: MatchStateView,
        /// Milliseconds left on the match clock, present while active
        #[serde(skip_serializing_if = "Option::is_none")]
        match_time_remaining: Option<u64>,
    },

    PlayerJoin {
        player_id: Uuid,
        player_name: String,
    },

    PlayerLeave {
        player_id: Uuid,
    },

    /// Sent on every hit, lethal or not
    Damage {
        victim_id: Uuid,
        attacker_id: Uuid,
        damage: f32,
        weapon_id: String,
        new_health: f32,
    },

    Death {
        victim_id: Uuid,
        killer_id: Uuid,
        weapon_id: String,
    },

    Respawn {
        player_id: Uuid,
        position: Vec3,
    },

    MatchCountdown {
        /// Countdown length in seconds
        countdown: u64,
    },

    MatchStart {
        /// Match length in seconds
        duration: u64,
        start_time: u64,
        end_time: u64,
    },

    MatchEnd {
        winner_id: Uuid,
        winner_name: String,
        scoreboard: Vec<ScoreboardEntry>,
    },
}

/// Match phase as seen on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStateView {
    Waiting,
    Countdown,
    Active,
    Finished,
}

/// Player state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: Uuid,
    pub position: Vec3,
    pub rotation: Rotation,
    pub velocity: Vec3,
    /// Health (0-100)
    pub health: f32,
    pub alive: bool,
    pub weapon_id: String,
    pub kills: u32,
    pub deaths: u32,
}

/// Projectile state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub id: String,
    pub owner_id: Uuid,
    pub position: Vec3,
    pub velocity: Vec3,
    pub created_at: u64,
    /// Remaining lifetime in seconds
    pub lifetime: f32,
}

/// One row of the end-of-match scoreboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreboardEntry {
    pub player_id: Uuid,
    pub player_name: String,
    pub kills: u32,
    pub deaths: u32,
    /// 1-based placement, kills descending
    pub placement: u32,
}
