//! Rolling history of per-tick player poses
//!
//! Recorded every tick so recent positions can be looked up by tick
//! number (e.g. for latency-aware queries). Not consulted by the damage
//! path, which resolves hits against current positions.

use std::collections::VecDeque;

use uuid::Uuid;

use crate::game::geometry::Vec3;
use crate::ws::protocol::Rotation;

/// Number of ticks retained (~1 second at 30 TPS)
pub const HISTORY_CAPACITY: usize = 30;

/// One player's pose at a given tick
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct PlayerPose {
    pub player_id: Uuid,
    pub position: Vec3,
    pub rotation: Rotation,
}

/// One tick's worth of poses
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct HistoryFrame {
    pub tick: u64,
    pub timestamp: u64,
    pub poses: Vec<PlayerPose>,
}

/// Bounded ring of recent frames; oldest discarded at capacity
#[derive(Debug, Default)]
pub struct PositionHistory {
    frames: VecDeque<HistoryFrame>,
}

impl PositionHistory {
    pub fn new() -> Self {
        Self {
            frames: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn record(&mut self, frame: HistoryFrame) {
        if self.frames.len() == HISTORY_CAPACITY {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Frame for an exact tick, if still retained
    #[allow(dead_code)]
    pub fn frame_at(&self, tick: u64) -> Option<&HistoryFrame> {
        self.frames.iter().find(|f| f.tick == tick)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
