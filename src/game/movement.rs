//! Movement validation - client-authoritative positions with sanity bounds
//!
//! The server never simulates player motion; it accepts client-reported
//! positions that pass arena-bounds, speed and displacement checks, and
//! silently drops the rest.

use crate::game::geometry::{Vec3, ARENA_BOUNDS};
use crate::ws::protocol::MovementUpdate;

/// Maximum allowed player speed in units per second
pub const MAX_PLAYER_SPEED: f32 = 20.0;

/// Maximum allowed displacement in a single update ("teleport" bound)
pub const MAX_TELEPORT_DISTANCE: f32 = 5.0;

/// If more time than this passed since the last accepted update, the
/// client was lagging; accept and reset the timestamp baseline instead
/// of rejecting everything after a gap.
pub const MAX_UPDATE_INTERVAL_SECS: f32 = 2.0;

/// Outcome of validating one movement sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Apply position, rotation, velocity and advance the timestamp
    Accept,
    /// Apply unconditionally, but only because the baseline went stale
    AcceptResetBaseline,
    /// Drop this sample, keep prior state
    Reject(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    OutOfBounds,
    TooFast,
    Teleport,
}

/// Validate a single movement sample against the previous accepted state.
/// `dt_secs` is the elapsed time since the last accepted update.
pub fn validate(prev_position: &Vec3, update: &MovementUpdate, dt_secs: f32) -> Verdict {
    if !ARENA_BOUNDS.contains(&update.position) {
        return Verdict::Reject(RejectReason::OutOfBounds);
    }

    if dt_secs > MAX_UPDATE_INTERVAL_SECS {
        return Verdict::AcceptResetBaseline;
    }

    let distance = update.position.distance(prev_position);
    if distance > MAX_TELEPORT_DISTANCE {
        return Verdict::Reject(RejectReason::Teleport);
    }

    let dt = dt_secs.max(1e-3);
    if distance / dt > MAX_PLAYER_SPEED {
        return Verdict::Reject(RejectReason::TooFast);
    }

    Verdict::Accept
}
