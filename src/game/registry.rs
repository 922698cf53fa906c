//! Registry of live sessions
//!
//! Maps an external session id to its Session, creating one on first
//! connection. Empty sessions are swept after a grace delay so reconnect
//! races do not tear down and recreate state.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;
use uuid::Uuid;

use crate::game::Session;
use crate::ws::protocol::ServerMsg;

/// Session id used when a connection names no target session
pub const DEFAULT_SESSION: &str = "default";

/// Grace period before an empty session is destroyed
pub const EMPTY_SWEEP_DELAY_MS: u64 = 10_000;

pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|s| s.value().clone())
    }

    pub fn get_or_create(&self, id: &str) -> Arc<Session> {
        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                info!(session_id = %id, "Creating session");
                Session::new(id.to_string())
            })
            .value()
            .clone()
    }

    /// Register a new inbound connection: create or reuse the session,
    /// mint a player identity, and join
    pub fn connect(
        &self,
        session_id: &str,
        name: Option<String>,
        tx: UnboundedSender<ServerMsg>,
    ) -> (Arc<Session>, Uuid) {
        let session = self.get_or_create(session_id);
        let player_id = Uuid::new_v4();
        let name = name.unwrap_or_else(|| format!("Player_{}", &player_id.to_string()[..8]));
        session.add_player(player_id, name, tx);
        (session, player_id)
    }

    /// Handle a disconnect and schedule the empty-session sweep
    pub fn disconnect(self: &Arc<Self>, session_id: &str, player_id: Uuid) {
        if let Some(session) = self.get(session_id) {
            session.remove_player(player_id);
            if session.is_empty() {
                self.schedule_sweep(session_id.to_string());
            }
        }
    }

    /// Idempotent delayed sweep: the session is only removed if it is
    /// still empty when the timer fires, absorbing reconnect races
    fn schedule_sweep(self: &Arc<Self>, session_id: String) {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(EMPTY_SWEEP_DELAY_MS)).await;
            registry.sweep(&session_id);
        });
    }

    pub(crate) fn sweep(&self, session_id: &str) {
        let removed = self
            .sessions
            .remove_if(session_id, |_, session| session.is_empty());
        if let Some((id, session)) = removed {
            session.stop();
            info!(session_id = %id, "Swept empty session");
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn total_players(&self) -> usize {
        self.sessions.iter().map(|s| s.value().player_count()).sum()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
