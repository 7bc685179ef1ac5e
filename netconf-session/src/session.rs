//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Session state machine and registry (`spec.md` §3 "Session entry",
//! §4.F "States"/"Counters").

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use netconf_utils::session_id::SessionIdAllocator;
use netconf_utils::Clock;

use crate::debug::Debug as SessionDebug;

/// `INIT → HELLO_WAIT → (capabilities exchanged) → RUNNING → CLOSING →
/// CLOSED` (`spec.md` §4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    HelloWait,
    Running,
    Closing,
    Closed,
}

/// Per-session RPC counters, flushed to the monitoring state tree on close
/// (`spec.md` §3).
#[derive(Debug, Default, Clone, Copy)]
pub struct Counters {
    pub in_rpcs: u64,
    pub in_bad_rpcs: u64,
    pub out_rpc_errors: u64,
    pub out_notifications: u64,
}

/// A live session's bookkeeping record (`spec.md` §3 "Session entry").
#[derive(Debug)]
pub struct Session {
    pub session_id: u32,
    pub peer_address: String,
    pub transport: String,
    pub peer_username: String,
    pub established_at: DateTime<Utc>,
    pub state: State,
    pub counters: Counters,
}

impl Session {
    pub fn new(
        session_id: u32,
        peer_address: impl Into<String>,
        transport: impl Into<String>,
        peer_username: impl Into<String>,
        clock: &dyn Clock,
    ) -> Session {
        Session {
            session_id,
            peer_address: peer_address.into(),
            transport: transport.into(),
            peer_username: peer_username.into(),
            established_at: clock.now_wall(),
            state: State::Init,
            counters: Counters::default(),
        }
    }

    pub fn set_state(&mut self, new: State) {
        let old = self.state;
        if old != new {
            SessionDebug::StateChange(old, new).log();
            self.state = new;
        }
    }
}

/// Owns session-id allocation and the live session table, mutated only from
/// reactor callbacks (`spec.md` §5 "Shared resources").
#[derive(Debug)]
pub struct SessionRegistry {
    allocator: SessionIdAllocator,
    sessions: HashMap<u32, Session>,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> SessionRegistry {
        SessionRegistry {
            allocator: SessionIdAllocator::new(),
            sessions: HashMap::new(),
            clock,
        }
    }

    pub fn register(
        &mut self,
        peer_address: impl Into<String>,
        transport: impl Into<String>,
        peer_username: impl Into<String>,
    ) -> u32 {
        let session_id = self.allocator.allocate();
        let session = Session::new(
            session_id,
            peer_address,
            transport,
            peer_username,
            self.clock.as_ref(),
        );
        self.sessions.insert(session_id, session);
        session_id
    }

    pub fn unregister(&mut self, session_id: u32) -> Option<Session> {
        let removed = self.sessions.remove(&session_id);
        if removed.is_some() {
            SessionDebug::SessionClosed(session_id).log();
        }
        removed
    }

    pub fn get(&self, session_id: u32) -> Option<&Session> {
        self.sessions.get(&session_id)
    }

    pub fn get_mut(&mut self, session_id: u32) -> Option<&mut Session> {
        self.sessions.get_mut(&session_id)
    }

    /// All live sessions, for the monitoring handler (`spec.md` §4.F
    /// "Counters").
    pub fn snapshot(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netconf_utils::clock::SystemClock;

    #[test]
    fn register_assigns_monotonic_ids_and_unregister_removes() {
        let mut registry = SessionRegistry::new(Arc::new(SystemClock));
        let a = registry.register("10.0.0.1", "tcp", "alice");
        let b = registry.register("10.0.0.2", "tcp", "bob");
        assert_ne!(a, b);
        assert!(registry.get(a).is_some());
        let removed = registry.unregister(a);
        assert!(removed.is_some());
        assert!(registry.get(a).is_none());
        assert!(registry.get(b).is_some());
    }

    #[test]
    fn state_transitions_follow_the_session_lifecycle() {
        let mut registry = SessionRegistry::new(Arc::new(SystemClock));
        let id = registry.register("10.0.0.1", "tcp", "alice");
        let session = registry.get_mut(id).unwrap();
        assert_eq!(session.state, State::Init);
        session.set_state(State::HelloWait);
        session.set_state(State::Running);
        assert_eq!(session.state, State::Running);
    }
}
