//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{debug, debug_span, trace, trace_span};

use crate::session::State;

#[derive(Debug)]
pub enum Debug<'a> {
    HelloSent(u32),
    HelloReceived(&'a [String]),
    StateChange(State, State),
    RpcReceived(&'a str, &'a str),
    RpcReply(&'a str),
    RpcError(&'a str, &'a str),
    RpcDeadlineExceeded(&'a str),
    MalformedEnvelope(&'a str),
    IdleTimeout,
    SessionClosed(u32),
}

impl<'a> Debug<'a> {
    pub fn log(&self) {
        match self {
            Debug::HelloSent(session_id) => {
                debug_span!("session").in_scope(|| debug!(session_id, "{}", self));
            }
            Debug::HelloReceived(capabilities) => {
                debug_span!("session")
                    .in_scope(|| debug!(?capabilities, "{}", self));
            }
            Debug::StateChange(old, new) => {
                debug_span!("session").in_scope(|| debug!(?old, ?new, "{}", self));
            }
            Debug::RpcReceived(namespace, name) => {
                trace_span!("session")
                    .in_scope(|| trace!(%namespace, %name, "{}", self));
            }
            Debug::RpcReply(message_id) => {
                trace_span!("session").in_scope(|| trace!(%message_id, "{}", self));
            }
            Debug::RpcError(message_id, tag) => {
                debug_span!("session")
                    .in_scope(|| debug!(%message_id, %tag, "{}", self));
            }
            Debug::RpcDeadlineExceeded(name) => {
                debug_span!("session").in_scope(|| debug!(%name, "{}", self));
            }
            Debug::MalformedEnvelope(reason) => {
                debug_span!("session").in_scope(|| debug!(%reason, "{}", self));
            }
            Debug::IdleTimeout => {
                debug_span!("session").in_scope(|| debug!("{}", self));
            }
            Debug::SessionClosed(session_id) => {
                debug_span!("session").in_scope(|| debug!(session_id, "{}", self));
            }
        }
    }
}

impl<'a> std::fmt::Display for Debug<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::HelloSent(..) => write!(f, "sent hello"),
            Debug::HelloReceived(..) => write!(f, "received hello"),
            Debug::StateChange(..) => write!(f, "session state changed"),
            Debug::RpcReceived(..) => write!(f, "received rpc"),
            Debug::RpcReply(..) => write!(f, "sent rpc-reply"),
            Debug::RpcError(..) => write!(f, "sent rpc-error"),
            Debug::RpcDeadlineExceeded(..) => write!(f, "rpc exceeded its processing deadline"),
            Debug::MalformedEnvelope(..) => write!(f, "rejected malformed rpc envelope"),
            Debug::IdleTimeout => write!(f, "idle timeout expired"),
            Debug::SessionClosed(..) => write!(f, "session closed"),
        }
    }
}
