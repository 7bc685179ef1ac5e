//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Per-session event loop (`spec.md` §4.F "RPC loop", §5 "Concurrency &
//! resource model").
//!
//! Grounded on the reactor pattern in `holo-protocol`'s `event_loop`: one
//! `tokio::select!` per session with a fixed, enumerated set of suspension
//! points. Unlike the teacher, there is no cross-instance event aggregator
//! here — each NETCONF session is already its own task, so the `select!`
//! arms are the session's own socket and timers directly.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::sleep;

use netconf_xml::document::{Document, Node, NodeId};
use netconf_xml::namespace;

use crate::debug::Debug as SessionDebug;
use crate::error::Error;
use crate::framing::{Framing, FramingMode};
use crate::hello::{self, BASE_1_1};
use crate::rpc::RpcRegistry;
use crate::rpc_error::{Outcome, RpcError};
use crate::session::{Session, SessionRegistry, State};

/// Static configuration shared by every session spawned on the reactor
/// (`spec.md` §5 "Shared resources": "the YANG spec set is read-only after
/// load; all sessions share it by reference").
pub struct ReactorConfig {
    pub capabilities: Vec<String>,
    pub idle_timeout: Duration,
    pub rpc_deadline: Duration,
}

impl Default for ReactorConfig {
    fn default() -> ReactorConfig {
        ReactorConfig {
            capabilities: vec![hello::BASE_1_0.to_string(), BASE_1_1.to_string()],
            idle_timeout: Duration::from_secs(600),
            rpc_deadline: Duration::from_secs(30),
        }
    }
}

/// Runs one session to completion: hello negotiation, then the RPC loop,
/// until the peer closes the stream, a fatal protocol error occurs, or the
/// idle timer expires.
pub async fn run<S>(
    mut stream: S,
    registry: Arc<Mutex<SessionRegistry>>,
    rpc_registry: Arc<RpcRegistry>,
    config: &ReactorConfig,
    peer_address: impl Into<String>,
    transport: impl Into<String>,
    peer_username: impl Into<String>,
) -> Result<(), Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let session_id = {
        let mut registry = registry.lock().unwrap();
        registry.register(peer_address, transport, peer_username)
    };

    let result = run_negotiated(&mut stream, &registry, &rpc_registry, config, session_id).await;

    {
        let mut registry = registry.lock().unwrap();
        registry.unregister(session_id);
    }

    result
}

async fn run_negotiated<S>(
    stream: &mut S,
    registry: &Arc<Mutex<SessionRegistry>>,
    rpc_registry: &Arc<RpcRegistry>,
    config: &ReactorConfig,
    session_id: u32,
) -> Result<(), Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    set_state(registry, session_id, State::HelloWait);

    let mut framing = Framing::new();
    let greeting = hello::build(&config.capabilities, Some(session_id));
    framing
        .write_message(stream, FramingMode::Legacy, greeting.as_bytes())
        .await?;
    SessionDebug::HelloSent(session_id).log();

    let raw = framing
        .read_message(stream, FramingMode::Legacy)
        .await?
        .ok_or(Error::MissingBaseCapability)?;
    let text = String::from_utf8(raw)
        .map_err(|_| Error::MalformedMessage("hello was not valid UTF-8".to_string()))?;
    let peer_hello = hello::parse(&text)?;
    SessionDebug::HelloReceived(&peer_hello.capabilities).log();

    let mode = if peer_hello.has_base_1_1() && config.capabilities.iter().any(|c| c == BASE_1_1) {
        FramingMode::Chunked
    } else {
        FramingMode::Legacy
    };

    set_state(registry, session_id, State::Running);

    loop {
        let idle = sleep(config.idle_timeout);
        tokio::pin!(idle);

        tokio::select! {
            frame = framing.read_message(stream, mode) => {
                match frame? {
                    Some(bytes) => {
                        if !process_frame(stream, &mut framing, mode, registry, rpc_registry, config, session_id, &bytes).await? {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = &mut idle => {
                SessionDebug::IdleTimeout.log();
                break;
            }
        }
    }

    set_state(registry, session_id, State::Closing);
    set_state(registry, session_id, State::Closed);
    Ok(())
}

/// Handles one inbound frame. Returns `Ok(false)` when the session should
/// close (e.g. `close-session`).
async fn process_frame<S>(
    stream: &mut S,
    framing: &mut Framing,
    mode: FramingMode,
    registry: &Arc<Mutex<SessionRegistry>>,
    rpc_registry: &Arc<RpcRegistry>,
    config: &ReactorConfig,
    session_id: u32,
    bytes: &[u8],
) -> Result<bool, Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let text = String::from_utf8(bytes.to_vec())
        .map_err(|_| Error::MalformedMessage("frame was not valid UTF-8".to_string()))?;
    let (mut doc, rpc) = netconf_xml::parser::parse(&text)?;

    if doc.node(rpc).local_name() != Some("rpc") {
        return send_envelope_error(
            stream,
            framing,
            mode,
            registry,
            session_id,
            format!("expected <rpc>, got <{}>", doc.node(rpc).local_name().unwrap_or("?")),
        )
        .await;
    }

    let message_id = doc
        .attributes(rpc)
        .find(|a| doc.node(*a).local_name() == Some("message-id"))
        .map(|a| attribute_value(&doc, a));

    let operation = match doc.element_children(rpc).next() {
        Some(operation) => operation,
        None => {
            return send_envelope_error(
                stream,
                framing,
                mode,
                registry,
                session_id,
                "rpc has no operation child".to_string(),
            )
            .await;
        }
    };
    let op_local = doc
        .node(operation)
        .local_name()
        .unwrap_or_default()
        .to_string();
    let op_namespace = namespace::resolve_namespace(&doc, operation).unwrap_or_default();

    let mut reply_doc = Document::new();
    let reply = reply_doc.new_element("rpc-reply", None, None);
    reply_doc.set_root(reply);
    copy_attributes(&doc, rpc, &mut reply_doc, reply);

    let started = Instant::now();
    let outcome = {
        let mut registry = registry.lock().unwrap();
        let session = registry
            .get_mut(session_id)
            .expect("session exists while its own reactor loop runs");
        session.counters.in_rpcs += 1;
        rpc_registry.dispatch(session, &mut doc, &op_namespace, &op_local, operation)
    };
    let outcome = if started.elapsed() > config.rpc_deadline {
        SessionDebug::RpcDeadlineExceeded(&op_local).log();
        Outcome::Soft(
            RpcError::application("operation-failed")
                .with_message(format!("{op_local} exceeded the {:?} RPC deadline", config.rpc_deadline)),
        )
    } else {
        outcome
    };

    let mut should_close = false;
    match outcome {
        Outcome::Ok(result_nodes) => {
            for node in result_nodes {
                graft(&doc, node, &mut reply_doc, reply);
            }
            if op_local == "close-session" {
                should_close = true;
            }
            if let Some(message_id) = &message_id {
                SessionDebug::RpcReply(message_id).log();
            }
        }
        Outcome::Soft(rpc_error) => {
            {
                let mut registry = registry.lock().unwrap();
                if let Some(session) = registry.get_mut(session_id) {
                    session.counters.in_bad_rpcs += 1;
                    session.counters.out_rpc_errors += 1;
                }
            }
            if let Some(message_id) = &message_id {
                SessionDebug::RpcError(message_id, rpc_error.error_tag).log();
            }
            rpc_error.append_to(&mut reply_doc, reply);
        }
        Outcome::Hard(error) => return Err(error),
    }

    let body = netconf_xml::encode::to_string(&reply_doc, reply, netconf_xml::encode::DEPTH_UNBOUNDED, true);
    framing.write_message(stream, mode, body.as_bytes()).await?;

    Ok(!should_close)
}

/// Replies with a `malformed-message` `<rpc-error>` for an envelope whose
/// XML was well-formed but whose shape wasn't a valid `<rpc>` (`spec.md`
/// §7: "fatal for the session after emitting `<rpc-error>` if possible").
/// The session always closes afterwards, since there is no RPC to keep
/// dispatching against.
async fn send_envelope_error<S>(
    stream: &mut S,
    framing: &mut Framing,
    mode: FramingMode,
    registry: &Arc<Mutex<SessionRegistry>>,
    session_id: u32,
    reason: String,
) -> Result<bool, Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    {
        let mut registry = registry.lock().unwrap();
        if let Some(session) = registry.get_mut(session_id) {
            session.counters.in_bad_rpcs += 1;
            session.counters.out_rpc_errors += 1;
        }
    }
    SessionDebug::MalformedEnvelope(&reason).log();

    let mut reply_doc = Document::new();
    let reply = reply_doc.new_element("rpc-reply", None, None);
    reply_doc.set_root(reply);
    RpcError::protocol("malformed-message")
        .with_message(reason)
        .append_to(&mut reply_doc, reply);

    let body = netconf_xml::encode::to_string(&reply_doc, reply, netconf_xml::encode::DEPTH_UNBOUNDED, true);
    framing.write_message(stream, mode, body.as_bytes()).await?;

    Ok(false)
}

fn attribute_value(doc: &Document, id: NodeId) -> String {
    match doc.node(id) {
        Node::Attribute { value, .. } => value.clone(),
        _ => String::new(),
    }
}

/// Copies every attribute of `src` onto `dst`, byte-identical, so that
/// reply envelopes echo the request verbatim (`spec.md` §8 invariant 5).
fn copy_attributes(src_doc: &Document, src: NodeId, dst_doc: &mut Document, dst: NodeId) {
    for attr in src_doc.attributes(src) {
        if let Node::Attribute { name, prefix, value } = src_doc.node(attr) {
            let copied = dst_doc.new_attribute(name.clone(), prefix.clone(), value.clone(), dst);
            dst_doc.append_child(dst, copied);
        }
    }
}

/// Deep-copies `src` (from a handler's scratch document) as a child of
/// `dst` in `dst_doc`.
fn graft(src_doc: &Document, src: NodeId, dst_doc: &mut Document, dst: NodeId) {
    match src_doc.node(src) {
        Node::Element { name, prefix, .. } => {
            let copied = dst_doc.new_element(name.clone(), prefix.clone(), Some(dst));
            dst_doc.append_child(dst, copied);
            for attr in src_doc.attributes(src) {
                graft(src_doc, attr, dst_doc, copied);
            }
            for child in src_doc.element_children(src) {
                graft(src_doc, child, dst_doc, copied);
            }
        }
        Node::Attribute { name, prefix, value } => {
            let copied = dst_doc.new_attribute(name.clone(), prefix.clone(), value.clone(), dst);
            dst_doc.append_child(dst, copied);
        }
        Node::Body { text } => {
            let copied = dst_doc.new_body(text.clone(), dst);
            dst_doc.append_child(dst, copied);
        }
    }
}

fn set_state(registry: &Arc<Mutex<SessionRegistry>>, session_id: u32, state: State) {
    let mut registry = registry.lock().unwrap();
    if let Some(session) = registry.get_mut(session_id) {
        session.set_state(state);
    }
}
