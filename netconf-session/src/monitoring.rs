//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! RFC 6022 `ietf-netconf-monitoring` `sessions` subtree builder
//! (`spec.md` §4.F "Counters", §6 "Monitoring").

use netconf_xml::document::{Document, NodeId};

use crate::session::SessionRegistry;

const NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring";

/// Builds the `<sessions>` subtree listing every live session, as exposed
/// by the built-in monitoring RPC handler.
pub fn build_sessions(doc: &mut Document, registry: &SessionRegistry) -> NodeId {
    let sessions = doc.new_element("sessions", None, None);
    let xmlns = doc.new_attribute("xmlns", None, NAMESPACE, sessions);
    doc.append_child(sessions, xmlns);

    for session in registry.snapshot() {
        let entry = doc.new_element("session", None, Some(sessions));
        doc.append_child(sessions, entry);

        append_leaf(doc, entry, "session-id", &session.session_id.to_string());
        append_leaf(doc, entry, "transport", &session.transport);
        append_leaf(doc, entry, "username", &session.peer_username);
        append_leaf(doc, entry, "source-host", &session.peer_address);
        append_leaf(
            doc,
            entry,
            "login-time",
            &session.established_at.to_rfc3339(),
        );
        append_leaf(doc, entry, "in-rpcs", &session.counters.in_rpcs.to_string());
        append_leaf(
            doc,
            entry,
            "in-bad-rpcs",
            &session.counters.in_bad_rpcs.to_string(),
        );
        append_leaf(
            doc,
            entry,
            "out-rpc-errors",
            &session.counters.out_rpc_errors.to_string(),
        );
        append_leaf(
            doc,
            entry,
            "out-notifications",
            &session.counters.out_notifications.to_string(),
        );
    }

    sessions
}

fn append_leaf(doc: &mut Document, parent: NodeId, name: &str, text: &str) {
    let leaf = doc.new_element(name, None, Some(parent));
    doc.append_child(parent, leaf);
    let body = doc.new_body(text.to_string(), leaf);
    doc.append_child(leaf, body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use netconf_utils::clock::SystemClock;
    use std::sync::Arc;

    #[test]
    fn builds_one_entry_per_live_session() {
        let mut registry = SessionRegistry::new(Arc::new(SystemClock));
        registry.register("10.0.0.1", "tcp", "alice");
        registry.register("10.0.0.2", "tcp", "bob");

        let mut doc = Document::new();
        let sessions = build_sessions(&mut doc, &registry);
        let entries: Vec<_> = doc.element_children(sessions).collect();
        assert_eq!(entries.len(), 2);
        for entry in entries {
            assert!(doc.find_element_child(entry, "session-id").is_some());
            assert!(doc.find_element_child(entry, "username").is_some());
        }
    }
}
