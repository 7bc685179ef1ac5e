//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The base NETCONF operations every server must support regardless of
//! which datastore backend is wired in (`spec.md` §6 "Supported
//! operations"), plus the built-in `ietf-netconf-monitoring` handlers
//! (`SPEC_FULL.md` §4.F / "SUPPLEMENTED FEATURES" §3).

use std::sync::{Arc, Mutex};

use netconf_xml::document::{Document, NodeId};
use netconf_session::monitoring;
use netconf_session::rpc::RpcHandler;
use netconf_session::rpc_error::{Outcome, RpcError};
use netconf_session::session::{Session, SessionRegistry};
use netconf_yang::YangSpec;

pub const BASE_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";
pub const MONITORING_NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring";

/// `<close-session>` (`spec.md` §4.F "RPC loop"): an empty `<rpc-reply>`
/// body, with the session close itself driven by the reactor checking the
/// operation name.
pub struct CloseSession;

impl RpcHandler for CloseSession {
    fn invoke(
        &self,
        _session: &mut Session,
        _doc: &mut Document,
        _operation: NodeId,
    ) -> Outcome<Vec<NodeId>> {
        Outcome::Ok(Vec::new())
    }
}

/// `<get>` (`SPEC_FULL.md` §4.F "Monitoring"): always returns the
/// `ietf-netconf-monitoring` `sessions` subtree under `<data>`. Filters on
/// other subtrees aren't supported, since this core has no other backend
/// wired in.
pub struct GetMonitoring {
    registry: Arc<Mutex<SessionRegistry>>,
}

impl GetMonitoring {
    pub fn new(registry: Arc<Mutex<SessionRegistry>>) -> GetMonitoring {
        GetMonitoring { registry }
    }
}

impl RpcHandler for GetMonitoring {
    fn invoke(
        &self,
        _session: &mut Session,
        doc: &mut Document,
        operation: NodeId,
    ) -> Outcome<Vec<NodeId>> {
        let data = doc.new_element("data", None, Some(operation));
        let sessions = {
            let registry = self.registry.lock().unwrap();
            monitoring::build_sessions(doc, &registry)
        };
        doc.set_parent(sessions, data);
        doc.append_child(data, sessions);
        Outcome::Ok(vec![data])
    }
}

/// `<get-schema>` (RFC 6022 §3.1): returns the raw source text of a
/// `(identifier, version)` pair already loaded into the `YangSpec`.
/// `version` is accepted but ignored — the loader keeps only one copy of
/// each module.
pub struct GetSchema {
    yang: Arc<YangSpec>,
}

impl GetSchema {
    pub fn new(yang: Arc<YangSpec>) -> GetSchema {
        GetSchema { yang }
    }
}

impl RpcHandler for GetSchema {
    fn invoke(
        &self,
        _session: &mut Session,
        doc: &mut Document,
        operation: NodeId,
    ) -> Outcome<Vec<NodeId>> {
        let identifier = doc
            .find_element_child(operation, "identifier")
            .map(|id| doc.body_text(id));
        let identifier = match identifier {
            Some(identifier) if !identifier.is_empty() => identifier,
            _ => {
                return Outcome::Soft(
                    RpcError::application("invalid-value")
                        .with_message("get-schema requires an <identifier>"),
                )
            }
        };

        match self.yang.source_text(&identifier) {
            Some(text) => {
                let data = doc.new_element("data", None, Some(operation));
                let body = doc.new_body(text.to_string(), data);
                doc.append_child(data, body);
                Outcome::Ok(vec![data])
            }
            None => Outcome::Soft(
                RpcError::application("invalid-value")
                    .with_message(format!("no loaded schema named '{identifier}'")),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use netconf_utils::clock::SystemClock;
    use netconf_yang::loader;

    use super::*;

    #[test]
    fn get_monitoring_returns_data_wrapped_sessions() {
        let registry = Arc::new(Mutex::new(SessionRegistry::new(Arc::new(SystemClock))));
        registry.lock().unwrap().register("10.0.0.1", "tcp", "alice");

        let mut doc = Document::new();
        let operation = doc.new_element("get", None, None);
        let mut session = Session::new(1, "10.0.0.1", "tcp", "alice", &SystemClock);

        let handler = GetMonitoring::new(registry);
        match handler.invoke(&mut session, &mut doc, operation) {
            Outcome::Ok(nodes) => {
                assert_eq!(nodes.len(), 1);
                let data = nodes[0];
                assert_eq!(doc.node(data).local_name(), Some("data"));
                let sessions = doc.find_element_child(data, "sessions").unwrap();
                assert_eq!(doc.element_children(sessions).count(), 1);
            }
            _ => panic!("expected Ok"),
        }
    }

    #[test]
    fn get_schema_returns_source_text_for_known_module() {
        let mut spec = YangSpec::default();
        loader::load_str(&mut spec, "module m { namespace \"urn:m\"; prefix m; }").unwrap();

        let mut doc = Document::new();
        let operation = doc.new_element("get-schema", None, None);
        let identifier = doc.new_element("identifier", None, Some(operation));
        doc.append_child(operation, identifier);
        let body = doc.new_body("m", identifier);
        doc.append_child(identifier, body);

        let mut session = Session::new(1, "10.0.0.1", "tcp", "alice", &SystemClock);
        let handler = GetSchema::new(Arc::new(spec));
        match handler.invoke(&mut session, &mut doc, operation) {
            Outcome::Ok(nodes) => {
                let data = nodes[0];
                assert!(doc.body_text(data).contains("module m"));
            }
            _ => panic!("expected Ok"),
        }
    }

    #[test]
    fn get_schema_rejects_unknown_module() {
        let mut doc = Document::new();
        let operation = doc.new_element("get-schema", None, None);
        let identifier = doc.new_element("identifier", None, Some(operation));
        doc.append_child(operation, identifier);
        let body = doc.new_body("no-such-module", identifier);
        doc.append_child(identifier, body);

        let mut session = Session::new(1, "10.0.0.1", "tcp", "alice", &SystemClock);
        let handler = GetSchema::new(Arc::new(YangSpec::default()));
        match handler.invoke(&mut session, &mut doc, operation) {
            Outcome::Soft(err) => assert_eq!(err.error_tag, "invalid-value"),
            _ => panic!("expected Soft"),
        }
    }
}
