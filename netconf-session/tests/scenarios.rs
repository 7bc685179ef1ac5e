//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! End-to-end scenarios spanning framing, hello negotiation, RPC dispatch,
//! binding, and validation (`spec.md` §8 "End-to-end scenarios" 2 and 3).
//!
//! These handlers are test-local stand-ins for the real `get-config`/
//! `edit-config` operations a deployment would register; the core itself
//! exposes the RPC handler registry as the seam and implements no
//! datastore (`SPEC_FULL.md` §1).

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use netconf_session::hello;
use netconf_session::reactor::{run, ReactorConfig};
use netconf_session::rpc::{RpcHandler, RpcRegistry};
use netconf_session::rpc_error::{Outcome, RpcError};
use netconf_session::session::{Session, SessionRegistry};
use netconf_utils::clock::SystemClock;
use netconf_xml::bind::{bind, BindMode, BindOptions};
use netconf_xml::document::{Document, NodeId};
use netconf_yang::loader::load_str;
use netconf_yang::YangSpec;

const BASE_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

struct GetConfig;

impl RpcHandler for GetConfig {
    fn invoke(&self, _session: &mut Session, doc: &mut Document, _operation: NodeId) -> Outcome<Vec<NodeId>> {
        let data = doc.new_element("data", None, None);
        let interfaces = doc.new_element("interfaces", None, Some(data));
        doc.append_child(data, interfaces);
        let interface = doc.new_element("interface", None, Some(interfaces));
        doc.append_child(interfaces, interface);
        let name = doc.new_element("name", None, Some(interface));
        doc.append_child(interface, name);
        let body = doc.new_body("eth0".to_string(), name);
        doc.append_child(name, body);
        Outcome::Ok(vec![data])
    }
}

/// Validates `<edit-config>`'s `<config>` payload against a YANG `port`
/// leaf; never mutates anything (`spec.md` §8 scenario 3: "No datastore
/// mutation").
struct EditConfig {
    spec: YangSpec,
}

const PORT_YANG: &str = r#"
    module test-port {
      namespace "urn:test:port";
      prefix "p";

      leaf port {
        type uint16;
      }
    }
"#;

impl EditConfig {
    fn new() -> EditConfig {
        let mut spec = YangSpec::default();
        load_str(&mut spec, PORT_YANG).unwrap();
        EditConfig { spec }
    }
}

impl RpcHandler for EditConfig {
    fn invoke(&self, _session: &mut Session, doc: &mut Document, operation: NodeId) -> Outcome<Vec<NodeId>> {
        let config = match doc.find_element_child(operation, "config") {
            Some(config) => config,
            None => return Outcome::Ok(Vec::new()),
        };

        bind(doc, config, &self.spec, BindMode::Top, BindOptions::default());
        let errors = netconf_validate::validate(doc, config, &self.spec);
        if let Some(error) = errors.into_iter().next() {
            return Outcome::Soft(
                RpcError::application("invalid-value").with_message(match error {
                    netconf_validate::ValidationError::InvalidValue { reason, .. } => reason,
                    netconf_validate::ValidationError::MissingMandatory { name, .. } => {
                        format!("missing mandatory leaf {name}")
                    }
                }),
            );
        }
        Outcome::Ok(Vec::new())
    }
}

async fn negotiate(client: &mut tokio::io::DuplexStream) {
    let mut buf = vec![0u8; 4096];
    let n = client.read(&mut buf).await.unwrap();
    assert!(String::from_utf8_lossy(&buf[..n]).contains("<hello"));

    let peer_hello = format!(
        "<hello xmlns=\"{BASE_NAMESPACE}\"><capabilities><capability>{}</capability></capabilities></hello>]]>]]>",
        hello::BASE_1_0
    );
    client.write_all(peer_hello.as_bytes()).await.unwrap();
}

async fn read_reply(client: &mut tokio::io::DuplexStream) -> String {
    let mut buf = vec![0u8; 8192];
    let n = client.read(&mut buf).await.unwrap();
    String::from_utf8_lossy(&buf[..n]).trim_end_matches("]]>]]>").to_string()
}

#[tokio::test]
async fn get_config_round_trip_carries_message_id_and_data() {
    let (mut client, server) = tokio::io::duplex(8192);
    let registry = Arc::new(Mutex::new(SessionRegistry::new(Arc::new(SystemClock))));
    let mut rpc_registry = RpcRegistry::new();
    rpc_registry.register(BASE_NAMESPACE, "get-config", Box::new(GetConfig));
    let rpc_registry = Arc::new(rpc_registry);
    let config = ReactorConfig::default();

    let client_task = tokio::spawn(async move {
        negotiate(&mut client).await;

        let request = format!(
            "<rpc message-id=\"42\" xmlns=\"{BASE_NAMESPACE}\"><get-config><source><running/></source></get-config></rpc>]]>]]>"
        );
        client.write_all(request.as_bytes()).await.unwrap();

        let reply = read_reply(&mut client).await;
        assert!(reply.contains("<rpc-reply"));
        assert!(reply.contains("message-id=\"42\""));
        assert!(reply.contains("<data"));
        assert!(reply.contains("eth0"));

        let close = format!("<rpc message-id=\"43\" xmlns=\"{BASE_NAMESPACE}\"><close-session/></rpc>]]>]]>");
        client.write_all(close.as_bytes()).await.unwrap();
        drop(client);
    });

    run(server, registry, rpc_registry, &config, "127.0.0.1", "tcp", "alice")
        .await
        .unwrap();

    client_task.await.unwrap();
}

#[tokio::test]
async fn invalid_value_on_edit_config_is_reported_and_closes_cleanly() {
    let (mut client, server) = tokio::io::duplex(8192);
    let registry = Arc::new(Mutex::new(SessionRegistry::new(Arc::new(SystemClock))));
    let mut rpc_registry = RpcRegistry::new();
    rpc_registry.register(BASE_NAMESPACE, "edit-config", Box::new(EditConfig::new()));
    let rpc_registry = Arc::new(rpc_registry);
    let config = ReactorConfig::default();

    let client_task = tokio::spawn(async move {
        negotiate(&mut client).await;

        let request = format!(
            "<rpc message-id=\"7\" xmlns=\"{BASE_NAMESPACE}\"><edit-config><target><running/></target><config xmlns=\"urn:test:port\"><port>99999</port></config></edit-config></rpc>]]>]]>"
        );
        client.write_all(request.as_bytes()).await.unwrap();

        let reply = read_reply(&mut client).await;
        assert!(reply.contains("<rpc-error>"));
        assert!(reply.contains("<error-type>application</error-type>"));
        assert!(reply.contains("<error-tag>invalid-value</error-tag>"));

        let close = format!("<rpc message-id=\"8\" xmlns=\"{BASE_NAMESPACE}\"><close-session/></rpc>]]>]]>");
        client.write_all(close.as_bytes()).await.unwrap();
        drop(client);
    });

    run(server, registry, rpc_registry, &config, "127.0.0.1", "tcp", "alice")
        .await
        .unwrap();

    client_task.await.unwrap();
}
