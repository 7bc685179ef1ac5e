//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! `<hello>` construction and parsing (`spec.md` §4.F, RFC 6241 §8.1).

use netconf_xml::document::Document;
use netconf_xml::encode;

use crate::error::Error;

pub const BASE_1_0: &str = "urn:ietf:params:netconf:base:1.0";
pub const BASE_1_1: &str = "urn:ietf:params:netconf:base:1.1";

const NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Builds the `<hello>` message this side sends, advertising `capabilities`
/// and, for server-initiated hellos, the assigned `session_id`.
pub fn build(capabilities: &[String], session_id: Option<u32>) -> String {
    let mut doc = Document::new();
    let hello = doc.new_element("hello", None, None);
    doc.set_root(hello);
    let xmlns = doc.new_attribute("xmlns", None, NAMESPACE, hello);
    doc.append_child(hello, xmlns);

    let caps = doc.new_element("capabilities", None, Some(hello));
    doc.append_child(hello, caps);
    for capability in capabilities {
        let cap = doc.new_element("capability", None, Some(caps));
        doc.append_child(caps, cap);
        let body = doc.new_body(capability.clone(), cap);
        doc.append_child(cap, body);
    }

    if let Some(session_id) = session_id {
        let session_id_elem = doc.new_element("session-id", None, Some(hello));
        doc.append_child(hello, session_id_elem);
        let body = doc.new_body(session_id.to_string(), session_id_elem);
        doc.append_child(session_id_elem, body);
    }

    encode::to_string(&doc, hello, encode::DEPTH_UNBOUNDED, true)
}

/// A peer's parsed `<hello>`: its advertised capability URIs and, if
/// present, the session-id it assigned (server hellos only).
#[derive(Debug, Clone)]
pub struct PeerHello {
    pub capabilities: Vec<String>,
    pub session_id: Option<u32>,
}

impl PeerHello {
    pub fn has_base_1_1(&self) -> bool {
        self.capabilities.iter().any(|c| c == BASE_1_1)
    }
}

/// Parses a raw (already de-framed) `<hello>` message.
pub fn parse(raw: &str) -> Result<PeerHello, Error> {
    let (doc, root) = netconf_xml::parser::parse(raw)?;
    let local = doc
        .node(root)
        .local_name()
        .ok_or_else(|| Error::MalformedMessage("hello root has no name".to_string()))?;
    if local != "hello" {
        return Err(Error::MalformedMessage(format!(
            "expected <hello>, got <{local}>"
        )));
    }

    let caps_elem = doc
        .find_element_child(root, "capabilities")
        .ok_or_else(|| Error::MissingBaseCapability)?;

    let mut capabilities = Vec::new();
    for child in doc.element_children(caps_elem) {
        if doc.node(child).local_name() == Some("capability") {
            capabilities.push(doc.body_text(child));
        }
    }
    if !capabilities.iter().any(|c| c == BASE_1_0 || c == BASE_1_1) {
        return Err(Error::MissingBaseCapability);
    }

    let session_id = doc
        .find_element_child(root, "session-id")
        .map(|id| doc.body_text(id))
        .and_then(|text| text.parse().ok());

    Ok(PeerHello {
        capabilities,
        session_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_parses_round_trip() {
        let capabilities = vec![BASE_1_1.to_string(), "urn:ietf:params:netconf:capability:candidate:1.0".to_string()];
        let message = build(&capabilities, Some(42));
        let parsed = parse(&message).unwrap();
        assert_eq!(parsed.session_id, Some(42));
        assert!(parsed.has_base_1_1());
        assert!(parsed
            .capabilities
            .contains(&"urn:ietf:params:netconf:capability:candidate:1.0".to_string()));
    }

    #[test]
    fn rejects_hello_without_base_capability() {
        let message = r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <capabilities>
    <capability>urn:ietf:params:netconf:capability:candidate:1.0</capability>
  </capabilities>
</hello>"#;
        let err = parse(message).unwrap_err();
        assert!(matches!(err, Error::MissingBaseCapability));
    }

    #[test]
    fn rejects_non_hello_root() {
        let message = r#"<rpc message-id="1"/>"#;
        let err = parse(message).unwrap_err();
        assert!(matches!(err, Error::MalformedMessage(..)));
    }
}
