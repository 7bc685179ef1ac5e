//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Hard (session-fatal) errors (`spec.md` §7, "Internal"/"Protocol").
//! Validation and authorization failures never reach this type: they are
//! reported as [`crate::rpc_error::RpcError`] and kept inside the session
//! (`spec.md` §7, "Propagation policy").

use tracing::warn;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Parse(netconf_xml::error::ParseError),
    Framing(String),
    /// The peer's `<hello>` never advertised the NETCONF base capability.
    MissingBaseCapability,
    /// A received frame's top-level element was not `<rpc>`.
    MalformedMessage(String),
}

impl Error {
    pub fn log(&self) {
        match self {
            Error::Io(error) => warn!(%error, "{}", self),
            Error::Parse(error) => warn!(%error, "{}", self),
            Error::Framing(reason) => warn!(%reason, "{}", self),
            Error::MissingBaseCapability => warn!("{}", self),
            Error::MalformedMessage(reason) => warn!(%reason, "{}", self),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(..) => write!(f, "I/O error"),
            Error::Parse(..) => write!(f, "failed to parse inbound frame"),
            Error::Framing(..) => write!(f, "framing error"),
            Error::MissingBaseCapability => {
                write!(f, "peer hello did not advertise the NETCONF base capability")
            }
            Error::MalformedMessage(..) => write!(f, "malformed message"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        Error::Io(error)
    }
}

impl From<netconf_xml::error::ParseError> for Error {
    fn from(error: netconf_xml::error::ParseError) -> Error {
        Error::Parse(error)
    }
}
