//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! NETCONF framing, hello negotiation, session state, and RPC dispatch
//! (`spec.md` §4.F).

pub mod debug;
pub mod error;
pub mod framing;
pub mod hello;
pub mod monitoring;
pub mod reactor;
pub mod rpc;
pub mod rpc_error;
pub mod session;

pub use error::Error;
pub use framing::{Framing, FramingMode};
pub use reactor::{run, ReactorConfig};
pub use rpc::{RpcHandler, RpcRegistry};
pub use rpc_error::{Outcome, RpcError};
pub use session::{Session, SessionRegistry, State};
