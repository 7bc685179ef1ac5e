//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

#[derive(Debug)]
pub enum Error {
    Io(String, std::io::Error),
    Syntax { line: u32, col: u32, reason: String },
    DuplicateModule(String),
    UnresolvedImport(String),
}

impl Error {
    pub fn log(&self) {
        match self {
            Error::Io(path, error) => warn!(%path, %error, "{}", self),
            Error::Syntax { .. } => warn!("{}", self),
            Error::DuplicateModule(name) => warn!(%name, "{}", self),
            Error::UnresolvedImport(name) => warn!(%name, "{}", self),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(path, _) => write!(f, "failed to read YANG module '{path}'"),
            Error::Syntax { line, col, reason } => {
                write!(f, "YANG syntax error at {line}:{col}: {reason}")
            }
            Error::DuplicateModule(name) => write!(f, "module '{name}' loaded twice"),
            Error::UnresolvedImport(name) => write!(f, "import '{name}' could not be resolved"),
        }
    }
}

impl std::error::Error for Error {}
