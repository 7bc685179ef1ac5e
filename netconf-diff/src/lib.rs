//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Structural diff between two bound XML configuration trees
//! (`spec.md` §4.E). Never soft-fails: a diff either succeeds or panics on
//! an invariant violation, matching `spec.md` §7 ("the XPath evaluator and
//! diff never return soft failures — only ok or hard").

pub mod diff;

pub use diff::{diff as compute, DiffResult};
