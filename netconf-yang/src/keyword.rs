//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! YANG statement keywords recognized by the loader (`spec.md` §3).

use std::fmt;

/// A statement keyword. `Other` carries any keyword the loader does not
/// interpret, so unrecognized statements are preserved rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Keyword {
    Module,
    Submodule,
    Import,
    Include,
    Namespace,
    Prefix,
    Container,
    List,
    Leaf,
    LeafList,
    Key,
    Mandatory,
    Type,
    Range,
    Length,
    Pattern,
    Default,
    Enum,
    Union,
    Uses,
    Grouping,
    Rpc,
    Action,
    Input,
    Output,
    Notification,
    Description,
    Revision,
    Other(String),
}

impl Keyword {
    pub fn parse(s: &str) -> Keyword {
        match s {
            "module" => Keyword::Module,
            "submodule" => Keyword::Submodule,
            "import" => Keyword::Import,
            "include" => Keyword::Include,
            "namespace" => Keyword::Namespace,
            "prefix" => Keyword::Prefix,
            "container" => Keyword::Container,
            "list" => Keyword::List,
            "leaf" => Keyword::Leaf,
            "leaf-list" => Keyword::LeafList,
            "key" => Keyword::Key,
            "mandatory" => Keyword::Mandatory,
            "type" => Keyword::Type,
            "range" => Keyword::Range,
            "length" => Keyword::Length,
            "pattern" => Keyword::Pattern,
            "default" => Keyword::Default,
            "enum" => Keyword::Enum,
            "union" => Keyword::Union,
            "uses" => Keyword::Uses,
            "grouping" => Keyword::Grouping,
            "rpc" => Keyword::Rpc,
            "action" => Keyword::Action,
            "input" => Keyword::Input,
            "output" => Keyword::Output,
            "notification" => Keyword::Notification,
            "description" => Keyword::Description,
            "revision" => Keyword::Revision,
            other => Keyword::Other(other.to_string()),
        }
    }

    /// Whether this keyword introduces a node that can carry a schema
    /// binding (as opposed to a purely descriptive sub-statement).
    pub fn is_data_node(&self) -> bool {
        matches!(
            self,
            Keyword::Container
                | Keyword::List
                | Keyword::Leaf
                | Keyword::LeafList
                | Keyword::Rpc
                | Keyword::Action
                | Keyword::Input
                | Keyword::Output
                | Keyword::Notification
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyword::Module => write!(f, "module"),
            Keyword::Submodule => write!(f, "submodule"),
            Keyword::Import => write!(f, "import"),
            Keyword::Include => write!(f, "include"),
            Keyword::Namespace => write!(f, "namespace"),
            Keyword::Prefix => write!(f, "prefix"),
            Keyword::Container => write!(f, "container"),
            Keyword::List => write!(f, "list"),
            Keyword::Leaf => write!(f, "leaf"),
            Keyword::LeafList => write!(f, "leaf-list"),
            Keyword::Key => write!(f, "key"),
            Keyword::Mandatory => write!(f, "mandatory"),
            Keyword::Type => write!(f, "type"),
            Keyword::Range => write!(f, "range"),
            Keyword::Length => write!(f, "length"),
            Keyword::Pattern => write!(f, "pattern"),
            Keyword::Default => write!(f, "default"),
            Keyword::Enum => write!(f, "enum"),
            Keyword::Union => write!(f, "union"),
            Keyword::Uses => write!(f, "uses"),
            Keyword::Grouping => write!(f, "grouping"),
            Keyword::Rpc => write!(f, "rpc"),
            Keyword::Action => write!(f, "action"),
            Keyword::Input => write!(f, "input"),
            Keyword::Output => write!(f, "output"),
            Keyword::Notification => write!(f, "notification"),
            Keyword::Description => write!(f, "description"),
            Keyword::Revision => write!(f, "revision"),
            Keyword::Other(s) => write!(f, "{s}"),
        }
    }
}
