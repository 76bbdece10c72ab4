//! Node identifiers and per-element data.

use std::collections::BTreeMap;

/// Handle to an element in a [`Document`](crate::Document).
///
/// Ids are never reused: a removed element keeps its id and simply becomes
/// detached, so stale handles held by timers or listeners stay harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index, stable for the lifetime of the document.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element data stored in the document arena.
#[derive(Debug, Clone, Default)]
pub(crate) struct ElementData {
    pub tag: String,
    /// All attributes except `class`
    pub attrs: BTreeMap<String, String>,
    /// Class list in insertion order, without duplicates
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }
}
