//! The document arena.
//!
//! Elements live in a `Vec` and are addressed by [`NodeId`]. Removing an
//! element only unlinks it from its parent; the data stays in the arena so a
//! stale id (held by a pending timer, say) can still be asked whether it is
//! connected.
//!
//! Children of a `<template>` element are the template's *content*: they are
//! reachable through [`Document::template_content`] but are skipped by
//! queries and are never connected.

use crate::error::{DomError, Result};
use crate::node::{ElementData, NodeId};
use crate::selector::Selector;
use crate::spec::ElementSpec;

/// Tag whose children are inert template content.
pub const TEMPLATE_TAG: &str = "template";

/// An element tree with a single root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<ElementData>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with an empty `<body>` root.
    pub fn new() -> Self {
        Self {
            nodes: vec![ElementData::new("body")],
            root: NodeId(0),
        }
    }

    /// Create a document whose root is built from `spec`.
    pub fn from_spec(spec: &ElementSpec) -> Self {
        let mut doc = Self {
            nodes: Vec::with_capacity(spec.element_count()),
            root: NodeId(0),
        };
        let root = doc.build(spec);
        doc.root = root;
        doc
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of elements ever created (connected or not).
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `node` was created by this document.
    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    fn data(&self, node: NodeId) -> Option<&ElementData> {
        self.nodes.get(node.0)
    }

    fn data_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        self.nodes.get_mut(node.0)
    }

    // =========================================================================
    // Tree construction and mutation
    // =========================================================================

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ElementData::new(tag));
        id
    }

    /// Build a detached subtree from `spec`.
    pub fn build(&mut self, spec: &ElementSpec) -> NodeId {
        let node = self.create_element(&spec.tag);
        if let Some(id) = &spec.id {
            self.set_attr(node, "id", id);
        }
        for class in &spec.classes {
            self.add_class(node, class);
        }
        for (name, value) in &spec.attrs {
            self.set_attr(node, name, value);
        }
        if let Some(text) = &spec.text {
            self.set_text(node, text);
        }
        for child_spec in &spec.children {
            let child = self.build(child_spec);
            self.link(node, child);
        }
        node
    }

    /// Build `spec` and append it under `parent`.
    ///
    /// If `parent` is unknown the new subtree is left detached.
    pub fn append_spec(&mut self, parent: NodeId, spec: &ElementSpec) -> NodeId {
        let node = self.build(spec);
        if self.contains(parent) {
            self.link(parent, node);
        }
        node
    }

    /// Move `child` (and its subtree) to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.contains(parent) {
            return Err(DomError::UnknownNode(parent));
        }
        if !self.contains(child) {
            return Err(DomError::UnknownNode(child));
        }
        if parent == child || self.ancestors(parent).any(|a| a == child) {
            return Err(DomError::Cycle { parent, child });
        }
        self.unlink(child);
        self.link(parent, child);
        Ok(())
    }

    /// Detach `node` from its parent. Returns false if it was already
    /// detached, is the root, or is unknown.
    pub fn remove(&mut self, node: NodeId) -> bool {
        if node == self.root || self.parent(node).is_none() {
            return false;
        }
        self.unlink(node);
        true
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn unlink(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != child);
        }
    }

    // =========================================================================
    // Tree navigation
    // =========================================================================

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).and_then(|d| d.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.data(node).map(|d| d.children.as_slice()).unwrap_or(&[])
    }

    /// Number of element children.
    pub fn child_count(&self, node: NodeId) -> usize {
        self.children(node).len()
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |&n| self.parent(n))
    }

    /// Whether `node` is reachable from the root outside any template content.
    pub fn is_connected(&self, node: NodeId) -> bool {
        if node == self.root {
            return true;
        }
        let mut reached_root = false;
        for ancestor in self.ancestors(node) {
            if self.tag(ancestor) == Some(TEMPLATE_TAG) {
                return false;
            }
            if ancestor == self.root {
                reached_root = true;
            }
        }
        reached_root
    }

    /// Content of a `<template>` element (its children).
    pub fn template_content(&self, node: NodeId) -> &[NodeId] {
        self.children(node)
    }

    /// Descendants of `scope` in document order, excluding `scope` and
    /// excluding the content of nested templates.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            if self.tag(node) != Some(TEMPLATE_TAG) {
                stack.extend(self.children(node).iter().rev().copied());
            }
        }
        out
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// `node` itself or its nearest ancestor matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        if !self.contains(node) {
            return None;
        }
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|&n| selector.matches(self, n))
    }

    /// Descendants of `scope` matching `selector`, in document order.
    pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    /// First descendant of `scope` matching `selector`.
    pub fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| selector.matches(self, n))
    }

    /// All connected elements matching `selector`, root included.
    pub fn select_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut out = Vec::new();
        if selector.matches(self, self.root) {
            out.push(self.root);
        }
        out.extend(self.query_all(self.root, selector));
        out
    }

    /// First connected element matching `selector`, root included.
    pub fn select(&self, selector: &Selector) -> Option<NodeId> {
        if selector.matches(self, self.root) {
            return Some(self.root);
        }
        self.query(self.root, selector)
    }

    /// Parse `selector` and return the first connected match.
    pub fn select_str(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.select(&Selector::parse(selector)?))
    }

    /// Parse `selector` and return every connected match.
    pub fn select_all_str(&self, selector: &str) -> Result<Vec<NodeId>> {
        Ok(self.select_all(&Selector::parse(selector)?))
    }

    /// First connected element whose `id` attribute equals `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&n| self.attr(n, "id") == Some(id))
    }

    // =========================================================================
    // Element data
    // =========================================================================

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.data(node).map(|d| d.tag.as_str())
    }

    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.attr(node, "id")
    }

    /// Attribute value. `class` is not an attribute here; use [`Self::classes`].
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.data(node)
            .and_then(|d| d.attrs.get(&name.to_ascii_lowercase()))
            .map(String::as_str)
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// Attributes in name order (excluding `class`).
    pub fn attrs(&self, node: NodeId) -> impl Iterator<Item = (&str, &str)> {
        self.data(node)
            .into_iter()
            .flat_map(|d| d.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Set an attribute. Setting `class` replaces the class list.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "class" {
            if let Some(data) = self.data_mut(node) {
                data.classes.clear();
            }
            for class in value.split_whitespace() {
                self.add_class(node, class);
            }
            return;
        }
        if let Some(data) = self.data_mut(node) {
            data.attrs.insert(name, value.to_string());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) -> Option<String> {
        self.data_mut(node)
            .and_then(|d| d.attrs.remove(&name.to_ascii_lowercase()))
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        self.data(node).map(|d| d.classes.as_slice()).unwrap_or(&[])
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).iter().any(|c| c == class)
    }

    /// Add a class; returns true if it was not already present.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        match self.data_mut(node) {
            Some(data) if !data.classes.iter().any(|c| c == class) => {
                data.classes.push(class.to_string());
                true
            }
            _ => false,
        }
    }

    /// Remove a class; returns true if it was present.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> bool {
        match self.data_mut(node) {
            Some(data) => {
                let before = data.classes.len();
                data.classes.retain(|c| c != class);
                data.classes.len() != before
            }
            None => false,
        }
    }

    /// Toggle a class; returns whether it is present afterwards.
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.remove_class(node, class) {
            false
        } else {
            self.add_class(node, class)
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.data(node).and_then(|d| d.text.as_deref())
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(data) = self.data_mut(node) {
            data.text = Some(text.to_string());
        }
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        std::iter::once(node)
            .chain(self.descendants(node))
            .filter_map(|n| self.text(n))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Current value of a form control (empty when unset).
    pub fn value(&self, node: NodeId) -> &str {
        self.attr(node, "value").unwrap_or("")
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        self.set_attr(node, "value", value);
    }

    pub fn is_checked(&self, node: NodeId) -> bool {
        self.has_attr(node, "checked")
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if checked {
            self.set_attr(node, "checked", "");
        } else {
            self.remove_attr(node, "checked");
        }
    }

    /// Snapshot `node`'s subtree as an owned spec.
    pub fn to_spec(&self, node: NodeId) -> ElementSpec {
        let Some(data) = self.data(node) else {
            return ElementSpec::default();
        };
        let mut attrs = data.attrs.clone();
        let id = attrs.remove("id");
        ElementSpec {
            tag: data.tag.clone(),
            id,
            classes: data.classes.clone(),
            attrs,
            text: data.text.clone(),
            children: data.children.iter().map(|&c| self.to_spec(c)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Document {
        Document::from_spec(
            &ElementSpec::new("body")
                .with_child(
                    ElementSpec::new("div")
                        .with_id("guardians")
                        .with_child(ElementSpec::new("div").with_class("field-group"))
                        .with_child(ElementSpec::new("div").with_class("field-group")),
                )
                .with_child(
                    ElementSpec::new("template")
                        .with_id("guardian-template")
                        .with_child(ElementSpec::new("div").with_class("field-group")),
                ),
        )
    }

    #[test]
    fn test_from_spec_structure() {
        let doc = page();
        let root = doc.root();
        assert_eq!(doc.tag(root), Some("body"));
        assert_eq!(doc.child_count(root), 2);
        let guardians = doc.get_element_by_id("guardians").unwrap();
        assert_eq!(doc.child_count(guardians), 2);
    }

    #[test]
    fn test_template_content_is_not_queried_or_connected() {
        let doc = page();
        let groups = doc.select_all_str(".field-group").unwrap();
        assert_eq!(groups.len(), 2);

        let template = doc.get_element_by_id("guardian-template").unwrap();
        let content = doc.template_content(template);
        assert_eq!(content.len(), 1);
        assert!(!doc.is_connected(content[0]));
        assert!(doc.is_connected(template));
    }

    #[test]
    fn test_remove_detaches_and_is_idempotent() {
        let mut doc = page();
        let guardians = doc.get_element_by_id("guardians").unwrap();
        let first = doc.children(guardians)[0];
        assert!(doc.remove(first));
        assert!(!doc.is_connected(first));
        assert_eq!(doc.child_count(guardians), 1);
        assert!(!doc.remove(first));
        assert!(!doc.remove(doc.root()));
    }

    #[test]
    fn test_descendant_of_removed_is_disconnected() {
        let mut doc = page();
        let guardians = doc.get_element_by_id("guardians").unwrap();
        let group = doc.children(guardians)[0];
        let input = doc.append_spec(group, &ElementSpec::new("input"));
        assert!(doc.is_connected(input));
        doc.remove(guardians);
        assert!(!doc.is_connected(input));
        assert!(doc.get_element_by_id("guardians").is_none());
    }

    #[test]
    fn test_append_child_rejects_cycles() {
        let mut doc = page();
        let guardians = doc.get_element_by_id("guardians").unwrap();
        let group = doc.children(guardians)[0];
        assert_eq!(
            doc.append_child(group, guardians),
            Err(DomError::Cycle {
                parent: group,
                child: guardians
            })
        );
        assert!(doc.append_child(doc.root(), group).is_ok());
        assert_eq!(doc.parent(group), Some(doc.root()));
    }

    #[test]
    fn test_class_operations() {
        let mut doc = Document::new();
        let root = doc.root();
        assert!(doc.toggle_class(root, "sb-sidenav-toggled"));
        assert!(doc.has_class(root, "sb-sidenav-toggled"));
        assert!(!doc.toggle_class(root, "sb-sidenav-toggled"));
        assert!(doc.add_class(root, "a"));
        assert!(!doc.add_class(root, "a"));
        doc.set_attr(root, "class", "x  y");
        assert_eq!(doc.classes(root), &["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_closest_includes_self() {
        let doc = page();
        let sel = Selector::parse(".field-group").unwrap();
        let guardians = doc.get_element_by_id("guardians").unwrap();
        let group = doc.children(guardians)[0];
        assert_eq!(doc.closest(group, &sel), Some(group));
        assert_eq!(doc.closest(guardians, &sel), None);
    }

    #[test]
    fn test_to_spec_round_trip() {
        let doc = page();
        let spec = doc.to_spec(doc.root());
        let rebuilt = Document::from_spec(&spec);
        assert_eq!(rebuilt.to_spec(rebuilt.root()), spec);
    }

    #[test]
    fn test_values_and_checked() {
        let mut doc = Document::new();
        let input = doc.append_spec(doc.root(), &ElementSpec::new("input"));
        assert_eq!(doc.value(input), "");
        doc.set_value(input, "Ada");
        assert_eq!(doc.value(input), "Ada");
        doc.set_checked(input, true);
        assert!(doc.is_checked(input));
        doc.set_checked(input, false);
        assert!(!doc.is_checked(input));
    }
}
