//! Repeatable field groups: add from a template, remove by delegation.
//!
//! An add control names its container and template through data attributes
//! (`data-container`, `data-template` by default), each holding a selector.
//! The new group's index is the container's child count at the time of the
//! click, so removals never renumber existing groups.

use campus_core::log_feature_skipped;
use campus_dom::{DomEvent, EventKind, FieldTemplate, ListenerScope, NodeId, Selector};
use tracing::{debug, warn};

use crate::controller::{FormController, Handler, bound_element};

/// A field group appended by an add control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedGroup {
    pub container: NodeId,
    pub index: usize,
    /// Top-level elements of the new group
    pub roots: Vec<NodeId>,
}

impl FormController {
    pub(crate) fn bind_add_controls(&mut self) -> usize {
        let controls = self.document.select_all(&self.markers.add_field);
        if controls.is_empty() {
            log_feature_skipped!("field_groups", reason = "no add controls");
        }
        for &control in &controls {
            self.listeners
                .add(ListenerScope::Element(control), EventKind::Click, Handler::AddFieldGroup);
        }
        controls.len()
    }

    pub(crate) fn add_field_group(&mut self, event: &mut DomEvent) {
        if let Some(control) = bound_element(event) {
            self.add_group_for(control);
        }
    }

    /// Append one group for the add control `control`.
    ///
    /// Returns `None`, logging why, when the control's container or template
    /// cannot be resolved.
    pub fn add_group_for(&mut self, control: NodeId) -> Option<AddedGroup> {
        let (container, template) = self.resolve_add_targets(control)?;
        let groups = &self.config.field_groups;
        let compiled = match FieldTemplate::compile(
            &self.document,
            template,
            &groups.index_placeholder,
            &groups.indexed_attributes,
        ) {
            Ok(compiled) => compiled,
            Err(e) => {
                warn!(feature = "field_groups", node = %control, error = %e, "Template unusable");
                return None;
            }
        };

        let index = self.document.child_count(container);
        let roots = compiled
            .render(index)
            .iter()
            .map(|spec| self.document.append_spec(container, spec))
            .collect();
        debug!(
            feature = "field_groups",
            node = %container,
            index,
            "Field group added"
        );
        Some(AddedGroup {
            container,
            index,
            roots,
        })
    }

    fn resolve_add_targets(&self, control: NodeId) -> Option<(NodeId, NodeId)> {
        let groups = &self.config.field_groups;
        let container = self.resolve_reference(control, &groups.container_attribute)?;
        let template = self.resolve_reference(control, &groups.template_attribute)?;
        Some((container, template))
    }

    /// Resolve the selector stored in `control`'s `attribute` against the
    /// page. A `<template>` element matches; its content never does.
    fn resolve_reference(&self, control: NodeId, attribute: &str) -> Option<NodeId> {
        let Some(source) = self.document.attr(control, attribute) else {
            warn!(feature = "field_groups", node = %control, attribute, "Add control is missing a reference");
            return None;
        };
        let selector = match Selector::parse(source) {
            Ok(selector) => selector,
            Err(e) => {
                warn!(feature = "field_groups", node = %control, attribute, error = %e, "Reference is not a valid selector");
                return None;
            }
        };
        let found = self.document.select(&selector);
        if found.is_none() {
            warn!(feature = "field_groups", node = %control, selector = source, "Reference matches nothing");
        }
        found
    }

    /// Delegated remove: drop the field group enclosing an activated remove
    /// control. Siblings keep their indices.
    pub(crate) fn remove_field_group(&mut self, event: &mut DomEvent) {
        if event.default_prevented() {
            return;
        }
        let Some(control) = self.document.closest(event.target, &self.markers.remove_field) else {
            return;
        };
        let Some(group) = self.document.closest(control, &self.markers.field_group) else {
            debug!(feature = "field_groups", node = %control, "Remove control outside any field group");
            return;
        };
        self.document.remove(group);
        debug!(feature = "field_groups", node = %group, "Field group removed");
    }
}

#[cfg(test)]
mod tests {
    use campus_config::FormsConfig;
    use campus_dom::{Document, ElementSpec};

    use super::*;
    use crate::capability::Capabilities;

    fn page() -> (FormController, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let container = doc.append_spec(root, &ElementSpec::new("div").with_id("guardians"));
        let add = doc.append_spec(
            root,
            &ElementSpec::new("button")
                .with_class("add-field")
                .with_attr("type", "button")
                .with_attr("data-container", "#guardians")
                .with_attr("data-template", "#guardian-template"),
        );
        doc.append_spec(
            root,
            &ElementSpec::new("template").with_id("guardian-template").with_child(
                ElementSpec::new("div")
                    .with_class("field-group")
                    .with_child(
                        ElementSpec::new("input")
                            .with_id("parent_name___INDEX__")
                            .with_attr("name", "guardians[__INDEX__][parent_name]"),
                    )
                    .with_child(ElementSpec::new("button").with_class("remove-field")),
            ),
        );
        let mut controller =
            FormController::new(doc, FormsConfig::default(), Capabilities::none()).unwrap();
        controller.on_page_load();
        (controller, container, add)
    }

    #[test]
    fn test_add_uses_child_count_as_index() {
        let (mut controller, container, add) = page();
        controller.click(add);
        controller.click(add);
        let added = controller.add_group_for(add).unwrap();
        assert_eq!(added.index, 2);
        assert_eq!(controller.document().child_count(container), 3);

        let input = controller.document().children(added.roots[0])[0];
        assert_eq!(controller.document().id(input), Some("parent_name_2"));
        assert_eq!(
            controller.document().attr(input, "name"),
            Some("guardians[2][parent_name]")
        );
    }

    #[test]
    fn test_template_content_not_queried() {
        let (controller, _, _) = page();
        // The template's own group is inert.
        let groups = controller.document().select_all_str(".field-group").unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_missing_reference_skipped() {
        let (mut controller, container, add) = page();
        controller.document_mut().remove_attr(add, "data-template");
        assert_eq!(controller.add_group_for(add), None);
        controller.click(add);
        assert_eq!(controller.document().child_count(container), 0);
    }

    #[test]
    fn test_bad_reference_selector_skipped() {
        let (mut controller, _, add) = page();
        controller
            .document_mut()
            .set_attr(add, "data-container", "#guardians[");
        assert_eq!(controller.add_group_for(add), None);
    }

    #[test]
    fn test_remove_outside_group_is_noop() {
        let (mut controller, _, _) = page();
        let root = controller.document().root();
        let stray = controller
            .document_mut()
            .append_spec(root, &ElementSpec::new("button").with_class("remove-field"));
        let before = controller.document().child_count(root);
        controller.click(stray);
        assert_eq!(controller.document().child_count(root), before);
    }
}
