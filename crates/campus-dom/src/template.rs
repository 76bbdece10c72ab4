//! Index-parameterised templates for repeatable field groups.
//!
//! A [`FieldTemplate`] is compiled once from a template element. Every
//! indexed attribute (by default `id` and `name`) whose value contains the
//! placeholder token is split around the token's first occurrence, so
//! rendering a group is a matter of splicing the index in. Later occurrences
//! of the token are kept as written.

use tracing::debug;

use crate::document::{Document, TEMPLATE_TAG};
use crate::error::{DomError, Result};
use crate::node::NodeId;
use crate::spec::ElementSpec;

/// A compiled attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Literal(String),
    Indexed { before: String, after: String },
}

impl Value {
    fn compile(raw: &str, placeholder: &str) -> Self {
        match raw.split_once(placeholder) {
            Some((before, after)) if !placeholder.is_empty() => Self::Indexed {
                before: before.to_string(),
                after: after.to_string(),
            },
            _ => Self::Literal(raw.to_string()),
        }
    }

    fn render(&self, index: usize) -> String {
        match self {
            Self::Literal(s) => s.clone(),
            Self::Indexed { before, after } => format!("{before}{index}{after}"),
        }
    }

    fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    tag: String,
    id: Option<Value>,
    classes: Vec<String>,
    attrs: Vec<(String, Value)>,
    text: Option<String>,
    children: Vec<Node>,
}

impl Node {
    fn compile(spec: &ElementSpec, placeholder: &str, indexed: &[String]) -> Self {
        let is_indexed = |name: &str| indexed.iter().any(|a| a.eq_ignore_ascii_case(name));
        let value = |name: &str, raw: &str| {
            if is_indexed(name) {
                Value::compile(raw, placeholder)
            } else {
                Value::Literal(raw.to_string())
            }
        };
        Self {
            tag: spec.tag.clone(),
            id: spec.id.as_deref().map(|raw| value("id", raw)),
            classes: spec.classes.clone(),
            attrs: spec
                .attrs
                .iter()
                .map(|(name, raw)| (name.clone(), value(name, raw)))
                .collect(),
            text: spec.text.clone(),
            children: spec
                .children
                .iter()
                .map(|child| Self::compile(child, placeholder, indexed))
                .collect(),
        }
    }

    fn render(&self, index: usize) -> ElementSpec {
        ElementSpec {
            tag: self.tag.clone(),
            id: self.id.as_ref().map(|v| v.render(index)),
            classes: self.classes.clone(),
            attrs: self
                .attrs
                .iter()
                .map(|(name, v)| (name.clone(), v.render(index)))
                .collect(),
            text: self.text.clone(),
            children: self.children.iter().map(|c| c.render(index)).collect(),
        }
    }

    fn indexed_slots(&self) -> usize {
        let own = self.id.iter().filter(|v| v.is_indexed()).count()
            + self.attrs.iter().filter(|(_, v)| v.is_indexed()).count();
        own + self.children.iter().map(Self::indexed_slots).sum::<usize>()
    }
}

/// A template rendered fresh for each new field group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTemplate {
    roots: Vec<Node>,
}

impl FieldTemplate {
    /// Compile the content of `template` found in `doc`.
    ///
    /// For a `<template>` element the content is its children; any other
    /// element is used whole.
    pub fn compile(
        doc: &Document,
        template: NodeId,
        placeholder: &str,
        indexed_attrs: &[String],
    ) -> Result<Self> {
        if !doc.contains(template) {
            return Err(DomError::UnknownNode(template));
        }
        let specs: Vec<ElementSpec> = if doc.tag(template) == Some(TEMPLATE_TAG) {
            doc.template_content(template)
                .iter()
                .map(|&n| doc.to_spec(n))
                .collect()
        } else {
            vec![doc.to_spec(template)]
        };
        let compiled = Self::from_specs(&specs, placeholder, indexed_attrs);
        debug!(
            template = %template,
            roots = compiled.root_count(),
            slots = compiled.indexed_slots(),
            "Compiled field template"
        );
        Ok(compiled)
    }

    /// Compile detached element specs.
    pub fn from_specs(specs: &[ElementSpec], placeholder: &str, indexed_attrs: &[String]) -> Self {
        Self {
            roots: specs
                .iter()
                .map(|s| Node::compile(s, placeholder, indexed_attrs))
                .collect(),
        }
    }

    /// Top-level elements of one rendered group.
    pub fn render(&self, index: usize) -> Vec<ElementSpec> {
        self.roots.iter().map(|n| n.render(index)).collect()
    }

    /// Number of top-level elements a render produces.
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Number of attribute values that receive the index.
    pub fn indexed_slots(&self) -> usize {
        self.roots.iter().map(Node::indexed_slots).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed() -> Vec<String> {
        vec!["id".to_string(), "name".to_string()]
    }

    fn guardian_template() -> (Document, NodeId) {
        let mut doc = Document::new();
        let template = doc.append_spec(
            doc.root(),
            &ElementSpec::new("template").with_id("guardian-template").with_child(
                ElementSpec::new("div")
                    .with_class("field-group")
                    .with_child(
                        ElementSpec::new("input")
                            .with_id("guardian___INDEX___name")
                            .with_attr("name", "guardians[__INDEX__][name]")
                            .with_attr("placeholder", "__INDEX__"),
                    )
                    .with_child(ElementSpec::new("button").with_class("remove-field")),
            ),
        );
        (doc, template)
    }

    #[test]
    fn test_render_substitutes_index() {
        let (doc, template) = guardian_template();
        let tpl = FieldTemplate::compile(&doc, template, "__INDEX__", &indexed()).unwrap();
        assert_eq!(tpl.root_count(), 1);
        assert_eq!(tpl.indexed_slots(), 2);

        let group = &tpl.render(3)[0];
        let input = &group.children[0];
        assert_eq!(input.id.as_deref(), Some("guardian_3_name"));
        assert_eq!(input.attrs["name"], "guardians[3][name]");
        // Attributes outside the indexed set are left alone.
        assert_eq!(input.attrs["placeholder"], "__INDEX__");
    }

    #[test]
    fn test_only_first_occurrence_replaced() {
        let spec = ElementSpec::new("input").with_attr("name", "row__INDEX__-__INDEX__");
        let tpl = FieldTemplate::from_specs(&[spec], "__INDEX__", &indexed());
        assert_eq!(tpl.render(7)[0].attrs["name"], "row7-__INDEX__");
    }

    #[test]
    fn test_renders_are_independent() {
        let (doc, template) = guardian_template();
        let tpl = FieldTemplate::compile(&doc, template, "__INDEX__", &indexed()).unwrap();
        let first = tpl.render(0);
        let second = tpl.render(1);
        assert_ne!(first, second);
        assert_eq!(first[0].children[0].id.as_deref(), Some("guardian_0_name"));
    }

    #[test]
    fn test_non_template_element_used_whole() {
        let mut doc = Document::new();
        let row = doc.append_spec(
            doc.root(),
            &ElementSpec::new("div").with_attr("name", "fee___INDEX__"),
        );
        let tpl = FieldTemplate::compile(&doc, row, "__INDEX__", &indexed()).unwrap();
        assert_eq!(tpl.render(2)[0].attrs["name"], "fee_2");
    }

    #[test]
    fn test_unknown_node() {
        let doc = Document::new();
        let missing = NodeId(99);
        let err = FieldTemplate::compile(&doc, missing, "__INDEX__", &indexed()).unwrap_err();
        assert_eq!(err, DomError::UnknownNode(missing));
    }
}
