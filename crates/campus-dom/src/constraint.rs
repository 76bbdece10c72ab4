//! Native-style constraint validation for form controls.
//!
//! Mirrors the browser's checks closely enough for server-rendered forms:
//! `required`, `type=email|number|date|checkbox`, `min`/`max`,
//! `minlength`/`maxlength` and `pattern`. Disabled controls and button-like
//! inputs are never validated.

use chrono::NaiveDate;
use regex::Regex;

use crate::document::Document;
use crate::node::NodeId;

/// Why a control is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    ValueMissing,
    TypeMismatch,
    PatternMismatch,
    TooShort,
    TooLong,
    RangeUnderflow,
    RangeOverflow,
    BadInput,
}

impl Violation {
    /// Short message suitable for an invalid-feedback line.
    pub fn message(&self) -> &'static str {
        match self {
            Self::ValueMissing => "Please fill out this field.",
            Self::TypeMismatch => "Please enter a valid value.",
            Self::PatternMismatch => "Please match the requested format.",
            Self::TooShort => "Please lengthen this text.",
            Self::TooLong => "Please shorten this text.",
            Self::RangeUnderflow => "Value is below the minimum.",
            Self::RangeOverflow => "Value is above the maximum.",
            Self::BadInput => "Please enter a number or date.",
        }
    }
}

const CONTROL_TAGS: [&str; 3] = ["input", "select", "textarea"];
const UNVALIDATED_TYPES: [&str; 5] = ["hidden", "submit", "button", "reset", "image"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether `node` takes part in constraint validation.
pub fn is_candidate(doc: &Document, node: NodeId) -> bool {
    let Some(tag) = doc.tag(node) else {
        return false;
    };
    if !CONTROL_TAGS.contains(&tag) || doc.has_attr(node, "disabled") {
        return false;
    }
    if tag == "input" {
        let kind = input_type(doc, node);
        return !UNVALIDATED_TYPES.contains(&kind.as_str());
    }
    true
}

fn input_type(doc: &Document, node: NodeId) -> String {
    doc.attr(node, "type")
        .unwrap_or("text")
        .to_ascii_lowercase()
}

/// First violated constraint of a single control, if any.
pub fn check_control(doc: &Document, node: NodeId) -> Option<Violation> {
    if !is_candidate(doc, node) {
        return None;
    }
    let kind = input_type(doc, node);
    let value = doc.value(node);

    if kind == "checkbox" {
        return (doc.has_attr(node, "required") && !doc.is_checked(node))
            .then_some(Violation::ValueMissing);
    }
    if kind == "radio" {
        // The whole group is required when any member is, and satisfied by
        // any checked member.
        let group = radio_group(doc, node);
        let required = group.iter().any(|&n| doc.has_attr(n, "required"));
        let checked = group.iter().any(|&n| doc.is_checked(n));
        return (required && !checked).then_some(Violation::ValueMissing);
    }

    if value.is_empty() {
        return doc
            .has_attr(node, "required")
            .then_some(Violation::ValueMissing);
    }

    match kind.as_str() {
        "email" if !is_email(value) => return Some(Violation::TypeMismatch),
        "number" => {
            let Some(number) = parse_number(value) else {
                return Some(Violation::BadInput);
            };
            if let Some(v) = check_range(doc, node, number, parse_number) {
                return Some(v);
            }
        }
        "date" => {
            let Ok(date) = NaiveDate::parse_from_str(value.trim(), DATE_FORMAT) else {
                return Some(Violation::BadInput);
            };
            if let Some(v) = check_range(doc, node, date, |s| {
                NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
            }) {
                return Some(v);
            }
        }
        _ => {}
    }

    let length = value.chars().count();
    if let Some(min) = doc.attr(node, "minlength").and_then(|s| s.parse::<usize>().ok()) {
        if length < min {
            return Some(Violation::TooShort);
        }
    }
    if let Some(max) = doc.attr(node, "maxlength").and_then(|s| s.parse::<usize>().ok()) {
        if length > max {
            return Some(Violation::TooLong);
        }
    }

    if let Some(pattern) = doc.attr(node, "pattern") {
        // An unparseable pattern is ignored, as browsers do.
        if let Ok(re) = Regex::new(&format!("^(?:{pattern})$")) {
            if !re.is_match(value) {
                return Some(Violation::PatternMismatch);
            }
        }
    }

    None
}

/// A finite floating-point number; `NaN` and infinities are bad input.
fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn check_range<T: PartialOrd>(
    doc: &Document,
    node: NodeId,
    value: T,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<Violation> {
    if let Some(min) = doc.attr(node, "min").and_then(&parse) {
        if value < min {
            return Some(Violation::RangeUnderflow);
        }
    }
    if let Some(max) = doc.attr(node, "max").and_then(&parse) {
        if value > max {
            return Some(Violation::RangeOverflow);
        }
    }
    None
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
        && !domain.contains('@')
}

/// The form owning `node`, or the document root for unowned controls.
fn form_owner(doc: &Document, node: NodeId) -> NodeId {
    doc.ancestors(node)
        .find(|&n| doc.tag(n) == Some("form"))
        .unwrap_or_else(|| doc.root())
}

/// Radio buttons sharing `radio`'s group: same `name` and same form owner,
/// in document order. A radio without a name is a group of its own.
pub fn radio_group(doc: &Document, radio: NodeId) -> Vec<NodeId> {
    let Some(name) = doc.attr(radio, "name").filter(|n| !n.is_empty()) else {
        return vec![radio];
    };
    let owner = form_owner(doc, radio);
    doc.descendants(owner)
        .into_iter()
        .filter(|&n| doc.tag(n) == Some("input") && input_type(doc, n) == "radio")
        .filter(|&n| doc.attr(n, "name") == Some(name))
        .filter(|&n| form_owner(doc, n) == owner)
        .collect()
}

/// Every invalid control inside `form`, in document order.
pub fn form_violations(doc: &Document, form: NodeId) -> Vec<(NodeId, Violation)> {
    doc.descendants(form)
        .into_iter()
        .filter_map(|n| check_control(doc, n).map(|v| (n, v)))
        .collect()
}

/// `checkValidity()` for a form: true when no control is invalid.
pub fn check_validity(doc: &Document, form: NodeId) -> bool {
    doc.descendants(form)
        .into_iter()
        .all(|n| check_control(doc, n).is_none())
}
