//! Page outline: the document flattened into indented, styled rows.
//!
//! The outline is rebuilt from the controller's document on every frame, so
//! added and removed field groups, dismissed alerts, and validation state
//! show up without any bookkeeping here.

use campus_core::Severity;
use campus_dom::{Document, NodeId, Selector, check_control};
use campus_forms::{FormController, WidgetKind};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::capability::HostState;
use crate::theme::Theme;

/// Elements drawn in the sidebar panel rather than the outline.
const SIDEBAR_TAG: &str = "nav";

/// Elements that never render.
const HIDDEN_TAGS: [&str; 4] = ["template", "script", "style", "head"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Heading,
    Form,
    /// Repeatable field group
    Group,
    Label,
    /// Text-like control; `Enter` edits it
    Field,
    /// Checkbox or radio
    Choice { checked: bool },
    Button,
    Alert(Severity),
    Table,
    TableRow,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub node: NodeId,
    pub depth: usize,
    pub kind: RowKind,
    pub label: String,
    /// Value, hint, or validation message shown after the label
    pub detail: Option<String>,
    pub invalid: bool,
}

impl OutlineRow {
    pub fn is_focusable(&self) -> bool {
        matches!(self.kind, RowKind::Field | RowKind::Choice { .. } | RowKind::Button)
    }

    pub fn is_editable(&self) -> bool {
        self.kind == RowKind::Field
    }
}

struct Walker<'a> {
    controller: &'a FormController,
    doc: &'a Document,
    host: &'a HostState,
    field_group: Option<Selector>,
    alert: Option<Selector>,
    rows: Vec<OutlineRow>,
}

/// Flatten the controller's page into outline rows.
pub fn outline(controller: &FormController, host: &HostState) -> Vec<OutlineRow> {
    let markers = &controller.config().markers;
    let mut walker = Walker {
        controller,
        doc: controller.document(),
        host,
        field_group: Selector::parse(&markers.field_group).ok(),
        alert: Selector::parse(&markers.alert).ok(),
        rows: Vec::new(),
    };
    let doc = controller.document();
    for &child in doc.children(doc.root()) {
        walker.visit(child, 0);
    }
    walker.rows
}

/// Link texts of the page's navigation, for the sidebar panel.
pub fn sidebar_links(doc: &Document) -> Vec<String> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|&n| doc.tag(n) == Some(SIDEBAR_TAG))
        .flat_map(|nav| doc.descendants(nav))
        .filter(|&n| doc.tag(n) == Some("a"))
        .map(|n| doc.text_content(n).trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

impl Walker<'_> {
    fn push(&mut self, node: NodeId, depth: usize, kind: RowKind, label: String) {
        self.rows.push(OutlineRow {
            node,
            depth,
            kind,
            label,
            detail: None,
            invalid: false,
        });
    }

    fn matches(&self, node: NodeId, selector: &Option<Selector>) -> bool {
        selector.as_ref().is_some_and(|s| s.matches(self.doc, node))
    }

    fn visit_children(&mut self, node: NodeId, depth: usize) {
        let doc = self.doc;
        for &child in doc.children(node) {
            self.visit(child, depth);
        }
    }

    fn visit(&mut self, node: NodeId, depth: usize) {
        let doc = self.doc;
        let Some(tag) = doc.tag(node) else {
            return;
        };
        if tag == SIDEBAR_TAG || HIDDEN_TAGS.contains(&tag) {
            return;
        }

        if self.matches(node, &self.alert) {
            let severity = alert_severity(doc, node);
            let text = own_text(doc, node);
            self.push(node, depth, RowKind::Alert(severity), text);
            self.visit_children(node, depth + 1);
            return;
        }
        if self.matches(node, &self.field_group) {
            let index = doc
                .parent(node)
                .map(|p| doc.children(p).iter().position(|&c| c == node).unwrap_or(0))
                .unwrap_or(0);
            self.push(node, depth, RowKind::Group, format!("Group {}", index + 1));
            self.visit_children(node, depth + 1);
            return;
        }

        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let text = doc.text_content(node).trim().to_string();
                self.push(node, depth, RowKind::Heading, text);
            }
            "form" => {
                let name = doc.id(node).map_or_else(|| "form".to_string(), |id| format!("form #{id}"));
                self.push(node, depth, RowKind::Form, name);
                let validated_class = &self.controller.config().validation.validated_class;
                if doc.has_class(node, validated_class) {
                    if let Some(row) = self.rows.last_mut() {
                        row.detail = Some("validated".to_string());
                    }
                }
                self.visit_children(node, depth + 1);
            }
            "label" => {
                let text = doc.text_content(node).trim().to_string();
                self.push(node, depth, RowKind::Label, text);
            }
            "input" | "select" | "textarea" => self.visit_control(node, depth),
            "button" => {
                let text = doc.text_content(node).trim().to_string();
                let label = if text.is_empty() { "Close".to_string() } else { text };
                self.push(node, depth, RowKind::Button, label);
            }
            "table" => self.visit_table(node, depth),
            _ => {
                if let Some(text) = doc.text(node).map(str::trim).filter(|t| !t.is_empty()) {
                    self.push(node, depth, RowKind::Text, text.to_string());
                }
                self.visit_children(node, depth);
            }
        }
    }

    fn visit_control(&mut self, node: NodeId, depth: usize) {
        let doc = self.doc;
        let input_type = doc.attr(node, "type").unwrap_or("text").to_ascii_lowercase();
        let label = doc
            .attr(node, "name")
            .or(doc.id(node))
            .unwrap_or(input_type.as_str())
            .to_string();

        let kind = match input_type.as_str() {
            "checkbox" | "radio" => RowKind::Choice {
                checked: doc.is_checked(node),
            },
            "submit" | "button" | "reset" | "image" => {
                let text = doc.attr(node, "value").unwrap_or("Submit").to_string();
                self.push(node, depth, RowKind::Button, text);
                return;
            }
            "hidden" => return,
            _ => RowKind::Field,
        };

        let value = doc.value(node);
        let mut detail = if value.is_empty() {
            self.host
                .date_options(node)
                .map(|options| format!("({})", options.date_format))
                .or_else(|| doc.attr(node, "placeholder").map(|p| format!("({p})")))
        } else {
            Some(value.to_string())
        };

        let validated_class = &self.controller.config().validation.validated_class;
        let shown = doc
            .ancestors(node)
            .any(|a| doc.tag(a) == Some("form") && doc.has_class(a, validated_class));
        let violation = if shown { check_control(doc, node) } else { None };
        if let Some(violation) = violation {
            detail = Some(match detail {
                Some(d) => format!("{d}  {}", violation.message()),
                None => violation.message().to_string(),
            });
        }

        self.rows.push(OutlineRow {
            node,
            depth,
            kind,
            label,
            detail,
            invalid: violation.is_some(),
        });
    }

    fn visit_table(&mut self, node: NodeId, depth: usize) {
        let doc = self.doc;
        let name = doc.id(node).map_or_else(|| "table".to_string(), |id| format!("table #{id}"));
        self.push(node, depth, RowKind::Table, name);
        if let Some(options) = self.host.table(node) {
            let search = if options.search_input_only {
                format!("[{}]", options.search_placeholder)
            } else {
                format!("Search: [{}]", options.search_placeholder)
            };
            if let Some(row) = self.rows.last_mut() {
                row.detail = Some(search);
            }
        }

        for tr in doc.descendants(node) {
            if doc.tag(tr) != Some("tr") {
                continue;
            }
            let cells: Vec<String> = doc
                .children(tr)
                .iter()
                .map(|&cell| self.cell_text(cell))
                .collect();
            self.push(tr, depth + 1, RowKind::TableRow, cells.join(" | "));
        }
    }

    /// Cell text; cells carrying `data-amount` show it as currency.
    fn cell_text(&self, cell: NodeId) -> String {
        let doc = self.doc;
        if let Some(amount) = doc.attr(cell, "data-amount") {
            let formatted = amount
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|a| {
                    self.controller
                        .format_currency(a, doc.attr(cell, "data-currency"))
                        .ok()
                });
            if let Some(formatted) = formatted {
                return formatted;
            }
        }
        doc.text_content(cell).trim().to_string()
    }
}

fn own_text(doc: &Document, node: NodeId) -> String {
    doc.text(node).unwrap_or_default().trim().to_string()
}

fn alert_severity(doc: &Document, node: NodeId) -> Severity {
    doc.classes(node)
        .iter()
        .filter_map(|c| c.strip_prefix("alert-"))
        .find_map(Severity::parse)
        .unwrap_or_default()
}

/// Status-line hint for `node`: its tooltip or popover text.
pub fn hint_text(host: &HostState, node: NodeId) -> Option<String> {
    host.hint(node).map(|(kind, text)| match kind {
        WidgetKind::Tooltip => text.to_string(),
        WidgetKind::Popover => format!("{text} (popover)"),
    })
}

/// Style one outline row as a line of text.
///
/// `editing` replaces the row's value with the edit buffer and a cursor.
pub fn row_line(row: &OutlineRow, focused: bool, editing: Option<&str>, theme: &Theme) -> Line<'static> {
    let colors = &theme.colors;
    let indent = "  ".repeat(row.depth);
    let marker = if focused { "› " } else { "  " };

    let label_style = match &row.kind {
        RowKind::Heading => Style::default().fg(colors.header).add_modifier(Modifier::BOLD),
        RowKind::Form | RowKind::Group | RowKind::Table => {
            Style::default().fg(colors.header)
        }
        RowKind::Label | RowKind::TableRow => Style::default().fg(colors.text_dim),
        RowKind::Alert(severity) => Style::default().fg(theme.severity_color(*severity)),
        _ => Style::default().fg(colors.text),
    };
    let label_style = if focused {
        label_style.fg(colors.focus_highlight).add_modifier(Modifier::BOLD)
    } else {
        label_style
    };

    let mut spans = vec![Span::raw(indent), Span::raw(marker)];
    match &row.kind {
        RowKind::Alert(severity) => {
            spans.push(Span::styled(format!("{} ", severity.icon()), label_style));
            spans.push(Span::styled(row.label.clone(), label_style));
        }
        RowKind::Button => spans.push(Span::styled(format!("[ {} ]", row.label), label_style)),
        RowKind::Choice { checked } => {
            let mark = if *checked { "[x] " } else { "[ ] " };
            spans.push(Span::styled(format!("{mark}{}", row.label), label_style));
        }
        RowKind::Field => spans.push(Span::styled(format!("{}: ", row.label), label_style)),
        _ => spans.push(Span::styled(row.label.clone(), label_style)),
    }

    if let Some(buffer) = editing {
        spans.push(Span::styled(
            format!("{buffer}▏"),
            Style::default().fg(colors.editing).add_modifier(Modifier::UNDERLINED),
        ));
    } else if let Some(detail) = &row.detail {
        let style = if row.invalid {
            Style::default().fg(colors.status_error)
        } else {
            Style::default().fg(colors.text_dim)
        };
        let sep = if row.kind == RowKind::Field { "" } else { "  " };
        spans.push(Span::styled(format!("{sep}{detail}"), style));
    }
    Line::from(spans)
}
