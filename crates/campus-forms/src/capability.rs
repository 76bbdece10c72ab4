//! Optional collaborators injected into the controller.
//!
//! Every enhancement library a page may or may not have loaded is modelled
//! as a trait object held in an `Option`. A `None` capability makes the
//! matching feature a silent no-op.

use std::fmt;

use campus_config::{DatePickerConfig, TableConfig};
use campus_core::Severity;
use campus_dom::{Document, NodeId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of decorative widget attached at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Tooltip,
    Popover,
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tooltip => "tooltip",
            Self::Popover => "popover",
        }
    }
}

/// Tooltip and popover library.
pub trait WidgetLibrary {
    /// Attach a widget of `kind` to `element`.
    fn create(&mut self, kind: WidgetKind, doc: &Document, element: NodeId);
}

/// Options passed to [`TableEnhancer::enhance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    pub responsive: bool,
    /// Render the search box without the library's label
    pub search_input_only: bool,
    pub search_placeholder: String,
}

impl From<&TableConfig> for TableOptions {
    fn from(config: &TableConfig) -> Self {
        Self {
            responsive: config.responsive,
            search_input_only: config.search_input_only,
            search_placeholder: config.search_placeholder.clone(),
        }
    }
}

/// Interactive data-table library.
pub trait TableEnhancer {
    fn enhance(&mut self, doc: &Document, table: NodeId, options: &TableOptions);
}

/// Options passed to [`DatePicker::attach`].
///
/// `date_format` uses the picker's own tokens (`Y-m-d`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePickerOptions {
    pub date_format: String,
    pub allow_input: bool,
}

impl From<&DatePickerConfig> for DatePickerOptions {
    fn from(config: &DatePickerConfig) -> Self {
        Self {
            date_format: config.date_format.clone(),
            allow_input: config.allow_input,
        }
    }
}

impl DatePickerOptions {
    /// Translate picker tokens into a chrono format string.
    pub fn chrono_format(&self) -> String {
        let mut out = String::with_capacity(self.date_format.len() * 2);
        for c in self.date_format.chars() {
            match c {
                'Y' => out.push_str("%Y"),
                'y' => out.push_str("%y"),
                'm' => out.push_str("%m"),
                'n' => out.push_str("%-m"),
                'd' => out.push_str("%d"),
                'j' => out.push_str("%-d"),
                'M' => out.push_str("%b"),
                'F' => out.push_str("%B"),
                'D' => out.push_str("%a"),
                'l' => out.push_str("%A"),
                '%' => out.push_str("%%"),
                other => out.push(other),
            }
        }
        out
    }

    pub fn format(&self, date: NaiveDate) -> String {
        date.format(&self.chrono_format()).to_string()
    }

    /// Parse typed input in the picker format, falling back to ISO dates.
    pub fn parse(&self, input: &str) -> Option<NaiveDate> {
        let input = input.trim();
        NaiveDate::parse_from_str(input, &self.chrono_format())
            .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
            .ok()
    }
}

/// Date-picker library.
pub trait DatePicker {
    fn attach(&mut self, doc: &Document, input: NodeId, options: &DatePickerOptions);
}

/// Non-blocking toast notifications.
pub trait Toaster {
    fn toast(&mut self, severity: Severity, message: &str);
}

/// Blocking dialogs.
pub trait Dialogs {
    /// Ask a yes/no question; true means the user confirmed.
    fn confirm(&mut self, message: &str) -> bool;

    /// Show a message and wait for acknowledgement.
    fn alert(&mut self, message: &str);
}

/// The set of optional collaborators available to a page.
#[derive(Default)]
pub struct Capabilities {
    pub widgets: Option<Box<dyn WidgetLibrary>>,
    pub tables: Option<Box<dyn TableEnhancer>>,
    pub date_picker: Option<Box<dyn DatePicker>>,
    pub toaster: Option<Box<dyn Toaster>>,
    pub dialogs: Option<Box<dyn Dialogs>>,
}

impl Capabilities {
    /// No optional libraries at all: a plain page.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_widgets(mut self, widgets: impl WidgetLibrary + 'static) -> Self {
        self.widgets = Some(Box::new(widgets));
        self
    }

    pub fn with_tables(mut self, tables: impl TableEnhancer + 'static) -> Self {
        self.tables = Some(Box::new(tables));
        self
    }

    pub fn with_date_picker(mut self, picker: impl DatePicker + 'static) -> Self {
        self.date_picker = Some(Box::new(picker));
        self
    }

    pub fn with_toaster(mut self, toaster: impl Toaster + 'static) -> Self {
        self.toaster = Some(Box::new(toaster));
        self
    }

    pub fn with_dialogs(mut self, dialogs: impl Dialogs + 'static) -> Self {
        self.dialogs = Some(Box::new(dialogs));
        self
    }

    /// Names of the capabilities present, for logging.
    pub fn available(&self) -> Vec<&'static str> {
        [
            ("widgets", self.widgets.is_some()),
            ("tables", self.tables.is_some()),
            ("date_picker", self.date_picker.is_some()),
            ("toaster", self.toaster.is_some()),
            ("dialogs", self.dialogs.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.available()).finish()
    }
}
