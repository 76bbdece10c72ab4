//! Capabilities that record what they were asked to do.
//!
//! Used by the headless `--check` run and by tests. Each recorder hands out
//! a shared log so the caller can inspect calls after the capability has
//! been moved into the controller.

use std::cell::RefCell;
use std::rc::Rc;

use campus_core::Severity;
use campus_dom::{Document, NodeId};

use crate::capability::{
    DatePicker, DatePickerOptions, Dialogs, TableEnhancer, TableOptions, Toaster, WidgetKind,
    WidgetLibrary,
};

/// Shared, append-only log of calls.
#[derive(Debug)]
pub struct Recorder<T> {
    entries: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T: Clone> Recorder<T> {
    fn push(&self, entry: T) {
        self.entries.borrow_mut().push(entry);
    }

    /// Snapshot of every recorded call, oldest first.
    pub fn entries(&self) -> Vec<T> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

pub type WidgetLog = Recorder<(WidgetKind, NodeId)>;
pub type TableLog = Recorder<(NodeId, TableOptions)>;
pub type DatePickerLog = Recorder<(NodeId, DatePickerOptions)>;
pub type ToastLog = Recorder<(Severity, String)>;

/// Messages shown through [`RecordingDialogs`].
#[derive(Debug, Clone, Default)]
pub struct DialogLog {
    confirms: Recorder<String>,
    alerts: Recorder<String>,
}

impl DialogLog {
    pub fn confirms(&self) -> Vec<String> {
        self.confirms.entries()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.entries()
    }
}

pub struct RecordingWidgets(WidgetLog);

impl RecordingWidgets {
    pub fn new(log: &WidgetLog) -> Self {
        Self(log.clone())
    }
}

impl WidgetLibrary for RecordingWidgets {
    fn create(&mut self, kind: WidgetKind, _doc: &Document, element: NodeId) {
        self.0.push((kind, element));
    }
}

pub struct RecordingTables(TableLog);

impl RecordingTables {
    pub fn new(log: &TableLog) -> Self {
        Self(log.clone())
    }
}

impl TableEnhancer for RecordingTables {
    fn enhance(&mut self, _doc: &Document, table: NodeId, options: &TableOptions) {
        self.0.push((table, options.clone()));
    }
}

pub struct RecordingDatePicker(DatePickerLog);

impl RecordingDatePicker {
    pub fn new(log: &DatePickerLog) -> Self {
        Self(log.clone())
    }
}

impl DatePicker for RecordingDatePicker {
    fn attach(&mut self, _doc: &Document, input: NodeId, options: &DatePickerOptions) {
        self.0.push((input, options.clone()));
    }
}

pub struct RecordingToaster(ToastLog);

impl RecordingToaster {
    pub fn new(log: &ToastLog) -> Self {
        Self(log.clone())
    }
}

impl Toaster for RecordingToaster {
    fn toast(&mut self, severity: Severity, message: &str) {
        self.0.push((severity, message.to_string()));
    }
}

/// Dialogs that always give the same answer.
pub struct RecordingDialogs {
    answer: bool,
    log: DialogLog,
}

impl RecordingDialogs {
    pub fn answering(answer: bool, log: &DialogLog) -> Self {
        Self {
            answer,
            log: log.clone(),
        }
    }
}

impl Dialogs for RecordingDialogs {
    fn confirm(&mut self, message: &str) -> bool {
        self.log.confirms.push(message.to_string());
        self.answer
    }

    fn alert(&mut self, message: &str) {
        self.log.alerts.push(message.to_string());
    }
}
