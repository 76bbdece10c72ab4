//! The form interaction controller.
//!
//! [`FormController`] owns a page's [`Document`], its listeners and timers,
//! and the optional capabilities. [`FormController::on_page_load`] wires
//! every feature once; afterwards the host feeds it clicks, submissions and
//! clock ticks.
//!
//! ```
//! use campus_config::FormsConfig;
//! use campus_dom::{Document, ElementSpec};
//! use campus_forms::{Capabilities, FormController};
//!
//! let mut doc = Document::new();
//! let form = doc.append_spec(
//!     doc.root(),
//!     &ElementSpec::new("form")
//!         .with_class("needs-validation")
//!         .with_child(ElementSpec::new("input").with_attr("required", "")),
//! );
//!
//! let mut controller =
//!     FormController::new(doc, FormsConfig::default(), Capabilities::none()).unwrap();
//! controller.on_page_load();
//!
//! let outcome = controller.submit(form).unwrap();
//! assert!(outcome.default_prevented);
//! assert!(controller.document().has_class(form, "was-validated"));
//! ```

use std::time::Duration;

use campus_config::{FormsConfig, MarkerConfig};
use campus_core::Severity;
use campus_dom::{
    Document, DomEvent, EventKind, ListenerRegistry, ListenerScope, NodeId, Selector, radio_group,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::capability::{Capabilities, WidgetKind};
use crate::currency;
use crate::error::{FormsError, Result};
use crate::notify::{self, NotificationRoute};
use crate::timer::TimerQueue;

/// Marker selectors compiled from [`MarkerConfig`].
#[derive(Debug, Clone)]
pub(crate) struct Markers {
    pub tooltip: Selector,
    pub popover: Selector,
    pub validated_form: Selector,
    pub data_table: Selector,
    pub date_picker: Selector,
    pub dismissible_alert: Selector,
    pub alert: Selector,
    pub alert_close: Selector,
    pub add_field: Selector,
    pub remove_field: Selector,
    pub field_group: Selector,
    pub delete_confirm: Selector,
    pub form: Selector,
}

impl Markers {
    fn compile(config: &MarkerConfig) -> Result<Self> {
        let parse = |marker: &'static str, source: &str| {
            Selector::parse(source).map_err(|e| FormsError::selector(marker, e))
        };
        Ok(Self {
            tooltip: parse("tooltip", &config.tooltip)?,
            popover: parse("popover", &config.popover)?,
            validated_form: parse("validated_form", &config.validated_form)?,
            data_table: parse("data_table", &config.data_table)?,
            date_picker: parse("date_picker", &config.date_picker)?,
            dismissible_alert: parse("dismissible_alert", &config.dismissible_alert)?,
            alert: parse("alert", &config.alert)?,
            alert_close: parse("alert_close", &config.alert_close)?,
            add_field: parse("add_field", &config.add_field)?,
            remove_field: parse("remove_field", &config.remove_field)?,
            field_group: parse("field_group", &config.field_group)?,
            delete_confirm: parse("delete_confirm", &config.delete_confirm)?,
            form: parse("form", "form")?,
        })
    }
}

/// Listener bodies. Element-scoped handlers act on the element they are
/// bound to; document-scoped ones inspect the event target's ancestry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handler {
    ToggleSidebar,
    ValidateSubmit,
    AddFieldGroup,
    RemoveFieldGroup,
    CloseAlert,
    ConfirmDelete,
}

/// Work scheduled on the virtual clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerTask {
    DismissAlert(NodeId),
}

/// What [`FormController::on_page_load`] wired up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub tooltips: usize,
    pub popovers: usize,
    pub sidebar_toggle: bool,
    pub validated_forms: usize,
    pub tables: usize,
    pub date_inputs: usize,
    pub alerts_scheduled: usize,
    pub add_controls: usize,
}

/// Result of dispatching one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    pub handlers_run: usize,
}

/// What activating an element did once its click was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Click dispatched, no default action
    Clicked,
    /// A listener cancelled the click
    Cancelled,
    /// Checkbox or radio state after the click
    Toggled { checked: bool },
    /// The owning form was submitted; index into [`FormController::submissions`]
    Submitted(usize),
    /// The owning form's submit event was cancelled
    SubmitBlocked,
}

/// A form submission that was not cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub form: NodeId,
    pub form_id: Option<String>,
    /// `(name, value)` pairs in document order
    pub fields: Vec<(String, String)>,
}

impl FormSubmission {
    /// First value submitted under `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Owns a page and reacts to its events.
pub struct FormController {
    pub(crate) document: Document,
    pub(crate) config: FormsConfig,
    pub(crate) capabilities: Capabilities,
    pub(crate) markers: Markers,
    pub(crate) listeners: ListenerRegistry<Handler>,
    pub(crate) timers: TimerQueue<TimerTask>,
    submissions: Vec<FormSubmission>,
    loads: usize,
}

impl FormController {
    /// Create a controller for `document`.
    ///
    /// Fails only if a marker selector in `config` does not parse.
    pub fn new(document: Document, config: FormsConfig, capabilities: Capabilities) -> Result<Self> {
        let markers = Markers::compile(&config.markers)?;
        debug!(capabilities = ?capabilities.available(), "Form controller created");
        Ok(Self {
            document,
            config,
            capabilities,
            markers,
            listeners: ListenerRegistry::new(),
            timers: TimerQueue::new(),
            submissions: Vec::new(),
            loads: 0,
        })
    }

    /// Wire every feature against the current page.
    ///
    /// Calling this twice binds every listener twice.
    pub fn on_page_load(&mut self) -> BootstrapReport {
        self.loads += 1;
        if self.loads > 1 {
            warn!(loads = self.loads, "Page load handled again; listeners are now duplicated");
        }

        let report = BootstrapReport {
            tooltips: self.init_widgets(WidgetKind::Tooltip),
            popovers: self.init_widgets(WidgetKind::Popover),
            sidebar_toggle: self.bind_sidebar_toggle(),
            validated_forms: self.bind_validation(),
            tables: self.enhance_tables(),
            date_inputs: self.enhance_date_inputs(),
            alerts_scheduled: self.schedule_alert_dismissal(),
            add_controls: self.bind_add_controls(),
        };

        // Delegated at the document so elements added later are covered.
        // The confirmation runs first so a declined one cancels the others.
        self.listeners
            .add(ListenerScope::Document, EventKind::Click, Handler::ConfirmDelete);
        self.listeners
            .add(ListenerScope::Document, EventKind::Click, Handler::CloseAlert);
        self.listeners
            .add(ListenerScope::Document, EventKind::Click, Handler::RemoveFieldGroup);

        info!(
            tooltips = report.tooltips,
            popovers = report.popovers,
            sidebar_toggle = report.sidebar_toggle,
            validated_forms = report.validated_forms,
            tables = report.tables,
            date_inputs = report.date_inputs,
            alerts_scheduled = report.alerts_scheduled,
            add_controls = report.add_controls,
            "Page bootstrapped"
        );
        report
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Run `event` through its bubbling route.
    pub fn dispatch(&mut self, mut event: DomEvent) -> DispatchOutcome {
        let route = self.listeners.route(&self.document, &event);
        let mut handlers_run = 0;
        let mut scope = None;
        for step in route {
            if event.propagation_stopped() && scope != Some(step.current_target) {
                break;
            }
            scope = Some(step.current_target);
            event.current_target = Some(step.current_target);
            self.run(step.handler, &mut event);
            handlers_run += 1;
        }
        DispatchOutcome {
            default_prevented: event.default_prevented(),
            propagation_stopped: event.propagation_stopped(),
            handlers_run,
        }
    }

    fn run(&mut self, handler: Handler, event: &mut DomEvent) {
        match handler {
            Handler::ToggleSidebar => self.toggle_sidebar(event),
            Handler::ValidateSubmit => self.validate_submission(event),
            Handler::AddFieldGroup => self.add_field_group(event),
            Handler::RemoveFieldGroup => self.remove_field_group(event),
            Handler::CloseAlert => self.close_alert(event),
            Handler::ConfirmDelete => self.confirm_marked_delete(event),
        }
    }

    /// Dispatch a click on `node`. Detached nodes are ignored.
    pub fn click(&mut self, node: NodeId) -> Option<DispatchOutcome> {
        if !self.document.is_connected(node) {
            debug!(node = %node, "Click on detached element ignored");
            return None;
        }
        Some(self.dispatch(DomEvent::click(node)))
    }

    /// Dispatch a submit event on `form`; an uncancelled submission is
    /// recorded. Detached forms are ignored.
    pub fn submit(&mut self, form: NodeId) -> Option<DispatchOutcome> {
        if !self.document.is_connected(form) {
            debug!(node = %form, "Submit on detached form ignored");
            return None;
        }
        let outcome = self.dispatch(DomEvent::submit(form));
        if !outcome.default_prevented {
            let submission = self.collect_submission(form);
            info!(
                form = %form,
                form_id = submission.form_id.as_deref().unwrap_or(""),
                fields = submission.fields.len(),
                "Form submitted"
            );
            self.submissions.push(submission);
        }
        Some(outcome)
    }

    /// Click `node` and run its default action: toggle a checkbox or radio,
    /// or submit the owning form of a submit button.
    pub fn activate(&mut self, node: NodeId) -> Option<Activation> {
        let input_type = self.document.attr(node, "type").map(str::to_ascii_lowercase);
        let tag = self.document.tag(node).map(str::to_string).unwrap_or_default();

        if tag == "input" {
            match input_type.as_deref() {
                Some("checkbox") => return self.activate_checkable(node, false),
                Some("radio") => return self.activate_checkable(node, true),
                _ => {}
            }
        }

        let outcome = self.click(node)?;
        if outcome.default_prevented {
            return Some(Activation::Cancelled);
        }

        let submits = match tag.as_str() {
            "button" => matches!(input_type.as_deref(), None | Some("submit")),
            "input" => matches!(input_type.as_deref(), Some("submit" | "image")),
            _ => false,
        };
        if !submits {
            return Some(Activation::Clicked);
        }
        // A control removed by its own click has no form owner any more.
        let Some(form) = self.document.closest(node, &self.markers.form) else {
            return Some(Activation::Clicked);
        };
        match self.submit(form) {
            Some(o) if !o.default_prevented => Some(Activation::Submitted(self.submissions.len() - 1)),
            Some(_) => Some(Activation::SubmitBlocked),
            None => Some(Activation::Clicked),
        }
    }

    /// Check state changes before the click's listeners run and is restored
    /// when one of them cancels it. Checking a radio unchecks the rest of
    /// its group.
    fn activate_checkable(&mut self, node: NodeId, radio: bool) -> Option<Activation> {
        if !self.document.is_connected(node) {
            debug!(node = %node, "Activation of detached control ignored");
            return None;
        }
        let affected = if radio {
            radio_group(&self.document, node)
        } else {
            vec![node]
        };
        let previous: Vec<(NodeId, bool)> = affected
            .iter()
            .map(|&n| (n, self.document.is_checked(n)))
            .collect();

        let checked = radio || !self.document.is_checked(node);
        for &n in &affected {
            self.document.set_checked(n, false);
        }
        self.document.set_checked(node, checked);

        let outcome = self.click(node)?;
        if outcome.default_prevented {
            for (n, was_checked) in previous {
                self.document.set_checked(n, was_checked);
            }
            debug!(node = %node, "Check state restored after cancelled click");
            return Some(Activation::Cancelled);
        }
        Some(Activation::Toggled { checked })
    }

    /// Set a control's value and dispatch an input event on it.
    pub fn input(&mut self, node: NodeId, value: &str) -> Option<DispatchOutcome> {
        if !self.document.is_connected(node) {
            return None;
        }
        self.document.set_value(node, value);
        Some(self.dispatch(DomEvent::new(EventKind::Input, node)))
    }

    fn collect_submission(&self, form: NodeId) -> FormSubmission {
        let doc = &self.document;
        let fields = doc
            .descendants(form)
            .into_iter()
            .filter(|&n| matches!(doc.tag(n), Some("input" | "select" | "textarea")))
            .filter(|&n| !doc.has_attr(n, "disabled"))
            .filter_map(|n| {
                let name = doc.attr(n, "name")?;
                let kind = doc.attr(n, "type").unwrap_or("text").to_ascii_lowercase();
                match kind.as_str() {
                    "submit" | "button" | "reset" | "image" => None,
                    "checkbox" | "radio" if !doc.is_checked(n) => None,
                    "checkbox" | "radio" => {
                        Some((name.to_string(), doc.attr(n, "value").unwrap_or("on").to_string()))
                    }
                    _ => Some((name.to_string(), doc.value(n).to_string())),
                }
            })
            .collect();
        FormSubmission {
            form,
            form_id: doc.id(form).map(str::to_string),
            fields,
        }
    }

    // =========================================================================
    // Time
    // =========================================================================

    /// Advance the virtual clock and run every timer now due. Returns the
    /// number of timers fired.
    pub fn advance_time(&mut self, by: Duration) -> usize {
        let due = self.timers.advance(by);
        let fired = due.len();
        for task in due {
            match task {
                TimerTask::DismissAlert(alert) => {
                    self.dismiss_alert(alert);
                }
            }
        }
        fired
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_timer_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Ask to confirm a deletion; `None` uses the configured message.
    pub fn confirm_delete(&mut self, message: Option<&str>) -> bool {
        let message = message.unwrap_or(self.config.notifications.delete_confirmation.as_str());
        notify::confirm_delete(&mut self.capabilities, Some(message))
    }

    /// Show a notification through the best available channel.
    pub fn notify(&mut self, message: &str, severity: Option<Severity>) -> NotificationRoute {
        notify::show_notification(&mut self.capabilities, message, severity)
    }

    /// Format `amount`; `None` uses the configured default currency.
    pub fn format_currency(&self, amount: f64, currency: Option<&str>) -> Result<String> {
        let currency = currency.unwrap_or(self.config.notifications.default_currency.as_str());
        currency::format_currency(amount, Some(currency))
    }

    fn confirm_marked_delete(&mut self, event: &mut DomEvent) {
        let Some(control) = self.document.closest(event.target, &self.markers.delete_confirm) else {
            return;
        };
        let message = self
            .document
            .attr(control, &confirm_attribute(&self.config.markers.delete_confirm))
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string);
        if !self.confirm_delete(message.as_deref()) {
            debug!(node = %control, "Deletion declined");
            event.prevent_default();
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn config(&self) -> &FormsConfig {
        &self.config
    }

    pub fn capabilities_mut(&mut self) -> &mut Capabilities {
        &mut self.capabilities
    }

    /// Uncancelled submissions, oldest first.
    pub fn submissions(&self) -> &[FormSubmission] {
        &self.submissions
    }

    /// Whether the sidebar-toggled class is on the document root.
    pub fn sidebar_toggled(&self) -> bool {
        self.document
            .has_class(self.document.root(), &self.config.sidebar.toggled_class)
    }

    pub fn page_loads(&self) -> usize {
        self.loads
    }

    /// Number of listeners bound so far.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// The attribute named by a bare `[attr]` marker, else `data-confirm`.
fn confirm_attribute(marker: &str) -> String {
    marker
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .filter(|s| !s.contains(['=', '[', ']']))
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "data-confirm".to_string())
}

/// The element a handler is bound to.
pub(crate) fn bound_element(event: &DomEvent) -> Option<NodeId> {
    match event.current_target {
        Some(ListenerScope::Element(node)) => Some(node),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_dom::ElementSpec;

    fn controller(doc: Document) -> FormController {
        FormController::new(doc, FormsConfig::default(), Capabilities::none()).unwrap()
    }

    #[test]
    fn test_invalid_marker_is_config_error() {
        let mut config = FormsConfig::default();
        config.markers.add_field = ".add-field[".to_string();
        let err = FormController::new(Document::new(), config, Capabilities::none()).err();
        assert!(matches!(
            err,
            Some(FormsError::InvalidSelector {
                marker: "add_field",
                ..
            })
        ));
    }

    #[test]
    fn test_confirm_attribute() {
        assert_eq!(confirm_attribute("[data-confirm]"), "data-confirm");
        assert_eq!(confirm_attribute("[data-ask]"), "data-ask");
        assert_eq!(confirm_attribute(".confirm"), "data-confirm");
        assert_eq!(confirm_attribute("[data-x=y]"), "data-confirm");
    }

    #[test]
    fn test_second_page_load_duplicates_listeners() {
        let mut doc = Document::new();
        doc.append_spec(doc.root(), &ElementSpec::new("form").with_class("needs-validation"));
        let mut controller = controller(doc);
        controller.on_page_load();
        let once = controller.listener_count();
        controller.on_page_load();
        assert_eq!(controller.listener_count(), once * 2);
        assert_eq!(controller.page_loads(), 2);
    }

    #[test]
    fn test_detached_click_is_noop() {
        let mut doc = Document::new();
        let orphan = doc.create_element("button");
        let mut controller = controller(doc);
        controller.on_page_load();
        assert_eq!(controller.click(orphan), None);
        assert_eq!(controller.activate(orphan), None);
        assert_eq!(controller.submit(orphan), None);
    }

    #[test]
    fn test_stop_propagation_halts_bubbling() {
        let mut doc = Document::new();
        let form = doc.append_spec(
            doc.root(),
            &ElementSpec::new("form")
                .with_class("needs-validation")
                .with_child(ElementSpec::new("input").with_attr("required", "")),
        );
        let mut controller = controller(doc);
        controller.on_page_load();
        // A document-level submit listener must not run once validation stops
        // propagation.
        controller
            .listeners
            .add(ListenerScope::Document, EventKind::Submit, Handler::ConfirmDelete);

        let outcome = controller.submit(form).unwrap();
        assert!(outcome.default_prevented);
        assert!(outcome.propagation_stopped);
        assert_eq!(outcome.handlers_run, 1);
        assert!(controller.submissions().is_empty());
    }

    #[test]
    fn test_submission_collects_named_fields() {
        let mut doc = Document::new();
        let form = doc.append_spec(
            doc.root(),
            &ElementSpec::new("form")
                .with_id("admission")
                .with_child(
                    ElementSpec::new("input")
                        .with_attr("name", "first_name")
                        .with_attr("value", "Amina"),
                )
                .with_child(
                    ElementSpec::new("input")
                        .with_attr("name", "consent")
                        .with_attr("type", "checkbox"),
                )
                .with_child(
                    ElementSpec::new("input")
                        .with_attr("name", "notes")
                        .with_attr("disabled", ""),
                )
                .with_child(ElementSpec::new("button").with_attr("type", "submit")),
        );
        let mut controller = controller(doc);
        controller.on_page_load();
        assert!(controller.submit(form).is_some());

        let submission = &controller.submissions()[0];
        assert_eq!(submission.form_id.as_deref(), Some("admission"));
        assert_eq!(
            submission.fields,
            vec![("first_name".to_string(), "Amina".to_string())]
        );
        assert_eq!(submission.value("first_name"), Some("Amina"));
    }

    #[test]
    fn test_activate_checkbox_toggles() {
        let mut doc = Document::new();
        let checkbox = doc.append_spec(
            doc.root(),
            &ElementSpec::new("input").with_attr("type", "checkbox"),
        );
        let mut controller = controller(doc);
        assert_eq!(
            controller.activate(checkbox),
            Some(Activation::Toggled { checked: true })
        );
        assert_eq!(
            controller.activate(checkbox),
            Some(Activation::Toggled { checked: false })
        );
    }

    #[test]
    fn test_cancelled_click_restores_check_state() {
        use crate::recording::{DialogLog, RecordingDialogs};

        let mut doc = Document::new();
        let root = doc.root();
        let form = doc.append_spec(
            root,
            &ElementSpec::new("form")
                .with_child(
                    ElementSpec::new("input")
                        .with_attr("type", "radio")
                        .with_attr("name", "stream")
                        .with_attr("checked", ""),
                )
                .with_child(
                    ElementSpec::new("input")
                        .with_attr("type", "radio")
                        .with_attr("name", "stream")
                        .with_attr("data-confirm", "Change stream?"),
                ),
        );
        let (science, arts) = (doc.children(form)[0], doc.children(form)[1]);

        let dialogs = DialogLog::default();
        let caps = Capabilities::none().with_dialogs(RecordingDialogs::answering(false, &dialogs));
        let mut controller = FormController::new(doc, FormsConfig::default(), caps).unwrap();
        controller.on_page_load();

        assert_eq!(controller.activate(arts), Some(Activation::Cancelled));
        assert!(controller.document().is_checked(science));
        assert!(!controller.document().is_checked(arts));
        assert_eq!(dialogs.confirms(), vec!["Change stream?"]);
    }

    #[test]
    fn test_wrappers_use_config_defaults() {
        let config = FormsConfig::default().with_default_currency("EUR");
        let controller =
            FormController::new(Document::new(), config, Capabilities::none()).unwrap();
        assert_eq!(controller.format_currency(1234.5, None).unwrap(), "€1,234.50");
        assert_eq!(
            controller.format_currency(1234.5, Some("USD")).unwrap(),
            "$1,234.50"
        );
    }
}
