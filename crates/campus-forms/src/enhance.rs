//! Widget bootstrap, the sidebar toggle and optional table/date enhancement.

use campus_core::log_feature_skipped;
use campus_dom::{DomEvent, EventKind, ListenerScope};
use tracing::debug;

use crate::capability::{DatePickerOptions, TableOptions, WidgetKind};
use crate::controller::{FormController, Handler};

impl FormController {
    /// Hand every element carrying the `kind` marker to the widget library.
    pub(crate) fn init_widgets(&mut self, kind: WidgetKind) -> usize {
        let selector = match kind {
            WidgetKind::Tooltip => &self.markers.tooltip,
            WidgetKind::Popover => &self.markers.popover,
        };
        let targets = self.document.select_all(selector);
        if targets.is_empty() {
            log_feature_skipped!(kind.as_str(), reason = "no targets");
            return 0;
        }
        let Some(widgets) = self.capabilities.widgets.as_mut() else {
            log_feature_skipped!(kind.as_str(), reason = "no widget library", count = targets.len());
            return 0;
        };
        for &element in &targets {
            widgets.create(kind, &self.document, element);
        }
        debug!(feature = kind.as_str(), count = targets.len(), "Widgets created");
        targets.len()
    }

    pub(crate) fn bind_sidebar_toggle(&mut self) -> bool {
        let id = &self.config.markers.sidebar_toggle_id;
        let Some(toggle) = self.document.get_element_by_id(id) else {
            log_feature_skipped!("sidebar", reason = "no toggle control", id = id.as_str());
            return false;
        };
        self.listeners
            .add(ListenerScope::Element(toggle), EventKind::Click, Handler::ToggleSidebar);
        true
    }

    pub(crate) fn toggle_sidebar(&mut self, event: &mut DomEvent) {
        event.prevent_default();
        let root = self.document.root();
        let toggled = self
            .document
            .toggle_class(root, &self.config.sidebar.toggled_class);
        debug!(feature = "sidebar", toggled, "Sidebar toggled");
    }

    pub(crate) fn enhance_tables(&mut self) -> usize {
        let tables = self.document.select_all(&self.markers.data_table);
        if tables.is_empty() {
            log_feature_skipped!("tables", reason = "no targets");
            return 0;
        }
        let Some(enhancer) = self.capabilities.tables.as_mut() else {
            log_feature_skipped!("tables", reason = "no table library", count = tables.len());
            return 0;
        };
        let options = TableOptions::from(&self.config.tables);
        for &table in &tables {
            enhancer.enhance(&self.document, table, &options);
        }
        debug!(feature = "tables", count = tables.len(), "Tables enhanced");
        tables.len()
    }

    pub(crate) fn enhance_date_inputs(&mut self) -> usize {
        let inputs = self.document.select_all(&self.markers.date_picker);
        if inputs.is_empty() {
            log_feature_skipped!("date_picker", reason = "no targets");
            return 0;
        }
        let Some(picker) = self.capabilities.date_picker.as_mut() else {
            log_feature_skipped!("date_picker", reason = "no date picker", count = inputs.len());
            return 0;
        };
        let options = DatePickerOptions::from(&self.config.date_picker);
        for &input in &inputs {
            picker.attach(&self.document, input, &options);
        }
        debug!(feature = "date_picker", count = inputs.len(), "Date pickers attached");
        inputs.len()
    }
}
