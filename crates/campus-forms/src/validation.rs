//! Submission validation gate.

use campus_core::log_feature_skipped;
use campus_dom::{DomEvent, EventKind, ListenerScope, NodeId, Violation, constraint};
use tracing::debug;

use crate::controller::{FormController, Handler, bound_element};

impl FormController {
    pub(crate) fn bind_validation(&mut self) -> usize {
        let forms = self.document.select_all(&self.markers.validated_form);
        if forms.is_empty() {
            log_feature_skipped!("validation", reason = "no targets");
        }
        for &form in &forms {
            self.listeners
                .add(ListenerScope::Element(form), EventKind::Submit, Handler::ValidateSubmit);
        }
        forms.len()
    }

    /// Cancel an invalid submission, and mark the form validated either way.
    pub(crate) fn validate_submission(&mut self, event: &mut DomEvent) {
        let Some(form) = bound_element(event) else {
            return;
        };
        let valid = constraint::check_validity(&self.document, form);
        if !valid {
            event.prevent_default();
            event.stop_propagation();
        }
        self.document
            .add_class(form, &self.config.validation.validated_class);
        debug!(feature = "validation", node = %form, valid, "Submission checked");
    }

    /// Controls of `form` that currently fail validation.
    pub fn invalid_controls(&self, form: NodeId) -> Vec<(NodeId, Violation)> {
        constraint::form_violations(&self.document, form)
    }
}

#[cfg(test)]
mod tests {
    use campus_config::FormsConfig;
    use campus_dom::{Document, ElementSpec, NodeId, Violation};

    use crate::capability::Capabilities;
    use crate::controller::FormController;

    fn admission_form(first_name: Option<&str>) -> (FormController, NodeId) {
        let mut input = ElementSpec::new("input")
            .with_attr("name", "first_name")
            .with_attr("required", "");
        if let Some(value) = first_name {
            input = input.with_attr("value", value);
        }
        let mut doc = Document::new();
        let form = doc.append_spec(
            doc.root(),
            &ElementSpec::new("form")
                .with_class("needs-validation")
                .with_child(input),
        );
        let mut controller =
            FormController::new(doc, FormsConfig::default(), Capabilities::none()).unwrap();
        controller.on_page_load();
        (controller, form)
    }

    #[test]
    fn test_invalid_submission_cancelled() {
        let (mut controller, form) = admission_form(None);
        let outcome = controller.submit(form).unwrap();
        assert!(outcome.default_prevented);
        assert!(outcome.propagation_stopped);
        assert!(controller.document().has_class(form, "was-validated"));
        assert_eq!(
            controller.invalid_controls(form)[0].1,
            Violation::ValueMissing
        );
    }

    #[test]
    fn test_first_valid_submission_still_marked() {
        let (mut controller, form) = admission_form(Some("Amina"));
        let outcome = controller.submit(form).unwrap();
        assert!(!outcome.default_prevented);
        assert!(controller.document().has_class(form, "was-validated"));
        assert_eq!(controller.submissions().len(), 1);
    }

    #[test]
    fn test_validated_class_persists() {
        let (mut controller, form) = admission_form(None);
        controller.submit(form);
        let input = controller.document().children(form)[0];
        controller.input(input, "Amina");
        controller.submit(form);
        let classes = controller.document().classes(form);
        assert_eq!(classes.iter().filter(|c| *c == "was-validated").count(), 1);
    }

    #[test]
    fn test_unmarked_form_not_gated() {
        let mut doc = Document::new();
        let form = doc.append_spec(
            doc.root(),
            &ElementSpec::new("form").with_child(ElementSpec::new("input").with_attr("required", "")),
        );
        let mut controller =
            FormController::new(doc, FormsConfig::default(), Capabilities::none()).unwrap();
        assert_eq!(controller.on_page_load().validated_forms, 0);
        assert!(!controller.submit(form).unwrap().default_prevented);
        assert!(!controller.document().has_class(form, "was-validated"));
    }
}
