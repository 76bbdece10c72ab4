//! End-to-end tests of the form controller on an admission page.

use std::io::Write;
use std::time::Duration;

use campus_config::FormsConfig;
use campus_core::Severity;
use campus_dom::{Document, NodeId, PageSpec};
use campus_forms::recording::{DialogLog, RecordingDialogs, RecordingToaster, ToastLog};
use campus_forms::{Activation, BootstrapReport, Capabilities, FormController, NotificationRoute};
use tempfile::NamedTempFile;

const ADMISSION_PAGE: &str = r##"
title: New Admission
body:
  tag: body
  children:
    - tag: button
      id: sidebarToggle
      text: Menu
    - tag: div
      classes: [alert, alert-success, alert-dismissible]
      text: Admission draft saved
      children:
        - tag: button
          classes: [btn-close]
          attrs: { data-bs-dismiss: alert }
    - tag: div
      classes: [alert, alert-info, alert-dismissible, alert-persistent]
      text: Fees are due on the 5th
      children:
        - tag: button
          classes: [btn-close]
          attrs: { data-bs-dismiss: alert }
    - tag: form
      id: admission
      classes: [needs-validation]
      children:
        - tag: input
          attrs: { name: first_name, required: "" }
        - tag: input
          attrs: { name: parent_email, type: email }
        - tag: div
          id: guardians
        - tag: button
          classes: [add-field]
          attrs: { type: button, data-container: "#guardians", data-template: "#guardian-template" }
          text: Add guardian
        - tag: button
          classes: [btn, btn-danger]
          attrs: { type: submit, data-confirm: "Discard this application?" }
          text: Discard
        - tag: button
          attrs: { type: submit }
          text: Submit
    - tag: template
      id: guardian-template
      children:
        - tag: div
          classes: [field-group]
          children:
            - tag: input
              id: parent_name___INDEX__
              attrs: { name: "guardians[__INDEX__][parent_name]" }
            - tag: button
              classes: [remove-field]
              attrs: { type: button }
              text: Remove
"##;

struct Page {
    controller: FormController,
    report: BootstrapReport,
    form: NodeId,
    guardians: NodeId,
    add: NodeId,
}

fn load(config: FormsConfig, capabilities: Capabilities) -> Page {
    let page = PageSpec::from_yaml_str(ADMISSION_PAGE).unwrap();
    let doc = Document::from_spec(&page.body);
    let form = doc.get_element_by_id("admission").unwrap();
    let guardians = doc.get_element_by_id("guardians").unwrap();
    let add = doc.select_all_str(".add-field").unwrap()[0];
    let mut controller = FormController::new(doc, config, capabilities).unwrap();
    let report = controller.on_page_load();
    Page {
        controller,
        report,
        form,
        guardians,
        add,
    }
}

fn group_index(controller: &FormController, group: NodeId) -> String {
    let input = controller.document().children(group)[0];
    controller
        .document()
        .attr(input, "name")
        .unwrap()
        .to_string()
}

#[test]
fn test_bootstrap_report() {
    let page = load(FormsConfig::default(), Capabilities::none());
    let report = &page.report;
    assert!(report.sidebar_toggle);
    assert_eq!(report.validated_forms, 1);
    assert_eq!(report.alerts_scheduled, 1);
    assert_eq!(report.add_controls, 1);
    // Optional libraries are absent, so nothing was enhanced.
    assert_eq!(report.tooltips + report.tables + report.date_inputs, 0);
    assert_eq!(page.controller.pending_timers(), 1);
}

#[test]
fn test_validation_gate_on_submit_button() {
    let Page {
        mut controller,
        form,
        ..
    } = load(FormsConfig::default(), Capabilities::none());
    let submit = controller.document().select_all_str("button[type=submit]").unwrap()[1];

    assert_eq!(controller.activate(submit), Some(Activation::SubmitBlocked));
    assert!(controller.document().has_class(form, "was-validated"));
    assert!(controller.submissions().is_empty());

    let first_name = controller.document().select_all_str("[name=first_name]").unwrap()[0];
    controller.input(first_name, "Amina");
    assert_eq!(controller.activate(submit), Some(Activation::Submitted(0)));
    assert_eq!(controller.submissions()[0].value("first_name"), Some("Amina"));
    assert!(controller.document().has_class(form, "was-validated"));
}

#[test]
fn test_invalid_email_blocks_submission() {
    let Page {
        mut controller,
        form,
        ..
    } = load(FormsConfig::default(), Capabilities::none());
    let doc = controller.document();
    let first_name = doc.select_all_str("[name=first_name]").unwrap()[0];
    let email = doc.select_all_str("[name=parent_email]").unwrap()[0];
    controller.input(first_name, "Amina");
    controller.input(email, "not-an-email");
    assert!(controller.submit(form).unwrap().default_prevented);
    controller.input(email, "parent@example.org");
    assert!(!controller.submit(form).unwrap().default_prevented);
}

#[test]
fn test_alert_auto_dismiss_timing() {
    let Page { mut controller, .. } = load(FormsConfig::default(), Capabilities::none());
    let count = |c: &FormController| c.document().select_all_str(".alert").unwrap().len();

    assert_eq!(count(&controller), 2);
    controller.advance_time(Duration::from_millis(4000));
    assert_eq!(count(&controller), 2);
    controller.advance_time(Duration::from_millis(1000));
    assert_eq!(count(&controller), 1);

    let remaining = controller.document().select_all_str(".alert").unwrap()[0];
    assert!(controller.document().has_class(remaining, "alert-persistent"));
    controller.advance_time(Duration::from_secs(3600));
    assert_eq!(count(&controller), 1);
}

#[test]
fn test_field_group_indices_are_count_based() {
    let Page {
        mut controller,
        guardians,
        add,
        ..
    } = load(FormsConfig::default(), Capabilities::none());

    for _ in 0..3 {
        controller.activate(add);
    }
    let groups = controller.document().children(guardians).to_vec();
    let names: Vec<_> = groups.iter().map(|&g| group_index(&controller, g)).collect();
    assert_eq!(
        names,
        vec![
            "guardians[0][parent_name]",
            "guardians[1][parent_name]",
            "guardians[2][parent_name]"
        ]
    );

    // Remove the middle group through its own remove control.
    let remove = controller.document().children(groups[1])[1];
    assert_eq!(controller.activate(remove), Some(Activation::Clicked));
    assert_eq!(controller.document().child_count(guardians), 2);
    assert!(!controller.document().is_connected(groups[1]));

    controller.activate(add);
    let groups = controller.document().children(guardians).to_vec();
    let names: Vec<_> = groups.iter().map(|&g| group_index(&controller, g)).collect();
    assert_eq!(
        names,
        vec![
            "guardians[0][parent_name]",
            "guardians[2][parent_name]",
            "guardians[2][parent_name]"
        ]
    );
    let last_input = controller.document().children(groups[2])[0];
    assert_eq!(controller.document().id(last_input), Some("parent_name_2"));
}

#[test]
fn test_removed_control_click_is_noop() {
    let Page {
        mut controller,
        guardians,
        add,
        ..
    } = load(FormsConfig::default(), Capabilities::none());
    controller.activate(add);
    let group = controller.document().children(guardians)[0];
    let remove = controller.document().children(group)[1];
    controller.activate(remove);
    assert_eq!(controller.activate(remove), None);
    assert_eq!(controller.document().child_count(guardians), 0);
}

#[test]
fn test_confirm_marked_submit_declined() {
    let dialogs = DialogLog::default();
    let caps = Capabilities::none().with_dialogs(RecordingDialogs::answering(false, &dialogs));
    let Page { mut controller, .. } = load(FormsConfig::default(), caps);
    let discard = controller.document().select_all_str("[data-confirm]").unwrap()[0];

    assert_eq!(controller.activate(discard), Some(Activation::Cancelled));
    assert_eq!(dialogs.confirms(), vec!["Discard this application?"]);
    assert!(controller.submissions().is_empty());
}

#[test]
fn test_confirm_marked_submit_accepted() {
    let dialogs = DialogLog::default();
    let caps = Capabilities::none().with_dialogs(RecordingDialogs::answering(true, &dialogs));
    let Page { mut controller, .. } = load(FormsConfig::default(), caps);
    let discard = controller.document().select_all_str("[data-confirm]").unwrap()[0];
    // Accepted, then blocked by validation since first_name is empty.
    assert_eq!(controller.activate(discard), Some(Activation::SubmitBlocked));
    assert_eq!(dialogs.confirms().len(), 1);
}

#[test]
fn test_delete_confirmation_messages() {
    let dialogs = DialogLog::default();
    let caps = Capabilities::none().with_dialogs(RecordingDialogs::answering(true, &dialogs));
    let Page { mut controller, .. } = load(FormsConfig::default(), caps);

    assert!(controller.confirm_delete(None));
    assert!(controller.confirm_delete(Some("Delete exam record?")));
    assert_eq!(
        dialogs.confirms(),
        vec![
            "Are you sure you want to delete this item?",
            "Delete exam record?"
        ]
    );
}

#[test]
fn test_notification_fallback_carries_only_message() {
    let dialogs = DialogLog::default();
    let caps = Capabilities::none().with_dialogs(RecordingDialogs::answering(true, &dialogs));
    let Page { mut controller, .. } = load(FormsConfig::default(), caps);

    let route = controller.notify("Could not save admission", Some(Severity::Error));
    assert_eq!(route, NotificationRoute::Dialog);
    assert_eq!(dialogs.alerts(), vec!["Could not save admission"]);
}

#[test]
fn test_notification_toast_with_severity() {
    let toasts = ToastLog::default();
    let caps = Capabilities::none().with_toaster(RecordingToaster::new(&toasts));
    let Page { mut controller, .. } = load(FormsConfig::default(), caps);

    assert_eq!(controller.notify("Saved", None), NotificationRoute::Toast);
    assert_eq!(
        controller.notify("Fees overdue", Some(Severity::Warning)),
        NotificationRoute::Toast
    );
    assert_eq!(
        toasts.entries(),
        vec![
            (Severity::Info, "Saved".to_string()),
            (Severity::Warning, "Fees overdue".to_string())
        ]
    );
}

#[test]
fn test_currency_formatting() {
    let page = load(FormsConfig::default(), Capabilities::none());
    assert_eq!(page.controller.format_currency(1234.5, None).unwrap(), "$1,234.50");
    assert_eq!(
        page.controller.format_currency(1234.5, Some("EUR")).unwrap(),
        "€1,234.50"
    );
}

#[test]
fn test_config_file_changes_markers_and_timing() {
    let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(
        file,
        "alerts:\n  auto_dismiss_ms: 2000\nfield_groups:\n  index_placeholder: __INDEX__\nvalidation:\n  validated_class: checked"
    )
    .unwrap();
    file.flush().unwrap();

    let config = FormsConfig::load(file.path()).unwrap();
    let Page {
        mut controller,
        form,
        ..
    } = load(config, Capabilities::none());

    controller.submit(form);
    assert!(controller.document().has_class(form, "checked"));
    assert!(!controller.document().has_class(form, "was-validated"));

    controller.advance_time(Duration::from_millis(2000));
    assert_eq!(controller.document().select_all_str(".alert").unwrap().len(), 1);
}

#[test]
fn test_sidebar_toggle() {
    let Page { mut controller, .. } = load(FormsConfig::default(), Capabilities::none());
    let toggle = controller.document().get_element_by_id("sidebarToggle").unwrap();
    controller.activate(toggle);
    assert!(controller.sidebar_toggled());
    controller.activate(toggle);
    assert!(!controller.sidebar_toggled());
}

const HOUSE_PAGE: &str = r##"
title: House Allocation
body:
  tag: body
  children:
    - tag: form
      id: house
      classes: [needs-validation]
      children:
        - tag: input
          attrs: { type: radio, name: gender, value: f, required: "", checked: "" }
        - tag: input
          attrs: { type: radio, name: gender, value: m, required: "" }
        - tag: input
          attrs: { type: radio, name: house, value: red }
        - tag: input
          attrs: { type: radio, name: house, value: blue }
        - tag: input
          attrs: { type: number, name: fee, min: "0", required: "", value: "250" }
"##;

fn load_house() -> (FormController, NodeId, Vec<NodeId>) {
    let page = PageSpec::from_yaml_str(HOUSE_PAGE).unwrap();
    let doc = Document::from_spec(&page.body);
    let form = doc.get_element_by_id("house").unwrap();
    let radios = doc.select_all_str("input[type=radio]").unwrap();
    let mut controller =
        FormController::new(doc, FormsConfig::default(), Capabilities::none()).unwrap();
    controller.on_page_load();
    (controller, form, radios)
}

#[test]
fn test_required_radio_group_with_one_checked_submits() {
    let (mut controller, form, _) = load_house();
    let outcome = controller.submit(form).unwrap();
    assert!(!outcome.default_prevented);
    assert_eq!(controller.submissions()[0].value("gender"), Some("f"));
}

#[test]
fn test_activating_radios_keeps_one_checked_per_group() {
    let (mut controller, form, radios) = load_house();
    let (house_red, house_blue) = (radios[2], radios[3]);

    assert_eq!(
        controller.activate(house_red),
        Some(Activation::Toggled { checked: true })
    );
    assert_eq!(
        controller.activate(house_blue),
        Some(Activation::Toggled { checked: true })
    );
    assert_eq!(controller.activate(radios[1]), Some(Activation::Toggled { checked: true }));
    assert!(!controller.document().is_checked(house_red));
    assert!(!controller.document().is_checked(radios[0]));

    controller.submit(form).unwrap();
    let fields = &controller.submissions()[0].fields;
    let choices: Vec<_> = fields
        .iter()
        .filter(|(name, _)| name != "fee")
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    assert_eq!(choices, vec![("gender", "m"), ("house", "blue")]);
}

#[test]
fn test_non_finite_number_blocks_submission() {
    let (mut controller, form, _) = load_house();
    let fee = controller.document().select_all_str("input[name=fee]").unwrap()[0];
    for bad in ["NaN", "inf"] {
        controller.input(fee, bad);
        assert!(controller.submit(form).unwrap().default_prevented, "{bad}");
    }
    assert!(controller.submissions().is_empty());
}
