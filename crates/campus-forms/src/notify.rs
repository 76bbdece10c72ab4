//! Delete confirmation and user notifications.

use campus_config::DEFAULT_DELETE_MESSAGE;
use campus_core::Severity;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capability::Capabilities;

/// Where a notification ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationRoute {
    /// Shown by the toast library
    Toast,
    /// Shown as a blocking dialog, without severity
    Dialog,
    /// Neither toasts nor dialogs are available
    Dropped,
}

/// Ask the user to confirm a deletion.
///
/// Uses the default message when `message` is `None`. Without a dialog
/// capability nothing can be confirmed, so the answer is `false`.
pub fn confirm_delete(capabilities: &mut Capabilities, message: Option<&str>) -> bool {
    let message = message.unwrap_or(DEFAULT_DELETE_MESSAGE);
    match capabilities.dialogs.as_mut() {
        Some(dialogs) => {
            let confirmed = dialogs.confirm(message);
            debug!(confirmed, "Delete confirmation answered");
            confirmed
        }
        None => {
            campus_core::log_feature_skipped!("confirm_delete", reason = "no dialogs");
            false
        }
    }
}

/// Show `message` to the user.
///
/// Prefers a toast at `severity` (default [`Severity::Info`]); falls back to
/// a blocking dialog carrying the message text only.
pub fn show_notification(
    capabilities: &mut Capabilities,
    message: &str,
    severity: Option<Severity>,
) -> NotificationRoute {
    let severity = severity.unwrap_or_default();
    if let Some(toaster) = capabilities.toaster.as_mut() {
        toaster.toast(severity, message);
        return NotificationRoute::Toast;
    }
    if let Some(dialogs) = capabilities.dialogs.as_mut() {
        dialogs.alert(message);
        return NotificationRoute::Dialog;
    }
    campus_core::log_feature_skipped!(
        "show_notification",
        severity = severity.as_str(),
        reason = "no toaster or dialogs"
    );
    NotificationRoute::Dropped
}
