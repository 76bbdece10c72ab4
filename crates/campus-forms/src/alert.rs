//! Alert auto-dismiss and the delegated close control.

use std::time::Duration;

use campus_core::log_feature_skipped;
use campus_dom::{DomEvent, NodeId};
use tracing::debug;

use crate::controller::{FormController, TimerTask};

impl FormController {
    /// Arm one dismiss timer per dismissible, non-persistent alert present now.
    pub(crate) fn schedule_alert_dismissal(&mut self) -> usize {
        let alerts = self.document.select_all(&self.markers.dismissible_alert);
        if alerts.is_empty() {
            log_feature_skipped!("alerts", reason = "no targets");
            return 0;
        }
        let delay = Duration::from_millis(self.config.alerts.auto_dismiss_ms);
        let persistent = &self.config.markers.persistent_alert_class;
        let mut scheduled = 0;
        for alert in alerts {
            if self.document.has_class(alert, persistent) {
                continue;
            }
            let deadline = self.timers.schedule(delay, TimerTask::DismissAlert(alert));
            debug!(
                feature = "alerts",
                node = %alert,
                deadline_ms = deadline.as_millis() as u64,
                "Alert dismissal scheduled"
            );
            scheduled += 1;
        }
        scheduled
    }

    /// Click the alert's own close control. Returns false when the alert is
    /// already gone or has no close control.
    pub(crate) fn dismiss_alert(&mut self, alert: NodeId) -> bool {
        if !self.document.is_connected(alert) {
            debug!(feature = "alerts", node = %alert, "Alert already dismissed");
            return false;
        }
        let Some(close) = self.document.query(alert, &self.markers.alert_close) else {
            debug!(feature = "alerts", node = %alert, "Alert has no close control");
            return false;
        };
        self.click(close).is_some()
    }

    /// Delegated close: remove the alert enclosing an activated close control.
    pub(crate) fn close_alert(&mut self, event: &mut DomEvent) {
        if event.default_prevented() {
            return;
        }
        let Some(close) = self.document.closest(event.target, &self.markers.alert_close) else {
            return;
        };
        let Some(alert) = self.document.closest(close, &self.markers.alert) else {
            return;
        };
        self.document.remove(alert);
        debug!(feature = "alerts", node = %alert, "Alert closed");
    }
}
