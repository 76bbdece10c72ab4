//! Configuration for the campus form-interaction layer.
//!
//! Every marker the controller looks for, every timing constant and every
//! display format lives in [`FormsConfig`]. All sections default sensibly so a
//! config file only needs to name what it overrides:
//!
//! ```yaml
//! alerts:
//!   auto_dismiss_ms: 8000
//! markers:
//!   data_table: ".table-enhanced"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use campus_core::{CampusError, Result};
use serde::{Deserialize, Serialize};

/// Default delete confirmation prompt.
pub const DEFAULT_DELETE_MESSAGE: &str = "Are you sure you want to delete this item?";

/// Default currency code for amount formatting.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Default index placeholder token embedded in field-group templates.
pub const DEFAULT_INDEX_PLACEHOLDER: &str = "__INDEX__";

/// Complete form-layer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FormsConfig {
    /// Selectors and attribute names the controller binds to
    pub markers: MarkerConfig,
    /// Alert auto-dismiss settings
    pub alerts: AlertConfig,
    /// Repeatable field-group settings
    pub field_groups: FieldGroupConfig,
    /// Submission validation settings
    pub validation: ValidationConfig,
    /// Sidebar toggle settings
    pub sidebar: SidebarConfig,
    /// Data table enhancement options
    pub tables: TableConfig,
    /// Date picker enhancement options
    pub date_picker: DatePickerConfig,
    /// Notification and utility defaults
    pub notifications: NotificationConfig,
}

/// Page markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub tooltip: String,
    pub popover: String,
    /// Element id (not a selector) of the sidebar toggle control
    pub sidebar_toggle_id: String,
    pub validated_form: String,
    pub data_table: String,
    pub date_picker: String,
    pub dismissible_alert: String,
    /// Class name (not a selector) that exempts an alert from auto-dismiss
    pub persistent_alert_class: String,
    pub alert: String,
    pub alert_close: String,
    pub add_field: String,
    pub remove_field: String,
    pub field_group: String,
    pub delete_confirm: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            tooltip: "[data-bs-toggle=\"tooltip\"]".to_string(),
            popover: "[data-bs-toggle=\"popover\"]".to_string(),
            sidebar_toggle_id: "sidebarToggle".to_string(),
            validated_form: ".needs-validation".to_string(),
            data_table: ".datatable".to_string(),
            date_picker: ".datepicker".to_string(),
            dismissible_alert: ".alert-dismissible".to_string(),
            persistent_alert_class: "alert-persistent".to_string(),
            alert: ".alert".to_string(),
            alert_close: "[data-bs-dismiss=\"alert\"]".to_string(),
            add_field: ".add-field".to_string(),
            remove_field: ".remove-field".to_string(),
            field_group: ".field-group".to_string(),
            delete_confirm: "[data-confirm]".to_string(),
        }
    }
}

/// Alert auto-dismiss configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Delay before a non-persistent alert is dismissed, in milliseconds
    pub auto_dismiss_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            auto_dismiss_ms: 5000,
        }
    }
}

/// Field-group template configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldGroupConfig {
    /// Token replaced by the group index
    pub index_placeholder: String,
    /// Attributes in which the token is replaced
    pub indexed_attributes: Vec<String>,
    /// Data attribute on the add control naming the container selector
    pub container_attribute: String,
    /// Data attribute on the add control naming the template selector
    pub template_attribute: String,
}

impl Default for FieldGroupConfig {
    fn default() -> Self {
        Self {
            index_placeholder: DEFAULT_INDEX_PLACEHOLDER.to_string(),
            indexed_attributes: vec!["id".to_string(), "name".to_string()],
            container_attribute: "data-container".to_string(),
            template_attribute: "data-template".to_string(),
        }
    }
}

/// Submission validation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Class added to a form on every submission attempt
    pub validated_class: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validated_class: "was-validated".to_string(),
        }
    }
}

/// Sidebar configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    /// Class toggled on the document root
    pub toggled_class: String,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            toggled_class: "sb-sidenav-toggled".to_string(),
        }
    }
}

/// Data table enhancement options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub responsive: bool,
    /// Render the search box without the library's label text
    pub search_input_only: bool,
    pub search_placeholder: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            responsive: true,
            search_input_only: true,
            search_placeholder: "Search...".to_string(),
        }
    }
}

/// Date picker enhancement options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatePickerConfig {
    /// Picker format tokens (`Y` year, `m` month, `d` day)
    pub date_format: String,
    /// Whether free-text typing is allowed
    pub allow_input: bool,
}

impl Default for DatePickerConfig {
    fn default() -> Self {
        Self {
            date_format: "Y-m-d".to_string(),
            allow_input: true,
        }
    }
}

/// Notification and utility defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub default_currency: String,
    pub delete_confirmation: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY.to_string(),
            delete_confirmation: DEFAULT_DELETE_MESSAGE.to_string(),
        }
    }
}

impl FormsConfig {
    /// Parse a configuration from YAML text and validate it.
    pub fn from_yaml_str(content: &str, origin: &Path) -> Result<Self> {
        let config: FormsConfig =
            serde_yaml::from_str(content).map_err(|e| CampusError::ConfigInvalid {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CampusError::config_not_found_with_source(path, e))?;
        let config = Self::from_yaml_str(&content, path)?;
        tracing::info!(path = %path.display(), "loaded forms configuration");
        Ok(config)
    }

    /// Load an explicit path, or the default path if it exists, or defaults.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(default) if default.exists() => Self::load(&default),
            _ => {
                tracing::debug!("no forms configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Returns `~/.campus/forms.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".campus").join("forms.yaml"))
    }

    /// Check field values that serde alone cannot enforce.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: &str| {
            Err(CampusError::ConfigValidation {
                message: message.to_string(),
            })
        };

        if self.field_groups.index_placeholder.is_empty() {
            return fail("field_groups.index_placeholder must not be empty");
        }
        if self.field_groups.indexed_attributes.is_empty() {
            return fail("field_groups.indexed_attributes must name at least one attribute");
        }
        if self.alerts.auto_dismiss_ms == 0 {
            return fail("alerts.auto_dismiss_ms must be greater than zero");
        }
        let currency = &self.notifications.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return fail("notifications.default_currency must be a 3-letter currency code");
        }
        if self.validation.validated_class.trim().is_empty() {
            return fail("validation.validated_class must not be empty");
        }
        if self.sidebar.toggled_class.trim().is_empty() {
            return fail("sidebar.toggled_class must not be empty");
        }
        if self.markers.persistent_alert_class.trim().is_empty() {
            return fail("markers.persistent_alert_class must not be empty");
        }
        Ok(())
    }

    /// Set the alert auto-dismiss delay.
    pub fn with_auto_dismiss(mut self, millis: u64) -> Self {
        self.alerts.auto_dismiss_ms = millis;
        self
    }

    /// Set the field-group index placeholder.
    pub fn with_placeholder(mut self, token: impl Into<String>) -> Self {
        self.field_groups.index_placeholder = token.into();
        self
    }

    /// Set the default currency code.
    pub fn with_default_currency(mut self, code: impl Into<String>) -> Self {
        self.notifications.default_currency = code.into();
        self
    }
}
