//! # campus-forms
//!
//! The form interaction controller for campus pages.
//!
//! This crate provides:
//! - [`FormController`] - Page-load wiring and event handling for widgets,
//!   the sidebar, validated forms, tables, date inputs, alerts and
//!   repeatable field groups
//! - [`Capabilities`] - Optional collaborators (widget, table, date-picker,
//!   toast and dialog libraries)
//! - [`TimerQueue`] - Virtual-clock timers driving alert auto-dismiss
//! - [`format_currency`], [`confirm_delete`], [`show_notification`] - Page
//!   utilities
//! - [`recording`] - Capabilities that record their calls

pub mod capability;
pub mod controller;
pub mod currency;
pub mod error;
pub mod notify;
pub mod recording;
pub mod timer;

mod alert;
mod enhance;
mod field_group;
mod validation;

pub use capability::{
    Capabilities, DatePicker, DatePickerOptions, Dialogs, TableEnhancer, TableOptions, Toaster,
    WidgetKind, WidgetLibrary,
};
pub use controller::{
    Activation, BootstrapReport, DispatchOutcome, FormController, FormSubmission,
};
pub use currency::{CurrencyStyle, format_currency};
pub use error::{FormsError, Result};
pub use field_group::AddedGroup;
pub use notify::{NotificationRoute, confirm_delete, show_notification};
pub use timer::TimerQueue;
