//! # campus-dom
//!
//! An in-memory document model for server-rendered campus pages.
//!
//! This crate provides:
//! - [`Document`] - Arena of elements addressed by [`NodeId`]
//! - [`Selector`] - CSS selector parsing and matching
//! - [`ElementSpec`] / [`PageSpec`] - Serializable element trees
//! - [`ListenerRegistry`] - Event listeners and bubbling routes
//! - [`constraint`] - Native-style form constraint validation
//! - [`FieldTemplate`] - Index-parameterised field-group templates
//!
//! ## Example
//!
//! ```
//! use campus_dom::{Document, ElementSpec, Selector};
//!
//! let mut doc = Document::new();
//! let form = doc.append_spec(doc.root(), &ElementSpec::new("form").with_class("needs-validation"));
//! let selector = Selector::parse(".needs-validation").unwrap();
//! assert_eq!(doc.select(&selector), Some(form));
//! ```

pub mod constraint;
pub mod document;
pub mod error;
pub mod event;
mod node;
pub mod selector;
pub mod spec;
pub mod template;

pub use constraint::{Violation, check_control, check_validity, form_violations, radio_group};
pub use document::{Document, TEMPLATE_TAG};
pub use error::{DomError, Result};
pub use event::{DomEvent, EventKind, ListenerId, ListenerRegistry, ListenerScope, RouteStep};
pub use node::NodeId;
pub use selector::Selector;
pub use spec::{ElementSpec, PageSpec};
pub use template::FieldTemplate;
