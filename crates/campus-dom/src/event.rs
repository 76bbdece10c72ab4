//! Events and listener routing.
//!
//! Listeners are data, not closures: a [`ListenerRegistry`] maps a scope
//! (an element or the whole document) and an [`EventKind`] to a handler value
//! of the owner's choosing. [`ListenerRegistry::route`] computes the bubbling
//! order for an event; the owner runs the handlers and honours
//! [`DomEvent::stop_propagation`] between propagation steps.

use crate::document::Document;
use crate::node::NodeId;

/// Kinds of events the page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Activation of a control
    Click,
    /// Submission attempt of a form
    Submit,
    /// Value edit of a form control
    Input,
}

/// An event in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    /// Element the event was dispatched on
    pub target: NodeId,
    /// Element (or document) whose listener is currently running
    pub current_target: Option<ListenerScope>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            current_target: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn click(target: NodeId) -> Self {
        Self::new(EventKind::Click, target)
    }

    pub fn submit(target: NodeId) -> Self {
        Self::new(EventKind::Submit, target)
    }

    /// Cancel the default action (form submission, link navigation).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop the event from reaching further propagation steps.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerScope {
    Element(NodeId),
    /// The document itself, above the root element
    Document,
}

/// Handle returned by [`ListenerRegistry::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

#[derive(Debug, Clone)]
struct Listener<H> {
    scope: ListenerScope,
    kind: EventKind,
    handler: H,
}

/// One step of an event's route: run `handler` with `current_target` set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStep<H> {
    pub current_target: ListenerScope,
    pub handler: H,
}

/// Registry of listeners keyed by scope and event kind.
#[derive(Debug, Clone)]
pub struct ListenerRegistry<H> {
    listeners: Vec<Listener<H>>,
}

impl<H> Default for ListenerRegistry<H> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<H: Clone> ListenerRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Duplicates are kept, as in the browser model
    /// where each registration call binds again.
    pub fn add(&mut self, scope: ListenerScope, kind: EventKind, handler: H) -> ListenerId {
        self.listeners.push(Listener {
            scope,
            kind,
            handler,
        });
        ListenerId(self.listeners.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Number of listeners bound to `scope` for `kind`.
    pub fn count_for(&self, scope: ListenerScope, kind: EventKind) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.scope == scope && l.kind == kind)
            .count()
    }

    /// Bubbling route for `event`: target first, then each ancestor, then
    /// the document. Within one scope, registration order is kept.
    pub fn route(&self, doc: &Document, event: &DomEvent) -> Vec<RouteStep<H>> {
        let path = std::iter::once(event.target)
            .chain(doc.ancestors(event.target))
            .map(ListenerScope::Element)
            .chain(std::iter::once(ListenerScope::Document));

        let mut steps = Vec::new();
        for scope in path {
            steps.extend(
                self.listeners
                    .iter()
                    .filter(|l| l.scope == scope && l.kind == event.kind)
                    .map(|l| RouteStep {
                        current_target: scope,
                        handler: l.handler.clone(),
                    }),
            );
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ElementSpec;

    #[test]
    fn test_route_bubbles_target_to_document() {
        let mut doc = Document::new();
        let form = doc.append_spec(doc.root(), &ElementSpec::new("form"));
        let button = doc.append_spec(form, &ElementSpec::new("button"));

        let mut registry = ListenerRegistry::new();
        registry.add(ListenerScope::Document, EventKind::Click, "document");
        registry.add(ListenerScope::Element(form), EventKind::Click, "form");
        registry.add(ListenerScope::Element(button), EventKind::Click, "button");
        registry.add(ListenerScope::Element(button), EventKind::Submit, "ignored");
        registry.add(ListenerScope::Element(button), EventKind::Click, "button-2");

        let route = registry.route(&doc, &DomEvent::click(button));
        let handlers: Vec<_> = route.iter().map(|s| s.handler).collect();
        assert_eq!(handlers, vec!["button", "button-2", "form", "document"]);
        assert_eq!(route[0].current_target, ListenerScope::Element(button));
        assert_eq!(route[3].current_target, ListenerScope::Document);
    }

    #[test]
    fn test_detached_target_still_routes_to_document() {
        let mut doc = Document::new();
        let orphan = doc.create_element("button");
        let mut registry = ListenerRegistry::new();
        registry.add(ListenerScope::Document, EventKind::Click, 1);
        assert_eq!(registry.route(&doc, &DomEvent::click(orphan)).len(), 1);
    }

    #[test]
    fn test_event_flags() {
        let mut event = DomEvent::submit(NodeId(0));
        assert!(!event.default_prevented());
        event.prevent_default();
        event.stop_propagation();
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
    }

    #[test]
    fn test_count_for() {
        let mut registry = ListenerRegistry::new();
        registry.add(ListenerScope::Document, EventKind::Click, ());
        registry.add(ListenerScope::Document, EventKind::Click, ());
        assert_eq!(registry.count_for(ListenerScope::Document, EventKind::Click), 2);
        assert_eq!(registry.count_for(ListenerScope::Document, EventKind::Submit), 0);
        assert_eq!(registry.len(), 2);
    }
}
