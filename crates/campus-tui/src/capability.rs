//! Terminal implementations of the controller's optional libraries.
//!
//! Widgets, tables, and date pickers record what was attached in a shared
//! [`HostState`] that the renderer reads back. Toasts are kept in a short
//! stack that expires with the frame clock. Dialogs take over the bottom
//! line of the terminal and block until a key is pressed.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use campus_core::Severity;
use campus_dom::{Document, NodeId};
use campus_forms::{
    Capabilities, DatePicker, DatePickerOptions, Dialogs, TableEnhancer, TableOptions, Toaster,
    WidgetKind, WidgetLibrary,
};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::{cursor, execute, terminal};

/// How long a toast stays on screen.
pub const TOAST_LIFETIME: Duration = Duration::from_secs(4);

/// Older toasts are dropped beyond this many.
pub const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub severity: Severity,
    pub message: String,
    pub remaining: Duration,
}

/// What the terminal libraries were asked to attach.
#[derive(Debug, Default)]
pub struct HostState {
    hints: HashMap<NodeId, (WidgetKind, String)>,
    tables: HashMap<NodeId, TableOptions>,
    date_inputs: HashMap<NodeId, DatePickerOptions>,
    toasts: VecDeque<Toast>,
    screen_stale: bool,
}

pub type SharedHost = Rc<RefCell<HostState>>;

impl HostState {
    /// Tooltip or popover text attached to `node`.
    pub fn hint(&self, node: NodeId) -> Option<(WidgetKind, &str)> {
        self.hints.get(&node).map(|(kind, text)| (*kind, text.as_str()))
    }

    pub fn table(&self, node: NodeId) -> Option<&TableOptions> {
        self.tables.get(&node)
    }

    pub fn date_options(&self, node: NodeId) -> Option<&DatePickerOptions> {
        self.date_inputs.get(&node)
    }

    /// Toasts, newest last.
    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn push_toast(&mut self, severity: Severity, message: &str) {
        if self.toasts.len() == MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            severity,
            message: message.to_string(),
            remaining: TOAST_LIFETIME,
        });
    }

    /// Age toasts by `elapsed`; returns how many expired.
    pub fn expire_toasts(&mut self, elapsed: Duration) -> usize {
        let before = self.toasts.len();
        for toast in &mut self.toasts {
            toast.remaining = toast.remaining.saturating_sub(elapsed);
        }
        self.toasts.retain(|t| !t.remaining.is_zero());
        before - self.toasts.len()
    }

    /// Whether something drew outside ratatui since the last call.
    pub fn take_screen_stale(&mut self) -> bool {
        std::mem::take(&mut self.screen_stale)
    }
}

/// Owner of the shared state behind the terminal capabilities.
#[derive(Debug, Clone, Default)]
pub struct TerminalHost {
    state: SharedHost,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SharedHost {
        &self.state
    }

    /// Capabilities backed by this host.
    ///
    /// `dialogs` is separate so tests and headless runs can answer prompts
    /// without a terminal; pass [`TerminalDialogs`] for interactive use.
    pub fn capabilities(&self, dialogs: Option<Box<dyn Dialogs>>) -> Capabilities {
        let mut capabilities = Capabilities::none()
            .with_widgets(TerminalWidgets(Rc::clone(&self.state)))
            .with_tables(TerminalTables(Rc::clone(&self.state)))
            .with_date_picker(TerminalDatePicker(Rc::clone(&self.state)))
            .with_toaster(TerminalToaster(Rc::clone(&self.state)));
        capabilities.dialogs = dialogs;
        capabilities
    }

    /// Interactive dialogs drawing on this host's terminal.
    pub fn dialogs(&self) -> TerminalDialogs {
        TerminalDialogs(Rc::clone(&self.state))
    }
}

/// Tooltips and popovers shown in the status line for the focused element.
pub struct TerminalWidgets(SharedHost);

impl WidgetLibrary for TerminalWidgets {
    fn create(&mut self, kind: WidgetKind, doc: &Document, element: NodeId) {
        let text = match kind {
            WidgetKind::Tooltip => doc.attr(element, "data-bs-title").or(doc.attr(element, "title")),
            WidgetKind::Popover => doc
                .attr(element, "data-bs-content")
                .or(doc.attr(element, "title")),
        };
        match text.map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => {
                self.0.borrow_mut().hints.insert(element, (kind, text.to_string()));
            }
            None => tracing::debug!(kind = kind.as_str(), node = %element, "Widget has no text"),
        }
    }
}

/// Tables rendered with a search box.
pub struct TerminalTables(SharedHost);

impl TableEnhancer for TerminalTables {
    fn enhance(&mut self, _doc: &Document, table: NodeId, options: &TableOptions) {
        self.0.borrow_mut().tables.insert(table, options.clone());
    }
}

/// Date inputs whose committed text is normalised to the picker format.
pub struct TerminalDatePicker(SharedHost);

impl DatePicker for TerminalDatePicker {
    fn attach(&mut self, _doc: &Document, input: NodeId, options: &DatePickerOptions) {
        self.0.borrow_mut().date_inputs.insert(input, options.clone());
    }
}

pub struct TerminalToaster(SharedHost);

impl Toaster for TerminalToaster {
    fn toast(&mut self, severity: Severity, message: &str) {
        self.0.borrow_mut().push_toast(severity, message);
    }
}

/// Blocking prompts on the bottom terminal line.
pub struct TerminalDialogs(SharedHost);

impl TerminalDialogs {
    fn prompt(&self, message: &str, hint: &str) -> io::Result<KeyCode> {
        self.0.borrow_mut().screen_stale = true;
        let (cols, rows) = terminal::size()?;
        let mut line = format!(" {message} {hint} ");
        if let Some((cut, _)) = line.char_indices().nth(cols as usize) {
            line.truncate(cut);
        }

        let mut stdout = io::stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetAttribute(Attribute::Reverse),
            Print(line),
            SetAttribute(Attribute::Reset),
        )?;
        stdout.flush()?;

        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(key.code);
                }
            }
        }
    }
}

impl Dialogs for TerminalDialogs {
    fn confirm(&mut self, message: &str) -> bool {
        match self.prompt(message, "[y/N]") {
            Ok(code) => matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')),
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation prompt failed");
                false
            }
        }
    }

    fn alert(&mut self, message: &str) {
        if let Err(e) = self.prompt(message, "[any key]") {
            tracing::warn!(error = %e, "Alert prompt failed");
        }
    }
}
