//! Main application state and logic for the campus TUI.
//!
//! The `App` owns a [`FormController`] for one page and turns key presses
//! into clicks, submissions, and input events on that page. Wall-clock time
//! between frames drives the controller's virtual clock, so alerts dismiss
//! themselves while the page is open.

use std::io;
use std::time::{Duration, Instant};

use campus_config::FormsConfig;
use campus_core::{CampusError, Result, Severity};
use campus_dom::{Document, NodeId, PageSpec};
use campus_forms::{Activation, BootstrapReport, Dialogs, FormController};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::capability::TerminalHost;
use crate::event::{AppEvent, InputHandler};
use crate::render::{self, OutlineRow};
use crate::theme::ThemeManager;

/// Target frame rate (60 FPS = ~16.67ms per frame).
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_millis(1000 / TARGET_FPS);

/// Header timestamp cache duration (update every second).
const TIMESTAMP_CACHE_DURATION: Duration = Duration::from_secs(1);

const SIDEBAR_WIDTH: u16 = 24;
const TOAST_WIDTH: u16 = 44;

/// Main application state.
pub struct App {
    controller: FormController,
    host: TerminalHost,
    title: String,
    report: BootstrapReport,
    input_handler: InputHandler,
    theme_manager: ThemeManager,
    /// Focused element; always a focusable outline row when set
    focus: Option<NodeId>,
    /// Text being typed into the focused field
    edit_buffer: Option<String>,
    should_quit: bool,
    show_help: bool,
    status_message: Option<String>,
    dirty: bool,
    last_tick: Instant,
    cached_timestamp: Option<String>,
    last_timestamp_update: Instant,
}

impl App {
    /// Interactive app: terminal dialogs and the saved theme.
    pub fn new(page: PageSpec, config: FormsConfig) -> Result<Self> {
        let host = TerminalHost::new();
        let dialogs: Box<dyn Dialogs> = Box::new(host.dialogs());
        let theme_manager = ThemeManager::default_path()
            .map(ThemeManager::load)
            .unwrap_or_default();
        Self::build(page, config, host, Some(dialogs), theme_manager)
    }

    /// App with caller-supplied dialogs and an unsaved default theme.
    pub fn with_dialogs(
        page: PageSpec,
        config: FormsConfig,
        dialogs: Option<Box<dyn Dialogs>>,
    ) -> Result<Self> {
        Self::build(page, config, TerminalHost::new(), dialogs, ThemeManager::new())
    }

    fn build(
        page: PageSpec,
        config: FormsConfig,
        host: TerminalHost,
        dialogs: Option<Box<dyn Dialogs>>,
        theme_manager: ThemeManager,
    ) -> Result<Self> {
        let document = Document::from_spec(&page.body);
        let mut controller = FormController::new(document, config, host.capabilities(dialogs))?;
        let report = controller.on_page_load();

        let mut app = Self {
            controller,
            host,
            title: page.title,
            status_message: Some(format!(
                "{} form(s) validated, {} alert(s) will auto-dismiss",
                report.validated_forms, report.alerts_scheduled
            )),
            report,
            input_handler: InputHandler::new(),
            theme_manager,
            focus: None,
            edit_buffer: None,
            should_quit: false,
            show_help: false,
            dirty: true,
            last_tick: Instant::now(),
            cached_timestamp: None,
            last_timestamp_update: Instant::now(),
        };
        app.focus = app.focusables().first().copied();
        Ok(app)
    }

    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn report(&self) -> &BootstrapReport {
        &self.report
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if UI needs redraw and clear the dirty flag.
    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn get_cached_timestamp(&mut self) -> String {
        if self.cached_timestamp.is_none()
            || self.last_timestamp_update.elapsed() >= TIMESTAMP_CACHE_DURATION
        {
            self.cached_timestamp = Some(chrono::Local::now().format("%H:%M:%S").to_string());
            self.last_timestamp_update = Instant::now();
        }
        self.cached_timestamp.clone().unwrap_or_default()
    }

    fn outline(&self) -> Vec<OutlineRow> {
        render::outline(&self.controller, &self.host.state().borrow())
    }

    fn focusables(&self) -> Vec<NodeId> {
        self.outline()
            .into_iter()
            .filter(OutlineRow::is_focusable)
            .map(|row| row.node)
            .collect()
    }

    /// Move focus by `step` positions, wrapping around.
    fn move_focus(&mut self, step: isize) {
        let targets = self.focusables();
        if targets.is_empty() {
            self.focus = None;
            return;
        }
        let len = targets.len() as isize;
        let next = match self.focus.and_then(|f| targets.iter().position(|&t| t == f)) {
            Some(pos) => (pos as isize + step).rem_euclid(len),
            None if step < 0 => len - 1,
            None => 0,
        };
        self.focus = Some(targets[next as usize]);
        self.mark_dirty();
    }

    /// Keep focus on a live element after the page changed under it.
    fn repair_focus(&mut self, previous_position: Option<usize>) {
        let targets = self.focusables();
        if self.focus.is_some_and(|f| targets.contains(&f)) {
            return;
        }
        self.focus = match previous_position {
            Some(pos) if !targets.is_empty() => Some(targets[pos.min(targets.len() - 1)]),
            _ => targets.first().copied(),
        };
    }

    /// Advance page timers and toasts by `elapsed`.
    pub fn tick(&mut self, elapsed: Duration) {
        let due = self
            .controller
            .next_timer_deadline()
            .is_some_and(|deadline| deadline <= self.controller.now() + elapsed);
        let position = if due { self.focus_position() } else { None };
        let fired = self.controller.advance_time(elapsed);
        let expired = self.host.state().borrow_mut().expire_toasts(elapsed);
        if fired > 0 {
            self.repair_focus(position);
        }
        if fired > 0 || expired > 0 {
            self.mark_dirty();
        }
    }

    fn focus_position(&self) -> Option<usize> {
        let focus = self.focus?;
        self.focusables().iter().position(|&n| n == focus)
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let event = self.input_handler.handle_key(key);
        if self.show_help && event != AppEvent::ForceQuit {
            self.show_help = false;
            self.mark_dirty();
            return;
        }
        self.handle_app_event(event);
    }

    /// Handle an application event.
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::FocusNext => self.move_focus(1),
            AppEvent::FocusPrev => self.move_focus(-1),
            AppEvent::Activate => self.activate_focused(),
            AppEvent::TextInput(c) => {
                if let Some(buffer) = self.edit_buffer.as_mut() {
                    buffer.push(c);
                    self.mark_dirty();
                }
            }
            AppEvent::Backspace => {
                if let Some(buffer) = self.edit_buffer.as_mut() {
                    buffer.pop();
                    self.mark_dirty();
                }
            }
            AppEvent::Commit => self.commit_edit(),
            AppEvent::Cancel => {
                if self.edit_buffer.take().is_some() {
                    self.status_message = Some("Edit cancelled".to_string());
                }
                self.input_handler.set_edit_mode(false);
                self.mark_dirty();
            }
            AppEvent::ShowHelp => {
                self.show_help = true;
                self.mark_dirty();
            }
            AppEvent::CycleTheme => {
                let name = self.theme_manager.cycle_theme();
                self.status_message = Some(format!("Theme: {}", name.display_name()));
                self.mark_dirty();
            }
            AppEvent::Quit | AppEvent::ForceQuit => self.should_quit = true,
            AppEvent::None => {}
        }
    }

    fn activate_focused(&mut self) {
        let Some(node) = self.focus else {
            return;
        };
        let rows = self.outline();
        let Some(row) = rows.iter().find(|r| r.node == node) else {
            return;
        };
        if row.is_editable() {
            self.edit_buffer = Some(self.controller.document().value(node).to_string());
            self.input_handler.set_edit_mode(true);
            self.status_message = Some(format!("Editing {}: Enter saves, Esc cancels", row.label));
            self.mark_dirty();
            return;
        }

        let label = row.label.clone();
        let position = self.focus_position();
        let sidebar_before = self.controller.sidebar_toggled();
        let activation = self.controller.activate(node);
        tracing::debug!(node = %node, ?activation, "Activated element");
        self.status_message = match activation {
            Some(Activation::Submitted(index)) => {
                let submission = &self.controller.submissions()[index];
                let message = format!(
                    "Submitted {} ({} fields)",
                    submission.form_id.as_deref().unwrap_or("form"),
                    submission.fields.len()
                );
                self.controller.notify(&message, Some(Severity::Success));
                None
            }
            Some(Activation::SubmitBlocked) => {
                self.controller
                    .notify("Please correct the highlighted fields", Some(Severity::Warning));
                None
            }
            Some(Activation::Cancelled) if self.controller.sidebar_toggled() != sidebar_before => {
                let state = if self.controller.sidebar_toggled() { "hidden" } else { "shown" };
                Some(format!("Menu {state}"))
            }
            Some(Activation::Cancelled) => Some(format!("{label}: cancelled")),
            Some(Activation::Toggled { checked }) => {
                Some(format!("{label}: {}", if checked { "checked" } else { "unchecked" }))
            }
            Some(Activation::Clicked) => None,
            None => Some(format!("{label} is no longer on the page")),
        };
        self.repair_focus(position);
        self.mark_dirty();
    }

    fn commit_edit(&mut self) {
        let (Some(node), Some(typed)) = (self.focus, self.edit_buffer.take()) else {
            return;
        };
        self.input_handler.set_edit_mode(false);

        let options = self.host.state().borrow().date_options(node).cloned();
        let value = match options {
            Some(options) if !typed.trim().is_empty() => match options.parse(&typed) {
                Some(date) => options.format(date),
                None => {
                    self.status_message = Some(format!("Unrecognised date: {typed}"));
                    typed
                }
            },
            _ => typed,
        };
        self.controller.input(node, &value);
        self.mark_dirty();
    }

    /// Run the main application loop.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal().map_err(|e| CampusError::TerminalInit {
            message: e.to_string(),
        })?;

        let result = self.run_loop(&mut terminal);

        restore_terminal(&mut terminal).map_err(|e| CampusError::TerminalRestore {
            message: e.to_string(),
        })?;
        result
    }

    /// The inner event loop with frame-rate limiting.
    fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let io_err = |e: io::Error| CampusError::internal(format!("terminal I/O: {e}"));
        self.last_tick = Instant::now();

        while !self.should_quit {
            let frame_start = Instant::now();
            let elapsed = frame_start.duration_since(self.last_tick);
            self.last_tick = frame_start;
            self.tick(elapsed);

            // A dialog drew over the screen; ratatui's diff does not know.
            if self.host.state().borrow_mut().take_screen_stale() {
                terminal.clear().map_err(io_err)?;
                self.mark_dirty();
            }

            let needs_redraw =
                self.take_dirty() || self.last_timestamp_update.elapsed() >= TIMESTAMP_CACHE_DURATION;
            if needs_redraw {
                terminal.draw(|frame| self.draw(frame)).map_err(io_err)?;
            }

            let timeout = FRAME_DURATION
                .checked_sub(frame_start.elapsed())
                .unwrap_or(Duration::from_millis(10));
            if event::poll(timeout).map_err(io_err)? {
                if let Event::Key(key) = event::read().map_err(io_err)? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }

            if let Some(rest) = FRAME_DURATION.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        Ok(())
    }

    /// Draw the UI.
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(5),    // Sidebar + page
                Constraint::Length(1), // Status line
                Constraint::Length(2), // Footer
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_status(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
        self.draw_toasts(frame, chunks[1]);

        if self.show_help {
            self.draw_help_overlay(frame, area);
        }
    }

    fn draw_header(&mut self, frame: &mut Frame, area: Rect) {
        let now = self.get_cached_timestamp();
        let theme = self.theme_manager.current();
        let title = format!(" CAMPUS - {} ", self.title);

        let sidebar = if self.controller.sidebar_toggled() {
            "[menu hidden]"
        } else {
            "[menu]"
        };
        let submissions = format!("[{} submitted]", self.controller.submissions().len());

        let right_len = now.chars().count() + 2 + sidebar.len() + 2 + submissions.len();
        let spacing = (area.width as usize)
            .saturating_sub(title.chars().count() + right_len + 2);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(title, Style::default().fg(theme.colors.header).add_modifier(Modifier::BOLD)),
            Span::raw(" ".repeat(spacing)),
            Span::styled(now, Style::default().fg(theme.colors.text_dim)),
            Span::raw("  "),
            Span::styled(sidebar, Style::default().fg(theme.colors.text_dim)),
            Span::raw("  "),
            Span::styled(submissions, Style::default().fg(theme.colors.status_success)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.colors.border_dim)),
        );

        frame.render_widget(header, area);
    }

    fn draw_body(&self, frame: &mut Frame, area: Rect) {
        if self.controller.sidebar_toggled() {
            self.draw_page(frame, area);
            return;
        }
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(area);
        self.draw_sidebar(frame, columns[0]);
        self.draw_page(frame, columns[1]);
    }

    fn draw_sidebar(&self, frame: &mut Frame, area: Rect) {
        let theme = self.theme_manager.current();
        let lines: Vec<Line> = render::sidebar_links(self.controller.document())
            .into_iter()
            .map(|link| Line::from(Span::styled(format!(" {link}"), Style::default().fg(theme.colors.text))))
            .collect();
        self.draw_panel(frame, area, "Menu", lines, false);
    }

    fn draw_page(&self, frame: &mut Frame, area: Rect) {
        let theme = self.theme_manager.current();
        let rows = self.outline();
        let mut focused_line = 0;
        let lines: Vec<Line> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let focused = self.focus == Some(row.node);
                if focused {
                    focused_line = i;
                }
                let editing = if focused { self.edit_buffer.as_deref() } else { None };
                render::row_line(row, focused, editing, theme)
            })
            .collect();

        let visible = area.height.saturating_sub(2) as usize;
        let scroll = (focused_line + 1).saturating_sub(visible);
        let title = format!(" {} ", self.title);
        let page = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.colors.header))
                    .title(Span::styled(
                        title,
                        Style::default().fg(theme.colors.header).add_modifier(Modifier::BOLD),
                    )),
            )
            .scroll((scroll as u16, 0));
        frame.render_widget(page, area);
    }

    fn draw_panel(&self, frame: &mut Frame, area: Rect, title: &str, content: Vec<Line>, focused: bool) {
        let theme = self.theme_manager.current();
        let border = if focused { theme.colors.header } else { theme.colors.border_dim };
        let panel = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(Span::styled(format!(" {title} "), Style::default().fg(theme.colors.header))),
        );
        frame.render_widget(panel, area);
    }

    /// Tooltip of the focused element, else the last status message.
    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let theme = self.theme_manager.current();
        let hint = self
            .focus
            .and_then(|node| render::hint_text(&self.host.state().borrow(), node));
        let line = match (&self.edit_buffer, hint, &self.status_message) {
            (None, Some(hint), _) => Line::from(Span::styled(
                format!(" {hint}"),
                Style::default().fg(theme.colors.status_info),
            )),
            (_, _, Some(message)) => Line::from(Span::styled(
                format!(" {message}"),
                Style::default().fg(theme.colors.text_dim),
            )),
            _ => Line::default(),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let theme = self.theme_manager.current();
        let hotkey_style = Style::default().fg(theme.colors.hotkey);
        let hints = if self.input_handler.is_edit_mode() {
            vec![
                Span::styled("[Enter]", hotkey_style),
                Span::raw("Save "),
                Span::styled("[Esc]", hotkey_style),
                Span::raw("Cancel"),
            ]
        } else {
            vec![
                Span::styled("[Tab/j]", hotkey_style),
                Span::raw("Next "),
                Span::styled("[S-Tab/k]", hotkey_style),
                Span::raw("Prev "),
                Span::styled("[Enter]", hotkey_style),
                Span::raw("Activate "),
                Span::styled("[?]", hotkey_style),
                Span::raw("Help "),
                Span::styled("[t]", hotkey_style),
                Span::raw("Theme "),
                Span::styled("[q]", hotkey_style),
                Span::raw("Quit"),
            ]
        };

        let clock = format!("t+{:.1}s", self.controller.now().as_secs_f64());
        let footer = Paragraph::new(Line::from(hints))
            .style(Style::default().fg(theme.colors.text_dim))
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .title(Span::styled(clock, Style::default().fg(theme.colors.border_dim)))
                    .title_alignment(ratatui::layout::Alignment::Right),
            );

        frame.render_widget(footer, area);
    }

    /// Toast stack in the top-right corner of the body, newest at the bottom.
    fn draw_toasts(&self, frame: &mut Frame, area: Rect) {
        let theme = self.theme_manager.current();
        let state = self.host.state().borrow();
        let lines: Vec<Line> = state
            .toasts()
            .map(|toast| {
                Line::from(Span::styled(
                    format!(" {} {}", toast.severity.icon(), toast.message),
                    Style::default().fg(theme.severity_color(toast.severity)),
                ))
            })
            .collect();
        if lines.is_empty() {
            return;
        }

        let width = TOAST_WIDTH.min(area.width);
        let height = (lines.len() as u16 + 2).min(area.height);
        let toast_area = Rect::new(area.x + area.width - width, area.y, width, height);
        frame.render_widget(Clear, toast_area);
        let toasts = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.colors.border_dim)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(toasts, toast_area);
    }

    fn draw_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let theme = self.theme_manager.current();
        let overlay_width = 52.min(area.width.saturating_sub(4));
        let overlay_height = 18.min(area.height.saturating_sub(4));
        let overlay_x = (area.width - overlay_width) / 2;
        let overlay_y = (area.height - overlay_height) / 2;

        let overlay_area = Rect::new(overlay_x, overlay_y, overlay_width, overlay_height);

        frame.render_widget(Clear, overlay_area);

        let help_text = "\
CAMPUS Hotkey Reference

Page:
  Tab ↓ j    Focus next element
  S-Tab ↑ k  Focus previous element
  Enter      Click button / edit field
  Space      Click button / toggle

Editing:
  Enter      Save value
  Esc        Discard changes

General:
  ?  h       Show this help
  t          Cycle theme
  q          Quit
  Ctrl+C     Force quit

Press any key to close this help.";

        let help = Paragraph::new(help_text)
            .style(Style::default().fg(theme.colors.text))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.colors.header))
                    .title(Span::styled(
                        " Help ",
                        Style::default().fg(theme.colors.header).add_modifier(Modifier::BOLD),
                    ))
                    .style(Style::default().bg(Color::Black)),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(help, overlay_area);
    }
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()
}
