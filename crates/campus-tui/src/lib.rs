//! # campus-tui
//!
//! Terminal host for the campus form controller. A page is drawn as an
//! indented outline; the keyboard moves focus, clicks buttons, and edits
//! fields, and every action goes through the controller exactly as a
//! browser event would.
//!
//! ## Features
//!
//! - Page outline with live values, validation messages, and alerts
//! - Sidebar menu that follows the page's sidebar toggle
//! - Toast stack and blocking y/N prompts for the notification utilities
//! - Currency formatting for table cells carrying `data-amount`
//!
//! ## Hotkeys
//!
//! - `Tab`, `j`, `↓` - Focus next element
//! - `Shift+Tab`, `k`, `↑` - Focus previous element
//! - `Enter`, `Space` - Click, or edit a field
//! - `Esc` - Leave edit mode
//! - `?` or `h` - Help
//! - `t` - Cycle theme
//! - `q` - Quit

pub mod app;
pub mod capability;
pub mod event;
pub mod page;
pub mod render;
pub mod theme;

pub use app::App;
pub use capability::{HostState, TerminalDialogs, TerminalHost};
pub use event::{AppEvent, InputHandler};
pub use page::{DEMO_PAGE, demo_page, load_page};
pub use theme::{Theme, ThemeManager, ThemeName};
