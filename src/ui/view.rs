use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::catalog::Catalog;

/// A keyboard shortcut hint for display in the footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, picker, edit form) and return
/// actions for the App to execute: App → View → Components.
///
/// Views read catalog data through the `watch` receivers handed out by
/// [`Catalog`], so rendering never needs the catalog itself. Anything that
/// changes what a view observes happens in `handle_key` or `tick`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent, catalog: &mut Catalog) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Short description of what is being shown, for the header
  fn context(&self) -> Option<String> {
    None
  }

  /// Called on each tick, after the catalog has applied settled fetches
  fn tick(&mut self, _catalog: &mut Catalog) {}

  /// Keyboard shortcuts to display in the footer
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("r", "reload").with_priority(80),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
