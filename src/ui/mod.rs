pub mod components;
mod renderfns;
pub mod view;
pub mod views;

use ratatui::prelude::*;
use ratatui::widgets::ListState;

use self::renderfns::{draw_footer, draw_header};
use self::view::View;

/// Application-level text shown around the active view
pub struct Chrome<'a> {
  pub title: &'a str,
  pub host: &'a str,
}

/// Main draw function: header, active view, footer
pub fn draw(frame: &mut Frame, chrome: &Chrome, view_stack: &mut [Box<dyn View>]) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let breadcrumb: Vec<String> = view_stack.iter().map(|v| v.breadcrumb_label()).collect();

  let Some(view) = view_stack.last_mut() else {
    return;
  };

  let context = view.context();
  draw_header(frame, chunks[0], chrome.title, chrome.host, context.as_deref());

  view.render(frame, chunks[1]);

  let mut shortcuts = view.shortcuts();
  shortcuts.sort_by_key(|s| s.priority);
  draw_footer(frame, chunks[2], &breadcrumb, &shortcuts);
}

/// Keep a list selection inside `0..len` (or cleared when empty).
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(i) if i >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}
