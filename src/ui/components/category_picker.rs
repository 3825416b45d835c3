use super::KeyResult;
use crate::catalog::ALL_CATEGORIES;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Events emitted by the category picker that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
  /// Category chosen ([`ALL_CATEGORIES`] for no filter)
  Selected(String),
  Cancelled,
}

/// Overlay listing "all" followed by every known category
#[derive(Debug, Clone, Default)]
pub struct CategoryPicker {
  active: bool,
  options: Vec<String>,
  selected: usize,
}

impl CategoryPicker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Open the picker with `current` preselected.
  pub fn show(&mut self, categories: &[String], current: &str) {
    self.options = std::iter::once(ALL_CATEGORIES.to_string())
      .chain(categories.iter().cloned())
      .collect();
    self.selected = self
      .options
      .iter()
      .position(|c| c == current)
      .unwrap_or(0);
    self.active = true;
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.options.clear();
    self.selected = 0;
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<PickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(PickerEvent::Cancelled)
      }
      KeyCode::Enter => {
        let choice = self.options.get(self.selected).cloned();
        self.hide();
        match choice {
          Some(category) => KeyResult::Event(PickerEvent::Selected(category)),
          None => KeyResult::Event(PickerEvent::Cancelled),
        }
      }
      KeyCode::Char('j') | KeyCode::Down => {
        if !self.options.is_empty() {
          self.selected = (self.selected + 1) % self.options.len();
        }
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if !self.options.is_empty() {
          self.selected = if self.selected == 0 {
            self.options.len() - 1
          } else {
            self.selected - 1
          };
        }
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active || self.options.is_empty() {
      return;
    }

    let max_name_len = self
      .options
      .iter()
      .map(|s| s.chars().count())
      .max()
      .unwrap_or(10);
    let width = (max_name_len as u16 + 6).clamp(20, area.width.saturating_sub(4).max(20));
    let height = (self.options.len() as u16 + 2).clamp(3, area.height.saturating_sub(4).max(3));

    // Center the overlay
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width.min(area.width), height.min(area.height));

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Category ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = self
      .options
      .iter()
      .map(|name| {
        let style = if name == ALL_CATEGORIES {
          Style::default().fg(Color::DarkGray)
        } else {
          Style::default().fg(Color::Cyan)
        };
        ListItem::new(Line::from(Span::styled(name.as_str(), style)))
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, inner, &mut state);
  }
}
