use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::catalog::{Book, CatalogError, CatalogResult, Price};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by the edit form that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// The draft parsed into a full record
  Submit(Book),
  Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Title,
  Author,
  Year,
  Price,
  Stock,
  Categories,
  Summary,
}

impl Field {
  const ALL: [Field; 7] = [
    Field::Title,
    Field::Author,
    Field::Year,
    Field::Price,
    Field::Stock,
    Field::Categories,
    Field::Summary,
  ];

  fn label(self) -> &'static str {
    match self {
      Field::Title => "Title",
      Field::Author => "Author",
      Field::Year => "Year",
      Field::Price => "Price",
      Field::Stock => "Stock",
      Field::Categories => "Categories",
      Field::Summary => "Summary",
    }
  }

  fn initial_value(self, book: &Book) -> String {
    match self {
      Field::Title => book.title.clone(),
      Field::Author => book.author.clone(),
      Field::Year => book.published_year.to_string(),
      Field::Price => format!("{:.2}", book.price.as_dollars()),
      Field::Stock => book.stock.to_string(),
      Field::Categories => book.categories.join(", "),
      Field::Summary => book.summary.clone().unwrap_or_default(),
    }
  }
}

/// Overlay form editing every field of one book
#[derive(Debug, Clone, Default)]
pub struct EditForm {
  active: bool,
  original: Option<Book>,
  inputs: Vec<TextInput>,
  focus: usize,
  error: Option<String>,
  busy: bool,
}

impl EditForm {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Open the form pre-filled from `book`.
  pub fn open(&mut self, book: &Book) {
    self.inputs = Field::ALL
      .iter()
      .map(|f| TextInput::with_value(f.initial_value(book)))
      .collect();
    self.original = Some(book.clone());
    self.focus = 0;
    self.error = None;
    self.busy = false;
    self.active = true;
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.original = None;
    self.inputs.clear();
    self.error = None;
    self.busy = false;
  }

  pub fn set_busy(&mut self, busy: bool) {
    self.busy = busy;
    if busy {
      self.error = None;
    }
  }

  pub fn set_error(&mut self, message: impl Into<String>) {
    self.busy = false;
    self.error = Some(message.into());
  }

  fn value(&self, field: Field) -> &str {
    Field::ALL
      .iter()
      .position(|f| *f == field)
      .and_then(|i| self.inputs.get(i))
      .map(|input| input.value())
      .unwrap_or("")
  }

  /// Parse the current inputs into a record with the original id.
  pub fn draft(&self) -> CatalogResult<Book> {
    let original = self
      .original
      .as_ref()
      .ok_or_else(|| CatalogError::Validation("nothing is being edited".to_string()))?;

    let year = self.value(Field::Year).trim();
    let published_year = year
      .parse::<i32>()
      .map_err(|_| CatalogError::Validation(format!("'{}' is not a valid year", year)))?;

    let stock = self.value(Field::Stock).trim();
    let stock = stock
      .parse::<i64>()
      .map_err(|_| CatalogError::Validation(format!("'{}' is not a valid stock count", stock)))?;

    let categories = self
      .value(Field::Categories)
      .split(',')
      .map(str::trim)
      .filter(|c| !c.is_empty())
      .map(String::from)
      .collect();

    let summary = self.value(Field::Summary).trim();

    Ok(Book {
      id: original.id.clone(),
      title: self.value(Field::Title).trim().to_string(),
      author: self.value(Field::Author).trim().to_string(),
      published_year,
      price: Price::parse(self.value(Field::Price))?,
      stock,
      categories,
      summary: (!summary.is_empty()).then(|| summary.to_string()),
    })
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.focus = (self.focus + 1) % Field::ALL.len();
        KeyResult::Handled
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus = (self.focus + Field::ALL.len() - 1) % Field::ALL.len();
        KeyResult::Handled
      }
      KeyCode::Esc => {
        self.hide();
        KeyResult::Event(FormEvent::Cancelled)
      }
      KeyCode::Enter => match self.draft() {
        Ok(book) => KeyResult::Event(FormEvent::Submit(book)),
        Err(e) => {
          self.error = Some(e.to_string());
          KeyResult::Handled
        }
      },
      _ => {
        if let Some(input) = self.inputs.get_mut(self.focus) {
          if input.handle_key(key) == InputResult::Edited {
            self.error = None;
          }
        }
        KeyResult::Handled
      }
    }
  }

  /// Render the form overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = area.width.saturating_sub(8).clamp(20, 80).min(area.width);
    let height = (Field::ALL.len() as u16 + 4).min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let title = match &self.original {
      Some(book) if self.busy => format!(" Edit {} (saving...) ", book.id),
      Some(book) => format!(" Edit {} ", book.id),
      None => " Edit ".to_string(),
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(title);

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines: Vec<Line> = Field::ALL
      .iter()
      .zip(&self.inputs)
      .enumerate()
      .map(|(i, (field, input))| {
        let focused = i == self.focus;
        let label_style = if focused {
          Style::default().fg(Color::Yellow).bold()
        } else {
          Style::default().fg(Color::DarkGray)
        };
        let mut spans = vec![Span::styled(format!("{:<12}", field.label()), label_style)];
        if focused {
          let value = input.value();
          let split = value
            .char_indices()
            .nth(input.cursor_position())
            .map(|(i, _)| i)
            .unwrap_or(value.len());
          let (before, after) = value.split_at(split);
          spans.push(Span::raw(before.to_string()));
          spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
          spans.push(Span::raw(after.to_string()));
        } else {
          spans.push(Span::raw(input.value().to_string()));
        }
        Line::from(spans)
      })
      .collect();

    lines.push(Line::default());
    lines.push(match &self.error {
      Some(error) => Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))),
      None if self.busy => Line::from(Span::styled("Saving...", Style::default().fg(Color::Yellow))),
      None => Line::from(Span::styled(
        "Tab: next field   Enter: save   Esc: cancel",
        Style::default().fg(Color::DarkGray),
      )),
    });

    frame.render_widget(Paragraph::new(lines), inner);
  }
}
