use crate::catalog::{Book, Catalog, DetailSnapshot, MutationState, MutationTicket};
use crate::ui::components::{EditForm, FormEvent, KeyResult};
use crate::ui::renderfns::stock_color;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::watch;

/// View for displaying and editing one book
pub struct BookDetailView {
  id: String,
  detail: watch::Receiver<DetailSnapshot>,
  form: EditForm,
  ticket: Option<MutationTicket>,
  mutation: MutationState,
}

impl BookDetailView {
  pub fn new(id: String, catalog: &mut Catalog) -> Self {
    let detail = catalog.observe_detail(&id);
    let mutation = catalog.mutation_state(&id);
    Self {
      id,
      detail,
      form: EditForm::new(),
      ticket: None,
      mutation,
    }
  }

  fn snapshot(&self) -> DetailSnapshot {
    self.detail.borrow().clone()
  }

  fn submit(&mut self, book: Book, catalog: &mut Catalog) {
    match catalog.submit_update(book) {
      Ok(ticket) => {
        self.ticket = Some(ticket);
        self.form.set_busy(true);
      }
      Err(e) => self.form.set_error(e.to_string()),
    }
    self.mutation = catalog.mutation_state(&self.id);
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let snapshot = self.snapshot();

    let title = if snapshot.is_loading() && snapshot.value.is_some() {
      format!(" {} (refreshing...) ", self.id)
    } else if snapshot.is_loading() {
      format!(" {} (loading...) ", self.id)
    } else {
      format!(" {} ", self.id)
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(book) = snapshot.data() else {
      let (content, color) = match snapshot.error() {
        Some(error) if error.is_retryable() => {
          (format!("Error: {}\n\nPress 'r' to retry.", error), Color::Red)
        }
        Some(error) => (format!("Error: {}", error), Color::Red),
        None => ("Loading book...".to_string(), Color::DarkGray),
      };
      frame.render_widget(Paragraph::new(content).style(Style::default().fg(color)), inner);
      return;
    };

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(6), // Fields
        Constraint::Length(1), // Separator
        Constraint::Min(1),    // Summary
        Constraint::Length(1), // Save state
      ])
      .split(inner);

    let label = |text: &'static str| {
      Span::styled(format!("{:<12}", text), Style::default().fg(Color::DarkGray))
    };
    let level = book.stock_level();
    let fields = vec![
      Line::from(vec![label("Title"), Span::raw(book.title.as_str()).bold()]),
      Line::from(vec![label("Author"), Span::raw(book.author.as_str())]),
      Line::from(vec![label("Published"), Span::raw(book.published_year.to_string())]),
      Line::from(vec![label("Price"), Span::raw(book.price.to_string())]),
      Line::from(vec![
        label("Stock"),
        Span::raw(format!("{}  ", book.stock)),
        Span::styled(format!("[{}]", level.label()), Style::default().fg(stock_color(level))),
      ]),
      Line::from(vec![
        label("Categories"),
        Span::styled(book.categories.join(", "), Style::default().fg(Color::Cyan)),
      ]),
    ];
    frame.render_widget(Paragraph::new(fields), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, chunks[1]);

    let summary = book.summary.as_deref().unwrap_or("No summary");
    frame.render_widget(Paragraph::new(summary).wrap(Wrap { trim: true }), chunks[2]);

    if let Some(line) = self.save_state_line(&snapshot) {
      frame.render_widget(Paragraph::new(line), chunks[3]);
    }
  }

  fn save_state_line(&self, snapshot: &DetailSnapshot) -> Option<Line<'static>> {
    // A refetch error outranks an old save result
    if let Some(error) = snapshot.error() {
      return Some(Line::styled(
        format!("Refresh failed: {}", error),
        Style::default().fg(Color::Red),
      ));
    }
    match &self.mutation {
      MutationState::Idle => None,
      MutationState::Submitting => Some(Line::styled("Saving...", Style::default().fg(Color::Yellow))),
      MutationState::Succeeded => Some(Line::styled("Saved", Style::default().fg(Color::Green))),
      MutationState::Failed(e) => Some(Line::styled(
        format!("Save failed: {}", e),
        Style::default().fg(Color::Red),
      )),
    }
  }
}

impl View for BookDetailView {
  fn handle_key(&mut self, key: KeyEvent, catalog: &mut Catalog) -> ViewAction {
    if self.form.is_active() {
      if let KeyResult::Event(FormEvent::Submit(book)) = self.form.handle_key(key) {
        self.submit(book, catalog);
      }
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('e') => {
        if let Some(book) = self.snapshot().data() {
          self.form.open(book);
          catalog.acknowledge_update(&self.id);
          self.mutation = catalog.mutation_state(&self.id);
        }
        ViewAction::None
      }
      KeyCode::Char('r') => {
        // Refetches a failed or stale entry; a fresh one is left alone
        self.detail = catalog.observe_detail(&self.id);
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
    self.form.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.id.clone()
  }

  fn context(&self) -> Option<String> {
    self.snapshot().data().map(|b| b.title.clone())
  }

  fn tick(&mut self, catalog: &mut Catalog) {
    self.mutation = catalog.mutation_state(&self.id);

    let Some(outcome) = self.ticket.as_mut().and_then(|t| t.try_outcome()) else {
      return;
    };
    self.ticket = None;
    match outcome {
      Ok(_) => self.form.hide(),
      Err(e) => self.form.set_error(e.to_string()),
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.form.is_active() {
      return vec![
        ShortcutInfo::new("tab", "next field").with_priority(10),
        ShortcutInfo::new("enter", "save").with_priority(20),
        ShortcutInfo::new("esc", "cancel").with_priority(30),
      ];
    }
    vec![
      ShortcutInfo::new("e", "edit").with_priority(10),
      ShortcutInfo::new("r", "refresh").with_priority(80),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
