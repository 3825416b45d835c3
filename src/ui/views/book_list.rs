use crate::catalog::{BookPage, Catalog, CategoriesSnapshot, ListSnapshot, QueryDescriptor};
use crate::query::QueryController;
use crate::ui::components::{CategoryPicker, KeyResult, PickerEvent, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{pager_line, stock_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::BookDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Paged, searchable list of books
pub struct BookListView {
  query: QueryController,
  list: watch::Receiver<ListSnapshot>,
  categories: watch::Receiver<CategoriesSnapshot>,
  /// Last page that had data, kept on screen while the next one loads
  shown: Option<Arc<BookPage>>,
  list_state: ListState,
  search: SearchInput,
  picker: CategoryPicker,
}

impl BookListView {
  pub fn new(catalog: &mut Catalog, page_size: u32, debounce: Duration) -> Self {
    let query = QueryController::new(QueryDescriptor::new(page_size), debounce);
    let list = catalog.observe_list(query.descriptor());
    let categories = catalog.observe_categories();

    Self {
      query,
      list,
      categories,
      shown: None,
      list_state: ListState::default(),
      search: SearchInput::new(),
      picker: CategoryPicker::new(),
    }
  }

  fn descriptor(&self) -> &QueryDescriptor {
    self.query.descriptor()
  }

  /// Point the list subscription at the current effective descriptor.
  fn observe(&mut self, catalog: &mut Catalog) {
    self.list = catalog.observe_list(self.query.descriptor());
    self.list_state.select(Some(0));
  }

  fn snapshot(&self) -> ListSnapshot {
    self.list.borrow().clone()
  }

  fn page(&self) -> Option<Arc<BookPage>> {
    self.snapshot().value.or_else(|| self.shown.clone())
  }

  fn total_pages(&self) -> u32 {
    self
      .page()
      .map(|p| p.total_pages(self.descriptor().limit))
      .unwrap_or(0)
  }

  fn go_to_page(&mut self, page: u32, catalog: &mut Catalog) {
    if page == self.descriptor().page || page == 0 || page > self.total_pages() {
      return;
    }
    self.query.on_page_changed(page);
    self.observe(catalog);
  }

  fn open_picker(&mut self, catalog: &mut Catalog) {
    // Retries a failed category fetch; a cached index is reused
    self.categories = catalog.observe_categories();
    let categories = self.categories.borrow().value.clone();
    let categories = categories.as_deref().map(Vec::as_slice).unwrap_or(&[]);
    let current = self.descriptor().category.clone();
    self.picker.show(categories, &current);
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let snapshot = self.snapshot();
    let page = self.page();
    let books = page.as_ref().map(|p| p.items.as_slice()).unwrap_or(&[]);
    ensure_valid_selection(&mut self.list_state, books.len());

    let title = if let Some(error) = snapshot.error() {
      format!(" Books (error: {}) ", error)
    } else if snapshot.is_loading() {
      " Books (loading...) ".to_string()
    } else {
      let total = page.as_ref().map(|p| p.total_count).unwrap_or(0);
      format!(" Books ({}) ", total)
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if books.is_empty() {
      let content = if snapshot.error().is_some_and(|e| e.is_retryable()) {
        "Failed to load books. Press 'r' to retry."
      } else if snapshot.is_error() {
        "Failed to load books."
      } else if snapshot.is_loading() {
        "Loading..."
      } else {
        "No books match."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = books
      .iter()
      .map(|book| {
        let level = book.stock_level();
        let line = Line::from(vec![
          Span::styled(format!("{:<6}", book.id), Style::default().fg(Color::Cyan)),
          Span::raw(" "),
          Span::raw(format!("{:<40}", truncate(&book.title, 40))),
          Span::raw(" "),
          Span::styled(
            format!("{:<22}", truncate(&book.author, 22)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(format!("{:>5} ", book.published_year)),
          Span::raw(format!("{:>9} ", book.price.to_string())),
          Span::styled(level.label(), Style::default().fg(stock_color(level))),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for BookListView {
  fn handle_key(&mut self, key: KeyEvent, catalog: &mut Catalog) -> ViewAction {
    if self.picker.is_active() {
      if let KeyResult::Event(PickerEvent::Selected(category)) = self.picker.handle_key(key) {
        self.query.on_category_changed(category);
        self.observe(catalog);
      }
      return ViewAction::None;
    }

    // Let search component try to handle first
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(text)) => {
        self.query.on_search_text_changed(text);
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('n') | KeyCode::Right => {
        let page = self.descriptor().page + 1;
        self.go_to_page(page, catalog);
      }
      KeyCode::Char('p') | KeyCode::Left => {
        let page = self.descriptor().page.saturating_sub(1);
        self.go_to_page(page, catalog);
      }
      KeyCode::Char('c') => self.open_picker(catalog),
      KeyCode::Char('r') => catalog.reload(),
      KeyCode::Enter => {
        let selected = self.list_state.selected().and_then(|idx| {
          self
            .page()
            .and_then(|p| p.items.get(idx).map(|b| b.id.clone()))
        });
        if let Some(id) = selected {
          return ViewAction::Push(Box::new(BookDetailView::new(id, catalog)));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(3), Constraint::Length(1)])
      .split(area);

    self.render_list(frame, chunks[0]);

    let pager = pager_line(self.total_pages(), self.descriptor().page);
    frame.render_widget(Paragraph::new(pager).alignment(Alignment::Center), chunks[1]);

    self
      .search
      .render_overlay(frame, area, self.query.has_pending_search());
    self.picker.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Books".to_string()
  }

  fn context(&self) -> Option<String> {
    let query = self.descriptor();
    let mut parts = Vec::new();
    if self.query.has_pending_search() {
      parts.push(format!("\"{}\"...", self.query.raw_search().trim()));
    } else if let Some(term) = query.search_term() {
      parts.push(format!("\"{}\"", term));
    }
    if let Some(category) = query.category_filter() {
      parts.push(format!("in {}", category));
    }
    let pages = self.total_pages();
    if pages > 0 {
      parts.push(format!("page {}/{}", query.page, pages));
    }
    Some(parts.join("  "))
  }

  fn tick(&mut self, catalog: &mut Catalog) {
    if self.query.poll().is_some() {
      self.observe(catalog);
    }
    let latest = self.list.borrow().value.clone();
    if latest.is_some() {
      self.shown = latest;
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("/", "search").with_priority(10),
      ShortcutInfo::new("c", "category").with_priority(20),
      ShortcutInfo::new("n/p", "page").with_priority(30),
      ShortcutInfo::new("enter", "open").with_priority(40),
      ShortcutInfo::new("r", "reload").with_priority(80),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
