use crate::catalog::{Catalog, HttpCatalog};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::ui::{self, view::View, view::ViewAction, views::BookListView, Chrome};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use tracing::{debug, info};

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Cached access to the book collection, shared by every view
  catalog: Catalog,

  /// Application configuration
  config: Config,

  /// Header title
  title: String,

  /// API host for the header
  host: String,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let api = HttpCatalog::new(&config.api)?;
    info!(url = %api.base_url(), "using catalog API");

    let mut catalog = Catalog::new(Arc::new(api));
    let root = BookListView::new(&mut catalog, config.page_size, config.debounce());

    let host = config.api_host();
    let title = config.title.clone().unwrap_or_else(|| "shelf".to_string());

    Ok(Self {
      view_stack: vec![Box::new(root)],
      catalog,
      config,
      title,
      host,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let result = self.event_loop().await;

    // Cleanup terminal, even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(self.config.tick_rate());

    while !self.should_quit {
      let chrome = Chrome {
        title: &self.title,
        host: &self.host,
      };
      terminal.draw(|frame| ui::draw(frame, &chrome, &mut self.view_stack))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.tick(),
      Event::Resize => {} // Redrawn on the next loop iteration
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let Some(view) = self.view_stack.last_mut() else {
      self.should_quit = true;
      return;
    };

    match view.handle_key(key, &mut self.catalog) {
      ViewAction::None => {}
      ViewAction::Push(next) => {
        debug!(view = %next.breadcrumb_label(), "push view");
        self.view_stack.push(next);
      }
      ViewAction::Pop => {
        // Popping the root view quits
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn tick(&mut self) {
    self.catalog.poll();
    if let Some(view) = self.view_stack.last_mut() {
      view.tick(&mut self.catalog);
    }
  }
}
