use ratatui::prelude::Color;

use crate::catalog::StockLevel;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Get the display color for a stock badge
pub fn stock_color(level: StockLevel) -> Color {
  match level {
    StockLevel::OutOfStock => Color::Red,
    StockLevel::Low => Color::Yellow,
    StockLevel::InStock => Color::Green,
  }
}
