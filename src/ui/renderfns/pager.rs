use ratatui::prelude::*;

use crate::catalog::{page_window, PageSlot};

/// Pager strip such as `‹ 1 … 3 4 [5] 6 7 … 10 ›`.
pub fn pager_line(total_pages: u32, current: u32) -> Line<'static> {
  let slots = page_window(total_pages, current);
  if slots.is_empty() {
    return Line::default();
  }

  let dim = Style::default().fg(Color::DarkGray);
  let arrow = |enabled: bool| if enabled { Style::default().fg(Color::Cyan) } else { dim };

  let mut spans = vec![Span::styled("‹ ", arrow(current > 1))];
  for slot in slots {
    match slot {
      PageSlot::Page(page) if page == current => spans.push(Span::styled(
        format!("[{}]", page),
        Style::default().fg(Color::Yellow).bold(),
      )),
      PageSlot::Page(page) => spans.push(Span::raw(page.to_string())),
      PageSlot::Ellipsis => spans.push(Span::styled("…", dim)),
    }
    spans.push(Span::raw(" "));
  }
  spans.push(Span::styled("›", arrow(current < total_pages)));
  Line::from(spans)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
  }

  #[test]
  fn test_pager_line_marks_current_page() {
    assert_eq!(text(&pager_line(10, 5)), "‹ 1 … 3 4 [5] 6 7 … 10 ›");
  }

  #[test]
  fn test_pager_line_empty_without_pages() {
    assert!(pager_line(0, 1).spans.is_empty());
  }
}
