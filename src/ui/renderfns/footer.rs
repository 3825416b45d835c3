use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::ui::view::ShortcutInfo;

/// Draw the footer bar: view breadcrumb on the left, shortcut hints on the right
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], shortcuts: &[ShortcutInfo]) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      // Current view - highlighted
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let hints: Vec<Span> = shortcuts
    .iter()
    .flat_map(|s| {
      [
        Span::styled(format!("<{}>", s.key), Style::default().fg(Color::Cyan)),
        Span::styled(format!(" {}  ", s.label), Style::default().fg(Color::DarkGray)),
      ]
    })
    .collect();

  let chunks = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(10), Constraint::Length(hints_width(shortcuts))])
    .split(area);

  let style = Style::default().bg(Color::Black);
  frame.render_widget(Paragraph::new(Line::from(spans)).style(style), chunks[0]);
  frame.render_widget(
    Paragraph::new(Line::from(hints))
      .style(style)
      .alignment(Alignment::Right),
    chunks[1],
  );
}

fn hints_width(shortcuts: &[ShortcutInfo]) -> u16 {
  shortcuts
    .iter()
    .map(|s| s.key.chars().count() + s.label.chars().count() + 5)
    .sum::<usize>()
    .min(u16::MAX as usize) as u16
}
