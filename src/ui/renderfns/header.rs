use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::ui::theme::Theme;

/// Draw the header bar with app name, API host, project, and sync state
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  theme: &Theme,
  host: &str,
  project: &str,
  pending_mutations: usize,
) {
  let mut spans = vec![
    Span::styled(" taskdeck ", Style::default().fg(theme.accent).bold()),
    Span::styled("│", Style::default().fg(theme.dim)),
    Span::styled(format!(" {} ", host), Style::default().fg(theme.text)),
    Span::styled("│", Style::default().fg(theme.dim)),
    Span::styled(
      format!(" {} ", project),
      Style::default().fg(theme.border_active).bold(),
    ),
    Span::raw("  "),
    Span::styled("<:>", Style::default().fg(theme.accent)),
    Span::styled(" command", Style::default().fg(theme.dim)),
    Span::raw("   "),
    Span::styled("<q>", Style::default().fg(theme.accent)),
    Span::styled(" back", Style::default().fg(theme.dim)),
  ];

  if pending_mutations > 0 {
    spans.push(Span::raw("   "));
    spans.push(Span::styled(
      format!("⟳ {} saving", pending_mutations),
      Style::default().fg(theme.border_active),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.bar_bg));

  frame.render_widget(paragraph, area);
}
