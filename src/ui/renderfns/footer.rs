use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::ui::theme::Theme;
use crate::ui::view::Shortcut;

/// Draw the footer bar with view breadcrumb and the current view's shortcuts.
/// A pending mutation error takes over the whole line.
pub fn draw_footer(
  frame: &mut Frame,
  area: Rect,
  theme: &Theme,
  breadcrumb: &[String],
  shortcuts: &[Shortcut],
  mutation_error: Option<&str>,
) {
  if let Some(error) = mutation_error {
    let line = Line::from(vec![
      Span::styled(" ✗ ", Style::default().fg(theme.error).bold()),
      Span::styled(error.to_string(), Style::default().fg(theme.error)),
      Span::styled("  (any key to dismiss)", Style::default().fg(theme.dim)),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().bg(theme.bar_bg));
    frame.render_widget(paragraph, area);
    return;
  }

  let mut spans = Vec::new();
  spans.push(Span::raw(" "));

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(theme.dim)));
    }

    let style = if i == breadcrumb.len() - 1 {
      Style::default().fg(theme.accent).bold()
    } else {
      Style::default().fg(theme.text)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  for shortcut in shortcuts {
    spans.push(Span::raw("   "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(theme.accent),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(theme.dim),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.bar_bg));

  frame.render_widget(paragraph, area);
}
