use crate::store::{ResourceKey, Store};
use crate::ui::components::prompt::{Prompt, PromptEvent};
use crate::ui::components::KeyResult;
use crate::ui::renderfns::utils::{status_color, truncate};
use crate::ui::theme::Theme;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Cross-resource search: tasks, projects, and users matching one query.
///
/// Each submitted query is its own cache key. Submitting a new query
/// releases the previous key so the old result set ages out on its own.
pub struct SearchView {
  key: Option<ResourceKey>,
  query: String,
  prompt: Prompt,
}

impl SearchView {
  pub fn new() -> Self {
    Self {
      key: None,
      query: String::new(),
      prompt: Prompt::new(),
    }
  }

  fn submit_query(&mut self, store: &mut Store, query: String) {
    if query.trim().is_empty() {
      return;
    }
    let query = query.trim().to_string();
    let new_key = ResourceKey::Search {
      query: query.clone(),
    };
    if self.key.as_ref() == Some(&new_key) {
      store.refetch(&new_key);
      return;
    }
    if let Some(old) = self.key.take() {
      store.release(&old);
    }
    store.subscribe(new_key.clone());
    self.key = Some(new_key);
    self.query = query;
  }
}

impl Default for SearchView {
  fn default() -> Self {
    Self::new()
  }
}

impl View for SearchView {
  fn mounted(&mut self, _store: &mut Store) {
    // No query yet; prompt for one straight away.
    self.prompt.open("Search");
  }

  fn unmounted(&mut self, store: &mut Store) {
    if let Some(key) = self.key.take() {
      store.release(&key);
    }
  }

  fn handle_key(&mut self, key: KeyEvent, store: &mut Store) -> ViewAction {
    match self.prompt.handle_key(key) {
      KeyResult::Event(PromptEvent::Submitted(query)) => {
        self.submit_query(store, query);
        return ViewAction::None;
      }
      KeyResult::Event(PromptEvent::Cancelled) => {
        // Cancelling the first prompt leaves nothing to show.
        if self.key.is_none() {
          return ViewAction::Pop;
        }
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('/') => {
        self.prompt.open_with("Search", &self.query);
      }
      KeyCode::Char('r') => {
        if let Some(search_key) = self.key.clone() {
          store.refetch(&search_key);
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
    let title = if self.query.is_empty() {
      " Search ".to_string()
    } else {
      format!(" Search: {} ", self.query)
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(theme.border));

    let body: Paragraph = match &self.key {
      None => Paragraph::new("Type a query and press Enter.")
        .style(Style::default().fg(theme.dim)),
      Some(key) => {
        let snapshot = store.snapshot(key);
        match snapshot.search() {
          None if snapshot.is_error() => Paragraph::new(format!(
            "Search failed: {}\nPress 'r' to retry.",
            snapshot.error.unwrap_or("unknown error")
          ))
          .style(Style::default().fg(theme.error)),
          None => Paragraph::new("Searching...").style(Style::default().fg(theme.dim)),
          Some(results) => {
            let mut lines = Vec::new();

            lines.push(Line::from(Span::styled(
              format!("Tasks ({})", results.tasks.len()),
              Style::default().fg(theme.accent).bold(),
            )));
            for task in results.tasks.iter().take(10) {
              lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                  format!("{:<18}", task.status.label()),
                  Style::default().fg(status_color(task.status)),
                ),
                Span::styled(truncate(&task.title, 60), Style::default().fg(theme.text)),
              ]));
            }

            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
              format!("Projects ({})", results.projects.len()),
              Style::default().fg(theme.accent).bold(),
            )));
            for project in results.projects.iter().take(10) {
              lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                  truncate(&project.name, 60),
                  Style::default().fg(theme.text),
                ),
              ]));
            }

            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
              format!("Users ({})", results.users.len()),
              Style::default().fg(theme.accent).bold(),
            )));
            for user in results.users.iter().take(10) {
              lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(user.username.clone(), Style::default().fg(theme.text)),
              ]));
            }

            if results.tasks.is_empty()
              && results.projects.is_empty()
              && results.users.is_empty()
            {
              lines.push(Line::raw(""));
              lines.push(Line::from(Span::styled(
                "No matches.",
                Style::default().fg(theme.dim),
              )));
            }

            Paragraph::new(lines)
          }
        }
      }
    };

    frame.render_widget(body.block(block), area);

    self.prompt.render_overlay(frame, area, theme);
  }

  fn breadcrumb_label(&self) -> String {
    if self.query.is_empty() {
      "Search".to_string()
    } else {
      format!("Search \"{}\"", truncate(&self.query, 20))
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("/", "new query"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "back"),
    ]
  }
}
