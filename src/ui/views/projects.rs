use crate::api::types::ProjectStatus;
use crate::store::{ResourceKey, Store};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::utils::truncate;
use crate::ui::theme::Theme;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::BoardView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Project list. Enter opens the project's board.
pub struct ProjectListView {
  key: ResourceKey,
  list_state: ListState,
}

impl ProjectListView {
  pub fn new() -> Self {
    Self {
      key: ResourceKey::Projects,
      list_state: ListState::default(),
    }
  }
}

impl Default for ProjectListView {
  fn default() -> Self {
    Self::new()
  }
}

impl View for ProjectListView {
  fn mounted(&mut self, store: &mut Store) {
    store.subscribe(self.key.clone());
  }

  fn unmounted(&mut self, store: &mut Store) {
    store.release(&self.key);
  }

  fn handle_key(&mut self, key: KeyEvent, store: &mut Store) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('r') => {
        store.refetch(&self.key);
      }
      KeyCode::Enter => {
        let selected = self
          .list_state
          .selected()
          .zip(store.snapshot(&self.key).projects())
          .and_then(|(idx, projects)| projects.get(idx))
          .map(|p| (p.id, p.name.clone()));
        if let Some((id, name)) = selected {
          return ViewAction::Push(Box::new(BoardView::new(id, name)));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
    let snapshot = store.snapshot(&self.key);

    let title = if snapshot.refreshing {
      " Projects ⟳ ".to_string()
    } else {
      " Projects ".to_string()
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(theme.border));

    let Some(projects) = snapshot.projects() else {
      let (message, color) = if snapshot.is_error() {
        (
          format!(
            "Failed to load projects: {}\nPress 'r' to retry.",
            snapshot.error.unwrap_or("unknown error")
          ),
          theme.error,
        )
      } else {
        ("Loading projects...".to_string(), theme.dim)
      };
      let paragraph = Paragraph::new(message)
        .block(block)
        .style(Style::default().fg(color));
      frame.render_widget(paragraph, area);
      return;
    };

    if projects.is_empty() {
      let paragraph = Paragraph::new("No projects found.")
        .block(block)
        .style(Style::default().fg(theme.dim));
      frame.render_widget(paragraph, area);
      return;
    }

    ensure_valid_selection(&mut self.list_state, projects.len());

    let items: Vec<ListItem> = projects
      .iter()
      .map(|project| {
        let status = project.status();
        let status_style = match status {
          ProjectStatus::Active => Style::default().fg(theme.accent),
          ProjectStatus::Completed => Style::default().fg(theme.dim),
        };

        let mut spans = vec![
          Span::styled(
            format!("{:<30}", truncate(&project.name, 28)),
            Style::default().fg(theme.text),
          ),
          Span::styled(format!("{:<10}", status.label()), status_style),
        ];
        if let Some(description) = &project.description {
          spans.push(Span::styled(
            truncate(description, 50),
            Style::default().fg(theme.dim),
          ));
        }
        ListItem::new(Line::from(spans))
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(theme.selection_bg)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn breadcrumb_label(&self) -> String {
    "Projects".to_string()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("j/k", "project"),
      Shortcut::new("enter", "board"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "back"),
    ]
  }
}
