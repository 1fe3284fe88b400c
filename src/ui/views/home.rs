use crate::stats;
use crate::store::{ResourceKey, Store};
use crate::ui::renderfns::utils::{priority_color, status_color, truncate};
use crate::ui::theme::Theme;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::BoardView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{BarChart, Block, Borders, Cell, Paragraph, Row, Table, TableState};

/// Dashboard landing view: priority distribution, project status summary,
/// and the default project's task table.
///
/// Charts and the table read from two independent cache keys, so a failure
/// on one endpoint degrades that panel alone.
pub struct HomeView {
  projects_key: ResourceKey,
  tasks_key: Option<ResourceKey>,
  default_project: Option<u64>,
  table_state: TableState,
}

impl HomeView {
  pub fn new(default_project: Option<u64>) -> Self {
    Self {
      projects_key: ResourceKey::Projects,
      tasks_key: default_project.map(|project_id| ResourceKey::Tasks { project_id }),
      default_project,
      table_state: TableState::default(),
    }
  }

  fn project_name(&self, store: &Store) -> String {
    let fallback = || {
      self
        .default_project
        .map(|id| format!("Project {}", id))
        .unwrap_or_else(|| "Tasks".to_string())
    };
    let snapshot = store.snapshot(&self.projects_key);
    snapshot
      .projects()
      .and_then(|projects| {
        projects
          .iter()
          .find(|p| Some(p.id) == self.default_project)
          .map(|p| p.name.clone())
      })
      .unwrap_or_else(fallback)
  }

  fn render_priority_chart(&self, frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
    let block = Block::default()
      .title(" Priority ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(theme.border));

    let Some(tasks_key) = &self.tasks_key else {
      let paragraph = Paragraph::new("No default project configured.")
        .block(block)
        .style(Style::default().fg(theme.dim));
      frame.render_widget(paragraph, area);
      return;
    };

    let snapshot = store.snapshot(tasks_key);
    let Some(tasks) = snapshot.tasks() else {
      let (message, color) = if snapshot.is_error() {
        (
          format!("Error: {}", snapshot.error.unwrap_or("unknown")),
          theme.error,
        )
      } else {
        ("Loading...".to_string(), theme.dim)
      };
      let paragraph = Paragraph::new(message)
        .block(block)
        .style(Style::default().fg(color));
      frame.render_widget(paragraph, area);
      return;
    };

    let distribution = stats::priority_distribution(tasks);
    if distribution.is_empty() {
      let paragraph = Paragraph::new("No tasks.")
        .block(block)
        .style(Style::default().fg(theme.dim));
      frame.render_widget(paragraph, area);
      return;
    }

    let data: Vec<(&str, u64)> = distribution
      .iter()
      .map(|&(priority, count)| {
        let label = priority.map(|p| p.label()).unwrap_or("None");
        (label, count as u64)
      })
      .collect();

    let bar_style = distribution
      .first()
      .and_then(|(priority, _)| *priority)
      .map(|priority| Style::default().fg(priority_color(priority)))
      .unwrap_or_default();

    let chart = BarChart::default()
      .block(block)
      .data(&data)
      .bar_width(9)
      .bar_gap(1)
      .bar_style(bar_style)
      .value_style(Style::default().fg(theme.text).bold());

    frame.render_widget(chart, area);
  }

  fn render_project_summary(&self, frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
    let snapshot = store.snapshot(&self.projects_key);

    let block = Block::default()
      .title(" Projects ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(theme.border));

    let Some(projects) = snapshot.projects() else {
      let (message, color) = if snapshot.is_error() {
        (
          format!("Error: {}", snapshot.error.unwrap_or("unknown")),
          theme.error,
        )
      } else {
        ("Loading...".to_string(), theme.dim)
      };
      let paragraph = Paragraph::new(message)
        .block(block)
        .style(Style::default().fg(color));
      frame.render_widget(paragraph, area);
      return;
    };

    let counts = stats::project_status_counts(projects);
    let lines = vec![
      Line::from(vec![
        Span::styled("Active     ", Style::default().fg(theme.dim)),
        Span::styled(
          counts.active.to_string(),
          Style::default().fg(theme.accent).bold(),
        ),
      ]),
      Line::from(vec![
        Span::styled("Completed  ", Style::default().fg(theme.dim)),
        Span::styled(
          counts.completed.to_string(),
          Style::default().fg(theme.text).bold(),
        ),
      ]),
      Line::raw(""),
      Line::from(Span::styled(
        format!("{} total", projects.len()),
        Style::default().fg(theme.dim),
      )),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
  }

  fn render_task_table(&mut self, frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
    let title = format!(" {} ", self.project_name(store));
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(theme.border));

    let Some(tasks_key) = &self.tasks_key else {
      let paragraph =
        Paragraph::new("No default project configured. Use :projects to pick a board.")
          .block(block)
          .style(Style::default().fg(theme.dim));
      frame.render_widget(paragraph, area);
      return;
    };

    let snapshot = store.snapshot(tasks_key);
    let Some(tasks) = snapshot.tasks() else {
      let (message, color) = if snapshot.is_error() {
        (
          format!(
            "Failed to load tasks: {}\nPress 'r' to retry.",
            snapshot.error.unwrap_or("unknown error")
          ),
          theme.error,
        )
      } else {
        ("Loading tasks...".to_string(), theme.dim)
      };
      let paragraph = Paragraph::new(message)
        .block(block)
        .style(Style::default().fg(color));
      frame.render_widget(paragraph, area);
      return;
    };

    if tasks.is_empty() {
      let paragraph = Paragraph::new("No tasks in this project.")
        .block(block)
        .style(Style::default().fg(theme.dim));
      frame.render_widget(paragraph, area);
      return;
    }

    if self.table_state.selected().map_or(true, |i| i >= tasks.len()) {
      self.table_state.select(Some(0));
    }

    let header = Row::new(vec!["Title", "Status", "Priority", "Due", "Assignee"])
      .style(Style::default().fg(theme.dim).bold());

    let rows: Vec<Row> = tasks
      .iter()
      .map(|task| {
        let priority_cell = match task.priority {
          Some(p) => Cell::from(p.label()).style(Style::default().fg(priority_color(p))),
          None => Cell::from("-").style(Style::default().fg(theme.dim)),
        };
        let due = task
          .due_date
          .map(|d| d.format("%Y-%m-%d").to_string())
          .unwrap_or_else(|| "-".to_string());
        let assignee = task
          .assignee
          .as_ref()
          .map(|u| u.username.clone())
          .unwrap_or_else(|| "-".to_string());

        Row::new(vec![
          Cell::from(truncate(&task.title, 40)),
          Cell::from(task.status.label())
            .style(Style::default().fg(status_color(task.status))),
          priority_cell,
          Cell::from(due),
          Cell::from(assignee),
        ])
      })
      .collect();

    let table = Table::new(
      rows,
      [
        Constraint::Min(24),
        Constraint::Length(18),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(14),
      ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
      Style::default()
        .bg(theme.selection_bg)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut self.table_state);
  }
}

impl View for HomeView {
  fn mounted(&mut self, store: &mut Store) {
    store.subscribe(self.projects_key.clone());
    if let Some(key) = &self.tasks_key {
      store.subscribe(key.clone());
    }
  }

  fn unmounted(&mut self, store: &mut Store) {
    store.release(&self.projects_key);
    if let Some(key) = &self.tasks_key {
      store.release(key);
    }
  }

  fn handle_key(&mut self, key: KeyEvent, store: &mut Store) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.table_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.table_state.select_previous();
      }
      KeyCode::Char('r') => {
        store.refetch(&self.projects_key);
        if let Some(tasks_key) = self.tasks_key.clone() {
          store.refetch(&tasks_key);
        }
      }
      KeyCode::Enter => {
        if let Some(project_id) = self.default_project {
          let name = self.project_name(store);
          return ViewAction::Push(Box::new(BoardView::new(project_id, name)));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(10), Constraint::Min(0)])
      .split(area);

    let top = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Min(0), Constraint::Length(24)])
      .split(chunks[0]);

    self.render_priority_chart(frame, top[0], store, theme);
    self.render_project_summary(frame, top[1], store, theme);
    self.render_task_table(frame, chunks[1], store, theme);
  }

  fn breadcrumb_label(&self) -> String {
    "Home".to_string()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("j/k", "task"),
      Shortcut::new("enter", "board"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "quit"),
    ]
  }
}
