use crate::api::types::{NewTaskPayload, Task, TaskStatus};
use crate::stats;
use crate::store::{Mutation, ResourceKey, Store};
use crate::ui::components::column_picker::{ColumnPicker, ColumnPickerEvent};
use crate::ui::components::prompt::{Prompt, PromptEvent};
use crate::ui::components::KeyResult;
use crate::ui::renderfns::utils::{priority_color, status_color, truncate};
use crate::ui::theme::Theme;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tracing::info;

/// Kanban board for one project: four fixed status columns over the
/// project's cached task list.
///
/// The grouping is recomputed from the latest snapshot on every render, so a
/// card only ever appears in the column its server-confirmed status puts it
/// in. A move stays pending in the source column until the PATCH lands and
/// the follow-up refetch replaces the list.
pub struct BoardView {
  project_id: u64,
  project_name: String,
  key: ResourceKey,

  selected_column: usize,
  selected_card: usize,

  picker: ColumnPicker,
  new_task: Prompt,
}

impl BoardView {
  pub fn new(project_id: u64, project_name: String) -> Self {
    Self {
      project_id,
      project_name,
      key: ResourceKey::Tasks { project_id },
      selected_column: 0,
      selected_card: 0,
      picker: ColumnPicker::new(),
      new_task: Prompt::new(),
    }
  }

  /// Per-column card counts for the current snapshot
  fn column_lens(&self, store: &Store) -> [usize; 4] {
    let mut lens = [0; 4];
    if let Some(tasks) = store.snapshot(&self.key).tasks() {
      for (i, (_, column)) in stats::group_by_status(tasks).iter().enumerate() {
        lens[i] = column.len();
      }
    }
    lens
  }

  /// Identity and status of the card under the cursor
  fn selected_task(&self, store: &Store) -> Option<(u64, TaskStatus, String)> {
    let snapshot = store.snapshot(&self.key);
    let tasks = snapshot.tasks()?;
    let grouped = stats::group_by_status(tasks);
    let (_, column) = grouped.get(self.selected_column)?;
    let task = column.get(self.selected_card)?;
    Some((task.id, task.status, task.title.clone()))
  }

  fn move_column(&mut self, direction: i32) {
    let count = TaskStatus::ALL.len();
    self.selected_column = if direction > 0 {
      (self.selected_column + 1) % count
    } else {
      self.selected_column.checked_sub(1).unwrap_or(count - 1)
    };
    self.selected_card = 0;
  }

  fn move_card(&mut self, store: &Store, direction: i32) {
    let len = self.column_lens(store)[self.selected_column];
    if len == 0 {
      return;
    }
    self.selected_card = if direction > 0 {
      (self.selected_card + 1) % len
    } else {
      self.selected_card.checked_sub(1).unwrap_or(len - 1)
    };
  }

  fn render_card<'a>(task: &'a Task, width: usize, theme: &Theme) -> ListItem<'a> {
    let mut spans = Vec::new();

    if let Some(priority) = task.priority {
      spans.push(Span::styled(
        "▐ ",
        Style::default().fg(priority_color(priority)),
      ));
    } else {
      spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
      truncate(&task.title, width.saturating_sub(8)),
      Style::default().fg(theme.text),
    ));
    if let Some(points) = task.points {
      spans.push(Span::styled(
        format!(" {}pt", points),
        Style::default().fg(theme.dim),
      ));
    }

    ListItem::new(Line::from(spans))
  }
}

impl View for BoardView {
  fn mounted(&mut self, store: &mut Store) {
    store.subscribe(self.key.clone());
  }

  fn unmounted(&mut self, store: &mut Store) {
    store.release(&self.key);
  }

  fn handle_key(&mut self, key: KeyEvent, store: &mut Store) -> ViewAction {
    match self.picker.handle_key(key) {
      KeyResult::Event(ColumnPickerEvent::Selected(status)) => {
        if let Some((task_id, current, _)) = self.selected_task(store) {
          if status != current {
            info!(task_id, from = current.label(), to = status.label(), "moving task");
            store.mutate(Mutation::UpdateTaskStatus {
              task_id,
              project_id: self.project_id,
              status,
            });
          }
        }
        return ViewAction::None;
      }
      KeyResult::Event(ColumnPickerEvent::Cancelled) | KeyResult::Handled => {
        return ViewAction::None;
      }
      KeyResult::NotHandled => {}
    }

    match self.new_task.handle_key(key) {
      KeyResult::Event(PromptEvent::Submitted(title)) => {
        let title = title.trim().to_string();
        if !title.is_empty() {
          store.mutate(Mutation::CreateTask(NewTaskPayload::new(
            title,
            self.project_id,
          )));
        }
        return ViewAction::None;
      }
      KeyResult::Event(PromptEvent::Cancelled) | KeyResult::Handled => {
        return ViewAction::None;
      }
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('h') | KeyCode::Left => self.move_column(-1),
      KeyCode::Char('l') | KeyCode::Right => self.move_column(1),
      KeyCode::Char('j') | KeyCode::Down => self.move_card(store, 1),
      KeyCode::Char('k') | KeyCode::Up => self.move_card(store, -1),

      KeyCode::Char('m') | KeyCode::Enter => {
        if let Some((_, current, title)) = self.selected_task(store) {
          self
            .picker
            .show(format!("Move: {}", truncate(&title, 24)), current);
        }
      }

      KeyCode::Char('n') => {
        self.new_task.open("New task title");
      }

      KeyCode::Char('r') => {
        store.refetch(&self.key);
      }

      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,

      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
    let snapshot = store.snapshot(&self.key);

    if snapshot.data.is_none() {
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

      let block = Block::default()
        .title(format!(" {} ", self.project_name))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
      let paragraph = Paragraph::new(message)
        .block(block)
        .style(Style::default().fg(color));
      frame.render_widget(paragraph, area);
      return;
    }

    let tasks = snapshot.tasks().unwrap_or(&[]);
    let grouped = stats::group_by_status(tasks);

    // Snapshot may have shrunk since the last keypress.
    if let Some((_, column)) = grouped.get(self.selected_column) {
      if self.selected_card >= column.len() {
        self.selected_card = column.len().saturating_sub(1);
      }
    }

    let constraints = vec![Constraint::Ratio(1, grouped.len() as u32); grouped.len()];
    let col_areas = Layout::horizontal(constraints).split(area);

    for (col_idx, (status, column)) in grouped.iter().enumerate() {
      let is_selected = col_idx == self.selected_column;
      let col_area = col_areas[col_idx];

      let border = if is_selected {
        theme.border_active
      } else {
        theme.border
      };

      let refresh_marker = if is_selected && snapshot.refreshing {
        " ⟳"
      } else {
        ""
      };
      let title = format!(" {} ({}){} ", status.label(), column.len(), refresh_marker);

      let block = Block::default()
        .title(Span::styled(title, Style::default().fg(status_color(*status))))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

      let items: Vec<ListItem> = column
        .iter()
        .map(|task| Self::render_card(task, col_area.width as usize, theme))
        .collect();

      let list = List::new(items)
        .block(block)
        .highlight_style(
          Style::default()
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

      if is_selected {
        let mut state = ListState::default();
        state.select((!column.is_empty()).then_some(self.selected_card));
        frame.render_stateful_widget(list, col_area, &mut state);
      } else {
        frame.render_widget(list, col_area);
      }
    }

    self.picker.render_overlay(frame, area, theme);
    self.new_task.render_overlay(frame, area, theme);
  }

  fn breadcrumb_label(&self) -> String {
    self.project_name.clone()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("h/l", "column"),
      Shortcut::new("j/k", "card"),
      Shortcut::new("m", "move"),
      Shortcut::new("n", "new task"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "back"),
    ]
  }
}
