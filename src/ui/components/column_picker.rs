use super::KeyResult;
use crate::api::types::TaskStatus;
use crate::ui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Events emitted by the column picker that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPickerEvent {
  /// Target column chosen
  Selected(TaskStatus),
  /// Picker cancelled
  Cancelled,
}

/// Picker for moving a task to another board column.
///
/// The columns are the fixed set of task statuses; the picker opens on the
/// task's current column so Enter without movement is a no-op move.
#[derive(Debug, Clone, Default)]
pub struct ColumnPicker {
  active: bool,
  selected: usize,
  title: String,
}

impl ColumnPicker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the picker, preselecting the task's current column
  pub fn show(&mut self, title: String, current: TaskStatus) {
    self.active = true;
    self.title = title;
    self.selected = TaskStatus::ALL
      .iter()
      .position(|&s| s == current)
      .unwrap_or(0);
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.selected = 0;
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ColumnPickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(ColumnPickerEvent::Cancelled)
      }
      KeyCode::Enter => {
        let status = TaskStatus::ALL[self.selected];
        self.hide();
        KeyResult::Event(ColumnPickerEvent::Selected(status))
      }
      KeyCode::Char('j') | KeyCode::Down => {
        self.selected = (self.selected + 1) % TaskStatus::ALL.len();
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.selected = if self.selected == 0 {
          TaskStatus::ALL.len() - 1
        } else {
          self.selected - 1
        };
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
    if !self.active {
      return;
    }

    let max_label_len = TaskStatus::ALL
      .iter()
      .map(|s| s.label().len())
      .max()
      .unwrap_or(10);
    let width = (max_label_len as u16 + 6).min(area.width.saturating_sub(4)).max(20);
    let height = (TaskStatus::ALL.len() as u16 + 2).min(area.height.saturating_sub(4)).max(3);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(theme.border_active))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = TaskStatus::ALL
      .iter()
      .map(|status| {
        let line = Line::from(vec![Span::styled(
          status.label(),
          Style::default().fg(theme.accent),
        )]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .highlight_style(Style::default().bg(theme.selection_bg).fg(theme.text));

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, inner, &mut state);
  }
}
