use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::ui::theme::Theme;
use crossterm::event::{KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by a prompt that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
  /// Enter pressed with the final value
  Submitted(String),
  /// Escape pressed, prompt dismissed
  Cancelled,
}

/// Titled single-line prompt overlay.
///
/// Used wherever a view needs one line of free text (a new task title, a
/// search query). Unlike the command input it emits nothing until submit.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
  input: TextInput,
  active: bool,
  title: String,
}

impl Prompt {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Open the prompt with a fresh buffer
  pub fn open(&mut self, title: &str) {
    self.active = true;
    self.title = title.to_string();
    self.input.clear();
  }

  /// Open the prompt seeded with an initial value
  pub fn open_with(&mut self, title: &str, initial: &str) {
    self.open(title);
    for c in initial.chars() {
      let key = KeyEvent::new(crossterm::event::KeyCode::Char(c), KeyModifiers::NONE);
      self.input.handle_key(key);
    }
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<PromptEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(value) => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(PromptEvent::Submitted(value))
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(PromptEvent::Cancelled)
      }
      InputResult::Consumed => KeyResult::Handled,
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the prompt overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
    if !self.active {
      return;
    }

    let width = (area.width * 60 / 100).clamp(30, 60);
    let height = 3;

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

    let line = Line::from(vec![
      Span::styled("> ", Style::default().fg(theme.border_active)),
      Span::raw(self.input.value()),
      Span::styled("_", Style::default().fg(theme.border_active)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::{KeyCode, KeyModifiers};

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_submit_returns_typed_value() {
    let mut prompt = Prompt::new();
    prompt.open("New task");
    for c in "Fix login".chars() {
      prompt.handle_key(key(KeyCode::Char(c)));
    }

    let result = prompt.handle_key(key(KeyCode::Enter));
    assert_eq!(
      result,
      KeyResult::Event(PromptEvent::Submitted("Fix login".to_string()))
    );
    assert!(!prompt.is_active());
  }

  #[test]
  fn test_cancel_discards_buffer() {
    let mut prompt = Prompt::new();
    prompt.open("New task");
    prompt.handle_key(key(KeyCode::Char('x')));

    let result = prompt.handle_key(key(KeyCode::Esc));
    assert_eq!(result, KeyResult::Event(PromptEvent::Cancelled));

    // Reopening starts from an empty buffer.
    prompt.open("New task");
    let result = prompt.handle_key(key(KeyCode::Enter));
    assert_eq!(
      result,
      KeyResult::Event(PromptEvent::Submitted(String::new()))
    );
  }

  #[test]
  fn test_open_with_seeds_initial_value() {
    let mut prompt = Prompt::new();
    prompt.open_with("Search", "api");

    let result = prompt.handle_key(key(KeyCode::Enter));
    assert_eq!(
      result,
      KeyResult::Event(PromptEvent::Submitted("api".to_string()))
    );
  }
}
