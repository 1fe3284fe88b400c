use ratatui::prelude::Color;

use crate::api::types::{Priority, TaskStatus};

/// Truncate a string to a maximum character count, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    return s.to_string();
  }
  let keep = max_len.saturating_sub(3);
  // Cut on a char boundary; titles are arbitrary user text.
  let end = s
    .char_indices()
    .nth(keep)
    .map(|(i, _)| i)
    .unwrap_or(s.len());
  format!("{}...", &s[..end])
}

/// Display color for a board column
pub fn status_color(status: TaskStatus) -> Color {
  match status {
    TaskStatus::ToDo => Color::Blue,
    TaskStatus::WorkInProgress => Color::Green,
    TaskStatus::UnderReview => Color::Yellow,
    TaskStatus::Completed => Color::Gray,
  }
}

/// Display color for a task priority
pub fn priority_color(priority: Priority) -> Color {
  match priority {
    Priority::Urgent => Color::Red,
    Priority::High => Color::Yellow,
    Priority::Medium => Color::Green,
    Priority::Low => Color::Blue,
  }
}
