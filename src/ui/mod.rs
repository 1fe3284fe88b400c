pub mod components;
pub mod renderfns;
pub mod theme;
pub mod view;
pub mod views;

use ratatui::widgets::ListState;

/// Clamp a list selection to the current item count. Lists shrink when a
/// refetch lands, so the selection is revalidated on every render.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    None => state.select(Some(0)),
    Some(i) if i >= len => state.select(Some(len - 1)),
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_selection_clamps_to_shrunk_list() {
    let mut state = ListState::default();
    state.select(Some(5));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));
  }

  #[test]
  fn test_selection_cleared_on_empty_list() {
    let mut state = ListState::default();
    state.select(Some(0));
    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }

  #[test]
  fn test_unselected_list_defaults_to_first() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 4);
    assert_eq!(state.selected(), Some(0));
  }
}
