use crossterm::event::KeyEvent;
use ratatui::prelude::Rect;
use ratatui::Frame;

use crate::store::Store;
use crate::ui::theme::Theme;

/// What a view wants the app to do after handling a key.
pub enum ViewAction {
  None,
  /// Push a new view onto the stack.
  Push(Box<dyn View>),
  /// Pop this view off the stack. Popping the root view quits.
  Pop,
}

/// A keyboard shortcut shown in the footer.
#[derive(Debug, Clone, Copy)]
pub struct Shortcut {
  pub key: &'static str,
  pub label: &'static str,
}

impl Shortcut {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self { key, label }
  }
}

/// A full-screen view on the navigation stack.
///
/// Views do not own their data: they subscribe to resources in `mounted`,
/// read snapshots out of the store on each render, and release their
/// subscriptions in `unmounted` so the cache can evict what nothing watches.
pub trait View {
  /// Called when the view enters the stack.
  fn mounted(&mut self, _store: &mut Store) {}

  /// Called when the view leaves the stack.
  fn unmounted(&mut self, _store: &mut Store) {}

  fn handle_key(&mut self, key: KeyEvent, store: &mut Store) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect, store: &Store, theme: &Theme);

  /// Label for the breadcrumb in the footer.
  fn breadcrumb_label(&self) -> String;

  /// Shortcuts to advertise in the footer.
  fn shortcuts(&self) -> Vec<Shortcut> {
    Vec::new()
  }
}
