//! Color palettes driven by the persisted dark-mode preference.

use ratatui::prelude::Color;

use crate::prefs::Preferences;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
  pub text: Color,
  pub dim: Color,
  pub accent: Color,
  pub border: Color,
  pub border_active: Color,
  pub selection_bg: Color,
  pub bar_bg: Color,
  pub error: Color,
}

impl Theme {
  pub fn dark() -> Self {
    Self {
      text: Color::White,
      dim: Color::DarkGray,
      accent: Color::Cyan,
      border: Color::Blue,
      border_active: Color::Yellow,
      selection_bg: Color::DarkGray,
      bar_bg: Color::Black,
      error: Color::Red,
    }
  }

  pub fn light() -> Self {
    Self {
      text: Color::Black,
      dim: Color::Gray,
      accent: Color::Blue,
      border: Color::Blue,
      border_active: Color::Magenta,
      selection_bg: Color::Gray,
      bar_bg: Color::White,
      error: Color::Red,
    }
  }

  pub fn from_prefs(prefs: &Preferences) -> Self {
    if prefs.is_dark_mode {
      Self::dark()
    } else {
      Self::light()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_theme_follows_preference() {
    let dark = Theme::from_prefs(&Preferences {
      is_dark_mode: true,
      is_sidebar_collapsed: false,
    });
    assert_eq!(dark.text, Color::White);

    let light = Theme::from_prefs(&Preferences::default());
    assert_eq!(light.text, Color::Black);
  }
}
