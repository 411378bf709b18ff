use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Search text changed (emitted on each edit)
  Changed(String),
  /// Search submitted (input deactivated, filter persists)
  Submitted(String),
  /// Search cancelled (input deactivated and emptied)
  Cancelled,
}

/// Search box of a list overlay.
///
/// Unlike a popup search, the text stays on screen after submitting so the
/// user can see what the list is filtered by.
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn query(&self) -> &str {
    self.input.value()
  }

  /// Focus the input, keeping the current text for refinement
  pub fn activate(&mut self) {
    self.active = true;
  }

  /// Empty the displayed text and leave input mode
  pub fn clear(&mut self) {
    self.active = false;
    self.input.clear();
  }

  /// Replace the displayed text
  pub fn set_query(&mut self, text: &str) {
    self.input.set_value(text);
  }

  /// Handle a key event; call this regardless of active state, `/` activates
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(text) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted(text))
      }
      InputResult::Cancelled => {
        self.clear();
        KeyResult::Event(SearchEvent::Cancelled)
      }
      InputResult::Changed => KeyResult::Event(SearchEvent::Changed(self.input.value().to_string())),
      InputResult::Consumed => KeyResult::Handled,
      // Swallow everything else while typing
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the search box on one line
  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let accent = if self.active {
      Color::Yellow
    } else {
      Color::DarkGray
    };

    let mut spans = vec![Span::styled("/ ", Style::default().fg(accent))];
    if self.input.is_empty() && !self.active {
      spans.push(Span::styled(
        "Search...",
        Style::default().fg(Color::DarkGray),
      ));
    } else {
      spans.push(Span::raw(self.input.value()));
    }
    if self.active {
      spans.push(Span::styled("_", Style::default().fg(Color::Yellow))); // Cursor
    }
    if !self.input.is_empty() {
      spans.push(Span::styled(" ✕", Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_inactive_ignores_typing() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('a'))), KeyResult::NotHandled);
    assert_eq!(search.handle_key(key(KeyCode::Char('/'))), KeyResult::Handled);
    assert!(search.is_active());
  }

  #[test]
  fn test_changed_then_submitted_keeps_text() {
    let mut search = SearchInput::new();
    search.activate();
    assert_eq!(
      search.handle_key(key(KeyCode::Char('a'))),
      KeyResult::Event(SearchEvent::Changed("a".to_string()))
    );
    assert_eq!(
      search.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(SearchEvent::Submitted("a".to_string()))
    );
    assert!(!search.is_active());
    assert_eq!(search.query(), "a");

    // Reactivating keeps the text
    search.handle_key(key(KeyCode::Char('/')));
    assert_eq!(search.query(), "a");
  }

  #[test]
  fn test_cancel_clears() {
    let mut search = SearchInput::new();
    search.activate();
    search.handle_key(key(KeyCode::Char('z')));
    assert_eq!(
      search.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(SearchEvent::Cancelled)
    );
    assert_eq!(search.query(), "");
    assert!(!search.is_active());
  }
}
