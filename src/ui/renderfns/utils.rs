use crate::overlay::OverlayPhase;
use ratatui::prelude::Color;

/// Truncate a string to a maximum number of chars, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Border color of a list block for its overlay phase
pub fn phase_color(phase: OverlayPhase, focused: bool) -> Color {
  match (phase, focused) {
    (_, false) => Color::DarkGray,
    (OverlayPhase::Detached, true) => Color::White,
    (OverlayPhase::Attached, true) => Color::Blue,
    (OverlayPhase::Filtered, true) => Color::Yellow,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("crème brûlée", 8), "crème...");
  }

  #[test]
  fn test_phase_color() {
    assert_eq!(phase_color(OverlayPhase::Filtered, true), Color::Yellow);
    assert_eq!(phase_color(OverlayPhase::Filtered, false), Color::DarkGray);
    assert_eq!(phase_color(OverlayPhase::Detached, true), Color::White);
  }
}
