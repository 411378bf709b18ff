use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// One row of a menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
  pub label: String,
  pub checked: bool,
}

impl MenuItem {
  pub fn new(label: &str, checked: bool) -> Self {
    Self {
      label: label.to_string(),
      checked,
    }
  }
}

/// Events emitted by a menu that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
  /// Item at index chosen
  Chosen(usize),
  /// Menu closed without a choice
  Closed,
}

/// Popup menu over a list of items owned by the parent.
///
/// A multi-select menu stays open after a choice so several items can be
/// toggled in a row.
#[derive(Debug, Clone)]
pub struct Menu {
  title: &'static str,
  multi: bool,
  active: bool,
  selected: usize,
}

impl Menu {
  pub fn new(title: &'static str, multi: bool) -> Self {
    Self {
      title,
      multi,
      active: false,
      selected: 0,
    }
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn show(&mut self) {
    self.active = true;
    self.selected = 0;
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.selected = 0;
  }

  /// Handle a key event for a menu with `len` items
  pub fn handle_key(&mut self, key: KeyEvent, len: usize) -> KeyResult<MenuEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(MenuEvent::Closed)
      }
      KeyCode::Enter | KeyCode::Char(' ') => {
        if self.selected >= len {
          self.hide();
          return KeyResult::Event(MenuEvent::Closed);
        }
        let chosen = self.selected;
        if !self.multi {
          self.hide();
        }
        KeyResult::Event(MenuEvent::Chosen(chosen))
      }
      KeyCode::Char('j') | KeyCode::Down => {
        if len > 0 {
          self.selected = (self.selected + 1) % len;
        }
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if len > 0 {
          self.selected = if self.selected == 0 {
            len - 1
          } else {
            self.selected - 1
          };
        }
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the menu as a popup centered in `area`
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect, items: &[MenuItem]) {
    if !self.active || area.width < 8 || area.height < 3 {
      return;
    }

    let max_label = items.iter().map(|i| i.label.chars().count()).max().unwrap_or(10);
    let width = (max_label as u16 + 8)
      .max(self.title.len() as u16 + 4)
      .min(area.width);
    let height = (items.len() as u16 + 2).min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let list_items: Vec<ListItem> = items
      .iter()
      .map(|item| {
        let mark = if item.checked { "● " } else { "  " };
        ListItem::new(Line::from(vec![
          Span::styled(mark, Style::default().fg(Color::Green)),
          Span::styled(item.label.clone(), Style::default().fg(Color::Cyan)),
        ]))
      })
      .collect();

    let list = List::new(list_items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, overlay_area, &mut state);
  }
}
