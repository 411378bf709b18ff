pub mod components;
mod list;
pub mod renderfns;

use crate::host::record::display_value;
use crate::host::{FormView, ViewId};
use crate::overlay::OverlayManager;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, TableState};
use std::collections::BTreeMap;

/// Everything a frame is drawn from
pub struct Screen<'a> {
  pub form: &'a FormView,
  pub overlays: &'a OverlayManager,
  pub tables: &'a mut BTreeMap<ViewId, TableState>,
  pub focus: usize,
  pub status: Option<&'a str>,
}

/// Main draw function
pub fn draw(frame: &mut Frame, screen: Screen) {
  let form = screen.form;
  let scalar_fields: Vec<(&str, String)> = form
    .record
    .data
    .iter()
    .filter(|(name, _)| !form.widgets.iter().any(|w| &w.field == *name))
    .map(|(name, value)| {
      let def = form.fields.get(name);
      let label = def.map(|d| d.label(name)).unwrap_or(name.as_str());
      (label, display_value(def, value))
    })
    .collect();

  let fields_height = (scalar_fields.len() as u16 + 2).min(8);
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1),             // Header
      Constraint::Length(fields_height), // Parent record
      Constraint::Min(3),                // Embedded lists
      Constraint::Length(1),             // Status bar
    ])
    .split(frame.area());

  let record_name = form.record.get("name").to_string();
  let record_label = if record_name.is_empty() {
    format!("#{}", form.record.id)
  } else {
    record_name
  };
  renderfns::draw_header(frame, chunks[0], &form.model, &record_label);

  draw_record_fields(frame, chunks[1], &scalar_fields);
  draw_lists(frame, chunks[2], screen.form, screen.overlays, screen.tables, screen.focus);
  draw_status_bar(frame, chunks[3], &screen);
}

fn draw_record_fields(frame: &mut Frame, area: Rect, fields: &[(&str, String)]) {
  let width = fields.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
  let lines: Vec<Line> = fields
    .iter()
    .map(|(label, value)| {
      Line::from(vec![
        Span::styled(
          format!("{:<width$}  ", label, width = width),
          Style::default().fg(Color::DarkGray),
        ),
        Span::raw(value.clone()),
      ])
    })
    .collect();

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_lists(
  frame: &mut Frame,
  area: Rect,
  form: &FormView,
  overlays: &OverlayManager,
  tables: &mut BTreeMap<ViewId, TableState>,
  focus: usize,
) {
  if form.widgets.is_empty() {
    frame.render_widget(
      Paragraph::new("This form has no embedded lists.").style(Style::default().fg(Color::DarkGray)),
      area,
    );
    return;
  }

  let constraints = vec![Constraint::Fill(1); form.widgets.len()];
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints(constraints)
    .split(area);

  for (idx, (view, chunk)) in form.widgets.iter().zip(chunks.iter()).enumerate() {
    let table_state = tables.entry(view.id).or_default();
    list::draw_list(
      frame,
      *chunk,
      view,
      overlays.get(view.id),
      table_state,
      idx == focus,
    );
  }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, screen: &Screen) {
  let focused = screen
    .form
    .widgets
    .get(screen.focus)
    .and_then(|v| screen.overlays.get(v.id));

  let (content, style) = match (screen.status, focused) {
    (Some(msg), _) => (format!(" {}", msg), Style::default().fg(Color::Yellow)),
    (None, Some(o)) if o.search_input().is_active() => (
      " type to filter  Enter:apply  Esc:clear".to_string(),
      Style::default().fg(Color::Cyan),
    ),
    (None, Some(o)) if o.filter_menu().is_active() || o.group_menu().is_active() => (
      " j/k:nav  Enter:choose  Esc:close".to_string(),
      Style::default().fg(Color::Cyan),
    ),
    _ => (
      " j/k:nav  Enter:fold  x:clear  o:overlay  r:reload  Ctrl-C:quit".to_string(),
      Style::default().fg(Color::DarkGray),
    ),
  };

  frame.render_widget(Paragraph::new(content).style(style), area);
}
