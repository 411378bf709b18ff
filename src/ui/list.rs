use crate::host::record::display_value;
use crate::host::ListWidgetView;
use crate::overlay::{DisplayRow, Overlay, OverlayPhase};
use crate::ui::renderfns::{phase_color, truncate};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

const CELL_WIDTH: usize = 40;

/// Draw an embedded list, with its overlay bar when one is attached
pub fn draw_list(
  frame: &mut Frame,
  area: Rect,
  view: &ListWidgetView,
  overlay: Option<&Overlay>,
  table_state: &mut TableState,
  focused: bool,
) {
  let phase = overlay.map(|o| o.phase()).unwrap_or(OverlayPhase::Detached);
  let shown = overlay.map(|o| o.visible().len()).unwrap_or(view.rows.len());

  let title = if shown == view.rows.len() {
    format!(" {} [{}] ({}) ", view.label, view.kind.label(), view.rows.len())
  } else {
    format!(
      " {} [{}] ({}/{}) ",
      view.label,
      view.kind.label(),
      shown,
      view.rows.len()
    )
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(phase_color(phase, focused)));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  if inner.height == 0 {
    return;
  }

  let table_area = match overlay {
    Some(overlay) => {
      let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
      draw_overlay_bar(frame, chunks[0], overlay);
      chunks[1]
    }
    None => inner,
  };

  draw_table(frame, table_area, view, overlay, table_state);

  if let Some(overlay) = overlay {
    overlay
      .filter_menu()
      .render_overlay(frame, area, &overlay.filter_menu_items());
    overlay
      .group_menu()
      .render_overlay(frame, area, &overlay.group_menu_items());
  }
}

/// Search box on the left, filter and group-by buttons on the right
fn draw_overlay_bar(frame: &mut Frame, area: Rect, overlay: &Overlay) {
  let chunks = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(20), Constraint::Length(48)])
    .split(area);

  overlay.search_input().render(frame, chunks[0]);

  let filter_labels: Vec<String> = overlay
    .filters()
    .items()
    .filter(|(_, on)| *on)
    .map(|(label, _)| label.to_string())
    .collect();

  let button = |key: &'static str, label: String, on: bool| {
    let style = if on {
      Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
      Style::default().fg(Color::Gray)
    };
    vec![
      Span::styled(format!("<{}>", key), Style::default().fg(Color::Cyan)),
      Span::styled(format!(" {} ", label), style),
    ]
  };

  let mut spans = Vec::new();
  let filters_label = if filter_labels.is_empty() {
    "Filters".to_string()
  } else {
    truncate(&filter_labels.join(" & "), 18)
  };
  spans.extend(button("f", filters_label, !filter_labels.is_empty()));
  spans.push(Span::raw(" "));
  let group_label = overlay
    .group_by_label()
    .map(|l| truncate(l, 18))
    .unwrap_or_else(|| "Group By".to_string());
  spans.extend(button("g", group_label, overlay.group_by_label().is_some()));

  frame.render_widget(
    Paragraph::new(Line::from(spans)).alignment(Alignment::Right),
    chunks[1],
  );
}

fn draw_table(
  frame: &mut Frame,
  area: Rect,
  view: &ListWidgetView,
  overlay: Option<&Overlay>,
  table_state: &mut TableState,
) {
  let display: Vec<DisplayRow> = match overlay {
    Some(overlay) => overlay.display_rows(),
    None => (0..view.rows.len()).map(DisplayRow::Record).collect(),
  };

  if display.is_empty() {
    let content = if view.rows.is_empty() {
      "No records."
    } else {
      "No records match the search."
    };
    frame.render_widget(
      Paragraph::new(content).style(Style::default().fg(Color::DarkGray)),
      area,
    );
    return;
  }

  let header = Row::new(
    view
      .columns
      .iter()
      .map(|c| Cell::from(view.column_label(c).to_string())),
  )
  .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let rows: Vec<Row> = display
    .iter()
    .map(|row| match row {
      DisplayRow::Group(idx) => group_row(overlay, *idx),
      DisplayRow::Record(idx) => record_row(view, *idx),
    })
    .collect();

  let widths = vec![Constraint::Fill(1); view.columns.len().max(1)];
  let table = Table::new(rows, widths)
    .header(header)
    .row_highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  frame.render_stateful_widget(table, area, table_state);
}

fn group_row(overlay: Option<&Overlay>, idx: usize) -> Row<'static> {
  let Some(group) = overlay.and_then(|o| o.groups().get(idx)) else {
    return Row::new(Vec::<Cell>::new());
  };
  let caret = if group.folded { "▸" } else { "▾" };
  Row::new(vec![Cell::from(format!(
    "{} {} ({})",
    caret,
    group.key.display,
    group.rows.len()
  ))])
  .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
}

fn record_row(view: &ListWidgetView, idx: usize) -> Row<'static> {
  let Some(record) = view.rows.get(idx) else {
    return Row::new(Vec::<Cell>::new());
  };
  Row::new(view.columns.iter().map(|c| {
    let text = display_value(view.field_def(c), record.get(c));
    Cell::from(truncate(&text, CELL_WIDTH))
  }))
}
