use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with app name, record context and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, model: &str, record: &str) {
  let header = Line::from(vec![
    Span::styled(" x2m ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", model), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", record),
      Style::default().fg(Color::Yellow).bold(),
    ),
    Span::raw("  "),
    // Shortcuts - keys highlighted, descriptions dimmed
    Span::styled("</>", Style::default().fg(Color::Cyan)),
    Span::styled(" search", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<f>", Style::default().fg(Color::Cyan)),
    Span::styled(" filters", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<g>", Style::default().fg(Color::Cyan)),
    Span::styled(" group by", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<tab>", Style::default().fg(Color::Cyan)),
    Span::styled(" next list", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<q>", Style::default().fg(Color::Cyan)),
    Span::styled(" quit", Style::default().fg(Color::DarkGray)),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}
