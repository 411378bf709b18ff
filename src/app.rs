use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::host::assets::AssetRegistry;
use crate::host::{FormView, ListWidgetView, ViewId, ViewLifecycle, X2M_SEARCH};
use crate::overlay::{DisplayRow, OverlayEvent, OverlayManager};
use crate::ui::{self, components::KeyResult, Screen};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::TableState;
use std::collections::BTreeMap;
use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Ticks drive debounced searches, so they must be well under the debounce
const TICK_RATE: Duration = Duration::from_millis(50);

/// Listener for forms mounted without the overlay module installed
struct Unhooked;

impl ViewLifecycle for Unhooked {
  fn on_mounted(&mut self, _view: &ListWidgetView) {}
  fn on_unmounted(&mut self, _view: &ListWidgetView) {}
}

/// Main application state
pub struct App {
  /// Fixture the form was loaded from, for reloads
  form_path: Option<PathBuf>,

  form: FormView,

  overlays: OverlayManager,

  /// Whether overlays hook into the form lifecycle
  overlays_enabled: bool,

  /// Index of the focused list widget
  focus: usize,

  /// Row selection per list, over displayed rows
  tables: BTreeMap<ViewId, TableState>,

  /// One-shot message for the status bar
  status: Option<String>,

  should_quit: bool,
}

impl App {
  pub fn new(config: &Config, registry: &AssetRegistry, form: FormView) -> Self {
    let overlays_enabled = registry.is_installed(X2M_SEARCH.technical_name);
    if !overlays_enabled {
      warn!("{} not installed, lists render without overlays", X2M_SEARCH.name);
    }

    let mut app = Self {
      form_path: None,
      form,
      overlays: OverlayManager::new(config.search.settings()),
      overlays_enabled,
      focus: 0,
      tables: BTreeMap::new(),
      status: None,
      should_quit: false,
    };
    app.mount();
    app
  }

  /// Remember where the form came from so `r` can reload it
  pub fn with_form_path(mut self, path: PathBuf) -> Self {
    self.form_path = Some(path);
    self
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(TICK_RATE);

    let result = self.event_loop(&mut terminal, &mut events).await;

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(event) => self.handle_event(event, Instant::now()),
        None => break,
      }
    }
    Ok(())
  }

  pub fn draw(&mut self, frame: &mut Frame) {
    ui::draw(
      frame,
      Screen {
        form: &self.form,
        overlays: &self.overlays,
        tables: &mut self.tables,
        focus: self.focus,
        status: self.status.as_deref(),
      },
    );
  }

  fn handle_event(&mut self, event: Event, now: Instant) {
    match event {
      Event::Key(key) => self.handle_key(key, now),
      Event::Tick => {
        if self.overlays.tick(&self.form.widgets, now) {
          self.reset_selection();
        }
      }
      Event::Resize => {} // Redraw happens on the next loop
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let Some(view) = self.form.widgets.get(self.focus) else {
      if key.code == KeyCode::Char('q') {
        self.should_quit = true;
      }
      return;
    };
    let view_id = view.id;

    // A typing search box or an open menu gets every key
    let capturing = self
      .overlays
      .get(view_id)
      .is_some_and(|o| o.is_capturing_input());
    if capturing {
      let result = self.overlays.handle_key(view, key, now);
      self.apply_overlay_result(result);
      return;
    }

    self.status = None;

    match key.code {
      KeyCode::Char('q') => self.should_quit = true,
      KeyCode::Tab => self.move_focus(1),
      KeyCode::BackTab => self.move_focus(-1),
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
      KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected_group(),
      KeyCode::Char('o') => self.toggle_overlay(),
      KeyCode::Char('r') => self.reload(),
      _ => {
        let result = self.overlays.handle_key(view, key, now);
        self.apply_overlay_result(result);
      }
    }
  }

  fn apply_overlay_result(&mut self, result: KeyResult<OverlayEvent>) {
    match result {
      KeyResult::Event(OverlayEvent::VisibleChanged | OverlayEvent::DisplayChanged) => {
        self.reset_selection()
      }
      KeyResult::Handled | KeyResult::NotHandled => {}
    }
  }

  fn focused(&self) -> Option<&ListWidgetView> {
    self.form.widgets.get(self.focus)
  }

  /// Rows of the focused list as displayed
  fn display_rows(&self) -> Vec<DisplayRow> {
    let Some(view) = self.focused() else {
      return Vec::new();
    };
    match self.overlays.get(view.id) {
      Some(overlay) => overlay.display_rows(),
      None => (0..view.rows.len()).map(DisplayRow::Record).collect(),
    }
  }

  fn move_focus(&mut self, delta: i32) {
    let len = self.form.widgets.len();
    if len > 0 {
      self.focus = (self.focus as i32 + delta).rem_euclid(len as i32) as usize;
    }
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.display_rows().len();
    let Some(view_id) = self.focused().map(|v| v.id) else {
      return;
    };
    let state = self.tables.entry(view_id).or_default();
    if len == 0 {
      state.select(None);
      return;
    }
    let current = state.selected().unwrap_or(0);
    let next = (current as i32 + delta).rem_euclid(len as i32) as usize;
    state.select(Some(next));
  }

  fn reset_selection(&mut self) {
    let has_rows = !self.display_rows().is_empty();
    if let Some(view_id) = self.focused().map(|v| v.id) {
      let state = self.tables.entry(view_id).or_default();
      state.select(if has_rows { Some(0) } else { None });
      *state.offset_mut() = 0;
    }
  }

  fn selected(&self) -> Option<usize> {
    let view = self.focused()?;
    self.tables.get(&view.id).and_then(|s| s.selected())
  }

  fn toggle_selected_group(&mut self) {
    let Some(selected) = self.selected() else {
      return;
    };
    let Some(DisplayRow::Group(group)) = self.display_rows().get(selected).copied() else {
      return;
    };
    if let Some(view_id) = self.focused().map(|v| v.id) {
      if let Some(overlay) = self.overlays.get_mut(view_id) {
        overlay.toggle_group(group);
      }
    }
  }

  /// Detach the focused list's overlay, or attach one if it has none
  fn toggle_overlay(&mut self) {
    if !self.overlays_enabled {
      self.status = Some(format!("{} is not installed", X2M_SEARCH.name));
      return;
    }
    let Some(view) = self.form.widgets.get(self.focus) else {
      return;
    };
    if self.overlays.is_attached(view.id) {
      self.overlays.detach(view);
      self.status = Some(format!("Search detached from {}", view.label));
    } else if self.overlays.attach(view) {
      self.status = Some(format!("Search attached to {}", view.label));
    } else {
      self.status = Some(format!("{} is not a one2many/many2many list", view.label));
    }
    self.reset_selection();
  }

  /// Unmount the form, load it again from disk and mount the new one
  fn reload(&mut self) {
    let Some(path) = self.form_path.clone() else {
      self.status = Some("Form was not loaded from a file".to_string());
      return;
    };

    match FormView::load(&path) {
      Ok(form) => {
        self.unmount();
        self.form = form;
        self.tables.clear();
        self.focus = self.focus.min(self.form.widgets.len().saturating_sub(1));
        self.mount();
        info!(path = %path.display(), "form reloaded");
        self.status = Some(format!("Reloaded {}", path.display()));
      }
      Err(e) => {
        warn!(error = %e, "form reload failed");
        self.status = Some(e.to_string());
      }
    }
  }

  fn mount(&mut self) {
    if self.overlays_enabled {
      self.form.mount(&mut self.overlays);
    } else {
      self.form.mount(&mut Unhooked);
    }
  }

  fn unmount(&mut self) {
    if self.overlays_enabled {
      self.form.unmount(&mut self.overlays);
    } else {
      self.form.unmount(&mut Unhooked);
    }
  }
}
