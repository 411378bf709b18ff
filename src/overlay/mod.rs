//! Live search, filter and group-by for relational lists embedded in forms.
//!
//! An [`OverlayManager`] listens to the form's widget lifecycle and attaches
//! one [`Overlay`] to every one2many/many2many list. Overlays only read the
//! rows of their list; all they own is which rows are shown and how.

mod debounce;
mod error;
mod group;
mod matcher;
mod predicate;
mod state;

pub use debounce::Debouncer;
pub use error::OverlayError;
pub use group::{group_bys_for, group_rows, Group, GroupKeyFn};
pub use matcher::SearchColumns;
pub use predicate::FilterRegistry;
pub use state::FilterState;

use crate::host::{ListWidgetView, ViewId, ViewLifecycle};
use crate::ui::components::{KeyResult, Menu, MenuEvent, MenuItem, SearchEvent, SearchInput};
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Where a list is in the overlay lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
  /// No overlay; the list shows all rows the host's way
  Detached,
  /// Overlay attached, every row visible
  Attached,
  /// Search text or filters narrow the rows
  Filtered,
}

/// Events emitted by an overlay that the parent needs to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
  /// The set of visible rows changed
  VisibleChanged,
  /// Grouping or folding changed the displayed rows
  DisplayChanged,
}

/// A line of the rendered list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRow {
  /// Header of the group at this index
  Group(usize),
  /// Row at this index of the list
  Record(usize),
}

/// Overlay behavior shared by all lists
#[derive(Debug, Clone)]
pub struct SearchSettings {
  /// Quiet time before typed text is applied
  pub debounce: Duration,
  pub columns: SearchColumns,
}

impl Default for SearchSettings {
  fn default() -> Self {
    Self {
      debounce: Duration::from_millis(150),
      columns: SearchColumns::default(),
    }
  }
}

/// Search bar, filters and grouping attached to one list
pub struct Overlay {
  view: ViewId,
  columns: Vec<String>,
  state: FilterState,
  search: SearchInput,
  debounce: Debouncer,
  filters: FilterRegistry,
  filter_menu: Menu,
  group_bys: Vec<Box<dyn GroupKeyFn>>,
  group_by: Option<usize>,
  group_menu: Menu,
  groups: Vec<Group>,
}

impl Overlay {
  pub fn new(view: &ListWidgetView, settings: &SearchSettings) -> Self {
    Self {
      view: view.id,
      columns: settings.columns.resolve(view),
      state: FilterState::new(view),
      search: SearchInput::new(),
      debounce: Debouncer::new(settings.debounce),
      filters: FilterRegistry::from_view(view),
      filter_menu: Menu::new("Filters", true),
      group_bys: group_bys_for(view),
      group_by: None,
      group_menu: Menu::new("Group By", false),
      groups: Vec::new(),
    }
  }

  /// Fields the search text is matched against
  pub fn search_columns(&self) -> &[String] {
    &self.columns
  }

  pub fn visible(&self) -> &[usize] {
    self.state.visible()
  }

  pub fn search_input(&self) -> &SearchInput {
    &self.search
  }

  pub fn filters(&self) -> &FilterRegistry {
    &self.filters
  }

  pub fn groups(&self) -> &[Group] {
    &self.groups
  }

  pub fn phase(&self) -> OverlayPhase {
    if self.state.search_text().is_empty() && !self.filters.has_active() {
      OverlayPhase::Attached
    } else {
      OverlayPhase::Filtered
    }
  }

  /// Label of the active group-by, if any
  pub fn group_by_label(&self) -> Option<&str> {
    self
      .group_by
      .and_then(|idx| self.group_bys.get(idx))
      .map(|g| g.label())
  }

  /// Whether the overlay is taking all keystrokes (typing or a menu open)
  pub fn is_capturing_input(&self) -> bool {
    self.search.is_active() || self.filter_menu.is_active() || self.group_menu.is_active()
  }

  /// Apply `text` as the search text. Returns whether visible rows changed.
  pub fn set_search_text(&mut self, view: &ListWidgetView, text: &str) -> bool {
    self.debounce.cancel();
    if self.search.query() != text {
      self.search.set_query(text);
    }
    self.refresh(view, text)
  }

  /// Reset the search text and the search box
  pub fn clear(&mut self, view: &ListWidgetView) -> bool {
    self.debounce.cancel();
    self.search.clear();
    self.refresh(view, "")
  }

  /// Flip a filter; returns whether visible rows changed
  pub fn toggle_filter(&mut self, view: &ListWidgetView, idx: usize) -> bool {
    if self.filters.toggle(idx).is_none() {
      return false;
    }
    let text = self.state.search_text().to_string();
    self.refresh(view, &text)
  }

  /// Select a group-by option, or `None` for a flat list
  pub fn set_group_by(&mut self, view: &ListWidgetView, idx: Option<usize>) {
    self.group_by = idx.filter(|i| *i < self.group_bys.len());
    self.groups.clear();
    self.regroup(view);
  }

  /// Fold or unfold a group
  pub fn toggle_group(&mut self, idx: usize) -> bool {
    match self.groups.get_mut(idx) {
      Some(group) => {
        group.folded = !group.folded;
        true
      }
      None => false,
    }
  }

  /// Rows as displayed: group headers with their unfolded rows, or the flat
  /// visible rows when ungrouped
  pub fn display_rows(&self) -> Vec<DisplayRow> {
    if self.group_by.is_none() {
      return self.visible().iter().map(|&i| DisplayRow::Record(i)).collect();
    }
    let mut rows = Vec::new();
    for (idx, group) in self.groups.iter().enumerate() {
      rows.push(DisplayRow::Group(idx));
      if !group.folded {
        rows.extend(group.rows.iter().map(|&i| DisplayRow::Record(i)));
      }
    }
    rows
  }

  pub fn filter_menu_items(&self) -> Vec<MenuItem> {
    self
      .filters
      .items()
      .map(|(label, active)| MenuItem::new(label, active))
      .collect()
  }

  pub fn group_menu_items(&self) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::new("None", self.group_by.is_none())];
    items.extend(
      self
        .group_bys
        .iter()
        .enumerate()
        .map(|(idx, g)| MenuItem::new(g.label(), self.group_by == Some(idx))),
    );
    items
  }

  pub fn filter_menu(&self) -> &Menu {
    &self.filter_menu
  }

  pub fn group_menu(&self) -> &Menu {
    &self.group_menu
  }

  /// Apply debounced search text whose quiet period has elapsed
  pub fn poll(&mut self, view: &ListWidgetView, now: Instant) -> bool {
    match self.debounce.poll(now) {
      Some(text) => self.refresh(view, &text),
      None => false,
    }
  }

  /// Handle a key event aimed at this list
  pub fn handle_key(
    &mut self,
    view: &ListWidgetView,
    key: KeyEvent,
    now: Instant,
  ) -> KeyResult<OverlayEvent> {
    if self.filter_menu.is_active() {
      return match self.filter_menu.handle_key(key, self.filters.len()) {
        KeyResult::Event(MenuEvent::Chosen(idx)) => {
          self.toggle_filter(view, idx);
          KeyResult::Event(OverlayEvent::VisibleChanged)
        }
        KeyResult::Event(MenuEvent::Closed) => KeyResult::Handled,
        other => map_plain(other),
      };
    }

    if self.group_menu.is_active() {
      return match self.group_menu.handle_key(key, self.group_bys.len() + 1) {
        KeyResult::Event(MenuEvent::Chosen(0)) => {
          self.set_group_by(view, None);
          KeyResult::Event(OverlayEvent::DisplayChanged)
        }
        KeyResult::Event(MenuEvent::Chosen(idx)) => {
          self.set_group_by(view, Some(idx - 1));
          KeyResult::Event(OverlayEvent::DisplayChanged)
        }
        KeyResult::Event(MenuEvent::Closed) => KeyResult::Handled,
        other => map_plain(other),
      };
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(text)) => {
        return match self.debounce.schedule(text, now) {
          Some(text) => visible_event(self.refresh(view, &text)),
          None => KeyResult::Handled,
        };
      }
      KeyResult::Event(SearchEvent::Submitted(text)) => {
        self.debounce.cancel();
        return visible_event(self.refresh(view, &text));
      }
      KeyResult::Event(SearchEvent::Cancelled) => return visible_event(self.clear(view)),
      KeyResult::Handled => return KeyResult::Handled,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('f') if !self.filters.is_empty() => {
        self.filter_menu.show();
        KeyResult::Handled
      }
      KeyCode::Char('g') if !self.group_bys.is_empty() => {
        self.group_menu.show();
        KeyResult::Handled
      }
      KeyCode::Char('x') => visible_event(self.clear(view)),
      _ => KeyResult::NotHandled,
    }
  }

  fn refresh(&mut self, view: &ListWidgetView, text: &str) -> bool {
    let changed = self.state.recompute(view, text, &self.columns, &self.filters);
    trace!(
      view = %self.view,
      text,
      visible = self.state.visible().len(),
      "search recomputed"
    );
    self.regroup(view);
    changed
  }

  fn regroup(&mut self, view: &ListWidgetView) {
    let Some(group_by) = self.group_by.and_then(|idx| self.group_bys.get(idx)) else {
      self.groups.clear();
      return;
    };

    let open: BTreeSet<Option<String>> = self
      .groups
      .iter()
      .filter(|g| !g.folded)
      .map(|g| g.key.value.clone())
      .collect();

    let mut groups = group_rows(view, self.state.visible(), &**group_by);
    for group in &mut groups {
      group.folded = !open.contains(&group.key.value);
    }
    self.groups = groups;
  }
}

fn visible_event(changed: bool) -> KeyResult<OverlayEvent> {
  if changed {
    KeyResult::Event(OverlayEvent::VisibleChanged)
  } else {
    KeyResult::Handled
  }
}

fn map_plain<T>(result: KeyResult<MenuEvent>) -> KeyResult<T> {
  match result {
    KeyResult::NotHandled => KeyResult::NotHandled,
    _ => KeyResult::Handled,
  }
}

/// Attaches overlays to relational lists as the form mounts them.
///
/// Every entry point is infallible from the caller's side: operations on
/// unsupported or detached lists are logged and skipped.
#[derive(Default)]
pub struct OverlayManager {
  settings: SearchSettings,
  overlays: BTreeMap<ViewId, Overlay>,
}

impl OverlayManager {
  pub fn new(settings: SearchSettings) -> Self {
    Self {
      settings,
      overlays: BTreeMap::new(),
    }
  }

  /// Attach an overlay to a one2many/many2many list; returns whether one is
  /// attached afterwards
  pub fn attach(&mut self, view: &ListWidgetView) -> bool {
    match self.try_attach(view) {
      Ok(()) => true,
      Err(e) => {
        debug!(error = %e, "overlay not attached");
        false
      }
    }
  }

  pub fn try_attach(&mut self, view: &ListWidgetView) -> Result<(), OverlayError> {
    if !view.kind.is_relational_list() {
      return Err(OverlayError::UnsupportedViewType {
        view: view.id,
        kind: view.kind,
      });
    }
    if self.overlays.contains_key(&view.id) {
      trace!(view = %view.id, "overlay already attached");
      return Ok(());
    }

    let overlay = Overlay::new(view, &self.settings);
    debug!(
      view = %view.id,
      field = %view.field,
      kind = view.kind.label(),
      rows = view.rows.len(),
      columns = ?overlay.search_columns(),
      "overlay attached"
    );
    self.overlays.insert(view.id, overlay);
    Ok(())
  }

  pub fn set_search_text(&mut self, view: &ListWidgetView, text: &str) {
    if let Err(e) = self.with_overlay(view.id, |o| o.set_search_text(view, text)) {
      trace!(error = %e, "search skipped");
    }
  }

  pub fn clear(&mut self, view: &ListWidgetView) {
    if let Err(e) = self.with_overlay(view.id, |o| o.clear(view)) {
      trace!(error = %e, "clear skipped");
    }
  }

  pub fn detach(&mut self, view: &ListWidgetView) {
    if self.overlays.remove(&view.id).is_some() {
      debug!(view = %view.id, "overlay detached");
    } else {
      let e = OverlayError::DetachedOperation { view: view.id };
      trace!(error = %e, "detach skipped");
    }
  }

  pub fn is_attached(&self, view: ViewId) -> bool {
    self.overlays.contains_key(&view)
  }

  pub fn get(&self, view: ViewId) -> Option<&Overlay> {
    self.overlays.get(&view)
  }

  pub fn get_mut(&mut self, view: ViewId) -> Option<&mut Overlay> {
    self.overlays.get_mut(&view)
  }

  /// Visible rows of a list, `None` when no overlay is attached
  pub fn visible(&self, view: ViewId) -> Option<&[usize]> {
    self.overlays.get(&view).map(|o| o.visible())
  }

  pub fn phase(&self, view: ViewId) -> OverlayPhase {
    self
      .overlays
      .get(&view)
      .map(|o| o.phase())
      .unwrap_or(OverlayPhase::Detached)
  }

  /// Route a key to the overlay of `view`
  pub fn handle_key(
    &mut self,
    view: &ListWidgetView,
    key: KeyEvent,
    now: Instant,
  ) -> KeyResult<OverlayEvent> {
    match self.overlays.get_mut(&view.id) {
      Some(overlay) => overlay.handle_key(view, key, now),
      None => KeyResult::NotHandled,
    }
  }

  /// Apply due debounced searches; returns whether any list changed
  pub fn tick<'a>(&mut self, views: impl IntoIterator<Item = &'a ListWidgetView>, now: Instant) -> bool {
    let mut changed = false;
    for view in views {
      if let Some(overlay) = self.overlays.get_mut(&view.id) {
        changed |= overlay.poll(view, now);
      }
    }
    changed
  }

  fn with_overlay<T>(
    &mut self,
    view: ViewId,
    f: impl FnOnce(&mut Overlay) -> T,
  ) -> Result<T, OverlayError> {
    self
      .overlays
      .get_mut(&view)
      .map(f)
      .ok_or(OverlayError::DetachedOperation { view })
  }
}

impl ViewLifecycle for OverlayManager {
  fn on_mounted(&mut self, view: &ListWidgetView) {
    self.attach(view);
  }

  fn on_unmounted(&mut self, view: &ListWidgetView) {
    self.detach(view);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::host::form::tests::ORDER_FORM;
  use crate::host::{FormView, ViewKind};
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn immediate() -> OverlayManager {
    OverlayManager::new(SearchSettings {
      debounce: Duration::ZERO,
      ..SearchSettings::default()
    })
  }

  fn names(form: &FormView, manager: &OverlayManager) -> Vec<String> {
    let view = &form.widgets[0];
    manager
      .visible(view.id)
      .unwrap_or_default()
      .iter()
      .map(|&i| view.rows[i].get("name").to_string())
      .collect()
  }

  #[test]
  fn test_attach_only_relational_lists() {
    let mut form = FormView::from_yaml(ORDER_FORM).unwrap();
    let mut manager = immediate();
    form.mount(&mut manager);

    let (lines, tags) = (&form.widgets[0], &form.widgets[1]);
    assert!(manager.is_attached(lines.id));
    assert!(!manager.is_attached(tags.id));
    assert_eq!(manager.phase(tags.id), OverlayPhase::Detached);
    assert_eq!(
      manager.try_attach(tags),
      Err(OverlayError::UnsupportedViewType {
        view: tags.id,
        kind: ViewKind::Other
      })
    );

    // Operations on the unattached widget are silent no-ops
    manager.set_search_text(tags, "x");
    manager.clear(tags);
    manager.detach(tags);
    assert_eq!(manager.visible(tags.id), None);
  }

  #[test]
  fn test_search_scenario_ap() {
    let mut form = FormView::from_yaml(ORDER_FORM).unwrap();
    let mut manager = immediate();
    form.mount(&mut manager);
    let view = &form.widgets[0];

    assert_eq!(manager.phase(view.id), OverlayPhase::Attached);
    manager.set_search_text(view, "ap");
    assert_eq!(names(&form, &manager), vec!["Apple", "apricot"]);
    assert_eq!(manager.phase(view.id), OverlayPhase::Filtered);
  }

  #[test]
  fn test_no_match_then_clear_restores_all() {
    let mut form = FormView::from_yaml(ORDER_FORM).unwrap();
    let mut manager = immediate();
    form.mount(&mut manager);
    let view = &form.widgets[0];

    manager.set_search_text(view, "xyz");
    assert_eq!(manager.visible(view.id), Some(&[][..]));

    manager.clear(view);
    assert_eq!(names(&form, &manager), vec!["Apple", "Banana", "apricot"]);
    assert_eq!(manager.phase(view.id), OverlayPhase::Attached);
    assert_eq!(manager.get(view.id).unwrap().search_input().query(), "");
  }

  #[test]
  fn test_empty_search_equals_clear() {
    let mut form = FormView::from_yaml(ORDER_FORM).unwrap();
    let mut manager = immediate();
    form.mount(&mut manager);
    let view = &form.widgets[0];

    manager.set_search_text(view, "ban");
    manager.set_search_text(view, "");
    let via_empty = manager.visible(view.id).map(|v| v.to_vec());
    manager.set_search_text(view, "ban");
    manager.clear(view);
    assert_eq!(manager.visible(view.id).map(|v| v.to_vec()), via_empty);
    assert_eq!(via_empty, Some(vec![0, 1, 2]));
  }

  #[test]
  fn test_detach_leaves_rows_untouched() {
    let mut form = FormView::from_yaml(ORDER_FORM).unwrap();
    let mut manager = immediate();
    form.mount(&mut manager);
    let before = form.widgets[0].rows.clone();

    manager.set_search_text(&form.widgets[0], "ban");
    form.unmount(&mut manager);

    assert!(!manager.is_attached(form.widgets[0].id));
    assert_eq!(form.widgets[0].rows, before);

    // Re-attaching starts from a fresh state
    form.mount(&mut manager);
    assert_eq!(manager.visible(form.widgets[0].id), Some(&[0, 1, 2][..]));
  }

  #[test]
  fn test_typing_is_debounced() {
    let mut form = FormView::from_yaml(ORDER_FORM).unwrap();
    let mut manager = OverlayManager::default();
    form.mount(&mut manager);
    let view = &form.widgets[0];
    let t0 = Instant::now();

    manager.handle_key(view, key(KeyCode::Char('/')), t0);
    manager.handle_key(view, key(KeyCode::Char('b')), t0);
    assert_eq!(manager.visible(view.id).map(|v| v.len()), Some(3));
    assert!(!manager.tick(&form.widgets, t0 + Duration::from_millis(50)));
    assert!(manager.tick(&form.widgets, t0 + Duration::from_millis(200)));
    assert_eq!(names(&form, &manager), vec!["Banana"]);
  }

  #[test]
  fn test_submit_applies_immediately_and_escape_clears() {
    let mut form = FormView::from_yaml(ORDER_FORM).unwrap();
    let mut manager = OverlayManager::default();
    form.mount(&mut manager);
    let view = &form.widgets[0];
    let now = Instant::now();

    for code in [KeyCode::Char('/'), KeyCode::Char('A'), KeyCode::Char('P')] {
      manager.handle_key(view, key(code), now);
    }
    assert_eq!(
      manager.handle_key(view, key(KeyCode::Enter), now),
      KeyResult::Event(OverlayEvent::VisibleChanged)
    );
    assert_eq!(names(&form, &manager), vec!["Apple", "apricot"]);

    manager.handle_key(view, key(KeyCode::Char('/')), now);
    manager.handle_key(view, key(KeyCode::Esc), now);
    assert_eq!(manager.visible(view.id).map(|v| v.len()), Some(3));
    assert_eq!(manager.phase(view.id), OverlayPhase::Attached);
  }

  #[test]
  fn test_filter_menu_combines_with_search() {
    let mut form = FormView::from_yaml(ORDER_FORM).unwrap();
    let mut manager = immediate();
    form.mount(&mut manager);
    let view = &form.widgets[0];
    let now = Instant::now();

    manager.handle_key(view, key(KeyCode::Char('f')), now);
    assert!(manager.get(view.id).unwrap().is_capturing_input());
    assert_eq!(
      manager.handle_key(view, key(KeyCode::Enter), now),
      KeyResult::Event(OverlayEvent::VisibleChanged)
    );
    manager.handle_key(view, key(KeyCode::Esc), now);
    assert_eq!(names(&form, &manager), vec!["Banana"]);
    assert_eq!(manager.phase(view.id), OverlayPhase::Filtered);

    manager.set_search_text(view, "ap");
    assert!(names(&form, &manager).is_empty());

    // clear resets the search text only, the filter facet stays
    manager.clear(view);
    assert_eq!(names(&form, &manager), vec!["Banana"]);
  }

  #[test]
  fn test_group_by_menu_and_folding() {
    let mut form = FormView::from_yaml(ORDER_FORM).unwrap();
    let mut manager = immediate();
    form.mount(&mut manager);
    let view = &form.widgets[0];
    let now = Instant::now();

    manager.handle_key(view, key(KeyCode::Char('g')), now);
    manager.handle_key(view, key(KeyCode::Down), now);
    assert_eq!(
      manager.handle_key(view, key(KeyCode::Enter), now),
      KeyResult::Event(OverlayEvent::DisplayChanged)
    );

    let overlay = manager.get_mut(view.id).unwrap();
    assert_eq!(overlay.group_by_label(), Some("Status"));
    assert_eq!(
      overlay.display_rows(),
      vec![DisplayRow::Group(0), DisplayRow::Group(1)]
    );

    assert!(overlay.toggle_group(0));
    assert_eq!(
      overlay.display_rows(),
      vec![
        DisplayRow::Group(0),
        DisplayRow::Record(1),
        DisplayRow::Group(1)
      ]
    );

    // Unfolded groups stay open across searches
    overlay.set_search_text(view, "a");
    assert_eq!(overlay.groups()[0].key.display, "Done");
    assert!(!overlay.groups()[0].folded);

    overlay.set_group_by(view, None);
    assert_eq!(overlay.display_rows().len(), 3);
  }
}
