use super::matcher::row_matches;
use super::predicate::FilterRegistry;
use crate::host::ListWidgetView;

/// Transient filter state of one overlay: the search text and the rows it
/// leaves visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
  search_text: String,
  visible: Vec<usize>,
}

impl FilterState {
  /// Fresh state with every row visible
  pub fn new(view: &ListWidgetView) -> Self {
    Self {
      search_text: String::new(),
      visible: (0..view.rows.len()).collect(),
    }
  }

  pub fn search_text(&self) -> &str {
    &self.search_text
  }

  /// Visible row indices, ascending
  pub fn visible(&self) -> &[usize] {
    &self.visible
  }

  /// Recompute visibility for `text`; returns whether the visible set changed
  pub fn recompute(
    &mut self,
    view: &ListWidgetView,
    text: &str,
    columns: &[String],
    filters: &FilterRegistry,
  ) -> bool {
    let visible = compute_visible(view, text, columns, filters);
    self.search_text = text.to_string();
    let changed = visible != self.visible;
    self.visible = visible;
    changed
  }
}

/// Rows whose search columns contain `text` (case-insensitive) and that pass
/// every active filter, in original order.
pub fn compute_visible(
  view: &ListWidgetView,
  text: &str,
  columns: &[String],
  filters: &FilterRegistry,
) -> Vec<usize> {
  let needle = text.to_lowercase();
  view
    .rows
    .iter()
    .enumerate()
    .filter(|(_, record)| row_matches(view, record, columns, &needle))
    .filter(|(_, record)| filters.matches(view, record))
    .map(|(idx, _)| idx)
    .collect()
}
