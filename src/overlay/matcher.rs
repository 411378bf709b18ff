//! Case-insensitive text matching of rows against the search input.

use crate::host::record::display_value;
use crate::host::{ListWidgetView, Record};
use serde::Deserialize;

/// Field names preferred as the default search field, in order
const PREFERRED_SEARCH_FIELDS: &[&str] = &["name", "display_name", "subject", "title"];

/// Which columns the search text is matched against.
///
/// In YAML the explicit form is a one-key map (`fields: [name, ref]`), so
/// fields holding it deserialize through `serde_yaml::with::singleton_map`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchColumns {
  /// Every visible column of the list
  #[default]
  Visible,
  /// The single field the relation model would search by default
  DefaultField,
  /// An explicit set of fields; fields the list does not have are ignored
  Fields(Vec<String>),
}

impl SearchColumns {
  /// Resolve to concrete field names for a list widget
  pub fn resolve(&self, view: &ListWidgetView) -> Vec<String> {
    match self {
      SearchColumns::Visible => view.columns.clone(),
      SearchColumns::DefaultField => vec![default_search_field(view)],
      SearchColumns::Fields(fields) => fields
        .iter()
        .filter(|f| view.fields.contains_key(*f) || view.columns.contains(f))
        .cloned()
        .collect(),
    }
  }
}

/// Pick the field a plain text search should target: a preferred name among
/// textual fields, else the first textual field, else `name`.
pub fn default_search_field(view: &ListWidgetView) -> String {
  let is_textual = |name: &str| view.field_def(name).is_some_and(|d| d.kind.is_textual());

  if let Some(name) = PREFERRED_SEARCH_FIELDS.iter().find(|n| is_textual(n)) {
    return name.to_string();
  }

  view
    .fields
    .iter()
    .find(|(_, def)| def.kind.is_textual())
    .map(|(name, _)| name.clone())
    .unwrap_or_else(|| "name".to_string())
}

/// Check whether any of `columns` of a record contains `needle`.
///
/// `needle` must already be lowercased; an empty needle matches every row.
pub fn row_matches(view: &ListWidgetView, record: &Record, columns: &[String], needle: &str) -> bool {
  if needle.is_empty() {
    return true;
  }
  columns.iter().any(|column| {
    display_value(view.field_def(column), record.get(column))
      .to_lowercase()
      .contains(needle)
  })
}
