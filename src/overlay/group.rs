//! Group-by strategies and the partition of visible rows into groups.

use crate::host::{FieldDef, FieldKind, ListWidgetView, Record, Value};
use std::cmp::Ordering;

/// Key of one group: the raw grouping value and its label.
///
/// `value` is `None` for records with an empty field; those form the "None"
/// group, which always sorts last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupKey {
  pub value: Option<String>,
  pub display: String,
}

impl GroupKey {
  pub fn none() -> Self {
    Self {
      value: None,
      display: "None".to_string(),
    }
  }
}

/// Strategy that assigns records to groups and orders the groups
pub trait GroupKeyFn {
  /// Label shown in the group-by menu and as a facet
  fn label(&self) -> &str;

  fn key(&self, view: &ListWidgetView, record: &Record) -> GroupKey;

  /// Order of two groups; `None` groups sort last regardless of direction
  fn compare(&self, a: &GroupKey, b: &GroupKey) -> Ordering;
}

/// Group by the value of one field
#[derive(Debug, Clone)]
pub struct FieldGroupBy {
  field: String,
  label: String,
  descending: bool,
  by_display: bool,
}

impl FieldGroupBy {
  /// Build from a group-by option such as `state` or `date:desc`
  pub fn parse(option: &str, view: &ListWidgetView) -> Self {
    let field = field_of(option);
    let descending = option
      .split_once(':')
      .is_some_and(|(_, order)| order.eq_ignore_ascii_case("desc"));
    let by_display = matches!(
      view.field_def(field).map(|d| &d.kind),
      Some(FieldKind::Many2one { .. })
    );
    let mut label = view.column_label(field).to_string();
    if descending {
      label.push_str(" (desc)");
    }
    Self {
      field: field.to_string(),
      label,
      descending,
      by_display,
    }
  }

  fn key_of(&self, def: Option<&FieldDef>, value: &Value) -> GroupKey {
    if value.is_null() {
      // an unset boolean reads as false
      return match def.map(|d| &d.kind) {
        Some(FieldKind::Boolean) => GroupKey {
          value: Some("false".to_string()),
          display: "No".to_string(),
        },
        _ => GroupKey::none(),
      };
    }
    match value {
      Value::Bool(b) => GroupKey {
        value: Some(b.to_string()),
        display: if *b { "Yes" } else { "No" }.to_string(),
      },
      Value::Many2one(id, name) => GroupKey {
        value: Some(id.to_string()),
        display: if name.is_empty() { "None".to_string() } else { name.clone() },
      },
      other => GroupKey {
        value: Some(raw_key(other)),
        display: crate::host::record::display_value(def, other),
      },
    }
  }
}

/// Field name of a group-by option, without its `:desc` suffix
fn field_of(option: &str) -> &str {
  option.split_once(':').map_or(option, |(field, _)| field)
}

/// Case-insensitive order, byte order on ties
fn text_cmp(a: &str, b: &str) -> Ordering {
  a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Raw, unlabelled key of a value
fn raw_key(value: &Value) -> String {
  match value {
    Value::Many2one(id, _) => id.to_string(),
    other => other.to_string(),
  }
}

impl GroupKeyFn for FieldGroupBy {
  fn label(&self) -> &str {
    &self.label
  }

  fn key(&self, view: &ListWidgetView, record: &Record) -> GroupKey {
    self.key_of(view.field_def(&self.field), record.get(&self.field))
  }

  fn compare(&self, a: &GroupKey, b: &GroupKey) -> Ordering {
    let (av, bv) = match (&a.value, &b.value) {
      (None, None) => return Ordering::Equal,
      (None, Some(_)) => return Ordering::Greater,
      (Some(_), None) => return Ordering::Less,
      (Some(av), Some(bv)) => (av, bv),
    };

    let ordering = if self.by_display {
      text_cmp(&a.display, &b.display)
    } else {
      match (av.parse::<f64>(), bv.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => text_cmp(av, bv),
      }
    };

    if self.descending {
      ordering.reverse()
    } else {
      ordering
    }
  }
}

/// Group-by options for a list: the declared ones, or every groupable
/// visible column when the search view declares none.
pub fn group_bys_for(view: &ListWidgetView) -> Vec<Box<dyn GroupKeyFn>> {
  let options: Vec<String> = if view.search.group_by.is_empty() {
    view
      .columns
      .iter()
      .filter(|c| view.field_def(c).is_some_and(|d| d.kind.is_groupable()))
      .cloned()
      .collect()
  } else {
    // Declared options naming a field the list does not carry are skipped
    view
      .search
      .group_by
      .iter()
      .filter(|option| view.field_def(field_of(option)).is_some())
      .cloned()
      .collect()
  };

  options
    .iter()
    .map(|option| Box::new(FieldGroupBy::parse(option, view)) as Box<dyn GroupKeyFn>)
    .collect()
}

/// A group of visible rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
  pub key: GroupKey,
  /// Row indices, in their original relative order
  pub rows: Vec<usize>,
  pub folded: bool,
}

/// Partition `visible` rows into sorted groups. All groups start folded.
pub fn group_rows(view: &ListWidgetView, visible: &[usize], group_by: &dyn GroupKeyFn) -> Vec<Group> {
  let mut groups: Vec<Group> = Vec::new();

  for &idx in visible {
    let Some(record) = view.rows.get(idx) else {
      continue;
    };
    let key = group_by.key(view, record);
    match groups.iter_mut().find(|g| g.key.value == key.value) {
      Some(group) => group.rows.push(idx),
      None => groups.push(Group {
        key,
        rows: vec![idx],
        folded: true,
      }),
    }
  }

  // Stable sort keeps first-seen order between groups that compare equal
  groups.sort_by(|a, b| group_by.compare(&a.key, &b.key));
  groups
}
