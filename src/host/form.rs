use super::record::{FieldDef, Record};
use super::view::{ListWidgetView, SearchDecl, ViewId, ViewKind};
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

/// Hooks the form emits as list widgets are mounted and unmounted.
///
/// This is the only integration surface between the form and anything that
/// decorates its widgets.
pub trait ViewLifecycle {
  fn on_mounted(&mut self, view: &ListWidgetView);
  fn on_unmounted(&mut self, view: &ListWidgetView);
}

/// Fixture description of a record-edit form
#[derive(Debug, Deserialize)]
struct FormFixture {
  model: String,
  record: Record,
  #[serde(default)]
  fields: BTreeMap<String, FieldDef>,
  #[serde(default)]
  widgets: Vec<WidgetFixture>,
}

#[derive(Debug, Deserialize)]
struct WidgetFixture {
  field: String,
  #[serde(default)]
  label: Option<String>,
  #[serde(default)]
  kind: ViewKind,
  #[serde(default)]
  relation: String,
  #[serde(default)]
  fields: BTreeMap<String, FieldDef>,
  #[serde(default)]
  columns: Vec<String>,
  #[serde(default)]
  records: Vec<Record>,
  #[serde(default)]
  search: SearchDecl,
}

/// A record-edit form with its embedded list widgets
#[derive(Debug)]
pub struct FormView {
  pub model: String,
  pub record: Rc<Record>,
  pub fields: BTreeMap<String, FieldDef>,
  pub widgets: Vec<ListWidgetView>,
  mounted: bool,
}

impl FormView {
  /// Load a form from a YAML (`.yaml`/`.yml`) or JSON (`.json`) fixture
  pub fn load(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read form file {}: {}", path.display(), e))?;

    let is_json = path
      .extension()
      .and_then(|e| e.to_str())
      .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let fixture: FormFixture = if is_json {
      serde_json::from_str(&contents)
        .map_err(|e| eyre!("Failed to parse form file {}: {}", path.display(), e))?
    } else {
      serde_yaml::from_str(&contents)
        .map_err(|e| eyre!("Failed to parse form file {}: {}", path.display(), e))?
    };

    Ok(Self::from_fixture(fixture))
  }

  /// Parse a YAML form description
  pub fn from_yaml(contents: &str) -> Result<Self> {
    let fixture: FormFixture =
      serde_yaml::from_str(contents).map_err(|e| eyre!("Failed to parse form: {}", e))?;
    Ok(Self::from_fixture(fixture))
  }

  fn from_fixture(fixture: FormFixture) -> Self {
    let record = Rc::new(fixture.record);
    let widgets = fixture
      .widgets
      .into_iter()
      .enumerate()
      .map(|(idx, w)| {
        let mut view = ListWidgetView::new(ViewId(idx), &w.field, w.kind, &record)
          .with_fields(w.fields)
          .with_rows(w.records)
          .with_search(w.search);
        view.label = w
          .label
          .or_else(|| fixture.fields.get(&w.field).and_then(|d| d.string.clone()))
          .unwrap_or(w.field);
        view.relation = w.relation;
        view.columns = if w.columns.is_empty() {
          view.fields.keys().cloned().collect()
        } else {
          w.columns
        };
        view
      })
      .collect();

    Self {
      model: fixture.model,
      record,
      fields: fixture.fields,
      widgets,
      mounted: false,
    }
  }

  pub fn is_mounted(&self) -> bool {
    self.mounted
  }

  /// Mount every widget, notifying the listener in display order
  pub fn mount(&mut self, listener: &mut dyn ViewLifecycle) {
    if self.mounted {
      return;
    }
    for view in &self.widgets {
      debug!(view = %view.id, field = %view.field, "mounted");
      listener.on_mounted(view);
    }
    self.mounted = true;
  }

  /// Unmount every widget; listeners detach before the widgets go away
  pub fn unmount(&mut self, listener: &mut dyn ViewLifecycle) {
    if !self.mounted {
      return;
    }
    for view in &self.widgets {
      debug!(view = %view.id, field = %view.field, "unmounted");
      listener.on_unmounted(view);
    }
    self.mounted = false;
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::host::record::Value;

  pub(crate) const ORDER_FORM: &str = r#"
model: sale.order
record:
  id: 7
  data:
    name: SO007
    partner_id: [3, Acme]
fields:
  name: { type: char, string: Order }
  line_ids: { type: one2many, string: Order Lines }
widgets:
  - field: line_ids
    kind: one2many
    relation: sale.order.line
    fields:
      name: { type: char, string: Description }
      qty: { type: integer, string: Quantity }
      state:
        type: selection
        string: Status
        selection: [[draft, Draft], [done, Done]]
    columns: [name, qty, state]
    records:
      - { id: 1, data: { name: Apple, qty: 3, state: draft } }
      - { id: 2, data: { name: Banana, qty: 1, state: done } }
      - { id: 3, data: { name: apricot, qty: 5, state: draft } }
    search:
      filters:
        - { name: done, label: Done, domain: [[state, '=', done]] }
      group_by: [state]
  - field: tag_ids
    kind: many2many_tags
"#;

  #[derive(Default)]
  struct Recorder {
    events: Vec<String>,
  }

  impl ViewLifecycle for Recorder {
    fn on_mounted(&mut self, view: &ListWidgetView) {
      self.events.push(format!("+{}", view.field));
    }
    fn on_unmounted(&mut self, view: &ListWidgetView) {
      self.events.push(format!("-{}", view.field));
    }
  }

  #[test]
  fn test_load_form() {
    let form = FormView::from_yaml(ORDER_FORM).unwrap();
    assert_eq!(form.model, "sale.order");
    assert_eq!(form.widgets.len(), 2);

    let lines = &form.widgets[0];
    assert_eq!(lines.kind, ViewKind::OneToMany);
    assert_eq!(lines.label, "Order Lines");
    assert_eq!(lines.rows.len(), 3);
    assert_eq!(lines.columns, vec!["name", "qty", "state"]);
    assert_eq!(lines.search.filters.len(), 1);
    assert_eq!(lines.parent().map(|p| p.id), Some(7));

    let tags = &form.widgets[1];
    assert_eq!(tags.kind, ViewKind::Other);
    assert_eq!(tags.label, "tag_ids");
  }

  #[test]
  fn test_mount_unmount_emit_hooks_once() {
    let mut form = FormView::from_yaml(ORDER_FORM).unwrap();
    let mut recorder = Recorder::default();

    form.mount(&mut recorder);
    form.mount(&mut recorder);
    assert!(form.is_mounted());
    form.unmount(&mut recorder);
    form.unmount(&mut recorder);

    assert_eq!(
      recorder.events,
      vec!["+line_ids", "+tag_ids", "-line_ids", "-tag_ids"]
    );
  }

  #[test]
  fn test_load_demo_fixture() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/sale_order.yaml");
    let form = FormView::load(&path).unwrap();
    assert_eq!(form.record.id, 42);
    let kinds: Vec<ViewKind> = form.widgets.iter().map(|w| w.kind).collect();
    assert_eq!(
      kinds,
      vec![ViewKind::OneToMany, ViewKind::ManyToMany, ViewKind::Other]
    );
    assert_eq!(form.widgets[0].rows.len(), 7);
    assert_eq!(form.widgets[0].search.filters.len(), 3);
  }

  #[test]
  fn test_load_json_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.json");
    std::fs::write(
      &path,
      r#"{
        "model": "sale.order",
        "record": { "id": 5, "data": { "partner_id": [3, "Acme"], "note": null } },
        "widgets": [{
          "field": "line_ids",
          "kind": "one2many",
          "fields": { "name": { "type": "char", "string": "Description" } },
          "records": [{ "id": 1, "data": { "name": "Apple", "qty": 2.5 } }]
        }]
      }"#,
    )
    .unwrap();

    let form = FormView::load(&path).unwrap();
    assert_eq!(
      form.record.get("partner_id"),
      &Value::Many2one(3, "Acme".to_string())
    );
    assert!(form.record.get("note").is_null());

    let lines = &form.widgets[0];
    assert_eq!(lines.kind, ViewKind::OneToMany);
    assert_eq!(lines.columns, vec!["name"]);
    assert_eq!(lines.rows[0].get("qty"), &Value::Float(2.5));
  }

  #[test]
  fn test_invalid_form_is_error() {
    assert!(FormView::from_yaml("model: [").is_err());
    assert!(FormView::load(Path::new("/nonexistent/form.yaml")).is_err());
  }
}
