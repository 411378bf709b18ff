use super::domain::Domain;
use super::record::{FieldDef, Record};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifier of a mounted list widget, unique within a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub usize);

impl fmt::Display for ViewId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "list-view-{}", self.0)
  }
}

/// Widget type of an embedded list, resolved once when the form is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ViewKind {
  #[serde(rename = "one2many")]
  OneToMany,
  #[serde(rename = "many2many")]
  ManyToMany,
  #[default]
  #[serde(other)]
  Other,
}

impl ViewKind {
  /// Whether this widget is a relational list an overlay can attach to
  pub fn is_relational_list(&self) -> bool {
    matches!(self, ViewKind::OneToMany | ViewKind::ManyToMany)
  }

  pub fn label(&self) -> &'static str {
    match self {
      ViewKind::OneToMany => "o2m",
      ViewKind::ManyToMany => "m2m",
      ViewKind::Other => "widget",
    }
  }
}

/// A named filter declared by the relation model's search view
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterDecl {
  pub name: String,
  #[serde(default)]
  pub label: Option<String>,
  #[serde(default)]
  pub domain: Domain,
}

/// Search view of the relation model: the filters and group-by fields it offers
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchDecl {
  #[serde(default)]
  pub filters: Vec<FilterDecl>,
  /// Field names, optionally suffixed `:desc`
  #[serde(default)]
  pub group_by: Vec<String>,
}

/// A rendered list widget for a relation field of the parent record
#[derive(Debug, Clone)]
pub struct ListWidgetView {
  pub id: ViewId,
  /// Relation field on the parent record
  pub field: String,
  pub label: String,
  pub kind: ViewKind,
  /// Model of the rows
  pub relation: String,
  pub fields: BTreeMap<String, FieldDef>,
  /// Visible columns in display order
  pub columns: Vec<String>,
  pub rows: Vec<Record>,
  pub search: SearchDecl,
  parent: Weak<Record>,
}

impl ListWidgetView {
  pub fn new(id: ViewId, field: &str, kind: ViewKind, parent: &Rc<Record>) -> Self {
    Self {
      id,
      field: field.to_string(),
      label: field.to_string(),
      kind,
      relation: String::new(),
      fields: BTreeMap::new(),
      columns: Vec::new(),
      rows: Vec::new(),
      search: SearchDecl::default(),
      parent: Rc::downgrade(parent),
    }
  }

  pub fn with_fields(mut self, fields: BTreeMap<String, FieldDef>) -> Self {
    self.fields = fields;
    self
  }

  pub fn with_rows(mut self, rows: Vec<Record>) -> Self {
    self.rows = rows;
    self
  }

  pub fn with_search(mut self, search: SearchDecl) -> Self {
    self.search = search;
    self
  }

  /// Parent form record, if the form is still alive
  pub fn parent(&self) -> Option<Rc<Record>> {
    self.parent.upgrade()
  }

  pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
    self.fields.get(name)
  }

  pub fn column_label<'a>(&'a self, name: &'a str) -> &'a str {
    self.field_def(name).map(|d| d.label(name)).unwrap_or(name)
  }
}
