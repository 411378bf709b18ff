//! Records and field definitions as the host form hands them to list widgets.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// A single field value of a record.
///
/// Deserialized untagged so fixtures can write plain scalars. A two element
/// `[id, "name"]` array is a many2one reference; any other array is a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
  Many2one(i64, String),
  List(Vec<Value>),
}

impl Value {
  pub fn is_null(&self) -> bool {
    match self {
      Value::Null => true,
      Value::Text(s) => s.is_empty(),
      Value::List(items) => items.is_empty(),
      _ => false,
    }
  }

  /// Numeric view of the value, used for ordering comparisons
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Value::Int(i) => Some(*i as f64),
      Value::Float(f) => Some(*f),
      Value::Many2one(id, _) => Some(*id as f64),
      Value::Text(s) => s.trim().parse().ok(),
      _ => None,
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => Ok(()),
      Value::Bool(true) => write!(f, "Yes"),
      Value::Bool(false) => write!(f, "No"),
      Value::Int(i) => write!(f, "{}", i),
      Value::Float(v) => write!(f, "{}", v),
      Value::Text(s) => write!(f, "{}", s),
      Value::Many2one(_, name) => write!(f, "{}", name),
      Value::List(items) => {
        for (idx, item) in items.iter().enumerate() {
          if idx > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{}", item)?;
        }
        Ok(())
      }
    }
  }
}

/// A record row: id plus field values
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
  pub id: i64,
  #[serde(default)]
  pub data: BTreeMap<String, Value>,
}

impl Record {
  /// Get a field value, `Null` when the record does not carry the field
  pub fn get(&self, field: &str) -> &Value {
    static NULL: Value = Value::Null;
    self.data.get(field).unwrap_or(&NULL)
  }
}

/// Field type as declared by the host model
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
  Char,
  Text,
  Html,
  Integer,
  Float,
  Boolean,
  Date,
  Selection {
    #[serde(default)]
    selection: Vec<(String, String)>,
  },
  Many2one {
    #[serde(default)]
    relation: String,
  },
  Many2many,
  One2many,
}

impl FieldKind {
  /// Free-text kinds a default search field can be chosen from
  pub fn is_textual(&self) -> bool {
    matches!(self, FieldKind::Char | FieldKind::Text | FieldKind::Html)
  }

  /// Kinds offered as group-by options when a widget declares none
  pub fn is_groupable(&self) -> bool {
    matches!(
      self,
      FieldKind::Char | FieldKind::Boolean | FieldKind::Selection { .. } | FieldKind::Many2one { .. }
    )
  }
}

/// Field definition: label plus kind
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDef {
  #[serde(default)]
  pub string: Option<String>,
  #[serde(flatten)]
  pub kind: FieldKind,
}

impl FieldDef {
  pub fn new(kind: FieldKind) -> Self {
    Self { string: None, kind }
  }

  /// Label for headers, falling back to the technical name
  pub fn label<'a>(&'a self, name: &'a str) -> &'a str {
    self.string.as_deref().unwrap_or(name)
  }

  /// Textual rendering of a value of this field, as shown in a table cell
  pub fn display(&self, value: &Value) -> String {
    match (&self.kind, value) {
      (FieldKind::Selection { selection }, Value::Text(key)) => selection
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, label)| label.clone())
        .unwrap_or_else(|| key.clone()),
      _ => value.to_string(),
    }
  }
}

/// Render a value with an optional field definition
pub fn display_value(def: Option<&FieldDef>, value: &Value) -> String {
  match def {
    Some(def) => def.display(value),
    None => value.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_value_untagged_yaml() {
    let data: BTreeMap<String, Value> = serde_yaml::from_str(
      "name: Apple\nqty: 3\nprice: 1.5\ndone: true\npartner: [7, Acme]\ntags: [red, green]\nnote: ~\n",
    )
    .unwrap();
    assert_eq!(data["name"], Value::Text("Apple".to_string()));
    assert_eq!(data["qty"], Value::Int(3));
    assert_eq!(data["price"], Value::Float(1.5));
    assert_eq!(data["done"], Value::Bool(true));
    assert_eq!(data["partner"], Value::Many2one(7, "Acme".to_string()));
    assert_eq!(
      data["tags"],
      Value::List(vec![
        Value::Text("red".to_string()),
        Value::Text("green".to_string())
      ])
    );
    assert_eq!(data["note"], Value::Null);
  }

  #[test]
  fn test_value_display() {
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(Value::Bool(false).to_string(), "No");
    assert_eq!(Value::Many2one(1, "Acme".to_string()).to_string(), "Acme");
    let tags = Value::List(vec![Value::Text("a".into()), Value::Text("b".into())]);
    assert_eq!(tags.to_string(), "a, b");
  }

  #[test]
  fn test_selection_display_uses_label() {
    let def = FieldDef::new(FieldKind::Selection {
      selection: vec![("draft".into(), "Draft".into()), ("done".into(), "Done".into())],
    });
    assert_eq!(def.display(&Value::Text("done".into())), "Done");
    assert_eq!(def.display(&Value::Text("other".into())), "other");
  }

  #[test]
  fn test_field_def_tagged_yaml() {
    let def: FieldDef =
      serde_yaml::from_str("type: selection\nstring: State\nselection: [[a, A], [b, B]]\n").unwrap();
    assert_eq!(def.label("state"), "State");
    assert!(matches!(def.kind, FieldKind::Selection { ref selection } if selection.len() == 2));

    let def: FieldDef = serde_yaml::from_str("type: many2one\nrelation: res.partner\n").unwrap();
    assert!(def.kind.is_groupable());
    assert_eq!(def.label("partner_id"), "partner_id");
  }

  #[test]
  fn test_missing_field_is_null() {
    let record = Record {
      id: 1,
      data: BTreeMap::new(),
    };
    assert!(record.get("name").is_null());
  }
}
