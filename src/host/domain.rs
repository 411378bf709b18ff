//! Search domains: conjunctions of `(field, operator, value)` conditions.

use super::record::{display_value, FieldDef, Record, Value};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Comparison operator of a domain condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Operator {
  #[serde(rename = "=")]
  Eq,
  #[serde(rename = "!=")]
  Ne,
  #[serde(rename = ">")]
  Gt,
  #[serde(rename = ">=")]
  Ge,
  #[serde(rename = "<")]
  Lt,
  #[serde(rename = "<=")]
  Le,
  #[serde(rename = "in")]
  In,
  #[serde(rename = "not in")]
  NotIn,
  #[serde(rename = "ilike")]
  Ilike,
  #[serde(rename = "not ilike")]
  NotIlike,
}

/// One leaf condition, written `[field, op, value]` in fixtures
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition(pub String, pub Operator, pub Value);

impl Condition {
  /// Evaluate against a record. Missing fields compare as `Null`.
  pub fn matches(&self, record: &Record, fields: &BTreeMap<String, FieldDef>) -> bool {
    let Condition(field, op, expected) = self;
    let actual = record.get(field);
    match op {
      Operator::Eq => values_equal(actual, expected),
      Operator::Ne => !values_equal(actual, expected),
      Operator::Gt => compare(actual, expected) == Some(Ordering::Greater),
      Operator::Ge => matches!(
        compare(actual, expected),
        Some(Ordering::Greater | Ordering::Equal)
      ),
      Operator::Lt => compare(actual, expected) == Some(Ordering::Less),
      Operator::Le => matches!(
        compare(actual, expected),
        Some(Ordering::Less | Ordering::Equal)
      ),
      Operator::In => contains(expected, actual),
      Operator::NotIn => !contains(expected, actual),
      Operator::Ilike => ilike(fields.get(field), actual, expected),
      Operator::NotIlike => !ilike(fields.get(field), actual, expected),
    }
  }
}

/// A conjunction of conditions. An empty domain matches every record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Domain(pub Vec<Condition>);

impl Domain {
  pub fn matches(&self, record: &Record, fields: &BTreeMap<String, FieldDef>) -> bool {
    self.0.iter().all(|c| c.matches(record, fields))
  }
}

/// Many2one values compare by id against plain integers, `false` stands in
/// for an empty value.
fn normalize(value: &Value) -> Value {
  match value {
    Value::Many2one(id, _) => Value::Int(*id),
    Value::Bool(false) => Value::Null,
    v if v.is_null() => Value::Null,
    v => v.clone(),
  }
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
  let (a, e) = (normalize(actual), normalize(expected));
  match (&a, &e) {
    (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
      a.as_f64() == e.as_f64()
    }
    _ => a == e,
  }
}

fn compare(actual: &Value, expected: &Value) -> Option<Ordering> {
  let (a, e) = (normalize(actual), normalize(expected));
  match (&a, &e) {
    (Value::Null, _) | (_, Value::Null) => None,
    (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
    _ => a.as_f64()?.partial_cmp(&e.as_f64()?),
  }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
  match haystack {
    Value::List(items) => match needle {
      // many2many: any shared element
      Value::List(values) => values
        .iter()
        .any(|v| items.iter().any(|i| values_equal(v, i))),
      v => items.iter().any(|i| values_equal(v, i)),
    },
    other => values_equal(needle, other),
  }
}

fn ilike(def: Option<&FieldDef>, actual: &Value, expected: &Value) -> bool {
  let needle = expected.to_string().to_lowercase();
  display_value(def, actual).to_lowercase().contains(&needle)
}
