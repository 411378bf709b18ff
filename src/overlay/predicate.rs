//! Pluggable row filters offered by the overlay's filter menu.

use crate::host::domain::Domain;
use crate::host::view::FilterDecl;
use crate::host::{ListWidgetView, Record};

/// A named row filter. Active filters are combined with AND.
pub trait RowPredicate {
  /// Label shown in the filter menu and as a facet
  fn label(&self) -> &str;

  fn matches(&self, view: &ListWidgetView, record: &Record) -> bool;
}

/// Filter backed by a search domain from the relation model's search view
#[derive(Debug, Clone)]
pub struct DomainFilter {
  label: String,
  domain: Domain,
}

impl DomainFilter {
  pub fn new(label: &str, domain: Domain) -> Self {
    Self {
      label: label.to_string(),
      domain,
    }
  }

  pub fn from_decl(decl: &FilterDecl) -> Self {
    Self::new(
      decl.label.as_deref().unwrap_or(&decl.name),
      decl.domain.clone(),
    )
  }
}

impl RowPredicate for DomainFilter {
  fn label(&self) -> &str {
    &self.label
  }

  fn matches(&self, view: &ListWidgetView, record: &Record) -> bool {
    self.domain.matches(record, &view.fields)
  }
}

struct Entry {
  predicate: Box<dyn RowPredicate>,
  active: bool,
}

/// Ordered set of filters a list offers, each toggled on or off
#[derive(Default)]
pub struct FilterRegistry {
  entries: Vec<Entry>,
}

impl FilterRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registry with one domain filter per declared search filter
  pub fn from_view(view: &ListWidgetView) -> Self {
    let mut registry = Self::new();
    for decl in &view.search.filters {
      registry.register(Box::new(DomainFilter::from_decl(decl)));
    }
    registry
  }

  pub fn register(&mut self, predicate: Box<dyn RowPredicate>) {
    self.entries.push(Entry {
      predicate,
      active: false,
    });
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Flip a filter on or off; returns the new state, `None` if out of range
  pub fn toggle(&mut self, idx: usize) -> Option<bool> {
    let entry = self.entries.get_mut(idx)?;
    entry.active = !entry.active;
    Some(entry.active)
  }

  pub fn has_active(&self) -> bool {
    self.entries.iter().any(|e| e.active)
  }

  /// Labels with their active flag, in registration order
  pub fn items(&self) -> impl Iterator<Item = (&str, bool)> {
    self.entries.iter().map(|e| (e.predicate.label(), e.active))
  }

  pub fn active(&self) -> impl Iterator<Item = &dyn RowPredicate> {
    self
      .entries
      .iter()
      .filter(|e| e.active)
      .map(|e| e.predicate.as_ref())
  }

  /// Whether a record passes every active filter
  pub fn matches(&self, view: &ListWidgetView, record: &Record) -> bool {
    self.active().all(|p| p.matches(view, record))
  }
}
