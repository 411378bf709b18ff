use crate::host::{ViewId, ViewKind};
use thiserror::Error;

/// Why an overlay operation did nothing.
///
/// These never reach the host form: the manager logs them and leaves the
/// widget with its default, unfiltered behavior.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
  /// Attach was called on a widget that is not a relational list
  #[error("{view} is not a one2many/many2many list ({})", .kind.label())]
  UnsupportedViewType { view: ViewId, kind: ViewKind },

  /// An operation targeted a widget without an attached overlay
  #[error("{view} has no overlay attached")]
  DetachedOperation { view: ViewId },
}
