//! The host form shell that list overlays plug into.

pub mod assets;
pub mod domain;
pub mod form;
pub mod record;
pub mod view;

pub use assets::{AssetRegistry, X2M_SEARCH};
pub use form::{FormView, ViewLifecycle};
pub use record::{FieldDef, FieldKind, Record, Value};
pub use view::{ListWidgetView, ViewId, ViewKind};
