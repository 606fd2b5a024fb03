use thiserror::Error;

use crate::placement::PlacementError;
use crate::widget::WidgetId;

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Failures of engine operations. Every variant leaves the registry and
/// history exactly as they were before the call.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no room for {widgets} widgets on a {cols}x{rows} grid")]
    Capacity { widgets: usize, cols: u16, rows: u16 },

    #[error("unknown widget: {id}")]
    UnknownWidget { id: WidgetId },

    #[error("widget id already in use: {id}")]
    DuplicateId { id: WidgetId },

    #[error("grid dimensions are not known yet")]
    GridUnknown,

    #[error("placement rejected: {0}")]
    Placement(#[from] PlacementError),

    #[error("interaction is locked while a widget is maximized or the mobile layout is active")]
    Locked,

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Failures decoding or validating a dashboard document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed dashboard JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported dashboard version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("document was saved for the {saved} layout but the {active} layout is active")]
    ViewMode {
        saved: &'static str,
        active: &'static str,
    },

    #[error("document has no widgets array")]
    MissingWidgets,

    #[error("saved layout of {widgets} widgets does not fit a {cols}x{rows} grid")]
    DoesNotFit { widgets: usize, cols: u16, rows: u16 },
}

impl LayoutError {
    #[must_use]
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::Capacity { .. })
    }
}
