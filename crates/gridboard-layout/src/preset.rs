//! Size-preset catalog: preset key to target pixel footprint.

use std::fmt;

use gridboard_core::geometry::{CellSize, PixelSize};
use serde::{Deserialize, Serialize};

use crate::widget::cells_at_least_one;

/// Closed table of named widget sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreset {
    Small,
    Medium,
    Large,
    Wide,
    Tall,
}

impl SizePreset {
    pub const ALL: [Self; 5] = [
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::Wide,
        Self::Tall,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Wide => "wide",
            Self::Tall => "tall",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(raw))
    }

    #[must_use]
    pub const fn target_px(self) -> PixelSize {
        match self {
            Self::Small => PixelSize::new(240.0, 180.0),
            Self::Medium => PixelSize::new(360.0, 270.0),
            Self::Large => PixelSize::new(480.0, 360.0),
            Self::Wide => PixelSize::new(600.0, 270.0),
            Self::Tall => PixelSize::new(300.0, 480.0),
        }
    }

    /// Grid spans for this preset: `round(targetPx / cellPx)`, floored at `floor`.
    #[must_use]
    pub fn spans(self, cell: CellSize, floor: (u16, u16)) -> (u16, u16) {
        let target = self.target_px();
        (
            cells_at_least_one(cell.cells_for_px(target.width)).max(floor.0),
            cells_at_least_one(cell.cells_for_px(target.height)).max(floor.1),
        )
    }
}

impl fmt::Display for SizePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;

    #[test]
    fn spans_round_to_nearest_cell() {
        let cell = CellSize::new(30).expect("non-zero");
        assert_eq!(SizePreset::Medium.spans(cell, (1, 1)), (12, 9));
        let cell = CellSize::new(25).expect("non-zero");
        // 600 / 25 = 24, 270 / 25 = 10.8
        assert_eq!(SizePreset::Wide.spans(cell, (1, 1)), (24, 11));
    }

    #[test]
    fn spans_respect_type_floor() {
        let cell = CellSize::new(30).expect("non-zero");
        let floor = WidgetKind::Calculator.min_spans(cell);
        assert_eq!(floor, (7, 10));
        assert_eq!(SizePreset::Small.spans(cell, floor), (8, 10));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(SizePreset::parse("LARGE"), Some(SizePreset::Large));
        assert_eq!(SizePreset::parse("huge"), None);
    }
}
