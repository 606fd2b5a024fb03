#![forbid(unsafe_code)]

//! Pointer input vocabulary for drag and resize gestures.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::CellSize;

/// Pointer position in container pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

impl PointerPosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Raw pixel delta from `origin` to `self`.
    #[must_use]
    pub const fn delta_from(self, origin: PointerPosition) -> PointerDelta {
        PointerDelta {
            dx: self.x.saturating_sub(origin.x),
            dy: self.y.saturating_sub(origin.y),
        }
    }
}

/// Pixel delta between two pointer positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PointerDelta {
    pub dx: i32,
    pub dy: i32,
}

impl PointerDelta {
    /// Snap the pixel delta to whole grid cells (`round(delta / cell)`).
    #[must_use]
    pub fn to_cells(self, cell: CellSize) -> (i32, i32) {
        (
            cell.cells_for_px(f64::from(self.dx)),
            cell.cells_for_px(f64::from(self.dy)),
        )
    }
}

bitflags! {
    /// Widget edges moved by a resize handle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResizeEdges: u8 {
        const TOP = 0b0001;
        const RIGHT = 0b0010;
        const BOTTOM = 0b0100;
        const LEFT = 0b1000;
    }
}

/// One of the eight edge/corner resize handles on a widget frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl ResizeHandle {
    /// All handles in clockwise order starting at the top edge.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Edges this handle drags.
    #[must_use]
    pub const fn edges(self) -> ResizeEdges {
        match self {
            Self::North => ResizeEdges::TOP,
            Self::NorthEast => ResizeEdges::TOP.union(ResizeEdges::RIGHT),
            Self::East => ResizeEdges::RIGHT,
            Self::SouthEast => ResizeEdges::BOTTOM.union(ResizeEdges::RIGHT),
            Self::South => ResizeEdges::BOTTOM,
            Self::SouthWest => ResizeEdges::BOTTOM.union(ResizeEdges::LEFT),
            Self::West => ResizeEdges::LEFT,
            Self::NorthWest => ResizeEdges::TOP.union(ResizeEdges::LEFT),
        }
    }

    /// Short compass label (`n`, `ne`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::North => "n",
            Self::NorthEast => "ne",
            Self::East => "e",
            Self::SouthEast => "se",
            Self::South => "s",
            Self::SouthWest => "sw",
            Self::West => "w",
            Self::NorthWest => "nw",
        }
    }

    /// Parse a compass label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|handle| handle.as_str().eq_ignore_ascii_case(label.trim()))
    }
}
