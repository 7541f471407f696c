#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use std::fmt;
use std::str::FromStr;

use crate::consts::HANDLE_SIZE;
use crate::doc::NoteCollection;
use crate::note::NoteId;
use crate::viewport::Point;

/// Which part of a note was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeDirection),
}

/// Edge or corner a resize handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    /// Bottom edge: height only.
    South,
    /// Right edge: width only.
    East,
    /// Bottom-right corner: both axes.
    SouthEast,
}

impl ResizeDirection {
    /// Short compass name (`"s"`, `"e"`, `"se"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::South => "s",
            Self::East => "e",
            Self::SouthEast => "se",
        }
    }

    /// CSS cursor shown while this handle is hovered or dragged.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::South => "s-resize",
            Self::East => "e-resize",
            Self::SouthEast => "se-resize",
        }
    }

    /// Whether dragging this handle changes the width.
    #[must_use]
    pub fn affects_width(self) -> bool {
        matches!(self, Self::East | Self::SouthEast)
    }

    /// Whether dragging this handle changes the height.
    #[must_use]
    pub fn affects_height(self) -> bool {
        matches!(self, Self::South | Self::SouthEast)
    }
}

/// Error returned when a resize direction name is not one of `s`, `e`, `se`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectionError(pub String);

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown resize direction '{}' (expected s, e or se)", self.0)
    }
}

impl std::error::Error for ParseDirectionError {}

impl FromStr for ResizeDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(Self::South),
            "e" => Ok(Self::East),
            "se" => Ok(Self::SouthEast),
            other => Err(ParseDirectionError(other.to_owned())),
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub note_id: NoteId,
    pub part: HitPart,
}

/// Find the topmost note under `canvas_pt`.
///
/// Handles win over the body of the same note: the bottom-right
/// `HANDLE_SIZE` square is the south-east handle, the rest of the bottom
/// strip is south and the rest of the right strip is east.
#[must_use]
pub fn hit_test(canvas_pt: Point, doc: &NoteCollection) -> Option<Hit> {
    doc.iter().rev().find_map(|note| {
        let g = note.geometry();
        if !g.contains(canvas_pt) {
            return None;
        }
        let near_right = canvas_pt.x >= g.x + g.width - HANDLE_SIZE;
        let near_bottom = canvas_pt.y >= g.y + g.height - HANDLE_SIZE;
        let part = match (near_right, near_bottom) {
            (true, true) => HitPart::ResizeHandle(ResizeDirection::SouthEast),
            (false, true) => HitPart::ResizeHandle(ResizeDirection::South),
            (true, false) => HitPart::ResizeHandle(ResizeDirection::East),
            (false, false) => HitPart::Body,
        };
        Some(Hit { note_id: note.id, part })
    })
}
