use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// A (section, row) position within one projection snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub section: usize,
    pub row: usize,
}

impl Coordinate {
    pub fn new(section: usize, row: usize) -> Self {
        Coordinate { section, row }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.section, self.row)
    }
}

/// Which of the two projections a list surface shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// Every flight in the logbook
    Primary,
    /// Flights matching the active search
    Filtered,
}

impl Surface {
    pub const ALL: [Surface; 2] = [Surface::Primary, Surface::Filtered];
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Surface::Primary => write!(f, "primary"),
            Surface::Filtered => write!(f, "filtered"),
        }
    }
}

/// One value per surface, indexable by [`Surface`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerSurface<T> {
    pub primary: T,
    pub filtered: T,
}

impl<T> Index<Surface> for PerSurface<T> {
    type Output = T;

    fn index(&self, surface: Surface) -> &T {
        match surface {
            Surface::Primary => &self.primary,
            Surface::Filtered => &self.filtered,
        }
    }
}

impl<T> IndexMut<Surface> for PerSurface<T> {
    fn index_mut(&mut self, surface: Surface) -> &mut T {
        match surface {
            Surface::Primary => &mut self.primary,
            Surface::Filtered => &mut self.filtered,
        }
    }
}

/// A view update or intent emitted by the reconciler.
///
/// The operations emitted for one notification form a batch. Deletions
/// (`DeleteSection`, `DeleteRow`, `ReloadRow` and the source of `MoveRow`)
/// address the snapshot from before the mutation; insertions (`InsertSection`,
/// `InsertRow`, the destination of `MoveRow`) and the intents address the
/// refreshed snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ViewOp {
    InsertSection { surface: Surface, section: usize },
    DeleteSection { surface: Surface, section: usize },
    InsertRow { surface: Surface, at: Coordinate },
    DeleteRow { surface: Surface, at: Coordinate },
    MoveRow {
        surface: Surface,
        from: Coordinate,
        to: Coordinate,
    },
    ReloadRow { surface: Surface, at: Coordinate },
    ReloadAll { surface: Surface },
    /// Select the row and scroll it into view
    SelectAndReveal { surface: Surface, at: Coordinate },
    /// Select the row nearest to where a deleted row used to be
    ReselectNearest { surface: Surface, at: Coordinate },
    /// The surface became empty; offer to create a new entry
    PromptCreateDefault { surface: Surface },
}

impl ViewOp {
    pub fn surface(&self) -> Surface {
        match self {
            ViewOp::InsertSection { surface, .. }
            | ViewOp::DeleteSection { surface, .. }
            | ViewOp::InsertRow { surface, .. }
            | ViewOp::DeleteRow { surface, .. }
            | ViewOp::MoveRow { surface, .. }
            | ViewOp::ReloadRow { surface, .. }
            | ViewOp::ReloadAll { surface }
            | ViewOp::SelectAndReveal { surface, .. }
            | ViewOp::ReselectNearest { surface, .. }
            | ViewOp::PromptCreateDefault { surface } => *surface,
        }
    }

    /// Whether this operation changes the row/section structure
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ViewOp::InsertSection { .. }
                | ViewOp::DeleteSection { .. }
                | ViewOp::InsertRow { .. }
                | ViewOp::DeleteRow { .. }
                | ViewOp::MoveRow { .. }
        )
    }
}

impl fmt::Display for ViewOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewOp::InsertSection { surface, section } => {
                write!(f, "{surface}: insert section {section}")
            }
            ViewOp::DeleteSection { surface, section } => {
                write!(f, "{surface}: delete section {section}")
            }
            ViewOp::InsertRow { surface, at } => write!(f, "{surface}: insert row {at}"),
            ViewOp::DeleteRow { surface, at } => write!(f, "{surface}: delete row {at}"),
            ViewOp::MoveRow { surface, from, to } => {
                write!(f, "{surface}: move row {from} -> {to}")
            }
            ViewOp::ReloadRow { surface, at } => write!(f, "{surface}: reload row {at}"),
            ViewOp::ReloadAll { surface } => write!(f, "{surface}: reload all"),
            ViewOp::SelectAndReveal { surface, at } => {
                write!(f, "{surface}: select and reveal {at}")
            }
            ViewOp::ReselectNearest { surface, at } => write!(f, "{surface}: reselect {at}"),
            ViewOp::PromptCreateDefault { surface } => {
                write!(f, "{surface}: prompt to create a new flight")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_surface_indexing() {
        let mut slots: PerSurface<Option<u8>> = PerSurface::default();
        slots[Surface::Filtered] = Some(3);
        assert_eq!(slots[Surface::Primary], None);
        assert_eq!(slots.filtered, Some(3));
    }

    #[test]
    fn json_shape() {
        let op = ViewOp::MoveRow {
            surface: Surface::Primary,
            from: Coordinate::new(1, 1),
            to: Coordinate::new(0, 0),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "op": "move_row",
                "surface": "primary",
                "from": {"section": 1, "row": 1},
                "to": {"section": 0, "row": 0},
            })
        );
    }

    #[test]
    fn display() {
        let op = ViewOp::DeleteSection {
            surface: Surface::Filtered,
            section: 2,
        };
        assert_eq!(op.to_string(), "filtered: delete section 2");
        assert_eq!(
            ViewOp::ReselectNearest {
                surface: Surface::Primary,
                at: Coordinate::new(0, 1)
            }
            .to_string(),
            "primary: reselect (0,1)"
        );
    }
}
