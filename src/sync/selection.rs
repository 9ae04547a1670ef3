use crate::model::flight::FlightId;

use super::error::SyncError;
use super::ops::{Coordinate, PerSurface, Surface, ViewOp};
use super::ordering::Section;
use super::resolver;
use super::view::DataSource;

/// The selected row of one surface, and the flight it showed when selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selected {
    pub at: Coordinate,
    pub id: FlightId,
}

/// Tracks the selected row of each surface independently.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    slots: PerSurface<Option<Selected>>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self, surface: Surface) -> Option<Selected> {
        self.slots[surface]
    }

    /// Explicit user selection; replaces whatever was tracked for `surface`
    pub fn select(
        &mut self,
        surface: Surface,
        at: Coordinate,
        data: &dyn DataSource,
    ) -> Result<FlightId, SyncError> {
        let sections = data.sections(surface);
        resolver::coordinate_to_index(sections, at)?;
        let id = sections[at.section].rows[at.row].id;
        self.slots[surface] = Some(Selected { at, id });
        Ok(id)
    }

    pub fn clear(&mut self, surface: Surface) {
        self.slots[surface] = None;
    }

    /// Carry each surface's selection through one batch of operations.
    pub fn apply(&mut self, batch: &[ViewOp], data: &dyn DataSource) {
        for surface in Surface::ALL {
            let ops: Vec<&ViewOp> = batch.iter().filter(|op| op.surface() == surface).collect();
            if ops.is_empty() {
                continue;
            }

            let sections = data.sections(surface);
            let reload = ops.iter().any(|op| matches!(op, ViewOp::ReloadAll { .. }));
            // A shifted coordinate must still show the same flight; if it
            // does not (or the row was deleted and re-inserted elsewhere),
            // find the flight by id.
            let mut next = self.slots[surface].and_then(|current| {
                let shifted = if reload { None } else { shift(current, &ops) };
                shifted
                    .filter(|s| id_at(sections, s.at) == Some(current.id))
                    .or_else(|| {
                        resolver::locate(sections, current.id).map(|at| Selected {
                            at,
                            id: current.id,
                        })
                    })
            });

            for op in &ops {
                if let ViewOp::SelectAndReveal { at, .. } | ViewOp::ReselectNearest { at, .. } = op
                    && let Some(id) = id_at(sections, *at)
                {
                    next = Some(Selected { at: *at, id });
                }
            }

            self.slots[surface] = next;
        }
    }
}

fn id_at(sections: &[Section], at: Coordinate) -> Option<FlightId> {
    sections
        .get(at.section)
        .and_then(|s| s.rows.get(at.row))
        .map(|f| f.id)
}

/// Move a selection through the structural operations of one batch.
/// Deletions address the old layout, insertions the new one.
fn shift(current: Selected, ops: &[&ViewOp]) -> Option<Selected> {
    let at = current.at;

    for op in ops {
        match op {
            ViewOp::MoveRow { from, to, .. } if *from == at => {
                return Some(Selected {
                    at: *to,
                    id: current.id,
                });
            }
            ViewOp::DeleteSection { section, .. } if *section == at.section => return None,
            ViewOp::DeleteRow { at: deleted, .. } if *deleted == at => return None,
            _ => {}
        }
    }

    let mut section = at.section;
    let mut row = at.row;
    for op in ops {
        match op {
            ViewOp::DeleteSection { section: s, .. } if *s < at.section => section -= 1,
            ViewOp::DeleteRow { at: d, .. } | ViewOp::MoveRow { from: d, .. }
                if d.section == at.section && d.row < at.row =>
            {
                row -= 1
            }
            _ => {}
        }
    }

    let mut inserted_sections: Vec<usize> = ops
        .iter()
        .filter_map(|op| match op {
            ViewOp::InsertSection { section, .. } => Some(*section),
            _ => None,
        })
        .collect();
    inserted_sections.sort_unstable();
    for s in inserted_sections {
        if s <= section {
            section += 1;
        }
    }

    let mut inserted_rows: Vec<Coordinate> = ops
        .iter()
        .filter_map(|op| match op {
            ViewOp::InsertRow { at, .. } | ViewOp::MoveRow { to: at, .. } => Some(*at),
            _ => None,
        })
        .collect();
    inserted_rows.sort_unstable();
    for ins in inserted_rows {
        if ins.section == section && ins.row <= row {
            row += 1;
        }
    }

    Some(Selected {
        at: Coordinate::new(section, row),
        id: current.id,
    })
}
