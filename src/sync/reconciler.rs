use std::collections::HashMap;

use crate::model::flight::{Flight, FlightField, FlightId};
use crate::store::notification::{DeleteHint, Notification};

use super::filter::SearchFilter;
use super::ops::{Coordinate, PerSurface, Surface, ViewOp};
use super::ordering::Section;
use super::projection::{Projection, RecordSource};
use super::view::DataSource;

/// Where a flight sat in one projection just before an update was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prior {
    /// Not in the projection (filtered out)
    Absent,
    At {
        at: Coordinate,
        key: i32,
        /// The flight was the only row of its section
        loner: bool,
    },
}

/// Turns logbook notifications into batches of view operations for the
/// primary list and, while a search is active, the search results list.
///
/// Any position that cannot be resolved degrades to a `ReloadAll` of the
/// affected surface; the reconciler never guesses a coordinate and never
/// hands an error to the view.
#[derive(Debug)]
pub struct Reconciler<S> {
    source: S,
    projections: PerSurface<Projection>,
    searching: bool,
    search_fields: Vec<FlightField>,
    /// Pre-update positions captured on `WillUpdate`, per surface. `None`
    /// means no position could be captured for that surface.
    pending: HashMap<FlightId, PerSurface<Option<Prior>>>,
}

impl<S: RecordSource> Reconciler<S> {
    pub fn new(source: S, search_fields: Vec<FlightField>) -> Self {
        Reconciler {
            source,
            projections: PerSurface {
                primary: Projection::new(Surface::Primary, None),
                filtered: Projection::new(Surface::Filtered, None),
            },
            searching: false,
            search_fields,
            pending: HashMap::new(),
        }
    }

    /// Materialize the primary list for the first time
    pub fn attach(&mut self) -> Vec<ViewOp> {
        self.projections.primary.refresh(&self.source);
        vec![ViewOp::ReloadAll {
            surface: Surface::Primary,
        }]
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn projection(&self, surface: Surface) -> &Projection {
        &self.projections[surface]
    }

    /// The surface the user is looking at
    pub fn displayed(&self) -> Surface {
        if self.searching {
            Surface::Filtered
        } else {
            Surface::Primary
        }
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// Whether `surface` is kept up to date. The search results list only
    /// is while a search is active.
    pub fn is_live(&self, surface: Surface) -> bool {
        match surface {
            Surface::Primary => true,
            Surface::Filtered => self.searching,
        }
    }

    fn live(&self) -> Vec<Surface> {
        Surface::ALL
            .into_iter()
            .filter(|s| self.is_live(*s))
            .collect()
    }

    /// Show the search results list, filtered by `text`. Blank text shows
    /// every flight.
    pub fn begin_search(&mut self, text: &str) -> Result<Vec<ViewOp>, regex::Error> {
        self.set_search_text(text)
    }

    /// Replace the search text. Starts a search if none is active.
    pub fn set_search_text(&mut self, text: &str) -> Result<Vec<ViewOp>, regex::Error> {
        let filter = SearchFilter::new(text, &self.search_fields)?;
        tracing::debug!(text, "search");
        self.projections.filtered.set_filter(filter);
        self.projections.filtered.refresh(&self.source);
        self.searching = true;
        // Positions captured against the previous results are meaningless now.
        for capture in self.pending.values_mut() {
            capture.filtered = None;
        }
        Ok(vec![ViewOp::ReloadAll {
            surface: Surface::Filtered,
        }])
    }

    /// Leave search; the primary list is displayed again
    pub fn end_search(&mut self) -> Vec<ViewOp> {
        self.searching = false;
        for capture in self.pending.values_mut() {
            capture.filtered = None;
        }
        Vec::new()
    }

    pub fn handle(&mut self, notification: &Notification) -> Vec<ViewOp> {
        tracing::debug!(
            kind = notification.kind(),
            id = %notification.flight().id,
            "reconciling"
        );
        match notification {
            Notification::Added { .. } | Notification::Updated { .. } | Notification::Deleted { .. }
                if !self.one_write_behind() =>
            {
                self.catch_up(notification)
            }
            Notification::Added { flight } => self.on_added(flight),
            Notification::WillUpdate { flight } => {
                self.on_will_update(flight);
                Vec::new()
            }
            Notification::Updated { flight } => self.on_updated(flight),
            Notification::UpdateFailed { flight } => {
                self.pending.remove(&flight.id);
                Vec::new()
            }
            Notification::Deleted { flight, hint } => self.on_deleted(flight, *hint),
        }
    }

    /// Whether the logbook changed exactly once since the live snapshots were
    /// taken. Only then is the change a notification announces the only
    /// difference between the old snapshot and the logbook.
    fn one_write_behind(&self) -> bool {
        let revision = self.source.revision();
        self.live()
            .into_iter()
            .all(|s| self.projections[s].revision().wrapping_add(1) == revision)
    }

    /// The logbook is not exactly one write past the snapshots, usually
    /// because more writes were queued behind this notification. No old
    /// layout can be diffed against it, so every live list is reloaded and
    /// the selection intent is worked out on the current data.
    fn catch_up(&mut self, notification: &Notification) -> Vec<ViewOp> {
        tracing::debug!(
            kind = notification.kind(),
            revision = self.source.revision(),
            "logbook is ahead of the lists; reloading"
        );
        self.pending.clear();
        self.refresh_after_change();

        let mut ops: Vec<ViewOp> = self
            .live()
            .into_iter()
            .map(|surface| ViewOp::ReloadAll { surface })
            .collect();
        match notification {
            Notification::Added { flight } => {
                if let Ok(Some(at)) = self.projections.primary.coordinate_of(flight) {
                    ops.push(ViewOp::SelectAndReveal {
                        surface: Surface::Primary,
                        at,
                    });
                }
            }
            Notification::Deleted { hint, .. } if self.is_live(hint.surface) => {
                ops.push(self.reselect(hint.surface, hint.at));
            }
            _ => {}
        }
        ops
    }

    /// Every notification after a store change invalidates both snapshots;
    /// only the live ones are re-derived right away.
    fn refresh_after_change(&mut self) {
        for surface in Surface::ALL {
            self.projections[surface].mark_stale();
        }
        for surface in self.live() {
            self.projections[surface].refresh(&self.source);
        }
    }

    fn on_added(&mut self, flight: &Flight) -> Vec<ViewOp> {
        self.refresh_after_change();

        let mut ops = Vec::new();
        let mut present = false;
        for surface in self.live() {
            match self.projections[surface].coordinate_of(flight) {
                Ok(Some(at)) => {
                    present = true;
                    self.push_added(surface, at, &mut ops);
                }
                Ok(None) => {}
                Err(e) => {
                    present = true;
                    tracing::warn!(%surface, error = %e, "cannot place added flight; reloading");
                    ops.push(ViewOp::ReloadAll { surface });
                }
            }
        }

        if !present {
            ops.push(ViewOp::ReloadAll {
                surface: self.displayed(),
            });
        }
        ops
    }

    /// Insert the row (or its new section) for a flight now at `at`
    fn push_insert(&self, surface: Surface, at: Coordinate, ops: &mut Vec<ViewOp>) {
        if self.projections[surface].row_count(at.section) == Ok(1) {
            ops.push(ViewOp::InsertSection {
                surface,
                section: at.section,
            });
        } else {
            ops.push(ViewOp::InsertRow { surface, at });
        }
    }

    fn push_added(&self, surface: Surface, at: Coordinate, ops: &mut Vec<ViewOp>) {
        self.push_insert(surface, at, ops);
        if surface == Surface::Primary {
            ops.push(ViewOp::SelectAndReveal { surface, at });
        }
    }

    fn on_will_update(&mut self, flight: &Flight) {
        let mut capture = PerSurface::default();
        for surface in self.live() {
            let projection = &self.projections[surface];
            capture[surface] = match projection.coordinate_of(flight) {
                Ok(Some(at)) => match (projection.section_key(at.section), projection.row_count(at.section)) {
                    (Ok(key), Ok(rows)) => Some(Prior::At {
                        at,
                        key,
                        loner: rows == 1,
                    }),
                    _ => None,
                },
                Ok(None) => Some(Prior::Absent),
                Err(e) => {
                    tracing::debug!(%surface, error = %e, "no pre-update position");
                    None
                }
            };
        }
        self.pending.insert(flight.id, capture);
    }

    fn on_updated(&mut self, flight: &Flight) -> Vec<ViewOp> {
        let capture = self.pending.remove(&flight.id);
        self.refresh_after_change();

        let displayed = self.displayed();
        let prior = capture.and_then(|c| c[displayed]);

        let mut ops = Vec::new();
        self.reconcile_update(displayed, flight, prior, &mut ops);

        // The other live list is not tracked incrementally.
        for surface in self.live() {
            if surface != displayed {
                ops.push(ViewOp::ReloadAll { surface });
            }
        }
        ops
    }

    fn reconcile_update(
        &self,
        surface: Surface,
        flight: &Flight,
        prior: Option<Prior>,
        ops: &mut Vec<ViewOp>,
    ) {
        let projection = &self.projections[surface];
        let now = match projection.coordinate_of(flight) {
            Ok(now) => now,
            Err(e) => {
                tracing::warn!(%surface, error = %e, "cannot place updated flight; reloading");
                ops.push(ViewOp::ReloadAll { surface });
                return;
            }
        };

        let Some(prior) = prior else {
            tracing::debug!(%surface, id = %flight.id, "update without a captured position; reloading");
            ops.push(ViewOp::ReloadAll { surface });
            return;
        };

        match (prior, now) {
            (Prior::Absent, None) => {}
            (Prior::Absent, Some(at)) => self.push_added(surface, at, ops),
            (Prior::At { at, loner, .. }, None) => {
                // The flight no longer matches this list.
                ops.push(delete_op(surface, at, loner));
            }
            (Prior::At { at: old, key, loner }, Some(new)) => {
                let (Ok(new_key), Ok(new_rows)) = (
                    projection.section_key(new.section),
                    projection.row_count(new.section),
                ) else {
                    ops.push(ViewOp::ReloadAll { surface });
                    return;
                };

                let same_section = key == new_key;
                if same_section && old == new {
                    ops.push(ViewOp::ReloadRow { surface, at: old });
                    return;
                }

                let old_section_gone = loner && !same_section;
                let new_section_created = new_rows == 1 && !same_section;
                if !old_section_gone && !new_section_created {
                    ops.push(ViewOp::MoveRow {
                        surface,
                        from: old,
                        to: new,
                    });
                } else {
                    // A move cannot make a section appear or disappear.
                    ops.push(delete_op(surface, old, loner && old_section_gone));
                    self.push_insert(surface, new, ops);
                }
            }
        }
    }

    fn on_deleted(&mut self, flight: &Flight, hint: DeleteHint) -> Vec<ViewOp> {
        let owner = hint.surface;

        // Read the pre-deletion layout before the snapshot is replaced.
        let rows_before = if self.is_live(owner) {
            let projection = &self.projections[owner];
            match (projection.item_at(hint.at), projection.row_count(hint.at.section)) {
                (Ok(item), Ok(rows)) if item.id == flight.id => Some(rows),
                _ => None,
            }
        } else {
            None
        };

        self.refresh_after_change();

        let mut ops = Vec::new();
        match rows_before {
            Some(rows) => ops.push(delete_op(owner, hint.at, rows == 1)),
            None => {
                tracing::warn!(
                    surface = %owner,
                    at = %hint.at,
                    id = %flight.id,
                    "delete hint does not match the list; reloading"
                );
                if self.is_live(owner) {
                    ops.push(ViewOp::ReloadAll { surface: owner });
                }
            }
        }

        // Only the owner knows where the row was.
        for surface in self.live() {
            if surface != owner {
                ops.push(ViewOp::ReloadAll { surface });
            }
        }

        if !self.is_live(owner) {
            return ops;
        }

        ops.push(self.reselect(owner, hint.at));
        ops
    }

    fn reselect(&self, surface: Surface, removed: Coordinate) -> ViewOp {
        match nearest(self.projections[surface].sections(), removed) {
            Some(at) => ViewOp::ReselectNearest { surface, at },
            None => ViewOp::PromptCreateDefault { surface },
        }
    }
}

impl<S> DataSource for Reconciler<S> {
    fn sections(&self, surface: Surface) -> &[Section] {
        self.projections[surface].sections()
    }
}

fn delete_op(surface: Surface, at: Coordinate, whole_section: bool) -> ViewOp {
    if whole_section {
        ViewOp::DeleteSection {
            surface,
            section: at.section,
        }
    } else {
        ViewOp::DeleteRow { surface, at }
    }
}

/// The row to select after the row at `at` was removed: the same
/// coordinate if it still exists, else the last row of the same section,
/// else the last row of the last section. `None` when nothing is left.
fn nearest(sections: &[Section], at: Coordinate) -> Option<Coordinate> {
    match sections.get(at.section) {
        Some(section) => {
            let row = at.row.min(section.rows.len().checked_sub(1)?);
            Some(Coordinate::new(at.section, row))
        }
        None => {
            let section = sections.len().checked_sub(1)?;
            let row = sections[section].rows.len().checked_sub(1)?;
            Some(Coordinate::new(section, row))
        }
    }
}
