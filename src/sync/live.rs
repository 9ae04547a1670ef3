use crate::model::flight::{FlightField, FlightId};
use crate::store::logbook::SharedLogBook;
use crate::store::subscription::Subscription;

use super::error::SyncError;
use super::ops::{Coordinate, Surface, ViewOp};
use super::projection::Projection;
use super::reconciler::Reconciler;
use super::selection::{Selected, SelectionTracker};
use super::view::ViewAdapter;

/// A logbook list kept live on a view: owns the reconciler, the selection
/// of each surface and the logbook subscription.
///
/// Mutations of the logbook only queue notifications; [`pump`] pushes them
/// through to the view. Pumping after each mutation gives row-level
/// updates, while several writes pumped together reload the lists. Dropping
/// the live list unsubscribes it.
///
/// [`pump`]: LiveList::pump
#[derive(Debug)]
pub struct LiveList {
    reconciler: Reconciler<SharedLogBook>,
    selection: SelectionTracker,
    subscription: Subscription,
}

impl LiveList {
    /// Subscribe to `book` and show its flights on `view`
    pub fn attach(
        book: &SharedLogBook,
        search_fields: Vec<FlightField>,
        view: &mut dyn ViewAdapter,
    ) -> Self {
        let subscription = book.borrow().subscribe();
        let mut list = LiveList {
            reconciler: Reconciler::new(book.clone(), search_fields),
            selection: SelectionTracker::new(),
            subscription,
        };
        let ops = list.reconciler.attach();
        list.deliver(&ops, view);
        list
    }

    /// Process every queued notification in order. Returns the batch
    /// emitted for each one, empty batches included.
    pub fn pump(&mut self, view: &mut dyn ViewAdapter) -> Vec<Vec<ViewOp>> {
        let mut batches = Vec::new();
        while let Some(notification) = self.subscription.try_next() {
            let ops = self.reconciler.handle(&notification);
            tracing::trace!(
                kind = notification.kind(),
                ops = ops.len(),
                structural = ops.iter().any(ViewOp::is_structural),
                "batch"
            );
            self.deliver(&ops, view);
            batches.push(ops);
        }
        batches
    }

    pub fn begin_search(
        &mut self,
        text: &str,
        view: &mut dyn ViewAdapter,
    ) -> Result<Vec<ViewOp>, regex::Error> {
        let ops = self.reconciler.begin_search(text)?;
        self.deliver(&ops, view);
        Ok(ops)
    }

    /// Change the search text; the previous results' selection is dropped
    pub fn set_search_text(
        &mut self,
        text: &str,
        view: &mut dyn ViewAdapter,
    ) -> Result<Vec<ViewOp>, regex::Error> {
        let ops = self.reconciler.set_search_text(text)?;
        self.selection.clear(Surface::Filtered);
        self.deliver(&ops, view);
        Ok(ops)
    }

    pub fn end_search(&mut self, view: &mut dyn ViewAdapter) -> Vec<ViewOp> {
        let ops = self.reconciler.end_search();
        self.deliver(&ops, view);
        ops
    }

    /// Select the row at `at` on `surface`
    pub fn select(&mut self, surface: Surface, at: Coordinate) -> Result<FlightId, SyncError> {
        if !self.reconciler.is_live(surface) {
            return Err(SyncError::Stale);
        }
        self.selection.select(surface, at, &self.reconciler)
    }

    pub fn selected(&self, surface: Surface) -> Option<Selected> {
        self.selection.selected(surface)
    }

    pub fn displayed(&self) -> Surface {
        self.reconciler.displayed()
    }

    pub fn is_searching(&self) -> bool {
        self.reconciler.is_searching()
    }

    pub fn projection(&self, surface: Surface) -> &Projection {
        self.reconciler.projection(surface)
    }

    pub fn reconciler(&self) -> &Reconciler<SharedLogBook> {
        &self.reconciler
    }

    /// Selection first, so the view sees the batch's final selection
    fn deliver(&mut self, ops: &[ViewOp], view: &mut dyn ViewAdapter) {
        if ops.is_empty() {
            return;
        }
        self.selection.apply(ops, &self.reconciler);
        view.apply(ops, &self.reconciler);
    }
}
