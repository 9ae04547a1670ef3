use std::cell::RefCell;
use std::rc::Rc;

use crate::model::flight::Flight;

use super::error::SyncError;
use super::filter::SearchFilter;
use super::ops::{Coordinate, Surface};
use super::ordering::Section;
use super::resolver;

/// Where a projection reads its flights from.
///
/// `query` returns the flights matching `filter` (all of them for `None`),
/// already ordered and grouped into sections. `revision` changes with
/// every write to the underlying flights.
pub trait RecordSource {
    fn query(&self, filter: Option<&SearchFilter>) -> Vec<Section>;
    fn revision(&self) -> u64;
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn query(&self, filter: Option<&SearchFilter>) -> Vec<Section> {
        (**self).query(filter)
    }

    fn revision(&self) -> u64 {
        (**self).revision()
    }
}

impl<T: RecordSource + ?Sized> RecordSource for Rc<RefCell<T>> {
    fn query(&self, filter: Option<&SearchFilter>) -> Vec<Section> {
        self.borrow().query(filter)
    }

    fn revision(&self) -> u64 {
        self.borrow().revision()
    }
}

/// A materialized, sectioned and ordered view of the flights matching an
/// optional search filter.
///
/// The projection keeps the snapshot from its last refresh. After a store
/// mutation it is marked stale; bounds and items can still be read from the
/// old snapshot (that is how the pre-mutation layout is recovered), but
/// coordinate lookups fail with [`SyncError::Stale`] until the next refresh.
#[derive(Debug, Clone)]
pub struct Projection {
    surface: Surface,
    filter: Option<SearchFilter>,
    sections: Vec<Section>,
    /// Source revision the snapshot was taken at
    revision: u64,
    stale: bool,
}

impl Projection {
    /// A projection that has not been refreshed yet (and is therefore stale)
    pub fn new(surface: Surface, filter: Option<SearchFilter>) -> Self {
        Projection {
            surface,
            filter,
            sections: Vec::new(),
            revision: 0,
            stale: true,
        }
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn filter(&self) -> Option<&SearchFilter> {
        self.filter.as_ref()
    }

    /// Replace the predicate. The snapshot is stale until the next refresh.
    pub fn set_filter(&mut self, filter: Option<SearchFilter>) {
        self.filter = filter;
        self.stale = true;
    }

    /// Re-derive the snapshot from `source`
    pub fn refresh<S: RecordSource + ?Sized>(&mut self, source: &S) {
        self.sections = source.query(self.filter.as_ref());
        self.revision = source.revision();
        self.stale = false;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn row_count(&self, section: usize) -> Result<usize, SyncError> {
        self.sections
            .get(section)
            .map(|s| s.rows.len())
            .ok_or(SyncError::SectionOutOfRange {
                section,
                count: self.sections.len(),
            })
    }

    /// Year of the given section
    pub fn section_key(&self, section: usize) -> Result<i32, SyncError> {
        self.sections
            .get(section)
            .map(|s| s.key)
            .ok_or(SyncError::SectionOutOfRange {
                section,
                count: self.sections.len(),
            })
    }

    pub fn item_at(&self, at: Coordinate) -> Result<&Flight, SyncError> {
        let count = self.row_count(at.section)?;
        self.sections[at.section]
            .rows
            .get(at.row)
            .ok_or(SyncError::RowOutOfRange {
                section: at.section,
                row: at.row,
                count,
            })
    }

    /// Flat position of `flight`, `Ok(None)` when it is filtered out or gone
    pub fn index_of(&self, flight: &Flight) -> Result<Option<usize>, SyncError> {
        self.ensure_fresh()?;
        Ok(resolver::index_of(&self.sections, flight))
    }

    pub fn index_to_coordinate(&self, index: usize) -> Result<Coordinate, SyncError> {
        self.ensure_fresh()?;
        resolver::index_to_coordinate(&self.sections, index)
    }

    /// `index_of` followed by `index_to_coordinate`
    pub fn coordinate_of(&self, flight: &Flight) -> Result<Option<Coordinate>, SyncError> {
        match self.index_of(flight)? {
            Some(index) => self.index_to_coordinate(index).map(Some),
            None => Ok(None),
        }
    }

    fn ensure_fresh(&self) -> Result<(), SyncError> {
        if self.stale {
            return Err(SyncError::Stale);
        }
        Ok(())
    }
}
