/// Failures of coordinate lookups against a projection.
///
/// None of these reach the view layer: the reconciler absorbs them by
/// falling back to a full reload of the affected surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("section {section} out of range (section count {count})")]
    SectionOutOfRange { section: usize, count: usize },
    #[error("row {row} out of range in section {section} (row count {count})")]
    RowOutOfRange {
        section: usize,
        row: usize,
        count: usize,
    },
    #[error("flat index {index} out of range (length {len})")]
    FlatIndexOutOfRange { index: usize, len: usize },
    #[error("projection is stale and must be refreshed first")]
    Stale,
}
