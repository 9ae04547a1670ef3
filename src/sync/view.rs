use crate::model::flight::FlightId;

use super::ops::{Coordinate, PerSurface, Surface, ViewOp};
use super::ordering::Section;

/// Read access to the refreshed projections, the way a list widget asks
/// its data source for the rows it has to draw.
pub trait DataSource {
    fn sections(&self, surface: Surface) -> &[Section];
}

/// Something that shows the lists and applies the reconciler's batches
pub trait ViewAdapter {
    fn apply(&mut self, batch: &[ViewOp], data: &dyn DataSource);
}

/// Adapter that only remembers every batch it was given
#[derive(Debug, Default)]
pub struct Recorder {
    pub batches: Vec<Vec<ViewOp>>,
}

impl ViewAdapter for Recorder {
    fn apply(&mut self, batch: &[ViewOp], _data: &dyn DataSource) {
        self.batches.push(batch.to_vec());
    }
}

/// An in-memory copy of what each list surface displays, kept up to date
/// purely from the batches it is given.
///
/// Within a batch, deletions are applied against the old layout first
/// (highest index first), then sections and rows are inserted at their new
/// indices (lowest first), pulling the inserted rows from the data source.
/// Operations that do not fit the current layout are recorded as faults
/// rather than applied.
#[derive(Debug, Default)]
pub struct MirrorView {
    lists: PerSurface<Vec<Vec<FlightId>>>,
    prompts: PerSurface<usize>,
    faults: Vec<String>,
}

impl MirrorView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids per section as currently displayed on `surface`
    pub fn layout(&self, surface: Surface) -> &[Vec<FlightId>] {
        &self.lists[surface]
    }

    /// How many times `surface` asked to create a new flight
    pub fn prompts(&self, surface: Surface) -> usize {
        self.prompts[surface]
    }

    pub fn faults(&self) -> &[String] {
        &self.faults
    }

    /// Whether the mirrored layout equals what `data` holds for `surface`
    pub fn agrees_with(&self, surface: Surface, data: &dyn DataSource) -> bool {
        self.lists[surface] == layout_of(data.sections(surface))
    }

    fn apply_surface(&mut self, surface: Surface, ops: &[&ViewOp], data: &dyn DataSource) {
        if ops.iter().any(|op| matches!(op, ViewOp::ReloadAll { .. })) {
            self.lists[surface] = layout_of(data.sections(surface));
            return;
        }

        let mut deleted_sections = Vec::new();
        let mut deleted_rows = Vec::new();
        let mut inserted_sections = Vec::new();
        let mut inserted_rows = Vec::new();
        let mut reloaded_rows = Vec::new();

        for op in ops {
            match op {
                ViewOp::DeleteSection { section, .. } => deleted_sections.push(*section),
                ViewOp::DeleteRow { at, .. } => deleted_rows.push(*at),
                ViewOp::InsertSection { section, .. } => inserted_sections.push(*section),
                ViewOp::InsertRow { at, .. } => inserted_rows.push(*at),
                ViewOp::MoveRow { from, to, .. } => {
                    deleted_rows.push(*from);
                    inserted_rows.push(*to);
                }
                ViewOp::ReloadRow { at, .. } => reloaded_rows.push(*at),
                ViewOp::PromptCreateDefault { .. } => self.prompts[surface] += 1,
                ViewOp::SelectAndReveal { .. }
                | ViewOp::ReselectNearest { .. }
                | ViewOp::ReloadAll { .. } => {}
            }
        }

        let sections = data.sections(surface);
        let list = &mut self.lists[surface];

        deleted_rows.sort_unstable_by(|a, b| b.cmp(a));
        for at in deleted_rows {
            match list.get_mut(at.section) {
                Some(rows) if at.row < rows.len() => {
                    rows.remove(at.row);
                }
                _ => self.faults.push(format!("{surface}: delete row {at} out of range")),
            }
        }

        deleted_sections.sort_unstable_by(|a, b| b.cmp(a));
        for section in deleted_sections {
            if section < list.len() {
                list.remove(section);
            } else {
                self.faults
                    .push(format!("{surface}: delete section {section} out of range"));
            }
        }

        inserted_sections.sort_unstable();
        for section in inserted_sections {
            match sections.get(section) {
                Some(s) if section <= list.len() => {
                    list.insert(section, s.rows.iter().map(|f| f.id).collect());
                }
                _ => self
                    .faults
                    .push(format!("{surface}: insert section {section} out of range")),
            }
        }

        inserted_rows.sort_unstable();
        for at in inserted_rows {
            let id = row_id(sections, at);
            match (list.get_mut(at.section), id) {
                (Some(rows), Some(id)) if at.row <= rows.len() => rows.insert(at.row, id),
                _ => self.faults.push(format!("{surface}: insert row {at} out of range")),
            }
        }

        for at in reloaded_rows {
            let id = row_id(sections, at);
            match (list.get_mut(at.section).and_then(|r| r.get_mut(at.row)), id) {
                (Some(slot), Some(id)) => *slot = id,
                _ => self.faults.push(format!("{surface}: reload row {at} out of range")),
            }
        }
    }
}

impl ViewAdapter for MirrorView {
    fn apply(&mut self, batch: &[ViewOp], data: &dyn DataSource) {
        for surface in Surface::ALL {
            let ops: Vec<&ViewOp> = batch.iter().filter(|op| op.surface() == surface).collect();
            if !ops.is_empty() {
                self.apply_surface(surface, &ops, data);
            }
        }
    }
}

fn layout_of(sections: &[Section]) -> Vec<Vec<FlightId>> {
    sections
        .iter()
        .map(|s| s.rows.iter().map(|f| f.id).collect())
        .collect()
}

fn row_id(sections: &[Section], at: Coordinate) -> Option<FlightId> {
    sections
        .get(at.section)
        .and_then(|s| s.rows.get(at.row))
        .map(|f| f.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::flight::Flight;
    use crate::sync::ordering::group;
    use chrono::NaiveDate;

    struct Fixed(PerSurface<Vec<Section>>);

    impl DataSource for Fixed {
        fn sections(&self, surface: Surface) -> &[Section] {
            &self.0[surface]
        }
    }

    fn flight(id: u64, date: &str) -> Flight {
        let mut f = Flight::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap());
        f.id = FlightId(id);
        f
    }

    fn data(flights: Vec<Flight>) -> Fixed {
        Fixed(PerSurface {
            primary: group(flights),
            filtered: Vec::new(),
        })
    }

    fn ids(layout: &[Vec<FlightId>]) -> Vec<Vec<u64>> {
        layout
            .iter()
            .map(|rows| rows.iter().map(|id| id.0).collect())
            .collect()
    }

    #[test]
    fn reload_all_copies_the_data_source() {
        let d = data(vec![flight(1, "2022-01-01"), flight(2, "2023-01-01")]);
        let mut mirror = MirrorView::new();
        mirror.apply(&[ViewOp::ReloadAll { surface: Surface::Primary }], &d);
        assert_eq!(ids(mirror.layout(Surface::Primary)), vec![vec![2], vec![1]]);
        assert!(mirror.agrees_with(Surface::Primary, &d));
    }

    #[test]
    fn move_across_sections() {
        let before = data(vec![
            flight(1, "2022-01-01"),
            flight(2, "2022-06-01"),
            flight(3, "2023-01-01"),
        ]);
        let mut mirror = MirrorView::new();
        mirror.apply(&[ViewOp::ReloadAll { surface: Surface::Primary }], &before);

        let after = data(vec![
            flight(1, "2023-06-01"),
            flight(2, "2022-06-01"),
            flight(3, "2023-01-01"),
        ]);
        mirror.apply(
            &[ViewOp::MoveRow {
                surface: Surface::Primary,
                from: Coordinate::new(1, 1),
                to: Coordinate::new(0, 0),
            }],
            &after,
        );
        assert_eq!(ids(mirror.layout(Surface::Primary)), vec![vec![1, 3], vec![2]]);
        assert!(mirror.faults().is_empty());
    }

    #[test]
    fn delete_section_then_insert_section() {
        let before = data(vec![flight(1, "2022-01-01"), flight(3, "2023-01-01")]);
        let mut mirror = MirrorView::new();
        mirror.apply(&[ViewOp::ReloadAll { surface: Surface::Primary }], &before);

        // flight 1 moves from its own 2022 section to a new 2021 section
        let after = data(vec![flight(1, "2021-01-01"), flight(3, "2023-01-01")]);
        mirror.apply(
            &[
                ViewOp::DeleteSection {
                    surface: Surface::Primary,
                    section: 1,
                },
                ViewOp::InsertSection {
                    surface: Surface::Primary,
                    section: 1,
                },
            ],
            &after,
        );
        assert!(mirror.agrees_with(Surface::Primary, &after));
    }

    #[test]
    fn bad_operations_are_faults() {
        let d = data(vec![flight(1, "2022-01-01")]);
        let mut mirror = MirrorView::new();
        mirror.apply(
            &[ViewOp::DeleteRow {
                surface: Surface::Primary,
                at: Coordinate::new(4, 0),
            }],
            &d,
        );
        assert_eq!(mirror.faults().len(), 1);
    }

    #[test]
    fn prompts_are_counted() {
        let d = data(Vec::new());
        let mut mirror = MirrorView::new();
        mirror.apply(&[ViewOp::PromptCreateDefault { surface: Surface::Primary }], &d);
        assert_eq!(mirror.prompts(Surface::Primary), 1);
        assert_eq!(mirror.prompts(Surface::Filtered), 0);
    }

    #[test]
    fn recorder_keeps_batches() {
        let d = data(Vec::new());
        let mut rec = Recorder::default();
        rec.apply(&[ViewOp::ReloadAll { surface: Surface::Filtered }], &d);
        rec.apply(&[], &d);
        assert_eq!(rec.batches.len(), 2);
    }
}
