//! Pure mappings between a flight's identity, its position in the flattened
//! (cross-section) ordering, and its (section, row) coordinate.

use crate::model::flight::{Flight, FlightId};

use super::error::SyncError;
use super::ops::Coordinate;
use super::ordering::{Section, compare, section_key};

/// Number of rows across all sections
pub fn flat_len(sections: &[Section]) -> usize {
    sections.iter().map(|s| s.rows.len()).sum()
}

/// Flat position of `flight`'s id, or `None` if it is not in `sections`.
///
/// The flight is first looked up by ordering, which is only reliable when its
/// date is the one the sections were built with. An entry being edited may
/// already carry a new date, so a miss falls back to scanning by id.
pub fn index_of(sections: &[Section], flight: &Flight) -> Option<usize> {
    by_ordering(sections, flight).or_else(|| by_id(sections, flight.id))
}

fn by_ordering(sections: &[Section], flight: &Flight) -> Option<usize> {
    let key = section_key(flight);
    let section = sections.binary_search_by(|s| key.cmp(&s.key)).ok()?;
    let row = sections[section]
        .rows
        .binary_search_by(|probe| compare(probe, flight))
        .ok()?;
    let before: usize = sections[..section].iter().map(|s| s.rows.len()).sum();
    Some(before + row)
}

fn by_id(sections: &[Section], id: FlightId) -> Option<usize> {
    sections
        .iter()
        .flat_map(|s| s.rows.iter())
        .position(|f| f.id == id)
}

/// Convert a flat position into a coordinate
pub fn index_to_coordinate(sections: &[Section], index: usize) -> Result<Coordinate, SyncError> {
    let mut remaining = index;
    for (section, s) in sections.iter().enumerate() {
        if remaining < s.rows.len() {
            return Ok(Coordinate::new(section, remaining));
        }
        remaining -= s.rows.len();
    }
    Err(SyncError::FlatIndexOutOfRange {
        index,
        len: flat_len(sections),
    })
}

/// Convert a coordinate into a flat position
pub fn coordinate_to_index(sections: &[Section], at: Coordinate) -> Result<usize, SyncError> {
    let s = sections.get(at.section).ok_or(SyncError::SectionOutOfRange {
        section: at.section,
        count: sections.len(),
    })?;
    if at.row >= s.rows.len() {
        return Err(SyncError::RowOutOfRange {
            section: at.section,
            row: at.row,
            count: s.rows.len(),
        });
    }
    let before: usize = sections[..at.section].iter().map(|s| s.rows.len()).sum();
    Ok(before + at.row)
}

/// Coordinate of the flight with `id`, if present
pub fn locate(sections: &[Section], id: FlightId) -> Option<Coordinate> {
    sections.iter().enumerate().find_map(|(section, s)| {
        s.rows
            .iter()
            .position(|f| f.id == id)
            .map(|row| Coordinate::new(section, row))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::ordering::group;
    use chrono::NaiveDate;

    fn flight(id: u64, date: &str) -> Flight {
        let mut f = Flight::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap());
        f.id = FlightId(id);
        f
    }

    fn sample() -> Vec<Section> {
        // [2023: 3] [2022: 2, 1]
        group(vec![
            flight(1, "2022-01-01"),
            flight(2, "2022-06-01"),
            flight(3, "2023-01-01"),
        ])
    }

    #[test]
    fn index_of_by_ordering() {
        let sections = sample();
        assert_eq!(index_of(&sections, &flight(3, "2023-01-01")), Some(0));
        assert_eq!(index_of(&sections, &flight(2, "2022-06-01")), Some(1));
        assert_eq!(index_of(&sections, &flight(1, "2022-01-01")), Some(2));
    }

    #[test]
    fn index_of_edited_flight_falls_back_to_id() {
        let sections = sample();
        // id 1 edited to a date the snapshot does not know about yet
        assert_eq!(index_of(&sections, &flight(1, "2023-06-01")), Some(2));
    }

    #[test]
    fn index_of_missing() {
        assert_eq!(index_of(&sample(), &flight(9, "2022-01-01")), None);
        assert_eq!(index_of(&[], &flight(1, "2022-01-01")), None);
    }

    #[test]
    fn flat_index_round_trip_through_coordinates() {
        let sections = sample();
        assert_eq!(index_to_coordinate(&sections, 0), Ok(Coordinate::new(0, 0)));
        assert_eq!(index_to_coordinate(&sections, 2), Ok(Coordinate::new(1, 1)));
        assert_eq!(coordinate_to_index(&sections, Coordinate::new(1, 1)), Ok(2));
    }

    #[test]
    fn out_of_range_lookups_fail() {
        let sections = sample();
        assert_eq!(
            index_to_coordinate(&sections, 3),
            Err(SyncError::FlatIndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            coordinate_to_index(&sections, Coordinate::new(2, 0)),
            Err(SyncError::SectionOutOfRange {
                section: 2,
                count: 2
            })
        );
        assert_eq!(
            coordinate_to_index(&sections, Coordinate::new(0, 1)),
            Err(SyncError::RowOutOfRange {
                section: 0,
                row: 1,
                count: 1
            })
        );
    }

    #[test]
    fn locate_by_id() {
        let sections = sample();
        assert_eq!(locate(&sections, FlightId(1)), Some(Coordinate::new(1, 1)));
        assert_eq!(locate(&sections, FlightId(42)), None);
    }
}
