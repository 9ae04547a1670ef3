use std::cmp::Ordering;

use serde::Serialize;

use crate::model::flight::Flight;

/// Order flights newest first; flights on the same date fall back to the
/// newer id first. Equal ids are the same flight and compare equal.
pub fn compare(a: &Flight, b: &Flight) -> Ordering {
    if a.id == b.id {
        return Ordering::Equal;
    }
    b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
}

/// Key of the section a flight is grouped under
pub fn section_key(flight: &Flight) -> i32 {
    flight.year()
}

/// One group of consecutive rows sharing a section key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub key: i32,
    pub rows: Vec<Flight>,
}

/// Sort `flights` under the ordering rule and split them into sections.
///
/// Because the year is derived from the date and dates sort descending,
/// consecutive runs of the same key are exactly the sections, already in
/// descending-year order.
pub fn group(mut flights: Vec<Flight>) -> Vec<Section> {
    flights.sort_by(compare);

    let mut sections: Vec<Section> = Vec::new();
    for flight in flights {
        let key = section_key(&flight);
        match sections.last_mut() {
            Some(last) if last.key == key => last.rows.push(flight),
            _ => sections.push(Section {
                key,
                rows: vec![flight],
            }),
        }
    }
    sections
}
