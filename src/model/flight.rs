use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Identifier of a flight log entry.
///
/// Assigned by the logbook when the entry is created, strictly increasing and
/// never handed out twice, even after the entry is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightId(pub u64);

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single flight log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: FlightId,
    /// Date the flight took place
    pub date: NaiveDate,
    /// Aircraft tail number (e.g. `N172SP`)
    #[serde(default)]
    pub aircraft: String,
    /// Free-form route, usually `KPAO-KHAF-KPAO`
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub remarks: String,
    /// Total flight time in minutes
    #[serde(default)]
    pub minutes: u32,
}

impl Flight {
    /// Create an empty entry for the given date. The id is overwritten when
    /// the entry is added to a logbook.
    pub fn new(date: NaiveDate) -> Self {
        Flight {
            id: FlightId(0),
            date,
            aircraft: String::new(),
            route: String::new(),
            remarks: String::new(),
            minutes: 0,
        }
    }

    /// The year this flight is grouped under
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Value of a searchable payload field by name
    pub fn field(&self, name: FlightField) -> &str {
        match name {
            FlightField::Aircraft => &self.aircraft,
            FlightField::Route => &self.route,
            FlightField::Remarks => &self.remarks,
        }
    }
}

/// Two entries with the same id are the same logical flight, whatever their
/// other fields say while an edit is in flight.
impl PartialEq for Flight {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Flight {}

/// Text fields of a flight that can be searched and length-limited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightField {
    Aircraft,
    Route,
    Remarks,
}

impl FlightField {
    pub const ALL: [FlightField; 3] = [FlightField::Aircraft, FlightField::Route, FlightField::Remarks];
}

impl fmt::Display for FlightField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightField::Aircraft => write!(f, "aircraft"),
            FlightField::Route => write!(f, "route"),
            FlightField::Remarks => write!(f, "remarks"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn equality_is_identity() {
        let mut a = Flight::new(date(2022, 1, 1));
        a.id = FlightId(7);
        let mut b = a.clone();
        b.date = date(2023, 6, 1);
        b.remarks = "edited".into();
        assert_eq!(a, b);

        b.id = FlightId(8);
        assert_ne!(a, b);
    }

    #[test]
    fn year_comes_from_date() {
        assert_eq!(Flight::new(date(1999, 12, 31)).year(), 1999);
    }

    #[test]
    fn serde_defaults_payload_fields() {
        let f: Flight = serde_json::from_str(r#"{"id":3,"date":"2022-06-01"}"#).unwrap();
        assert_eq!(f.id, FlightId(3));
        assert_eq!(f.date, date(2022, 6, 1));
        assert!(f.aircraft.is_empty());
        assert_eq!(f.minutes, 0);
    }

    #[test]
    fn field_lookup() {
        let mut f = Flight::new(date(2022, 1, 1));
        f.aircraft = "N172SP".into();
        f.route = "KPAO-KHAF".into();
        assert_eq!(f.field(FlightField::Aircraft), "N172SP");
        assert_eq!(f.field(FlightField::Route), "KPAO-KHAF");
        assert_eq!(f.field(FlightField::Remarks), "");
    }
}
