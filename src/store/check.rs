use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::model::config::FieldLimits;
use crate::model::flight::{Flight, FlightField, FlightId};

/// A problem found in stored logbook data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum CheckIssue {
    /// Ids start at 1
    ZeroId,
    DuplicateId { id: FlightId },
    /// `next_id` would hand out an id that is already taken
    NextIdTooLow { next_id: u64, highest: u64 },
    FieldTooLong {
        id: FlightId,
        field: FlightField,
        len: usize,
        max: usize,
    },
}

impl fmt::Display for CheckIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckIssue::ZeroId => write!(f, "a flight has id 0"),
            CheckIssue::DuplicateId { id } => write!(f, "id {id} is used more than once"),
            CheckIssue::NextIdTooLow { next_id, highest } => {
                write!(f, "next_id {next_id} is not above the highest id {highest}")
            }
            CheckIssue::FieldTooLong { id, field, len, max } => {
                write!(f, "{id}: {field} is {len} characters long (limit {max})")
            }
        }
    }
}

/// Validate stored flights and the id counter
pub fn check_flights(flights: &[Flight], next_id: u64, limits: &FieldLimits) -> Vec<CheckIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    let mut highest = 0;

    for flight in flights {
        if flight.id.0 == 0 {
            issues.push(CheckIssue::ZeroId);
        } else if !seen.insert(flight.id) {
            issues.push(CheckIssue::DuplicateId { id: flight.id });
        }
        highest = highest.max(flight.id.0);

        for field in FlightField::ALL {
            let len = flight.field(field).chars().count();
            let max = limits.max_len(field);
            if len > max {
                issues.push(CheckIssue::FieldTooLong {
                    id: flight.id,
                    field,
                    len,
                    max,
                });
            }
        }
    }

    if !flights.is_empty() && next_id <= highest {
        issues.push(CheckIssue::NextIdTooLow { next_id, highest });
    }

    issues
}
