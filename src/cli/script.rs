use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::flight::{Flight, FlightId};
use crate::sync::ops::{Coordinate, Surface};

/// One step of a replay script.
///
/// ```text
/// {"action": "add", "date": "2023-06-01", "aircraft": "N172SP"}
/// {"action": "update", "id": 1, "date": "2021-01-01"}
/// {"action": "delete", "section": 0, "row": 0}
/// {"action": "search", "text": "172"}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Add {
        date: NaiveDate,
        #[serde(default)]
        aircraft: String,
        #[serde(default)]
        route: String,
        #[serde(default)]
        remarks: String,
        #[serde(default)]
        minutes: u32,
    },
    /// Edit a flight; fields left out keep their value
    Update {
        id: FlightId,
        date: Option<NaiveDate>,
        aircraft: Option<String>,
        route: Option<String>,
        remarks: Option<String>,
        minutes: Option<u32>,
    },
    /// Submit an edit the logbook rejects (aircraft over its length limit)
    FailUpdate { id: FlightId },
    /// Delete the flight shown at a row; `surface` defaults to the
    /// displayed list
    Delete {
        surface: Option<Surface>,
        section: usize,
        row: usize,
    },
    Select {
        surface: Option<Surface>,
        section: usize,
        row: usize,
    },
    Search { text: String },
    EndSearch,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Add { .. } => "add",
            Action::Update { .. } => "update",
            Action::FailUpdate { .. } => "fail_update",
            Action::Delete { .. } => "delete",
            Action::Select { .. } => "select",
            Action::Search { .. } => "search",
            Action::EndSearch => "end_search",
        }
    }
}

/// Fields of an `update` action applied over the stored flight
pub fn apply_update(
    flight: &mut Flight,
    date: Option<NaiveDate>,
    aircraft: Option<String>,
    route: Option<String>,
    remarks: Option<String>,
    minutes: Option<u32>,
) {
    if let Some(d) = date {
        flight.date = d;
    }
    if let Some(a) = aircraft {
        flight.aircraft = a;
    }
    if let Some(r) = route {
        flight.route = r;
    }
    if let Some(r) = remarks {
        flight.remarks = r;
    }
    if let Some(m) = minutes {
        flight.minutes = m;
    }
}

pub fn target(surface: Option<Surface>, displayed: Surface, section: usize, row: usize) -> (Surface, Coordinate) {
    (surface.unwrap_or(displayed), Coordinate::new(section, row))
}

#[derive(Debug, thiserror::Error)]
#[error("script line {line}: {source}")]
pub struct ScriptError {
    pub line: usize,
    pub source: serde_json::Error,
}

/// Parse a script into `(line number, action)` pairs. Blank lines and
/// lines starting with `#` are skipped.
pub fn parse_script(text: &str) -> Result<Vec<(usize, Action)>, ScriptError> {
    let mut actions = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let action = serde_json::from_str(line).map_err(|source| ScriptError {
            line: i + 1,
            source,
        })?;
        actions.push((i + 1, action));
    }
    Ok(actions)
}
