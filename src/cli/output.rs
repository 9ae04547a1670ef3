use serde::Serialize;

use crate::model::flight::Flight;
use crate::store::check::CheckIssue;
use crate::sync::ops::ViewOp;
use crate::sync::ordering::Section;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct SectionJson<'a> {
    pub year: i32,
    pub flights: &'a [Flight],
}

#[derive(Serialize)]
pub struct BatchJson<'a> {
    /// Script line the batch was caused by
    pub line: usize,
    pub action: &'a str,
    pub ops: &'a [ViewOp],
}

#[derive(Serialize)]
pub struct RejectedJson<'a> {
    pub line: usize,
    pub action: &'a str,
    pub error: String,
}

#[derive(Serialize)]
pub struct CheckJson<'a> {
    pub valid: bool,
    pub flights: usize,
    pub issues: &'a [CheckIssue],
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn sections_to_json(sections: &[Section]) -> Vec<SectionJson<'_>> {
    sections
        .iter()
        .map(|s| SectionJson {
            year: s.key,
            flights: &s.rows,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Minutes as `h:mm`
pub fn format_duration(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// One flight as a list row
pub fn format_flight_line(flight: &Flight) -> String {
    let mut line = format!(
        "{:<5} {}  {:<10} {:>6}",
        flight.id.to_string(),
        flight.date.format("%Y-%m-%d"),
        flight.aircraft,
        format_duration(flight.minutes)
    );
    if !flight.route.is_empty() {
        line.push_str("  ");
        line.push_str(&flight.route);
    }
    if !flight.remarks.is_empty() {
        line.push_str("  ");
        line.push_str(&flight.remarks);
    }
    line.trim_end().to_string()
}

/// The sectioned list: a year header followed by its flights, indented
pub fn format_sections(sections: &[Section]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(section.key.to_string());
        for flight in &section.rows {
            lines.push(format!("  {}", format_flight_line(flight)));
        }
    }
    lines
}

/// The batches one script action caused, headed by its line and name
pub fn format_step(line: usize, action: &str, batches: &[Vec<ViewOp>]) -> Vec<String> {
    let mut lines = vec![format!("{} {}", line, action)];
    let mut any = false;
    for batch in batches.iter().filter(|b| !b.is_empty()) {
        any = true;
        for op in batch {
            lines.push(format!("  {}", op));
        }
    }
    if !any {
        lines.push("  (no list changes)".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::flight::FlightId;
    use crate::sync::ops::{Coordinate, Surface};
    use crate::sync::ordering::group;
    use chrono::NaiveDate;

    fn flight(id: u64, day: &str) -> Flight {
        let mut f = Flight::new(NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap());
        f.id = FlightId(id);
        f
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(84), "1:24");
        assert_eq!(format_duration(600), "10:00");
    }

    #[test]
    fn test_format_flight_line() {
        let mut f = flight(12, "2023-06-01");
        f.aircraft = "N172SP".into();
        f.minutes = 90;
        f.route = "KPAO-KHAF".into();
        assert_eq!(
            format_flight_line(&f),
            "#12   2023-06-01  N172SP       1:30  KPAO-KHAF"
        );
    }

    #[test]
    fn test_format_sections() {
        let sections = group(vec![flight(1, "2022-01-01"), flight(2, "2023-01-01")]);
        let lines = format_sections(&sections);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "2023");
        assert!(lines[1].starts_with("  #2"));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "2022");
    }

    #[test]
    fn test_format_step() {
        let ops = vec![
            vec![],
            vec![ViewOp::ReloadRow {
                surface: Surface::Primary,
                at: Coordinate::new(0, 1),
            }],
        ];
        let lines = format_step(4, "update", &ops);
        assert_eq!(lines, vec!["4 update", "  primary: reload row (0,1)"]);
        assert_eq!(format_step(5, "select", &[]), vec!["5 select", "  (no list changes)"]);
    }

    #[test]
    fn test_sections_json_shape() {
        let sections = group(vec![flight(1, "2022-01-01")]);
        let json = serde_json::to_value(sections_to_json(&sections)).unwrap();
        assert_eq!(json[0]["year"], 2022);
        assert_eq!(json[0]["flights"][0]["id"], 1);
    }
}
