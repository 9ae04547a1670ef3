use serde::{Deserialize, Serialize};

use super::flight::FlightField;

/// Configuration from flightlog.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub limits: FieldLimits,
    #[serde(default)]
    pub log: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Payload fields the search text is matched against
    #[serde(default = "default_search_fields")]
    pub fields: Vec<FlightField>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            fields: default_search_fields(),
        }
    }
}

fn default_search_fields() -> Vec<FlightField> {
    FlightField::ALL.to_vec()
}

/// Maximum character counts for the free-text fields. A write exceeding
/// one of them is rejected by the logbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldLimits {
    #[serde(default = "default_aircraft_max_len")]
    pub aircraft_max_len: usize,
    #[serde(default = "default_route_max_len")]
    pub route_max_len: usize,
    #[serde(default = "default_remarks_max_len")]
    pub remarks_max_len: usize,
}

impl FieldLimits {
    pub fn max_len(&self, field: FlightField) -> usize {
        match field {
            FlightField::Aircraft => self.aircraft_max_len,
            FlightField::Route => self.route_max_len,
            FlightField::Remarks => self.remarks_max_len,
        }
    }
}

impl Default for FieldLimits {
    fn default() -> Self {
        FieldLimits {
            aircraft_max_len: default_aircraft_max_len(),
            route_max_len: default_route_max_len(),
            remarks_max_len: default_remarks_max_len(),
        }
    }
}

fn default_aircraft_max_len() -> usize {
    10
}

fn default_route_max_len() -> usize {
    64
}

fn default_remarks_max_len() -> usize {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `FLIGHTLOG_LOG` is unset (e.g. "warn",
    /// "flightlog=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
