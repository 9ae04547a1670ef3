use serde::Serialize;

use crate::model::flight::Flight;
use crate::sync::ops::{Coordinate, Surface};

/// Where a deletion was requested from: the surface and the row the user
/// deleted. Only that surface knows the deleted flight's coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteHint {
    pub surface: Surface,
    pub at: Coordinate,
}

/// Change notifications raised by the logbook
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Added { flight: Flight },
    /// Raised before an update is attempted; carries the edited flight
    WillUpdate { flight: Flight },
    Updated { flight: Flight },
    /// The update announced by the preceding `WillUpdate` was rejected
    UpdateFailed { flight: Flight },
    Deleted { flight: Flight, hint: DeleteHint },
}

impl Notification {
    pub fn flight(&self) -> &Flight {
        match self {
            Notification::Added { flight }
            | Notification::WillUpdate { flight }
            | Notification::Updated { flight }
            | Notification::UpdateFailed { flight }
            | Notification::Deleted { flight, .. } => flight,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Added { .. } => "added",
            Notification::WillUpdate { .. } => "will_update",
            Notification::Updated { .. } => "updated",
            Notification::UpdateFailed { .. } => "update_failed",
            Notification::Deleted { .. } => "deleted",
        }
    }
}
