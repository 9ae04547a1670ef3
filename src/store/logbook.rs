use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::model::config::FieldLimits;
use crate::model::flight::{Flight, FlightField, FlightId};
use crate::sync::filter::SearchFilter;
use crate::sync::ordering::{Section, group};
use crate::sync::projection::RecordSource;

use super::notification::{DeleteHint, Notification};
use super::subscription::{Hub, Subscription};

/// A logbook shared between the code that edits it and the lists showing it
pub type SharedLogBook = Rc<RefCell<LogBook>>;

/// Error type for logbook writes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no flight with id {0}")]
    NotFound(FlightId),
    #[error("{field} is {len} characters long (limit {max})")]
    FieldTooLong {
        field: FlightField,
        len: usize,
        max: usize,
    },
    #[error("flight id {0} appears more than once")]
    DuplicateId(FlightId),
    #[error("no flight ids left to hand out")]
    IdSpaceExhausted,
}

/// The flight record store.
///
/// Every successful write raises a notification to all subscribers. An
/// update raises `WillUpdate` before it is attempted and then either
/// `Updated` or `UpdateFailed`.
#[derive(Debug)]
pub struct LogBook {
    flights: IndexMap<FlightId, Flight>,
    next_id: u64,
    /// Bumped by every successful add, update and delete
    revision: u64,
    limits: FieldLimits,
    hub: Rc<RefCell<Hub>>,
}

impl Default for LogBook {
    fn default() -> Self {
        LogBook::new(FieldLimits::default())
    }
}

impl LogBook {
    pub fn new(limits: FieldLimits) -> Self {
        LogBook {
            flights: IndexMap::new(),
            next_id: 1,
            revision: 0,
            limits,
            hub: Rc::new(RefCell::new(Hub::default())),
        }
    }

    /// Rebuild a logbook from stored flights. `next_id` is raised above the
    /// highest stored id if needed so that ids are never handed out twice.
    /// Fails on the first duplicated id, or when the highest stored id
    /// leaves no id to hand out.
    pub fn from_flights(
        flights: Vec<Flight>,
        next_id: u64,
        limits: FieldLimits,
    ) -> Result<Self, StoreError> {
        let mut book = LogBook::new(limits);
        let mut highest = 0;
        for flight in flights {
            highest = highest.max(flight.id.0);
            let id = flight.id;
            if book.flights.insert(id, flight).is_some() {
                return Err(StoreError::DuplicateId(id));
            }
        }
        let above_highest = highest.checked_add(1).ok_or(StoreError::IdSpaceExhausted)?;
        book.next_id = next_id.max(above_highest).max(1);
        Ok(book)
    }

    pub fn shared(self) -> SharedLogBook {
        Rc::new(RefCell::new(self))
    }

    pub fn subscribe(&self) -> Subscription {
        Hub::subscribe(&self.hub)
    }

    pub fn subscriber_count(&self) -> usize {
        self.hub.borrow().len()
    }

    pub fn get(&self, id: FlightId) -> Option<&Flight> {
        self.flights.get(&id)
    }

    /// Flights in the order they were logged
    pub fn iter(&self) -> impl Iterator<Item = &Flight> {
        self.flights.values()
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// The id the next added flight will get
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn limits(&self) -> &FieldLimits {
        &self.limits
    }

    /// Check `flight`'s text fields against the configured limits
    pub fn validate(&self, flight: &Flight) -> Result<(), StoreError> {
        for field in FlightField::ALL {
            let len = flight.field(field).chars().count();
            let max = self.limits.max_len(field);
            if len > max {
                return Err(StoreError::FieldTooLong { field, len, max });
            }
        }
        Ok(())
    }

    /// Log a new flight. Its id is assigned here; whatever id it carried is
    /// ignored.
    pub fn add(&mut self, mut flight: Flight) -> Result<FlightId, StoreError> {
        self.validate(&flight)?;
        let id = FlightId(self.next_id);
        self.next_id = self.next_id.checked_add(1).ok_or(StoreError::IdSpaceExhausted)?;
        flight.id = id;
        self.flights.insert(id, flight.clone());
        self.bump();
        tracing::debug!(%id, date = %flight.date, "flight added");
        self.publish(Notification::Added { flight });
        Ok(id)
    }

    /// Replace the stored flight with the same id
    pub fn update(&mut self, flight: Flight) -> Result<(), StoreError> {
        self.publish(Notification::WillUpdate {
            flight: flight.clone(),
        });

        let result = match self.flights.get(&flight.id) {
            None => Err(StoreError::NotFound(flight.id)),
            Some(_) => self.validate(&flight),
        };
        if let Err(e) = result {
            tracing::debug!(id = %flight.id, error = %e, "flight update rejected");
            self.publish(Notification::UpdateFailed { flight });
            return Err(e);
        }

        self.flights.insert(flight.id, flight.clone());
        self.bump();
        tracing::debug!(id = %flight.id, date = %flight.date, "flight updated");
        self.publish(Notification::Updated { flight });
        Ok(())
    }

    /// Remove a flight. `hint` names the list row the deletion was
    /// requested from and is passed on with the notification.
    pub fn delete(&mut self, id: FlightId, hint: DeleteHint) -> Result<Flight, StoreError> {
        let flight = self
            .flights
            .shift_remove(&id)
            .ok_or(StoreError::NotFound(id))?;
        self.bump();
        tracing::debug!(%id, "flight deleted");
        self.publish(Notification::Deleted {
            flight: flight.clone(),
            hint,
        });
        Ok(flight)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn publish(&self, notification: Notification) {
        self.hub.borrow_mut().publish(&notification);
    }
}

impl RecordSource for LogBook {
    fn query(&self, filter: Option<&SearchFilter>) -> Vec<Section> {
        group(
            self.flights
                .values()
                .filter(|f| filter.is_none_or(|flt| flt.matches(f)))
                .cloned()
                .collect(),
        )
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::ops::{Coordinate, Surface};
    use chrono::NaiveDate;

    fn flight(date: &str, aircraft: &str) -> Flight {
        let mut f = Flight::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap());
        f.aircraft = aircraft.into();
        f
    }

    fn hint() -> DeleteHint {
        DeleteHint {
            surface: Surface::Primary,
            at: Coordinate::new(0, 0),
        }
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut book = LogBook::default();
        let a = book.add(flight("2022-01-01", "")).unwrap();
        let b = book.add(flight("2022-01-02", "")).unwrap();
        assert_eq!((a, b), (FlightId(1), FlightId(2)));

        book.delete(b, hint()).unwrap();
        let c = book.add(flight("2022-01-03", "")).unwrap();
        assert_eq!(c, FlightId(3));
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn add_publishes_added() {
        let mut book = LogBook::default();
        let sub = book.subscribe();
        let id = book.add(flight("2022-01-01", "N172SP")).unwrap();
        let queued = sub.poll();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].kind(), "added");
        assert_eq!(queued[0].flight().id, id);
    }

    #[test]
    fn update_publishes_will_update_then_updated() {
        let mut book = LogBook::default();
        let id = book.add(flight("2022-01-01", "")).unwrap();
        let sub = book.subscribe();

        let mut edited = book.get(id).unwrap().clone();
        edited.date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        book.update(edited).unwrap();

        let kinds: Vec<_> = sub.poll().iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec!["will_update", "updated"]);
        assert_eq!(book.get(id).unwrap().year(), 2023);
    }

    #[test]
    fn rejected_update_publishes_update_failed_and_keeps_the_old_flight() {
        let mut book = LogBook::default();
        let id = book.add(flight("2022-01-01", "N172SP")).unwrap();
        let sub = book.subscribe();

        let mut edited = book.get(id).unwrap().clone();
        edited.aircraft = "N172SP-TOO-LONG".into();
        let err = book.update(edited).unwrap_err();
        assert_eq!(
            err,
            StoreError::FieldTooLong {
                field: FlightField::Aircraft,
                len: 15,
                max: 10
            }
        );

        let kinds: Vec<_> = sub.poll().iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec!["will_update", "update_failed"]);
        assert_eq!(book.get(id).unwrap().aircraft, "N172SP");
    }

    #[test]
    fn update_of_unknown_flight_fails() {
        let mut book = LogBook::default();
        let mut ghost = flight("2022-01-01", "");
        ghost.id = FlightId(9);
        assert_eq!(book.update(ghost), Err(StoreError::NotFound(FlightId(9))));
    }

    #[test]
    fn add_rejects_long_fields_without_notifying() {
        let mut book = LogBook::default();
        let sub = book.subscribe();
        let mut f = flight("2022-01-01", "");
        f.remarks = "x".repeat(501);
        assert!(book.add(f).is_err());
        assert!(sub.poll().is_empty());
        assert!(book.is_empty());
    }

    #[test]
    fn delete_passes_the_hint_along() {
        let mut book = LogBook::default();
        let id = book.add(flight("2022-01-01", "")).unwrap();
        let sub = book.subscribe();
        book.delete(id, hint()).unwrap();
        match sub.try_next() {
            Some(Notification::Deleted { flight, hint: h }) => {
                assert_eq!(flight.id, id);
                assert_eq!(h, hint());
            }
            other => panic!("expected Deleted, got {:?}", other),
        }
        assert_eq!(book.delete(id, hint()), Err(StoreError::NotFound(id)));
    }

    #[test]
    fn dropping_a_subscription_unregisters_it() {
        let mut book = LogBook::default();
        let sub = book.subscribe();
        let other = book.subscribe();
        assert_eq!(book.subscriber_count(), 2);
        drop(sub);
        assert_eq!(book.subscriber_count(), 1);
        book.add(flight("2022-01-01", "")).unwrap();
        assert_eq!(other.poll().len(), 1);
    }

    #[test]
    fn query_filters_and_groups() {
        let mut book = LogBook::default();
        book.add(flight("2022-01-01", "N172SP")).unwrap();
        book.add(flight("2022-06-01", "N9876")).unwrap();
        book.add(flight("2023-01-01", "N172SP")).unwrap();

        let all = book.query(None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].key, 2023);

        let filter = SearchFilter::new("n98", &FlightField::ALL).unwrap();
        let some = book.query(filter.as_ref());
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].rows[0].id, FlightId(2));
    }

    #[test]
    fn from_flights_raises_next_id_and_rejects_duplicates() {
        let mut a = flight("2022-01-01", "");
        a.id = FlightId(7);
        let book = LogBook::from_flights(vec![a.clone()], 3, FieldLimits::default()).unwrap();
        assert_eq!(book.next_id(), 8);

        let err = LogBook::from_flights(vec![a.clone(), a], 1, FieldLimits::default()).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(FlightId(7)));
    }

    #[test]
    fn highest_possible_id_leaves_nothing_to_hand_out() {
        let mut last = flight("2022-01-01", "");
        last.id = FlightId(u64::MAX);
        let err = LogBook::from_flights(vec![last], 1, FieldLimits::default()).unwrap_err();
        assert_eq!(err, StoreError::IdSpaceExhausted);
    }

    #[test]
    fn add_fails_once_the_id_counter_is_exhausted() {
        let mut book = LogBook::from_flights(Vec::new(), u64::MAX, FieldLimits::default()).unwrap();
        let sub = book.subscribe();
        assert_eq!(
            book.add(flight("2022-01-01", "")),
            Err(StoreError::IdSpaceExhausted)
        );
        assert!(book.is_empty());
        assert!(sub.poll().is_empty());
        assert_eq!(book.next_id(), u64::MAX);
    }

    #[test]
    fn revision_counts_successful_writes_only() {
        let mut book = LogBook::default();
        assert_eq!(book.revision(), 0);
        let id = book.add(flight("2022-01-01", "")).unwrap();
        let mut edited = book.get(id).unwrap().clone();
        edited.remarks = "night".into();
        book.update(edited.clone()).unwrap();
        edited.aircraft = "N172SP-TOO-LONG".into();
        assert!(book.update(edited).is_err());
        assert_eq!(book.revision(), 2);
        book.delete(id, hint()).unwrap();
        assert_eq!(book.revision(), 3);
    }
}
