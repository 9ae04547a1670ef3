use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::mpsc;

use super::notification::Notification;

/// Registry of subscriber channels, shared between a logbook and the
/// subscriptions it handed out.
#[derive(Debug, Default)]
pub(crate) struct Hub {
    next_id: u64,
    senders: Vec<(u64, mpsc::Sender<Notification>)>,
}

impl Hub {
    pub(crate) fn subscribe(hub: &Rc<RefCell<Hub>>) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut inner = hub.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.senders.push((id, tx));
        Subscription {
            id,
            hub: Rc::downgrade(hub),
            rx,
        }
    }

    /// Queue `notification` for every subscriber
    pub(crate) fn publish(&mut self, notification: &Notification) {
        // A closed receiver only happens if a subscription leaked its
        // channel; drop the sender in that case.
        self.senders
            .retain(|(_, tx)| tx.send(notification.clone()).is_ok());
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }

    fn unsubscribe(&mut self, id: u64) {
        self.senders.retain(|(sid, _)| *sid != id);
    }
}

/// A registration for logbook notifications.
///
/// Notifications are queued, never delivered inline, so whoever owns the
/// subscription drains it with [`Subscription::poll`] or
/// [`Subscription::try_next`] after the mutation returns. Dropping the
/// subscription unregisters it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    hub: Weak<RefCell<Hub>>,
    rx: mpsc::Receiver<Notification>,
}

impl Subscription {
    /// Next queued notification, if any
    pub fn try_next(&self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }

    /// Drain every queued notification
    pub fn poll(&self) -> Vec<Notification> {
        let mut queued = Vec::new();
        while let Ok(n) = self.rx.try_recv() {
            queued.push(n);
        }
        queued
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.borrow_mut().unsubscribe(self.id);
        }
    }
}
