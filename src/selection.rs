//! Active selection of the editor and the change notifications panels listen to.

use crate::host::ObjectRef;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    queues: Vec<(u64, VecDeque<Option<ObjectRef>>)>,
}

/// Owner of the current selection. Lives on the UI thread only.
#[derive(Default)]
pub struct SelectionBus {
    current: Option<ObjectRef>,
    subscribers: Rc<RefCell<Subscribers>>,
}

impl SelectionBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<ObjectRef> {
        self.current
    }

    /// Replace the active selection. Subscribers are only notified when the
    /// selection actually changes.
    pub fn select(&mut self, selection: Option<ObjectRef>) -> bool {
        if self.current == selection {
            return false;
        }
        self.current = selection;
        let mut subscribers = self.subscribers.borrow_mut();
        for (_, queue) in subscribers.queues.iter_mut() {
            queue.push_back(selection);
        }
        true
    }

    pub fn subscribe(&self) -> SelectionSubscription {
        let mut subscribers = self.subscribers.borrow_mut();
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.queues.push((id, VecDeque::new()));
        SelectionSubscription { id, subscribers: Rc::downgrade(&self.subscribers) }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().queues.len()
    }
}

/// Registration with a [`SelectionBus`]. Dropping it unsubscribes.
pub struct SelectionSubscription {
    id: u64,
    subscribers: Weak<RefCell<Subscribers>>,
}

impl SelectionSubscription {
    /// Pending notifications, oldest first. Empty once the bus is gone.
    pub fn drain(&self) -> Vec<Option<ObjectRef>> {
        let Some(subscribers) = self.subscribers.upgrade() else {
            return Vec::new();
        };
        let mut subscribers = subscribers.borrow_mut();
        subscribers
            .queues
            .iter_mut()
            .find(|(id, _)| *id == self.id)
            .map(|(_, queue)| queue.drain(..).collect())
            .unwrap_or_default()
    }
}

impl Drop for SelectionSubscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.borrow_mut().queues.retain(|(id, _)| *id != self.id);
        }
    }
}
