use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use super::IdentitySnapshot;

type Callback = Rc<RefCell<Box<dyn FnMut(&IdentitySnapshot)>>>;

struct Entry {
    id: u64,
    callback: Callback,
}

#[derive(Clone, Copy)]
enum Target {
    All,
    One(u64),
}

impl Target {
    fn includes(self, id: u64) -> bool {
        match self {
            Target::All => true,
            Target::One(target) => target == id,
        }
    }
}

#[derive(Default)]
struct Registry {
    entries: RefCell<Vec<Entry>>,
    next_id: Cell<u64>,
    pending: RefCell<VecDeque<(Target, IdentitySnapshot)>>,
    delivering: Cell<bool>,
}

impl Registry {
    fn contains(&self, id: u64) -> bool {
        self.entries.borrow().iter().any(|e| e.id == id)
    }

    fn remove(&self, id: u64) {
        self.entries.borrow_mut().retain(|e| e.id != id);
    }
}

/// Clears the delivering flag even if a callback panics.
struct DeliveryGuard<'a>(&'a Cell<bool>);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Subscriber registry shared by the identity clients.
///
/// Delivery is ordered and never re-entrant: a snapshot published from inside
/// a callback is queued and handed out after the current one finishes. A
/// subscriber released mid-delivery receives nothing further.
#[derive(Clone, Default)]
pub struct Subscribers {
    registry: Rc<Registry>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback without replaying any state.
    pub fn add(&self, on_change: Box<dyn FnMut(&IdentitySnapshot)>) -> Subscription {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);
        self.registry.entries.borrow_mut().push(Entry {
            id,
            callback: Rc::new(RefCell::new(on_change)),
        });
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
            released: false,
        }
    }

    /// Register a callback and deliver `current` to it alone.
    pub fn add_with_replay(
        &self,
        on_change: Box<dyn FnMut(&IdentitySnapshot)>,
        current: IdentitySnapshot,
    ) -> Subscription {
        let subscription = self.add(on_change);
        self.enqueue(Target::One(subscription.id), current);
        subscription
    }

    /// Publish a snapshot to every live subscriber.
    pub fn notify(&self, snapshot: IdentitySnapshot) {
        self.enqueue(Target::All, snapshot);
    }

    pub fn len(&self) -> usize {
        self.registry.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn enqueue(&self, target: Target, snapshot: IdentitySnapshot) {
        self.registry
            .pending
            .borrow_mut()
            .push_back((target, snapshot));
        self.drain();
    }

    fn drain(&self) {
        if self.registry.delivering.replace(true) {
            return;
        }
        let _guard = DeliveryGuard(&self.registry.delivering);

        loop {
            let next = self.registry.pending.borrow_mut().pop_front();
            let Some((target, snapshot)) = next else {
                break;
            };
            let callbacks: Vec<(u64, Callback)> = self
                .registry
                .entries
                .borrow()
                .iter()
                .filter(|e| target.includes(e.id))
                .map(|e| (e.id, Rc::clone(&e.callback)))
                .collect();

            for (id, callback) in callbacks {
                if !self.registry.contains(id) {
                    continue;
                }
                (callback.borrow_mut())(&snapshot);
            }
        }
    }
}

/// Owned registration with an identity client.
///
/// Released exactly once: by [`Subscription::release`] or on drop, whichever
/// comes first.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
    released: bool,
}

impl Subscription {
    pub fn release(mut self) {
        self.release_in_place();
    }

    pub fn is_active(&self) -> bool {
        !self.released
            && self
                .registry
                .upgrade()
                .is_some_and(|registry| registry.contains(self.id))
    }

    fn release_in_place(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_in_place();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("released", &self.released)
            .finish()
    }
}
