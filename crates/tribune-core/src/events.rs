//! Synchronous publish/subscribe channel.
//!
//! Listeners are invoked in registration order, inside the call stack of
//! [`EventBus::emit`]. There is no queueing: a listener that triggers
//! another emission on the same bus is delivered to immediately, except that
//! a listener is never re-entered while it is already running.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener<E> = Rc<RefCell<dyn FnMut(&E)>>;
type Liveness = Rc<dyn Fn() -> bool>;

struct Slot<E> {
    id: ListenerId,
    listener: Listener<E>,
    alive: Option<Liveness>,
}

/// An explicit, single-threaded event channel.
///
/// All methods take `&self`, so listeners may subscribe, unsubscribe or
/// emit while a delivery is in progress.
pub struct EventBus<E> {
    slots: RefCell<Vec<Slot<E>>>,
    next_id: Cell<u64>,
}

impl<E> EventBus<E> {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a listener. It receives every event emitted after this call.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        self.insert(Rc::new(RefCell::new(listener)), None)
    }

    /// Register a listener that stays subscribed only while `alive` returns
    /// `true`.
    ///
    /// Once `alive` fails the listener is never called again and its slot is
    /// dropped on the next `subscribe`, `emit`, `len` or `is_empty`. `alive`
    /// must not touch this bus.
    pub fn subscribe_while<A, F>(&self, alive: A, listener: F) -> ListenerId
    where
        A: Fn() -> bool + 'static,
        F: FnMut(&E) + 'static,
    {
        let alive: Liveness = Rc::new(alive);
        self.insert(Rc::new(RefCell::new(listener)), Some(alive))
    }

    fn insert(&self, listener: Listener<E>, alive: Option<Liveness>) -> ListenerId {
        self.prune();
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.slots.borrow_mut().push(Slot { id, listener, alive });
        id
    }

    /// Drop listeners whose liveness check fails.
    fn prune(&self) {
        let probes: Vec<(ListenerId, Liveness)> = self
            .slots
            .borrow()
            .iter()
            .filter_map(|s| s.alive.as_ref().map(|a| (s.id, Rc::clone(a))))
            .collect();
        let dead: Vec<ListenerId> = probes
            .into_iter()
            .filter(|(_, alive)| !(**alive)())
            .map(|(id, _)| id)
            .collect();
        if !dead.is_empty() {
            self.slots.borrow_mut().retain(|s| !dead.contains(&s.id));
        }
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|s| s.id != id);
        slots.len() != before
    }

    /// Whether `id` is currently registered.
    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.slots.borrow().iter().any(|s| s.id == id)
    }

    /// Deliver `event` to every registered listener, in registration order.
    ///
    /// Listeners removed by an earlier listener during the same delivery are
    /// skipped; listeners added during delivery first see the next event.
    pub fn emit(&self, event: &E) {
        self.prune();
        let snapshot: Vec<(ListenerId, Listener<E>)> = self
            .slots
            .borrow()
            .iter()
            .map(|s| (s.id, Rc::clone(&s.listener)))
            .collect();

        for (id, listener) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            match listener.try_borrow_mut() {
                Ok(mut f) => (&mut *f)(event),
                Err(_) => {
                    log::warn!("listener {id:?} re-entered during its own delivery; skipped");
                }
            }
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.prune();
        self.slots.borrow().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.prune();
        self.slots.borrow().is_empty()
    }

    /// Remove every listener.
    pub fn clear(&self) {
        self.slots.borrow_mut().clear();
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.len())
            .finish()
    }
}
