use std::cell::Cell;
use std::rc::Rc;

/// Marks which notification a piece of async work was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Activation-scoped liveness token.
///
/// Cloned into subscription callbacks and async work. Completion handlers
/// check [`is_current`](Self::is_current) before navigating or mutating
/// state: the activation must still be alive and no newer notification may
/// have arrived.
#[derive(Debug, Clone)]
pub struct Liveness {
    alive: Rc<Cell<bool>>,
    generation: Rc<Cell<u64>>,
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            alive: Rc::new(Cell::new(true)),
            generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// End the activation. Idempotent.
    pub fn end(&self) {
        self.alive.set(false);
    }

    /// Start tracking a new notification, superseding every earlier ticket.
    pub fn advance(&self) -> Ticket {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        Ticket(next)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.is_alive() && self.generation.get() == ticket.0
    }
}
