//! Bounds the stack depth of nested completions.
//!
//! Completing a chained future runs its callbacks, which complete the next
//! link, and so on. Each level goes through `run`. Past `MAX_DEPTH` nested
//! levels on one thread, work is queued instead and drained by the outermost
//! `run` on that thread before it returns.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

const MAX_DEPTH: usize = 32;

type Job = Box<dyn FnOnce()>;

thread_local! {
    static DEPTH: Cell<usize> = Cell::new(0);
    static QUEUE: RefCell<VecDeque<Job>> = RefCell::new(VecDeque::new());
}

/// Runs `f` now, or once the stack has unwound back to the outermost `run`
/// if this thread is already nested too deeply.
pub fn run<F: FnOnce() + 'static>(f: F) {
    let depth = DEPTH.with(Cell::get);

    if depth >= MAX_DEPTH {
        QUEUE.with(|queue| queue.borrow_mut().push_back(Box::new(f)));
        return;
    }

    let _guard = Enter::new(depth);

    f();

    if depth > 0 {
        return;
    }

    // Outermost frame, drain whatever deeper frames queued up
    while let Some(job) = QUEUE.with(|queue| queue.borrow_mut().pop_front()) {
        job();
    }
}

/// Holds a value whose drop may recurse, dropping it through `run`.
pub struct Deferred<V: 'static> {
    value: Option<V>,
}

impl<V: 'static> Deferred<V> {
    pub fn new(value: V) -> Deferred<V> {
        Deferred { value: Some(value) }
    }

    pub fn into_inner(mut self) -> V {
        self.value.take().expect("[BUG] deferred value already taken")
    }
}

impl<V: 'static> Drop for Deferred<V> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            run(move || drop(value));
        }
    }
}

// Restores the depth even if a job unwinds
struct Enter {
    prev: usize,
}

impl Enter {
    fn new(prev: usize) -> Enter {
        DEPTH.with(|depth| depth.set(prev + 1));
        Enter { prev }
    }
}

impl Drop for Enter {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(self.prev));
    }
}
