use super::Completer;
use crate::error::{AlreadyCompleted, Error};
use crate::util;
use crate::util::trampoline::{self, Deferred};
use self::State::*;

use log::{debug, error, trace};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::{fmt, mem};
use std::sync::Arc;

/// A single-assignment value that may not be available yet.
///
/// A `Future` is completed exactly once, either with a value through
/// [`set_result`](Future::set_result) or with an error through
/// [`set_error`](Future::set_error). Any number of threads may block on it
/// with [`wait`](Future::wait) or attach callbacks with
/// [`then`](Future::then), before or after completion.
///
/// Handles are cheap to clone and all clones refer to the same value.
pub struct Future<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Future<T> {
    /// Returns a new pending future.
    pub fn new() -> Future<T> {
        Future::with_state(Pending)
    }

    /// Returns a future already completed with `val`.
    pub fn completed(val: T) -> Future<T> {
        Future::with_state(Completed(val))
    }

    /// Returns a future already failed with `err`.
    pub fn failed<E: Into<Error>>(err: E) -> Future<T> {
        Future::with_state(Failed(err.into()))
    }

    /// Returns a new pending future along with its producer.
    pub fn pair() -> (Future<T>, Completer<T>) {
        let future = Future::new();
        let completer = Completer::new(future.clone());

        (future, completer)
    }

    /// Returns true once the future has been completed or failed.
    pub fn is_done(&self) -> bool {
        !self.lock().state.is_pending()
    }

    /// Completes the future with `val`, waking all waiters and then running
    /// every registered callback in registration order.
    ///
    /// Returns `AlreadyCompleted`, leaving the future untouched, if it was
    /// completed before.
    pub fn set_result(&self, val: T) -> Result<(), AlreadyCompleted> {
        self.complete(Completed(val))
    }

    /// Fails the future with `err`. Otherwise behaves like `set_result`.
    pub fn set_error<E: Into<Error>>(&self, err: E) -> Result<(), AlreadyCompleted> {
        self.complete(Failed(err.into()))
    }

    fn with_state(state: State<T>) -> Future<T> {
        Future {
            inner: Arc::new(Inner {
                core: Mutex::new(Core {
                    state,
                    callbacks: Vec::new(),
                    dispatching: false,
                }),
                condvar: Condvar::new(),
            }),
        }
    }

    fn complete(&self, state: State<T>) -> Result<(), AlreadyCompleted> {
        // Acquire the lock
        let mut core = self.lock();

        if !core.state.is_pending() {
            return Err(AlreadyCompleted);
        }

        debug!("completing future; outcome={}; callbacks={}",
               state.name(), core.callbacks.len());

        // Publish the value. Until dispatch finishes, new callbacks are
        // queued behind the ones already registered.
        core.state = state;
        core.dispatching = true;

        // Release the lock before notifying anyone. Callbacks may re-enter
        // this future.
        drop(core);

        self.inner.condvar.notify_all();
        self.dispatch();

        Ok(())
    }

    fn dispatch(&self) {
        loop {
            let callbacks = {
                let mut core = self.lock();

                if core.callbacks.is_empty() {
                    core.dispatching = false;
                    return;
                }

                mem::take(&mut core.callbacks)
            };

            for callback in callbacks {
                callback.invoke(self.clone());
            }
        }
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, Core<T>> {
        self.inner.core.lock()
    }
}

impl<T: Clone> Future<T> {
    /// Blocks the current thread until the future completes, then returns a
    /// clone of its value or error.
    pub fn wait(&self) -> Result<T, Error> {
        let mut core = self.lock();

        // Condvars may wake up spuriously, so the state is checked in a loop
        loop {
            if let Some(res) = core.state.result() {
                return res;
            }

            self.inner.condvar.wait(&mut core);
        }
    }

    /// Returns the outcome if the future is complete, without blocking.
    pub fn try_wait(&self) -> Option<Result<T, Error>> {
        self.lock().state.result()
    }

    /// Maps the future to `Future<U>` by applying `op` to the value.
    ///
    /// A failure is passed along to the returned future without calling `op`.
    pub fn map<U, F>(&self, op: F) -> Future<U>
        where T: Send + 'static,
              U: Send + 'static,
              F: FnOnce(T) -> U + Send + 'static,
    {
        self.then(move |parent| parent.wait().map(op))
    }
}

impl<T: Send + 'static> Future<T> {
    /// Chains a callback onto the future.
    ///
    /// `cb` receives this future once it is complete and can use `wait` to
    /// read the value or the error. The returned future completes with
    /// whatever `cb` returns. If `cb` panics, the returned future fails with
    /// an `ErrorKind::Panicked` error instead.
    ///
    /// If this future is already complete and its callbacks have all run,
    /// `cb` runs right away on the calling thread. If the completing thread is
    /// still running earlier callbacks, `cb` is queued behind them.
    pub fn then<U, F>(&self, cb: F) -> Future<U>
        where U: Send + 'static,
              F: FnOnce(Future<T>) -> Result<U, Error> + Send + 'static,
    {
        let ret = Future::new();
        let child = Deferred::new(ret.clone());

        self.ready(Callback::new(move |parent: Future<T>| {
            let res = match util::catch_panic(move || cb(parent)) {
                Ok(res) => res,
                Err(msg) => Err(Error::panicked(msg)),
            };

            let child = child.into_inner();

            // Completing the child runs the next link of the chain
            trampoline::run(move || {
                if child.complete(State::from(res)).is_err() {
                    debug!("chained future was completed before its callback returned");
                }
            });
        }));

        ret
    }

    /// Registers a callback to run once the future is complete.
    ///
    /// Unlike `then`, nothing observes the callback's outcome. A panic inside
    /// it is logged and does not stop the callbacks registered after it.
    pub fn add_done_callback<F>(&self, cb: F)
        where F: FnOnce(Future<T>) + Send + 'static,
    {
        self.ready(Callback::new(cb));
    }

    fn ready(&self, callback: Callback<T>) {
        // Acquire the lock
        let mut core = self.lock();

        if core.state.is_pending() || core.dispatching {
            trace!("queueing future callback; position={}", core.callbacks.len());
            core.callbacks.push(callback);
            return;
        }

        drop(core);

        trace!("future already complete; running callback immediately");
        callback.invoke(self.clone());
    }
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Future<T> {
        Future { inner: self.inner.clone() }
    }
}

impl<T> Default for Future<T> {
    fn default() -> Future<T> {
        Future::new()
    }
}

impl<T> fmt::Debug for Future<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (state, callbacks) = {
            let core = self.lock();
            (core.state.name(), core.callbacks.len())
        };

        fmt.debug_struct("Future")
            .field("state", &state)
            .field("callbacks", &callbacks)
            .finish()
    }
}

// == Implementation details ==
//
// A single mutex guards both the state and the callback list. The condvar is
// only used by `wait`; callbacks are dispatched by whichever thread completes
// the future, or by the registering thread once that dispatch has finished.
//
// `then` links hold their child through `Deferred` and complete it through
// the trampoline, so neither completing nor dropping a long chain recurses
// once per link.
struct Inner<T> {
    core: Mutex<Core<T>>,
    condvar: Condvar,
}

struct Core<T> {
    state: State<T>,
    // Only ever non-empty while pending or dispatching
    callbacks: Vec<Callback<T>>,
    // Set from completion until the completing thread has drained `callbacks`
    dispatching: bool,
}

struct Callback<T> {
    f: Box<dyn FnOnce(Future<T>) + Send>,
}

impl<T> Callback<T> {
    fn new<F>(f: F) -> Callback<T>
        where F: FnOnce(Future<T>) + Send + 'static,
    {
        Callback { f: Box::new(f) }
    }

    fn invoke(self, future: Future<T>) {
        let Callback { f } = self;

        if let Err(msg) = util::catch_panic(move || f(future)) {
            error!("future callback panicked; msg={}", msg);
        }
    }
}

enum State<T> {
    Pending,
    Completed(T),
    Failed(Error),
}

impl<T> State<T> {
    fn is_pending(&self) -> bool {
        match *self {
            Pending => true,
            _ => false,
        }
    }

    fn result(&self) -> Option<Result<T, Error>>
        where T: Clone,
    {
        match *self {
            Pending => None,
            Completed(ref val) => Some(Ok(val.clone())),
            Failed(ref err) => Some(Err(err.clone())),
        }
    }

    fn name(&self) -> &'static str {
        match *self {
            Pending => "Pending",
            Completed(..) => "Completed",
            Failed(..) => "Failed",
        }
    }
}

impl<T> From<Result<T, Error>> for State<T> {
    fn from(res: Result<T, Error>) -> State<T> {
        match res {
            Ok(val) => Completed(val),
            Err(err) => Failed(err),
        }
    }
}
