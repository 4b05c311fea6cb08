use super::Future;
use crate::error::{AlreadyCompleted, Error};

use log::debug;
use std::fmt;

/// The producing half of [`Future::pair`].
///
/// Completing consumes the completer. A completer dropped before it completes
/// fails its future with an `ErrorKind::Dropped` error, so waiters are not
/// left blocked forever.
pub struct Completer<T> {
    future: Future<T>,
}

impl<T> Completer<T> {
    pub(crate) fn new(future: Future<T>) -> Completer<T> {
        Completer { future }
    }

    /// Completes the future with `val`.
    pub fn complete(self, val: T) -> Result<(), AlreadyCompleted> {
        self.future.set_result(val)
    }

    /// Fails the future with `err`.
    pub fn fail<E: Into<Error>>(self, err: E) -> Result<(), AlreadyCompleted> {
        self.future.set_error(err)
    }

    /// Returns a handle to the future this completer produces.
    pub fn future(&self) -> Future<T> {
        self.future.clone()
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        // No-op when the future has already been completed
        if self.future.set_error(Error::dropped()).is_ok() {
            debug!("completer dropped without completing; failed its future");
        }
    }
}

impl<T> fmt::Debug for Completer<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Completer")
            .field("future", &self.future)
            .finish()
    }
}
