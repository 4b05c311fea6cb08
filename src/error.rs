use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Returned when completing a future that has already been completed.
///
/// This is a caller bug rather than a runtime condition: a future is
/// completed by exactly one producer, exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("future already completed")]
pub struct AlreadyCompleted;

/// A failure carried by a future as its terminal state.
///
/// Cloning is cheap; every waiter and every chained future observing the
/// failure shares the same underlying error.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    inner: Arc<Repr>,
}

/// What caused a future to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Set by the producer or returned by a callback
    Failed,
    /// A chained callback panicked
    Panicked,
    /// The completer went away without completing
    Dropped,
}

enum Repr {
    Source(BoxError),
    Message(String),
}

impl Error {
    /// Wraps an application error.
    pub fn new<E>(err: E) -> Error
        where E: Into<BoxError>
    {
        Error {
            kind: ErrorKind::Failed,
            inner: Arc::new(Repr::Source(err.into())),
        }
    }

    pub(crate) fn panicked(msg: String) -> Error {
        Error {
            kind: ErrorKind::Panicked,
            inner: Arc::new(Repr::Message(msg)),
        }
    }

    pub(crate) fn dropped() -> Error {
        Error {
            kind: ErrorKind::Dropped,
            inner: Arc::new(Repr::Message("completer dropped without completing".to_string())),
        }
    }

    /// Returns the cause of the failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns a reference to the wrapped application error if it is of
    /// type `E`.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match *self.inner {
            Repr::Source(ref err) => err.downcast_ref::<E>(),
            Repr::Message(..) => None,
        }
    }

    /// Returns true if both values are clones of the same failure.
    pub fn ptr_eq(&self, other: &Error) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.inner {
            Repr::Source(ref err) => fmt::Display::fmt(err, fmt),
            Repr::Message(ref msg) if self.kind == ErrorKind::Panicked => {
                write!(fmt, "callback panicked: {}", msg)
            }
            Repr::Message(ref msg) => fmt.write_str(msg),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = fmt.debug_struct("Error");
        dbg.field("kind", &self.kind);

        match *self.inner {
            Repr::Source(ref err) => dbg.field("source", err),
            Repr::Message(ref msg) => dbg.field("message", msg),
        };

        dbg.finish()
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self.inner {
            Repr::Source(ref err) => Some(&**err),
            Repr::Message(..) => None,
        }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Error {
        Error::new(msg)
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Error {
        Error::new(msg)
    }
}

impl From<BoxError> for Error {
    fn from(err: BoxError) -> Error {
        Error::new(err)
    }
}
