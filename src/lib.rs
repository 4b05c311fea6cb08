//! A single-assignment future for propagating results across threads.
//!
//! A [`Future`] starts out pending and is completed exactly once by its
//! producer, with either a value or an [`Error`]. Consumers can block on it
//! with [`Future::wait`], or chain continuations with [`Future::then`].
//! Continuations run in registration order on the thread that completes the
//! future, or right away on the registering thread when the future is
//! already complete.
//!
//! ```
//! use deferred::Future;
//! use std::thread;
//!
//! let f = Future::new();
//! let g = f.then(|f: Future<i32>| Ok(f.wait()? + 1));
//!
//! let producer = f.clone();
//! thread::spawn(move || producer.set_result(5).unwrap());
//!
//! assert_eq!(f.wait().unwrap(), 5);
//! assert_eq!(g.wait().unwrap(), 6);
//! ```

pub use crate::error::{AlreadyCompleted, Error, ErrorKind, Result};
pub use crate::future::{Completer, Future, collect_all, wait_all};

mod error;
mod future;
mod util;
