use super::Future;
use crate::error::Error;

use parking_lot::Mutex;
use std::mem;
use std::sync::Arc;

/// Returns a future that completes once every future in `futures` has
/// completed, successfully or not.
///
/// The returned future never fails; it yields the input futures in their
/// original order so that each outcome can be inspected.
pub fn collect_all<T, I>(futures: I) -> Future<Vec<Future<T>>>
    where T: Send + 'static,
          I: IntoIterator<Item = Future<T>>,
{
    let futures: Vec<Future<T>> = futures.into_iter().collect();

    if futures.is_empty() {
        return Future::completed(Vec::new());
    }

    let ret = Future::new();

    // Callbacks hold the slots rather than the input futures themselves,
    // otherwise every pending input would keep itself alive.
    let collect = Arc::new(Mutex::new(Collect {
        slots: futures.iter().map(|_| None).collect(),
        remaining: futures.len(),
    }));

    for (i, future) in futures.into_iter().enumerate() {
        let collect = collect.clone();
        let ret = ret.clone();

        future.add_done_callback(move |future| {
            let done = {
                let mut collect = collect.lock();
                collect.slots[i] = Some(future);
                collect.remaining -= 1;

                if collect.remaining > 0 {
                    return;
                }

                mem::take(&mut collect.slots)
            };

            // Ignored if the holder of `ret` already completed it by hand
            let _ = ret.set_result(done.into_iter().flatten().collect());
        });
    }

    ret
}

/// Blocks until every future in `futures` has completed, then returns their
/// values in order, or the first error in input order.
pub fn wait_all<T, I>(futures: I) -> Result<Vec<T>, Error>
    where T: Clone,
          I: IntoIterator<Item = Future<T>>,
{
    let futures: Vec<Future<T>> = futures.into_iter().collect();
    let results: Vec<Result<T, Error>> = futures.iter().map(Future::wait).collect();

    results.into_iter().collect()
}

struct Collect<T> {
    slots: Vec<Option<Future<T>>>,
    remaining: usize,
}
