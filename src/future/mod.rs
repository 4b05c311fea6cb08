pub use self::collect::{collect_all, wait_all};
pub use self::completer::Completer;
pub use self::future::Future;

mod collect;
mod completer;
mod future;
