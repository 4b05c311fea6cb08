use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

pub mod trampoline;

/// Runs `f`, turning a panic into the panic's message.
pub fn catch_panic<R, F: FnOnce() -> R>(f: F) -> Result<R, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(panic_message)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        return msg.to_string();
    }

    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(_) => "<non-string panic payload>".to_string(),
    }
}
