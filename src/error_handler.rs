use std::sync::{Arc, RwLock};

use crate::Error;

/// Receives errors that the SDK swallows or reports on behalf of the caller.
///
/// Implemented for any `Fn(&Error)` closure, so most callers pass a closure:
///
/// ```
/// # use hyphen::{Error, ToggleConfig};
/// let config = ToggleConfig::from_public_api_key("public_key").error_handler(|err: &Error| {
///     eprintln!("toggle evaluation failed: {err}");
/// });
/// ```
pub trait ErrorHandler {
    /// Called once per failed operation.
    fn handle_error(&self, error: &Error);
}

pub(crate) struct NoopErrorHandler;
impl ErrorHandler for NoopErrorHandler {
    fn handle_error(&self, _error: &Error) {}
}

impl<T: Fn(&Error)> ErrorHandler for T {
    fn handle_error(&self, error: &Error) {
        self(error);
    }
}

pub(crate) type SharedErrorHandler = Arc<dyn ErrorHandler + Send + Sync>;

/// Replaceable error handler slot shared by the service clients.
///
/// Writers replace the whole handler; readers clone the `Arc` out of the lock before calling it,
/// so a handler is never invoked while the lock is held.
pub(crate) struct ErrorHandlerSlot {
    handler: RwLock<SharedErrorHandler>,
}

impl ErrorHandlerSlot {
    pub(crate) fn new(handler: SharedErrorHandler) -> Self {
        Self {
            handler: RwLock::new(handler),
        }
    }

    pub(crate) fn noop() -> Self {
        Self::new(Arc::new(NoopErrorHandler))
    }

    pub(crate) fn set(&self, handler: SharedErrorHandler) {
        // A poisoned lock still holds a valid handler, so recover it instead of failing.
        let mut slot = self.handler.write().unwrap_or_else(|err| err.into_inner());
        *slot = handler;
    }

    pub(crate) fn emit(&self, error: &Error) {
        let handler = {
            let slot = self.handler.read().unwrap_or_else(|err| err.into_inner());
            Arc::clone(&slot)
        };
        handler.handle_error(error);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::ErrorHandlerSlot;
    use crate::Error;

    #[test]
    fn emits_to_the_latest_handler() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let slot = ErrorHandlerSlot::noop();
        slot.emit(&Error::validation("ignored"));

        {
            let first = first.clone();
            slot.set(Arc::new(move |_: &Error| {
                first.fetch_add(1, Ordering::SeqCst);
            }));
        }
        slot.emit(&Error::validation("first"));

        {
            let second = second.clone();
            slot.set(Arc::new(move |_: &Error| {
                second.fetch_add(1, Ordering::SeqCst);
            }));
        }
        slot.emit(&Error::validation("second"));

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handler_can_be_replaced_from_another_thread() {
        let slot = Arc::new(ErrorHandlerSlot::noop());
        let calls = Arc::new(AtomicUsize::new(0));

        {
            let slot = slot.clone();
            let calls = calls.clone();
            let _ = std::thread::spawn(move || {
                slot.set(Arc::new(move |_: &Error| {
                    calls.fetch_add(1, Ordering::SeqCst);
                }));
            })
            .join();
        }

        slot.emit(&Error::validation("boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
