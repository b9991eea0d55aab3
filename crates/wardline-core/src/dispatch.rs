//! Handler registries: ordered fan-out with token-based removal.
//!
//! Decouples "a message arrived" from "what the consumer does with it".
//! Two instances live on the connection manager (notification handlers,
//! error handlers). Registration order is the fan-out call order,
//! duplicates are legal and each fires independently, and removal is
//! by the token a registration returns -- never by index, since indices
//! shift as other entries unregister.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// An ordered collection of callbacks for one event type.
pub struct HandlerRegistry<T> {
    entries: Arc<Mutex<Vec<(u64, Handler<T>)>>>,
    next_token: AtomicU64,
}

impl<T: 'static> Default for HandlerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> HandlerRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            next_token: AtomicU64::new(0),
        }
    }

    /// Register a handler; returns a [`Subscription`] that removes
    /// exactly this registration. Dropping the subscription without
    /// calling [`Subscription::unsubscribe`] leaves the handler
    /// registered for the registry's lifetime.
    pub fn register(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.lock().push((token, Arc::new(handler)));
        Subscription {
            token,
            entries: Arc::downgrade(&self.entries) as Weak<dyn Unregister>,
            done: AtomicBool::new(false),
        }
    }

    /// Invoke every handler in registration order.
    ///
    /// The entry list is snapshotted first, so a handler that
    /// unregisters itself or another handler mid-cycle cannot skip or
    /// double-invoke entries in the same fan-out. A panicking handler
    /// is caught and logged and does not stop the remaining handlers.
    pub fn dispatch(&self, value: &T) {
        let snapshot: Vec<Handler<T>> =
            self.lock().iter().map(|(_, h)| Arc::clone(h)).collect();

        for handler in snapshot {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(value);
            }));
            if outcome.is_err() {
                tracing::error!("handler panicked during dispatch; continuing fan-out");
            }
        }
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Handler<T>)>> {
        // A panicking handler cannot poison this lock: dispatch runs
        // handlers outside the critical section.
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ── Subscription ─────────────────────────────────────────────────────

/// Type-erased removal hook so `Subscription` needs no type parameter.
trait Unregister: Send + Sync {
    fn remove(&self, token: u64);
}

impl<T> Unregister for Mutex<Vec<(u64, Handler<T>)>>
where
    T: 'static,
{
    fn remove(&self, token: u64) {
        let mut entries = match self.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.retain(|(t, _)| *t != token);
    }
}

/// Capability to remove one specific registration.
///
/// `unsubscribe()` is idempotent: the second and later calls are no-ops
/// and can never remove a different handler.
pub struct Subscription {
    token: u64,
    entries: Weak<dyn Unregister>,
    done: AtomicBool,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if self.done.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(entries) = self.entries.upgrade() {
            entries.remove(self.token);
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;

    fn collecting_registry() -> (HandlerRegistry<String>, Arc<StdMutex<Vec<String>>>) {
        (HandlerRegistry::new(), Arc::new(StdMutex::new(Vec::new())))
    }

    #[test]
    fn fan_out_preserves_registration_order() {
        let (registry, seen) = collecting_registry();

        for tag in ["a", "b", "c"] {
            let seen = Arc::clone(&seen);
            registry.register(move |msg: &String| {
                seen.lock().unwrap().push(format!("{tag}:{msg}"));
            });
        }

        registry.dispatch(&"x".to_string());
        assert_eq!(*seen.lock().unwrap(), vec!["a:x", "b:x", "c:x"]);
    }

    #[test]
    fn duplicate_handlers_each_fire() {
        let (registry, seen) = collecting_registry();

        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            registry.register(move |msg: &String| {
                seen.lock().unwrap().push(msg.clone());
            });
        }

        registry.dispatch(&"hi".to_string());
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn unsubscribe_removes_only_that_registration() {
        let (registry, seen) = collecting_registry();

        let sub_a = {
            let seen = Arc::clone(&seen);
            registry.register(move |_: &String| seen.lock().unwrap().push("a".into()))
        };
        let _sub_b = {
            let seen = Arc::clone(&seen);
            registry.register(move |_: &String| seen.lock().unwrap().push("b".into()))
        };

        sub_a.unsubscribe();
        registry.dispatch(&String::new());
        assert_eq!(*seen.lock().unwrap(), vec!["b"]);

        // Second call is a no-op and does not touch other handlers.
        sub_a.unsubscribe();
        registry.dispatch(&String::new());
        assert_eq!(*seen.lock().unwrap(), vec!["b", "b"]);
    }

    #[test]
    fn dropping_subscription_keeps_handler_registered() {
        let (registry, seen) = collecting_registry();

        {
            let seen = Arc::clone(&seen);
            let _sub = registry.register(move |_: &String| {
                seen.lock().unwrap().push("kept".into());
            });
            // _sub dropped here without unsubscribing
        }

        registry.dispatch(&String::new());
        assert_eq!(*seen.lock().unwrap(), vec!["kept"]);
    }

    #[test]
    fn panicking_handler_does_not_block_later_handlers() {
        let (registry, seen) = collecting_registry();

        registry.register(|_: &String| panic!("boom"));
        {
            let seen = Arc::clone(&seen);
            registry.register(move |_: &String| {
                seen.lock().unwrap().push("survived".into());
            });
        }

        registry.dispatch(&String::new());
        assert_eq!(*seen.lock().unwrap(), vec!["survived"]);

        // Registry still usable afterwards.
        registry.dispatch(&String::new());
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn unsubscribe_during_dispatch_cannot_skip_snapshot() {
        let registry = Arc::new(HandlerRegistry::<String>::new());
        let seen = Arc::new(StdMutex::new(Vec::<String>::new()));

        // First handler unregisters the second mid-cycle; the snapshot
        // taken at dispatch start still includes it for this cycle.
        let sub_b_slot: Arc<StdMutex<Option<Subscription>>> = Arc::new(StdMutex::new(None));
        {
            let slot = Arc::clone(&sub_b_slot);
            let seen = Arc::clone(&seen);
            registry.register(move |_: &String| {
                seen.lock().unwrap().push("a".into());
                if let Some(sub) = slot.lock().unwrap().take() {
                    sub.unsubscribe();
                }
            });
        }
        let sub_b = {
            let seen = Arc::clone(&seen);
            registry.register(move |_: &String| {
                seen.lock().unwrap().push("b".into());
            })
        };
        *sub_b_slot.lock().unwrap() = Some(sub_b);

        registry.dispatch(&String::new());
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);

        // Next cycle, the removal has taken effect.
        registry.dispatch(&String::new());
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "a"]);
    }
}
