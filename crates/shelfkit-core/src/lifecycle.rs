#![forbid(unsafe_code)]

//! Teardown signal for forms and page components.
//!
//! Every subscription a form node or page sets up is tied to the owning
//! component's [`DestroySignal`]. Firing the signal runs the registered
//! teardown hooks exactly once. Firing again is harmless.
//!
//! # Invariants
//!
//! 1. Hooks run at most once, in registration order.
//! 2. A hook registered after the signal fired runs immediately.
//! 3. `fire()` returns `true` only for the call that actually fired.
//! 4. A hook bound to an owner with [`DestroySignal::on_destroy_for`] is
//!    pruned once the owner is dropped, so rebuilding forms on a long-lived
//!    page does not grow the hook list.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

struct Hook {
    run: Box<dyn FnOnce() + Send>,
    alive: Option<Box<dyn Fn() -> bool + Send>>,
}

impl Hook {
    fn is_live(&self) -> bool {
        self.alive.as_ref().is_none_or(|alive| alive())
    }
}

#[derive(Default)]
struct SignalState {
    fired: bool,
    hooks: Vec<Hook>,
}

/// A clonable, fire-once destroy signal.
///
/// Clones share state: firing any clone fires them all.
#[derive(Clone, Default)]
pub struct DestroySignal {
    inner: Arc<Mutex<SignalState>>,
}

impl DestroySignal {
    /// Create a signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SignalState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check if the signal has fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.state().fired
    }

    /// Register a teardown hook.
    ///
    /// Runs immediately when the signal has already fired.
    pub fn on_destroy(&self, hook: impl FnOnce() + Send + 'static) {
        let mut state = self.state();
        if state.fired {
            drop(state);
            hook();
        } else {
            state.hooks.push(Hook {
                run: Box::new(hook),
                alive: None,
            });
        }
    }

    /// Register a teardown hook that only matters while `owner` lives.
    ///
    /// The signal keeps a weak reference: once `owner` is dropped the hook is
    /// pruned and never runs. Runs immediately when the signal has already
    /// fired.
    pub fn on_destroy_for<T>(&self, owner: &Arc<T>, hook: impl FnOnce(&T) + Send + 'static)
    where
        T: Send + Sync + 'static,
    {
        let mut state = self.state();
        if state.fired {
            drop(state);
            hook(owner.as_ref());
            return;
        }
        state.hooks.retain(Hook::is_live);
        let target: Weak<T> = Arc::downgrade(owner);
        let probe = Weak::clone(&target);
        state.hooks.push(Hook {
            run: Box::new(move || {
                if let Some(owner) = target.upgrade() {
                    hook(owner.as_ref());
                }
            }),
            alive: Some(Box::new(move || probe.strong_count() > 0)),
        });
    }

    /// Fire the signal and run pending hooks.
    ///
    /// Returns `false` if the signal had already fired.
    pub fn fire(&self) -> bool {
        let hooks = {
            let mut state = self.state();
            if state.fired {
                return false;
            }
            state.fired = true;
            std::mem::take(&mut state.hooks)
        };
        tracing::trace!(hooks = hooks.len(), "destroy signal fired");
        // Hooks run outside the lock so they may register or query the signal.
        for hook in hooks {
            (hook.run)();
        }
        true
    }

    /// Number of hooks waiting for the signal. Hooks whose owner is gone
    /// are pruned first.
    #[must_use]
    pub fn pending_hooks(&self) -> usize {
        let mut state = self.state();
        state.hooks.retain(Hook::is_live);
        state.hooks.len()
    }

    /// Check whether two handles share the same signal.
    #[must_use]
    pub fn same_signal(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for DestroySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("DestroySignal")
            .field("fired", &state.fired)
            .field("hooks", &state.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn new_signal_is_not_fired() {
        let signal = DestroySignal::new();
        assert!(!signal.is_fired());
        assert_eq!(signal.pending_hooks(), 0);
    }

    #[test]
    fn fire_runs_hooks_once() {
        let signal = DestroySignal::new();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let c = Arc::clone(&count);
            signal.on_destroy(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(signal.pending_hooks(), 3);

        assert!(signal.fire());
        assert_eq!(count.load(Ordering::SeqCst), 3);

        assert!(!signal.fire());
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(signal.pending_hooks(), 0);
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let signal = DestroySignal::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..4 {
            let o = Arc::clone(&order);
            signal.on_destroy(move || o.lock().unwrap().push(i));
        }
        signal.fire();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn late_hook_runs_immediately() {
        let signal = DestroySignal::new();
        signal.fire();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        signal.on_destroy(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_state() {
        let signal = DestroySignal::new();
        let clone = signal.clone();
        assert!(signal.same_signal(&clone));
        assert!(clone.fire());
        assert!(signal.is_fired());
        assert!(!signal.fire());
        assert!(!signal.same_signal(&DestroySignal::new()));
    }

    #[test]
    fn owned_hooks_pruned_after_owner_drops() {
        let signal = DestroySignal::new();
        for _ in 0..50 {
            let owner = Arc::new(AtomicUsize::new(0));
            signal.on_destroy_for(&owner, |o| {
                o.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(signal.pending_hooks(), 0);

        let kept = Arc::new(AtomicUsize::new(0));
        signal.on_destroy_for(&kept, |o| {
            o.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(signal.pending_hooks(), 1);
        signal.fire();
        assert_eq!(kept.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn owned_hook_runs_immediately_after_fire() {
        let signal = DestroySignal::new();
        signal.fire();
        let owner = Arc::new(AtomicUsize::new(0));
        signal.on_destroy_for(&owner, |o| {
            o.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(owner.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hook_may_query_signal_while_firing() {
        let signal = DestroySignal::new();
        let probe = signal.clone();
        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        signal.on_destroy(move || {
            *s.lock().unwrap() = Some(probe.is_fired());
        });
        signal.fire();
        assert_eq!(*seen.lock().unwrap(), Some(true));
    }
}
