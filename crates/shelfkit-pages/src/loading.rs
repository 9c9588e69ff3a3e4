#![forbid(unsafe_code)]

//! Loading indicator flag.
//!
//! [`LoadingFlag::begin`] sets the flag and returns a guard that clears it on
//! drop, so every exit path (success, error, early `?` return) leaves the
//! flag false.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "request in flight" flag.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag {
    active: Arc<AtomicBool>,
}

impl LoadingFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Set the flag until the returned guard drops.
    #[must_use = "the flag clears when the guard drops"]
    pub fn begin(&self) -> LoadingGuard {
        self.active.store(true, Ordering::Release);
        LoadingGuard {
            active: Arc::clone(&self.active),
        }
    }

    /// Run `f` with the flag set.
    pub fn track<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.begin();
        f()
    }
}

/// Clears the owning [`LoadingFlag`] on drop.
#[derive(Debug)]
pub struct LoadingGuard {
    active: Arc<AtomicBool>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}
