#![forbid(unsafe_code)]

//! Core: access modes, key events, lifecycle signals, debouncing, and engine
//! configuration shared by the form and grid crates.

pub mod access_mode;
pub mod config;
pub mod debounce;
pub mod event;
pub mod lifecycle;

pub use access_mode::{AccessMode, AccessModeError};
pub use config::{ConfigError, EngineConfig};
pub use debounce::Debouncer;
pub use event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use lifecycle::DestroySignal;
pub use std::time::Duration;
pub use web_time::Instant;
