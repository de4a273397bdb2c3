//! Trait seams implemented by the embedding application.
//!
//! # Submodules
//!
//! - `observer`: simulation and edit-mode notifications
//!
//! The core performs no rendering or input handling. A renderer or UI hooks
//! in by implementing [`SimObserver`]; tests use
//! [`RecordingObserver`](crate::mock::RecordingObserver).

pub mod observer;

pub use observer::*;
