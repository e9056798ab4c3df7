//! Persisted step completion flags.
//!
//! Completion truth across runs lives here, not in the in-memory pipeline
//! state. A step whose flag is set is recognised as already done and is not
//! invoked again.

pub mod store;

pub use store::{FileFlagStore, FlagStore, MemoryFlagStore};
