//! Workspace placeholder crate.
//!
//! This crate exists to expose the individual workspace crates
//! (`bridge-traits`, `core-runtime`, `core-resolver`, `core-playback`)
//! behind a single dependency. Host applications can depend on
//! `bilitune-workspace` and pull in the whole playback core without
//! wiring each crate individually.

pub use bridge_traits;
pub use core_playback;
pub use core_resolver;
pub use core_runtime;
