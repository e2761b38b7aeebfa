// src/future/mod.rs

//! Single-assignment result cells.
//!
//! - [`settable`] holds [`SettableFuture`], a blocking- and async-readable
//!   cell that transitions out of `Pending` exactly once.
//! - [`dependency`] type-erases futures so a job can wait on futures of
//!   different value types in one list.

pub mod dependency;
pub mod settable;

pub use dependency::{Dependency, DynDependency};
pub use settable::SettableFuture;
