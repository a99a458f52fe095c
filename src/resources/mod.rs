//! # Closeable resources.
//!
//! - [`Closer`] - trait for one-shot, cancellation-aware close operations
//! - [`CloseFn`] - closure-backed close operation
//! - [`ResourceSpec`] - descriptor bundling name, deadline and closer

mod close_fn;
mod closer;
mod spec;

pub use close_fn::CloseFn;
pub use closer::{BoxCloseFuture, Closer};
pub use spec::ResourceSpec;
