//! # Function-backed close operation (`CloseFn`)
//!
//! [`CloseFn`] wraps a closure `F: FnOnce(CancellationToken) -> Fut`. The
//! closure is called once, when the sequencer reaches the resource.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use termvisor::{CloseError, CloseFn, Closer};
//!
//! let closer: Box<dyn Closer> = CloseFn::boxed(|_ctx: CancellationToken| async {
//!     Ok::<_, CloseError>(())
//! });
//! # drop(closer);
//! ```

use std::fmt;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::CloseError;
use crate::resources::closer::{BoxCloseFuture, Closer};

/// Closure-backed [`Closer`].
pub struct CloseFn<F> {
    f: F,
}

impl<F> CloseFn<F> {
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> CloseFn<F>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), CloseError>> + Send + 'static,
{
    /// Wraps a closure and returns it as a boxed [`Closer`].
    pub fn boxed(f: F) -> Box<dyn Closer> {
        Box::new(Self::new(f))
    }
}

impl<F, Fut> Closer for CloseFn<F>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), CloseError>> + Send + 'static,
{
    fn close(self: Box<Self>, ctx: CancellationToken) -> BoxCloseFuture {
        Box::pin((self.f)(ctx))
    }
}

impl<F> fmt::Debug for CloseFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseFn").finish_non_exhaustive()
    }
}
