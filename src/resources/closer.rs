//! # Close operation abstraction.
//!
//! A [`Closer`] is consumed exactly once: the sequencer hands it a
//! [`CancellationToken`] and drives the returned future on its own task.
//! When the resource's deadline elapses the token is cancelled, but the
//! future is not aborted; it may keep running after a timeout was recorded.

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::CloseError;

/// Boxed future returned by [`Closer::close`].
pub type BoxCloseFuture = BoxFuture<'static, Result<(), CloseError>>;

/// # One-shot, cancellation-aware close operation.
///
/// Implementors should watch `ctx` and return promptly once it is cancelled.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use termvisor::{BoxCloseFuture, CloseError, Closer};
///
/// struct Pool { size: usize }
///
/// impl Closer for Pool {
///     fn close(self: Box<Self>, ctx: CancellationToken) -> BoxCloseFuture {
///         Box::pin(async move {
///             for _ in 0..self.size {
///                 if ctx.is_cancelled() {
///                     return Err(CloseError::Canceled);
///                 }
///                 // drain one connection...
///             }
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Closer: Send + 'static {
    /// Starts closing the resource.
    fn close(self: Box<Self>, ctx: CancellationToken) -> BoxCloseFuture;
}
