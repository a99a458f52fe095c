//! # Resource descriptor.
//!
//! Defines [`ResourceSpec`], the unit stored in the registry: a name, an
//! optional per-resource deadline and a one-shot [`Closer`].
//!
//! ## Rules
//! - Names are informational and need not be unique.
//! - A deadline of `Duration::ZERO` is normalized to `None` (no deadline).

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::CloseError;
use crate::resources::{CloseFn, Closer};

/// Registered closeable unit.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use termvisor::{CloseError, ResourceSpec};
///
/// let spec = ResourceSpec::from_fn("db", |_ctx: CancellationToken| async {
///     Ok::<(), CloseError>(())
/// })
/// .with_deadline(Duration::from_millis(500));
///
/// assert_eq!(spec.name(), "db");
/// assert_eq!(spec.deadline(), Some(Duration::from_millis(500)));
///
/// let spec = spec.with_deadline(Duration::ZERO);
/// assert!(spec.deadline().is_none());
/// ```
pub struct ResourceSpec {
    name: Cow<'static, str>,
    deadline: Option<Duration>,
    closer: Box<dyn Closer>,
}

impl ResourceSpec {
    /// Creates a descriptor with no deadline.
    pub fn new(name: impl Into<Cow<'static, str>>, closer: Box<dyn Closer>) -> Self {
        Self {
            name: name.into(),
            deadline: None,
            closer,
        }
    }

    /// Creates a descriptor from a closure.
    pub fn from_fn<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), CloseError>> + Send + 'static,
    {
        Self::new(name, CloseFn::boxed(f))
    }

    /// Returns a new spec with the given deadline (`0s` = none).
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline).filter(|d| !d.is_zero());
        self
    }

    /// Returns the resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the deadline, if configured.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub(crate) fn into_parts(self) -> (Cow<'static, str>, Option<Duration>, Box<dyn Closer>) {
        (self.name, self.deadline, self.closer)
    }
}

impl fmt::Debug for ResourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSpec")
            .field("name", &self.name)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
