// src/exec/action.rs

//! The unit-of-work abstraction.
//!
//! Every task owns an [`Action`]. The executor calls [`Action::execute`] once
//! per invocation and reports the resolved result back to the runtime as the
//! task's completion signal.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;

use crate::exec::context::TaskContext;

/// Boxed future returned by [`Action::execute`].
pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// A task's unit of work.
///
/// Implementations report failures by resolving to `Err`; they must not
/// terminate the process themselves.
pub trait Action: Send + Sync + fmt::Debug {
    fn execute<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a>;
}

/// Unit of work for aggregate tasks that only exist to group prerequisites.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAction;

impl Action for NoopAction {
    fn execute<'a>(&'a self, _ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(async { Ok(()) })
    }
}

/// Adapter turning an async closure into an [`Action`].
pub struct FnAction<F> {
    f: F,
}

impl<F> fmt::Debug for FnAction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction").finish_non_exhaustive()
    }
}

impl<F, Fut> Action for FnAction<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn execute<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin((self.f)(ctx.clone()))
    }
}

/// Build an [`Action`] from an async closure.
///
/// ```no_run
/// use releasedag::exec::from_fn;
///
/// let action = from_fn(|ctx| async move {
///     tracing::info!(task = %ctx.task, "hello");
///     Ok(())
/// });
/// # let _ = action;
/// ```
pub fn from_fn<F, Fut>(f: F) -> Arc<dyn Action>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnAction { f })
}
