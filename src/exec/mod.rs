// src/exec/mod.rs

//! Unit-of-work execution layer.
//!
//! - [`action`] defines the [`Action`] trait every task's unit of work
//!   implements, plus closure and no-op adapters.
//! - [`browser`] opens the URL of a ready long-lived task for `--open`.
//! - [`context`] holds the per-invocation [`TaskContext`] and the keeper for
//!   long-lived processes.
//! - [`shell`] runs commands through the platform shell using
//!   `tokio::process::Command`.
//! - [`backend`] provides the `ExecutorBackend` trait and the concrete
//!   `RealExecutorBackend` the runtime uses in production, and which tests
//!   can replace with a fake implementation.

pub mod action;
pub mod backend;
pub mod browser;
pub mod context;
pub mod shell;

pub use action::{Action, ActionFuture, FnAction, NoopAction, from_fn};
pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use browser::{SystemOpener, UrlOpener};
pub use context::{ProcessKeeper, TaskContext};
pub use shell::ShellAction;
