//! Effect hooks - side effects bound to one call site.
//!
//! An effect pairs a parameter value with a setup callback. The setup runs
//! later, as a scheduled [`Task::Effect`](crate::Task::Effect), never inside
//! the render that requested it. Whatever cleanup it returns runs right before
//! the next setup of the same call site, or when the element is torn down.
//!
//! # Example
//!
//! ```ignore
//! scope.use_effect(user_id, |id| {
//!     let subscription = feed.subscribe(*id);
//!     Setup::cleanup(move || subscription.cancel())
//! });
//! ```

use std::any::Any;
use std::fmt;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::primitives::Cleanup;
use crate::scheduler::{Priority, TaskId};

/// What a setup produced: an optional cleanup, or a failure message.
pub type SetupResult = Result<Option<Cleanup>, String>;

/// Return value of an effect setup.
pub enum Setup {
    /// Finished synchronously.
    Ready(SetupResult),
    /// Still running. Polled by the drain loop until it resolves.
    Pending(LocalBoxFuture<'static, SetupResult>),
}

impl Setup {
    /// Finished, nothing to clean up.
    pub fn none() -> Self {
        Setup::Ready(Ok(None))
    }

    /// Finished, run `cleanup` before the next setup or on teardown.
    pub fn cleanup(cleanup: impl FnOnce() + 'static) -> Self {
        Setup::Ready(Ok(Some(Box::new(cleanup))))
    }

    /// Failed. Reported through the root's effect error channel.
    pub fn failed(message: impl fmt::Display) -> Self {
        Setup::Ready(Err(message.to_string()))
    }

    /// Asynchronous setup.
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = SetupResult> + 'static,
    {
        Setup::Pending(future.boxed_local())
    }
}

impl From<()> for Setup {
    fn from(_: ()) -> Self {
        Setup::none()
    }
}

impl fmt::Debug for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setup::Ready(Ok(cleanup)) => write!(f, "Setup::Ready(cleanup: {})", cleanup.is_some()),
            Setup::Ready(Err(message)) => write!(f, "Setup::Ready(failed: {message:?})"),
            Setup::Pending(_) => f.write_str("Setup::Pending"),
        }
    }
}

/// When an effect re-runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectKind {
    /// Whenever its params change.
    #[default]
    Default,
    /// Only for the first evaluation of the element.
    Once,
    /// On every evaluation.
    Always,
}

/// Options of [`Scope::use_effect_with`](crate::Scope::use_effect_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectOptions {
    /// `None` falls back to [`Config::effect_priority`](crate::Config::effect_priority).
    pub priority: Option<Priority>,
    pub kind: EffectKind,
}

impl EffectOptions {
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn kind(mut self, kind: EffectKind) -> Self {
        self.kind = kind;
        self
    }
}

pub(crate) type EffectRun = Box<dyn FnOnce() -> Setup>;

/// Storage of one effect call site.
pub(crate) struct EffectSlot {
    pub params: Box<dyn Any>,
    /// Cleanup returned by the last completed setup.
    pub teardown: Option<Cleanup>,
    /// Queued Effect task of this slot.
    pub pending: Option<TaskId>,
    /// An async setup has not resolved yet.
    pub in_flight: bool,
    /// Latest requested run, waiting for its task (or for the in-flight setup).
    pub next_run: Option<EffectRun>,
}

impl EffectSlot {
    pub(crate) fn new(params: Box<dyn Any>) -> Self {
        Self {
            params,
            teardown: None,
            pending: None,
            in_flight: false,
            next_run: None,
        }
    }
}

/// A run requested during render, scheduled once the render returns.
pub(crate) struct EffectRequest {
    pub slot: usize,
    pub priority: Priority,
    pub run: EffectRun,
}
