//! Error types.
//!
//! Three families:
//! - [`Error`] - usage violations that abort the current pass
//! - [`EffectError`] - a failed effect setup, isolated to its call site
//! - [`ApplyError`] - the applier met an element it never saw created

use thiserror::Error;

use crate::engine::ElementId;

/// Result alias for reconciler and scheduler operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal usage violations.
///
/// Any of these aborts the pass that produced it. The instructions emitted
/// before the failure stay in the buffer; the caller decides whether to apply
/// them or to drop the root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A hook was used out of call order, or a slot was reused by a different
    /// kind of hook.
    #[error("invalid hook call in element {element:?} at slot {slot}")]
    InvalidHook { element: ElementId, slot: usize },

    /// An element is already placed under another parent.
    #[error("cannot mount element {element:?} twice (owned by {owner:?})")]
    InvalidMultimount { element: ElementId, owner: ElementId },

    /// `evaluate` ran without a parent evaluation context.
    #[error("cannot evaluate element {element:?} outside of an active pass")]
    InvalidEvaluation { element: ElementId },
}

/// A failed effect setup.
///
/// Reported through [`Root::take_effect_errors`](crate::Root::take_effect_errors),
/// never through the pass result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("effect in element {element:?} at slot {slot} failed: {message}")]
pub struct EffectError {
    pub element: ElementId,
    pub slot: usize,
    pub message: String,
}

/// Failure while applying instructions to a host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// The instruction references an element with no host handle.
    #[error("no host handle for element {0:?}")]
    UnknownElement(ElementId),
}
