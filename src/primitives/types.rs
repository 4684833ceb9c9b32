//! Primitive types - render and cleanup callbacks.

use crate::engine::Node;
use crate::hooks::Scope;
use crate::types::Props;

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup returned by an effect setup.
///
/// Runs once: before the next setup of the same call site, or when the
/// element is torn down.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Render Function
// =============================================================================

/// Render function of a [`Component`](super::Component).
///
/// Must be pure in `(props, children)` given the same hook state.
pub type RenderFn = Box<dyn Fn(&mut Scope<'_>, &Props, &[Node]) -> Node>;
