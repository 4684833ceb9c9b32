//! Hooks - per-element state and side effects.
//!
//! Render functions receive a [`Scope`]. Through it they can:
//! - keep values across renders ([`Scope::use_state`] → [`State`])
//! - run side effects after a render ([`Scope::use_effect`] → [`Setup`])
//!
//! Each hook call owns one slot of the element's hook storage, selected by
//! call order. Slots live on the element and are dropped with it; effect
//! cleanups run at teardown in slot order.
//!
//! # Example
//!
//! ```ignore
//! let counter = Component::new("Counter", |scope, props, _| {
//!     let count = scope.use_state((), || 0);
//!
//!     let step = props.get("step").and_then(Value::as_int).unwrap_or(1);
//!     scope.use_effect(step, move |step| {
//!         tracing::info!(step, "step changed");
//!         Setup::none()
//!     });
//!
//!     native("span").child(count.get()).into()
//! });
//! ```

mod effect;
mod scope;
mod state;

pub use effect::{EffectKind, EffectOptions, Setup, SetupResult};
pub use scope::Scope;
pub use state::{State, StateKind, StateOptions};

pub(crate) use effect::{EffectRequest, EffectSlot};
pub(crate) use state::{Inbox, StateSlot, Update};

/// One hook call site.
pub(crate) enum HookSlot {
    Effect(EffectSlot),
    State(StateSlot),
}

impl HookSlot {
    pub(crate) fn as_effect_mut(&mut self) -> Option<&mut EffectSlot> {
        match self {
            HookSlot::Effect(effect) => Some(effect),
            HookSlot::State(_) => None,
        }
    }

    /// Run the cleanup of a discarded slot, if it holds one.
    pub(crate) fn dispose(self) {
        if let HookSlot::Effect(effect) = self {
            if let Some(teardown) = effect.teardown {
                teardown();
            }
        }
    }
}
