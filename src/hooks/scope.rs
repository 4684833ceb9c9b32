//! Scope - the evaluation context handed to a render function.
//!
//! Hooks are identified by call order: the n-th hook call of a render owns
//! slot n of the element's hook storage. Calling hooks conditionally, or
//! changing which kind of hook sits at a position, breaks that mapping and is
//! reported as [`Error::InvalidHook`], aborting the pass once the render
//! returns.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::config::Config;
use crate::engine::{ElementId, SeedBuilder};
use crate::error::Error;

use super::HookSlot;
use super::effect::{EffectKind, EffectOptions, EffectRequest, EffectSlot, Setup};
use super::state::{Inbox, State, StateKind, StateOptions, StateSlot};

/// Hook access for one render of one custom element.
pub struct Scope<'a> {
    element: ElementId,
    /// The element rendered before. Its hook layout is fixed.
    attached: bool,
    hooks: &'a mut Vec<HookSlot>,
    cursor: usize,
    requests: Vec<EffectRequest>,
    error: Option<Error>,
    inbox: &'a Inbox,
    config: &'a Config,
}

/// What a render left behind for the reconciler.
pub(crate) struct ScopeOutcome {
    pub requests: Vec<EffectRequest>,
    pub error: Option<Error>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(
        element: ElementId,
        attached: bool,
        hooks: &'a mut Vec<HookSlot>,
        inbox: &'a Inbox,
        config: &'a Config,
    ) -> Self {
        Self {
            element,
            attached,
            hooks,
            cursor: 0,
            requests: Vec::new(),
            error: None,
            inbox,
            config,
        }
    }

    /// Element being rendered.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Whether the element rendered before.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Record this element as the owner of the seed being built.
    pub fn own(&self, builder: SeedBuilder) -> SeedBuilder {
        builder.owner(self.element)
    }

    // =========================================================================
    // State
    // =========================================================================

    /// State cell initialized by `init`, re-initialized when `params` change.
    ///
    /// ```ignore
    /// let count = scope.use_state((), || 0);
    /// let label = format!("clicked {} times", count.get());
    /// ```
    pub fn use_state<T, P, F>(&mut self, params: P, init: F) -> State<T>
    where
        T: PartialEq + 'static,
        P: PartialEq + 'static,
        F: FnOnce() -> T,
    {
        self.use_state_with(StateOptions::default(), params, init)
    }

    pub fn use_state_with<T, P, F>(&mut self, options: StateOptions, params: P, init: F) -> State<T>
    where
        T: PartialEq + 'static,
        P: PartialEq + 'static,
        F: FnOnce() -> T,
    {
        let index = self.next_slot();
        let mut init = Some(init);
        let mut params = Some(params);

        let reused = match self.hooks.get_mut(index) {
            Some(HookSlot::State(slot)) => match Rc::clone(&slot.cell).downcast::<RefCell<T>>() {
                Ok(cell) => {
                    let stale = match options.kind {
                        StateKind::Default => slot.params.downcast_ref::<P>() != params.as_ref(),
                        StateKind::Once => false,
                        StateKind::Always => true,
                    };
                    if stale {
                        if let (Some(init), Some(params)) = (init.take(), params.take()) {
                            *cell.borrow_mut() = init();
                            slot.params = Box::new(params);
                        }
                    }
                    Some(cell)
                }
                Err(_) => None,
            },
            _ => None,
        };

        let cell = match reused {
            Some(cell) => cell,
            None => {
                let (init, params) = match (init.take(), params.take()) {
                    (Some(init), Some(params)) => (init, params),
                    _ => unreachable!("init and params are only consumed for reused slots"),
                };
                let cell = Rc::new(RefCell::new(init()));
                let slot = HookSlot::State(StateSlot {
                    params: Box::new(params),
                    cell: cell.clone(),
                });
                self.install(index, slot);
                cell
            }
        };

        State::new(
            cell,
            self.element,
            options.priority.unwrap_or(self.config.state_priority),
            options.silent,
            Rc::clone(self.inbox),
        )
    }

    // =========================================================================
    // Effects
    // =========================================================================

    /// Run `setup` after this render when `params` changed since the last run.
    pub fn use_effect<P, F>(&mut self, params: P, setup: F)
    where
        P: PartialEq + Clone + 'static,
        F: FnOnce(&P) -> Setup + 'static,
    {
        self.use_effect_with(EffectOptions::default(), params, setup)
    }

    pub fn use_effect_with<P, F>(&mut self, options: EffectOptions, params: P, setup: F)
    where
        P: PartialEq + Clone + 'static,
        F: FnOnce(&P) -> Setup + 'static,
    {
        let index = self.next_slot();
        let attached = self.attached;

        let due = match self.hooks.get_mut(index) {
            Some(HookSlot::Effect(slot)) => {
                let changed = slot.params.downcast_ref::<P>() != Some(&params);
                let due = match options.kind {
                    EffectKind::Once => !attached,
                    EffectKind::Always => true,
                    EffectKind::Default => changed,
                };
                if changed {
                    slot.params = Box::new(params.clone());
                }
                Some(due)
            }
            _ => None,
        };

        let due = match due {
            Some(due) => due,
            None => {
                let slot = HookSlot::Effect(EffectSlot::new(Box::new(params.clone())));
                self.install(index, slot);
                true
            }
        };

        if due {
            self.requests.push(EffectRequest {
                slot: index,
                priority: options.priority.unwrap_or(self.config.effect_priority),
                run: Box::new(move || setup(&params)),
            });
        }
    }

    // =========================================================================
    // Slots
    // =========================================================================

    fn next_slot(&mut self) -> usize {
        let index = self.cursor;
        self.cursor += 1;
        index
    }

    /// Put a fresh slot at `index`.
    ///
    /// For an attached element every slot already exists with the right kind,
    /// so landing here means the hook order changed.
    fn install(&mut self, index: usize, slot: HookSlot) {
        if self.attached {
            self.invalid(index);
        }

        if index < self.hooks.len() {
            let replaced = std::mem::replace(&mut self.hooks[index], slot);
            trace!(element = ?self.element, index, "hook slot replaced");
            replaced.dispose();
        } else {
            self.hooks.push(slot);
        }
    }

    fn invalid(&mut self, slot: usize) {
        if self.error.is_none() {
            self.error = Some(Error::InvalidHook {
                element: self.element,
                slot,
            });
        }
    }

    /// Close the render: a re-render must call exactly the hooks it called
    /// before.
    pub(crate) fn finish(mut self) -> ScopeOutcome {
        if self.attached && self.cursor != self.hooks.len() {
            let slot = self.cursor.min(self.hooks.len());
            self.invalid(slot);
        }
        ScopeOutcome {
            requests: self.requests,
            error: self.error,
        }
    }
}
