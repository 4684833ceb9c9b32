//! State hooks - per-element value cells.
//!
//! [`State`] handles are `Rc`-shared and outlive the render that produced
//! them: event handlers and effect setups keep them and call [`State::set`]
//! later. A setter never touches the tree directly. It posts an [`Update`] to
//! the root's inbox; the root marks the element Dirty and schedules its
//! evaluation the next time it flushes updates (every scheduler step).

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::engine::ElementId;
use crate::scheduler::Priority;

/// A state change waiting to be turned into an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Update {
    pub element: ElementId,
    pub priority: Priority,
}

pub(crate) type Inbox = Rc<RefCell<VecDeque<Update>>>;

/// When the cell is re-initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateKind {
    /// Whenever the hook's params change.
    #[default]
    Default,
    /// Never after the first call.
    Once,
    /// On every call.
    Always,
}

/// Options of [`Scope::use_state_with`](crate::Scope::use_state_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateOptions {
    /// Priority of the evaluation a change requests. `None` falls back to
    /// [`Config::state_priority`](crate::Config::state_priority).
    pub priority: Option<Priority>,
    pub kind: StateKind,
    /// Store changes without requesting an evaluation.
    pub silent: bool,
}

impl StateOptions {
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn kind(mut self, kind: StateKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

/// Storage of one state call site.
pub(crate) struct StateSlot {
    pub params: Box<dyn Any>,
    /// `Rc<RefCell<T>>`, erased.
    pub cell: Rc<dyn Any>,
}

/// Handle to a state cell.
pub struct State<T> {
    cell: Rc<RefCell<T>>,
    element: ElementId,
    priority: Priority,
    silent: bool,
    inbox: Inbox,
}

impl<T> State<T> {
    pub(crate) fn new(
        cell: Rc<RefCell<T>>,
        element: ElementId,
        priority: Priority,
        silent: bool,
        inbox: Inbox,
    ) -> Self {
        Self {
            cell,
            element,
            priority,
            silent,
            inbox,
        }
    }

    /// Element that owns the cell.
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow())
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.borrow().clone()
    }
}

impl<T: PartialEq> State<T> {
    /// Store `value`. Returns whether it differed from the current one.
    ///
    /// An equal value is a no-op. A different one requests an evaluation of
    /// the owning element unless the hook is silent.
    pub fn set(&self, value: T) -> bool {
        if *self.cell.borrow() == value {
            return false;
        }
        *self.cell.borrow_mut() = value;

        if !self.silent {
            self.inbox.borrow_mut().push_back(Update {
                element: self.element,
                priority: self.priority,
            });
        }
        true
    }

    /// [`set`](Self::set) with a value computed from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> bool {
        let next = f(&self.cell.borrow());
        self.set(next)
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
            element: self.element,
            priority: self.priority,
            silent: self.silent,
            inbox: Rc::clone(&self.inbox),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("value", &self.cell.borrow())
            .field("element", &self.element)
            .field("priority", &self.priority)
            .finish()
    }
}
