//! Scheduler - when elements are (re)evaluated, torn down, or run effects.
//!
//! Tasks are tied to elements and carry a [`Priority`]:
//! - `Realtime` executes synchronously inside [`Root::schedule`]
//! - `Maximum` ... `Minimum` append to their FIFO bucket
//! - `Disabled` is dropped
//!
//! # Rules
//!
//! - An element has at most one pending Evaluation. A second request keeps
//!   the more urgent of the two; on a tie the existing one stays.
//! - A Detached element never gets an Evaluation.
//! - Scheduling a Teardown marks the element Detached right away and cancels
//!   its pending Evaluation.
//! - An effect call site has at most one pending Effect task; a newer request
//!   replaces it.
//!
//! # Driving
//!
//! The host drives the queue:
//!
//! ```ignore
//! // Option 1: run everything
//! root.drain()?;
//!
//! // Option 2: bounded steps, e.g. once per frame
//! while root.pending_tasks() > 0 {
//!     root.tick()?; // uses Config::tick_budget
//!     applier.apply(root.take_instructions())?;
//! }
//! ```
//!
//! Each step first flushes pending state updates into Evaluation tasks and
//! polls async effect setups, so work requested by the previous task is
//! eligible for the next pop.

mod effects;
mod priority;
mod queue;
mod task;

pub use priority::Priority;
pub use task::{Task, TaskId};

pub(crate) use effects::InFlight;
pub(crate) use queue::Queue;

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::engine::{ElementState, Root};
use crate::error::Result;
use crate::hooks::Update;

impl Root {
    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Request `task` at `priority`.
    ///
    /// Returns the queued task, or `None` when the request was dropped, merged
    /// into a more urgent pending Evaluation, or executed synchronously.
    pub fn schedule(&mut self, task: Task, priority: Priority) -> Result<Option<TaskId>> {
        if priority == Priority::Disabled {
            trace!(?task, "disabled priority, dropped");
            return Ok(None);
        }

        match task {
            Task::Evaluation(id) => {
                let Some(element) = self.elements.get(id) else {
                    trace!(?id, "evaluation for a missing element, dropped");
                    return Ok(None);
                };
                if element.is_detached() {
                    trace!(?id, "evaluation for a detached element, dropped");
                    return Ok(None);
                }

                if let Some(existing) = element.evaluation {
                    match self.queue.priority(existing) {
                        Some(queued) if queued >= priority => {
                            trace!(?id, %queued, requested = %priority, "kept pending evaluation");
                            return Ok(Some(existing));
                        }
                        _ => {
                            self.queue.dequeue(existing);
                            self.get_mut(id).evaluation = None;
                        }
                    }
                }

                if priority == Priority::Realtime {
                    self.execute(task)?;
                    return Ok(None);
                }
                let queued = self.queue.enqueue(task, priority);
                self.get_mut(id).evaluation = Some(queued);
                Ok(Some(queued))
            }

            Task::Teardown(id) => {
                if id == self.container() {
                    warn!("teardown of the root container ignored, use Root::unmount");
                    return Ok(None);
                }
                let Some(element) = self.elements.get_mut(id) else {
                    return Ok(None);
                };
                if element.is_detached() {
                    trace!(?id, "already detached, teardown dropped");
                    return Ok(None);
                }

                element.state = ElementState::Detached;
                if let Some(pending) = element.evaluation.take() {
                    self.queue.dequeue(pending);
                }

                if priority == Priority::Realtime {
                    self.execute(task)?;
                    return Ok(None);
                }
                Ok(Some(self.queue.enqueue(task, priority)))
            }

            Task::Effect { element, slot } => {
                if self.elements.get(element).is_none_or(|e| e.is_detached()) {
                    return Ok(None);
                }
                let Some(effect) = self.effect_slot_mut(element, slot) else {
                    return Ok(None);
                };
                if let Some(pending) = effect.pending.take() {
                    self.queue.dequeue(pending);
                }

                if priority == Priority::Realtime {
                    self.execute(task)?;
                    return Ok(None);
                }
                let queued = self.queue.enqueue(task, priority);
                if let Some(effect) = self.effect_slot_mut(element, slot) {
                    effect.pending = Some(queued);
                }
                Ok(Some(queued))
            }
        }
    }

    /// Run one task now.
    fn execute(&mut self, task: Task) -> Result<()> {
        trace!(?task, "execute");
        match task {
            Task::Evaluation(id) => {
                if self.elements.get(id).is_some_and(|e| !e.is_detached()) {
                    self.evaluate(id)?;
                }
            }
            Task::Teardown(id) => {
                self.remove_position(id);
            }
            Task::Effect { element, slot } => {
                if self.elements.get(element).is_some_and(|e| !e.is_detached()) {
                    self.run_effect(element, slot);
                }
            }
        }
        Ok(())
    }

    /// Clear the pending-task reference a popped task leaves behind.
    fn release(&mut self, id: TaskId, task: Task) {
        match task {
            Task::Evaluation(element) => {
                if let Some(element) = self.elements.get_mut(element) {
                    if element.evaluation == Some(id) {
                        element.evaluation = None;
                    }
                }
            }
            Task::Effect { element, slot } => {
                if let Some(effect) = self.effect_slot_mut(element, slot) {
                    if effect.pending == Some(id) {
                        effect.pending = None;
                    }
                }
            }
            Task::Teardown(_) => {}
        }
    }

    /// Queued tasks.
    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    /// Queued tasks at one priority.
    pub fn pending_tasks_at(&self, priority: Priority) -> usize {
        self.queue.len_at(priority)
    }

    // =========================================================================
    // State updates
    // =========================================================================

    /// Turn the state changes posted since the last flush into Evaluation
    /// tasks. Returns how many updates were processed.
    pub fn flush_updates(&mut self) -> Result<usize> {
        let updates: Vec<Update> = self.inbox.borrow_mut().drain(..).collect();
        let count = updates.len();

        for Update { element, priority } in updates {
            let Some(target) = self.elements.get_mut(element) else {
                continue;
            };
            if target.is_detached() {
                continue;
            }
            if target.state == ElementState::Attached {
                target.state = ElementState::Dirty;
            }
            self.schedule(Task::Evaluation(element), priority)?;
        }
        Ok(count)
    }

    // =========================================================================
    // Drain loop
    // =========================================================================

    /// Flush updates, poll effects, then execute the next task.
    ///
    /// Returns `false` when the queue was empty.
    pub fn run_next(&mut self) -> Result<bool> {
        self.flush_updates()?;
        self.poll_effects();

        let Some((id, task, priority)) = self.queue.pop() else {
            return Ok(false);
        };
        trace!(?task, %priority, "pop");
        self.release(id, task);
        self.execute(task)?;
        Ok(true)
    }

    /// Run until the queue is empty. Returns how many tasks executed.
    pub fn drain(&mut self) -> Result<usize> {
        let started = Instant::now();
        let mut executed = 0;
        while self.run_next()? {
            executed += 1;
        }
        if executed > 0 {
            debug!(executed, elapsed = ?started.elapsed(), "drained");
        }
        Ok(executed)
    }

    /// Run until the queue is empty or `deadline` passed.
    pub fn drain_until(&mut self, deadline: Instant) -> Result<usize> {
        let mut executed = 0;
        while Instant::now() < deadline && self.run_next()? {
            executed += 1;
        }
        if self.pending_tasks() > 0 {
            debug!(executed, remaining = self.pending_tasks(), "budget exhausted");
        }
        Ok(executed)
    }

    /// One budgeted drain, as configured by [`Config::tick_budget`](crate::Config).
    pub fn tick(&mut self) -> Result<usize> {
        match self.config.tick_budget {
            Some(budget) => self.drain_until(Instant::now() + budget),
            None => self.drain(),
        }
    }

    /// [`drain_until`](Self::drain_until) with a relative budget.
    pub fn drain_for(&mut self, budget: Duration) -> Result<usize> {
        self.drain_until(Instant::now() + budget)
    }
}
