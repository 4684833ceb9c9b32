//! Effect execution - running setups and settling async ones.
//!
//! A setup either finishes on the spot ([`Setup::Ready`]) or hands back a
//! future ([`Setup::Pending`]). Futures are polled once right away, then kept
//! in the root's in-flight list and polled again by the drain loop whenever
//! their waker fired.
//!
//! While a call site has a setup in flight, newer runs of it wait: the latest
//! requested run starts as soon as the in-flight one settles. In-flight setups
//! are never cancelled. If their element is gone by the time they settle, the
//! cleanup they produced runs immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use futures::task::{ArcWake, waker_ref};
use tracing::{trace, warn};

use crate::engine::{ElementId, Root};
use crate::error::EffectError;
use crate::hooks::{EffectSlot, Setup, SetupResult};

/// Set when the future asked to be polled again.
struct WakeFlag(AtomicBool);

impl ArcWake for WakeFlag {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.0.store(true, Ordering::Release);
    }
}

/// An async setup that has not resolved yet.
pub(crate) struct InFlight {
    element: ElementId,
    slot: usize,
    future: LocalBoxFuture<'static, SetupResult>,
    woken: Arc<WakeFlag>,
}

impl Root {
    pub(crate) fn effect_slot_mut(&mut self, element: ElementId, slot: usize) -> Option<&mut EffectSlot> {
        self.elements
            .get_mut(element)?
            .custom_mut()?
            .hooks
            .get_mut(slot)?
            .as_effect_mut()
    }

    /// Async setups still running.
    pub fn in_flight_effects(&self) -> usize {
        self.in_flight.len()
    }

    /// Run the pending setup of one call site: previous cleanup first, then
    /// the setup itself.
    pub(crate) fn run_effect(&mut self, element: ElementId, slot: usize) {
        let Some(effect) = self.effect_slot_mut(element, slot) else {
            return;
        };
        if effect.in_flight {
            trace!(?element, slot, "setup in flight, run deferred");
            return;
        }
        let Some(run) = effect.next_run.take() else {
            return;
        };

        if let Some(cleanup) = effect.teardown.take() {
            cleanup();
        }
        match run() {
            Setup::Ready(result) => self.settle_effect(element, slot, result),
            Setup::Pending(future) => self.start_effect(element, slot, future),
        }
    }

    fn start_effect(&mut self, element: ElementId, slot: usize, mut future: LocalBoxFuture<'static, SetupResult>) {
        let woken = Arc::new(WakeFlag(AtomicBool::new(false)));
        let poll = {
            let waker = waker_ref(&woken);
            let mut cx = Context::from_waker(&waker);
            future.as_mut().poll(&mut cx)
        };

        match poll {
            Poll::Ready(result) => self.settle_effect(element, slot, result),
            Poll::Pending => {
                if let Some(effect) = self.effect_slot_mut(element, slot) {
                    effect.in_flight = true;
                }
                trace!(?element, slot, "setup in flight");
                self.in_flight.push(InFlight {
                    element,
                    slot,
                    future,
                    woken,
                });
            }
        }
    }

    /// Store what a setup produced and start the run deferred behind it.
    fn settle_effect(&mut self, element: ElementId, slot: usize, result: SetupResult) {
        let cleanup = match result {
            Ok(cleanup) => cleanup,
            Err(message) => {
                self.record_effect_error(element, slot, message);
                None
            }
        };

        match self.effect_slot_mut(element, slot) {
            Some(effect) => {
                effect.in_flight = false;
                effect.teardown = cleanup;
            }
            None => {
                if let Some(cleanup) = cleanup {
                    trace!(?element, slot, "setup outlived its element, cleaning up");
                    cleanup();
                }
                return;
            }
        }

        let live = self.elements.get(element).is_some_and(|e| !e.is_detached());
        let deferred = self
            .effect_slot_mut(element, slot)
            .is_some_and(|effect| effect.next_run.is_some() && effect.pending.is_none());
        if live && deferred {
            self.run_effect(element, slot);
        }
    }

    fn record_effect_error(&mut self, element: ElementId, slot: usize, message: String) {
        warn!(?element, slot, %message, "effect setup failed");
        self.effect_errors.push(EffectError {
            element,
            slot,
            message,
        });
    }

    /// Poll the async setups whose waker fired. Returns how many settled.
    pub fn poll_effects(&mut self) -> usize {
        let mut settled = 0;
        let mut index = 0;

        while index < self.in_flight.len() {
            let flight = &mut self.in_flight[index];
            if !flight.woken.0.swap(false, Ordering::AcqRel) {
                index += 1;
                continue;
            }

            let poll = {
                let waker = waker_ref(&flight.woken);
                let mut cx = Context::from_waker(&waker);
                flight.future.as_mut().poll(&mut cx)
            };
            match poll {
                Poll::Pending => index += 1,
                Poll::Ready(result) => {
                    let flight = self.in_flight.remove(index);
                    self.settle_effect(flight.element, flight.slot, result);
                    settled += 1;
                }
            }
        }
        settled
    }
}
