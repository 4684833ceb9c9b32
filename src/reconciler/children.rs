//! Keyed children reconciliation.
//!
//! One left-to-right walk over the new child list against the result map of
//! the previous pass. Each child resolves to a key (explicit, or its ordinal
//! among unkeyed siblings) and lands in one of these cases:
//!
//! | Previous record             | Action                                   |
//! |-----------------------------|------------------------------------------|
//! | none                        | mount: evaluate new, place after cursor  |
//! | same raw node               | reuse untouched                          |
//! | same type                   | update in place (hook state survives)    |
//! | other type, or Detached     | replace: evaluate new, tear down old     |
//!
//! Reuse, update and replace then place the element after the cursor, which
//! emits a move only when its host predecessor actually differs.
//!
//! Literals have no identity of their own, so Plain runs get a shortcut:
//! - an old implicit Plain entry meeting a non-Plain child is swept away with
//!   the rest of its run that the new list no longer reaches
//! - a new unkeyed Plain child meeting a non-Plain record starts a tight pass
//!   over the consecutive Plain children that follow
//!
//! Whatever the walk did not visit is torn down and removed at the end. This
//! is O(n); moves are detected by adjacency only, not minimized.

use std::mem;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::engine::{ChildKey, ElementId, Instruction, Node, ResultMap, ResultRecord, Root, Seed};
use crate::error::Result;

/// Walk state of one child list.
struct ChildPass {
    old: ResultMap,
    visited: Vec<bool>,
    fresh: ResultMap,
    /// Last child placed by this walk.
    cursor: Option<ElementId>,
    implicit: usize,
    /// Unkeyed children in the new list.
    implicit_total: usize,
}

impl ChildPass {
    fn new(old: ResultMap, children: &[Node]) -> Self {
        let implicit_total = children
            .iter()
            .filter(|node| match node {
                Node::Seed(seed) => seed.key().is_none(),
                _ => true,
            })
            .count();

        Self {
            visited: vec![false; old.len()],
            old,
            fresh: ResultMap::with_capacity(children.len()),
            cursor: None,
            implicit: 0,
            implicit_total,
        }
    }

    fn key_of(&mut self, seed: &Seed) -> ChildKey {
        match seed.key() {
            Some(key) => ChildKey::Explicit(key.clone()),
            None => {
                let key = ChildKey::Implicit(self.implicit);
                self.implicit += 1;
                key
            }
        }
    }

    /// Unvisited record of the previous pass under `key`.
    fn lookup(&self, key: &ChildKey) -> Option<(usize, ResultRecord)> {
        let (slot, _, record) = self.old.get_full(key)?;
        (!self.visited[slot]).then(|| (slot, record.clone()))
    }

    fn visit(&mut self, slot: usize) {
        self.visited[slot] = true;
    }

    /// An old implicit entry that no new child will ask for.
    fn unreachable_implicit(&self, slot: usize) -> bool {
        !self.visited[slot]
            && matches!(
                self.old.get_index(slot),
                Some((ChildKey::Implicit(n), _)) if *n >= self.implicit_total
            )
    }

    fn record(&mut self, key: ChildKey, node: &Node, element: ElementId) {
        self.fresh.insert(
            key,
            ResultRecord {
                node: node.clone(),
                element,
            },
        );
        self.cursor = Some(element);
    }
}

impl Root {
    /// Reconcile the children of native element `parent` against `children`.
    pub(crate) fn reconcile_children(&mut self, parent: ElementId, children: &Rc<[Node]>) -> Result<()> {
        let old = match self.get_mut(parent).native_mut() {
            Some(native) => mem::take(&mut native.results),
            None => panic!("custom element {parent:?} has no child list"),
        };
        let mut pass = ChildPass::new(old, children);

        let walked = self.walk_children(parent, children, &mut pass);

        let leftovers: Vec<(ChildKey, ResultRecord)> = pass
            .old
            .into_iter()
            .zip(pass.visited)
            .filter(|(_, visited)| !visited)
            .map(|(entry, _)| entry)
            .collect();

        let mut fresh = pass.fresh;
        match walked {
            Ok(()) => {
                for (_, record) in leftovers {
                    self.remove_child(parent, record.element);
                }
                debug_assert_eq!(
                    self.sibling_order(parent),
                    fresh.values().map(|r| r.element).collect::<Vec<_>>(),
                    "sibling list diverged from the result map"
                );
            }
            // Keep every live element reachable; the pass is aborted anyway.
            Err(_) => {
                for (key, record) in leftovers {
                    fresh.entry(key).or_insert(record);
                }
            }
        }

        if let Some(native) = self.get_mut(parent).native_mut() {
            native.results = fresh;
        }
        walked
    }

    fn walk_children(&mut self, parent: ElementId, children: &[Node], pass: &mut ChildPass) -> Result<()> {
        let mut index = 0;
        while index < children.len() {
            let node = &children[index];
            let seed = node.to_seed();
            let key = pass.key_of(&seed);

            if pass.fresh.contains_key(&key) {
                if self.config.warn_duplicate_keys {
                    warn!(?parent, ?key, "duplicate key in child list, skipping child");
                }
                index += 1;
                continue;
            }

            let Some((slot, record)) = pass.lookup(&key) else {
                self.mount_child(parent, pass, key, node, seed)?;
                index += 1;
                continue;
            };

            let (detached, same_type, old_plain) = {
                let old = self.get(record.element);
                (old.is_detached(), old.seed.same_type(&seed), old.seed.is_plain())
            };

            if !detached && record.node.same(node) {
                pass.visit(slot);
                self.keep_child(parent, pass, key, node, record.element);
            } else if !detached && same_type {
                pass.visit(slot);
                self.update_child(parent, pass, key, node, seed, record.element)?;
            } else if old_plain && !seed.is_plain() && key.is_implicit() {
                self.remove_plain_run(parent, pass, slot);
                self.mount_child(parent, pass, key, node, seed)?;
            } else if seed.is_plain() && !old_plain && key.is_implicit() {
                index = self.walk_plain_run(parent, children, index, pass, seed, key)?;
                continue;
            } else {
                pass.visit(slot);
                self.replace_child(parent, pass, key, node, seed, record)?;
            }
            index += 1;
        }
        Ok(())
    }

    /// Place the consecutive unkeyed Plain children starting at `start`.
    /// Returns the index of the first child after the run.
    fn walk_plain_run(
        &mut self,
        parent: ElementId,
        children: &[Node],
        start: usize,
        pass: &mut ChildPass,
        seed: Rc<Seed>,
        key: ChildKey,
    ) -> Result<usize> {
        let mut index = start;
        let mut current = Some((seed, key));

        while let Some((seed, key)) = current.take() {
            let node = &children[index];
            match pass.lookup(&key) {
                None => self.mount_child(parent, pass, key, node, seed)?,
                Some((slot, record)) => {
                    pass.visit(slot);
                    let (detached, plain) = {
                        let old = self.get(record.element);
                        (old.is_detached(), old.seed.is_plain())
                    };
                    if detached || !plain {
                        self.replace_child(parent, pass, key, node, seed, record)?;
                    } else if record.node.same(node) {
                        self.keep_child(parent, pass, key, node, record.element);
                    } else {
                        self.update_child(parent, pass, key, node, seed, record.element)?;
                    }
                }
            }

            index += 1;
            if let Some(next) = children.get(index) {
                let seed = next.to_seed();
                if seed.is_plain() && seed.key().is_none() {
                    let key = pass.key_of(&seed);
                    current = Some((seed, key));
                }
            }
        }

        trace!(?parent, placed = index - start, "plain run");
        Ok(index)
    }

    /// Tear down the old Plain entry at `start` and the unreachable Plain
    /// entries right behind it.
    fn remove_plain_run(&mut self, parent: ElementId, pass: &mut ChildPass, start: usize) {
        let mut slot = start;
        loop {
            pass.visit(slot);
            let element = pass.old[slot].element;
            self.remove_child(parent, element);

            slot += 1;
            let next_is_plain = pass
                .old
                .get_index(slot)
                .is_some_and(|(_, record)| self.get(record.element).seed.is_plain());
            if !(next_is_plain && pass.unreachable_implicit(slot)) {
                break;
            }
        }
        trace!(?parent, removed = slot - start, "plain run removed");
    }

    // =========================================================================
    // Cases
    // =========================================================================

    fn mount_child(
        &mut self,
        parent: ElementId,
        pass: &mut ChildPass,
        key: ChildKey,
        node: &Node,
        seed: Rc<Seed>,
    ) -> Result<()> {
        let id = self.create_element(seed);
        if let Err(error) = self.evaluate_in(Some(parent), id) {
            self.teardown(id);
            return Err(error);
        }

        self.link_after(parent, id, pass.cursor);
        let instruction = Instruction::PreinsertNode {
            parent: self.host(parent),
            previous: self.host_of(pass.cursor),
            node: self.host(id),
        };
        self.emit(instruction);
        pass.record(key, node, id);
        Ok(())
    }

    fn keep_child(&mut self, parent: ElementId, pass: &mut ChildPass, key: ChildKey, node: &Node, id: ElementId) {
        self.relocate(parent, id, pass.cursor);
        pass.record(key, node, id);
    }

    fn update_child(
        &mut self,
        parent: ElementId,
        pass: &mut ChildPass,
        key: ChildKey,
        node: &Node,
        seed: Rc<Seed>,
        id: ElementId,
    ) -> Result<()> {
        self.get_mut(id).seed = seed;
        let evaluated = self.evaluate_in(Some(parent), id);
        if evaluated.is_ok() {
            self.relocate(parent, id, pass.cursor);
        }
        pass.record(key, node, id);
        evaluated
    }

    fn replace_child(
        &mut self,
        parent: ElementId,
        pass: &mut ChildPass,
        key: ChildKey,
        node: &Node,
        seed: Rc<Seed>,
        old: ResultRecord,
    ) -> Result<()> {
        let new = self.create_element(seed);
        if let Err(error) = self.evaluate_in(Some(parent), new) {
            self.teardown(new);
            pass.fresh.insert(key, old);
            return Err(error);
        }

        let (old_host, new_host) = (self.host(old.element), self.host(new));
        self.swap_sibling(parent, old.element, new);
        self.teardown(old.element);
        self.emit(Instruction::ReplaceNode {
            old: old_host,
            new: new_host,
        });

        self.relocate(parent, new, pass.cursor);
        pass.record(key, node, new);
        Ok(())
    }

    /// Take a child out of `parent` and off the host.
    pub(crate) fn remove_child(&mut self, parent: ElementId, id: ElementId) {
        let host = self.get(id).host;
        self.unlink(parent, id);
        self.teardown(id);
        if let Some(host) = host {
            self.emit(Instruction::RemoveNode { old: host });
        }
    }
}
