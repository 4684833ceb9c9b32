//! Root - one independent render session.
//!
//! A Root owns:
//! - the element arena (every retained element lives here)
//! - the container element standing for the host mount point
//! - the instruction buffer (append-only, drained by the host applier)
//! - the scheduler queue
//! - the update inbox state setters write into
//! - in-flight async effect setups and the effect error channel
//!
//! # Example
//!
//! ```ignore
//! let mut root = Root::new();
//! let host = MemoryRenderer::new();
//! let mount = host.root();
//! let mut applier = Applier::new(host, root.container(), mount);
//!
//! root.render(native("p").child("hello"))?;
//! applier.apply(root.take_instructions())?;
//!
//! // Later, after state changes:
//! root.drain()?;
//! applier.apply(root.take_instructions())?;
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::mem;
use std::rc::Rc;

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{EffectError, Result};
use crate::hooks::Inbox;
use crate::scheduler::{InFlight, Queue};

use super::element::{Element, ElementId, ElementState};
use super::instruction::Instruction;
use super::seed::{Node, Seed};

/// One render session: element arena, instruction buffer, task queue.
pub struct Root {
    pub(crate) elements: SlotMap<ElementId, Element>,
    pub(crate) instructions: Vec<Instruction>,
    pub(crate) queue: Queue,
    pub(crate) inbox: Inbox,
    pub(crate) in_flight: Vec<InFlight>,
    pub(crate) effect_errors: Vec<EffectError>,
    pub(crate) config: Config,
    container: ElementId,
}

impl Root {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut elements = SlotMap::with_key();
        let seed = Seed::container(Rc::from(Vec::new()));
        let snapshot = (seed.props().clone(), seed.children().clone());
        let container = elements.insert(Element::new(seed));

        // The container is placed by the host, never by an instruction.
        let element = &mut elements[container];
        element.state = ElementState::Attached;
        element.host = Some(container);
        element.props = Some(snapshot.0);
        element.children = Some(snapshot.1);

        Self {
            elements,
            instructions: Vec::new(),
            queue: Queue::new(),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            in_flight: Vec::new(),
            effect_errors: Vec::new(),
            config,
            container,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Element standing for the host mount point.
    pub fn container(&self) -> ElementId {
        self.container
    }

    // =========================================================================
    // Passes
    // =========================================================================

    /// Reconcile the mounted tree against `node`.
    pub fn render(&mut self, node: impl Into<Node>) -> Result<()> {
        self.render_children(Rc::from(vec![node.into()]))
    }

    /// Remove everything below the container.
    pub fn unmount(&mut self) -> Result<()> {
        self.render_children(Rc::from(Vec::new()))
    }

    fn render_children(&mut self, children: Rc<[Node]>) -> Result<()> {
        let _span = tracing::debug_span!("render").entered();
        let container = self.container;
        let before = self.instructions.len();

        self.get_mut(container).seed = Seed::container(children.clone());
        self.reconcile_children(container, &children)?;
        self.get_mut(container).children = Some(children);

        debug!(
            instructions = self.instructions.len() - before,
            elements = self.elements.len(),
            "render pass finished"
        );
        Ok(())
    }

    // =========================================================================
    // Instruction buffer
    // =========================================================================

    /// Instructions not yet taken by the host.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Drain the instruction buffer, in application order.
    pub fn take_instructions(&mut self) -> Vec<Instruction> {
        mem::take(&mut self.instructions)
    }

    pub(crate) fn emit(&mut self, instruction: Instruction) {
        trace!(?instruction, "emit");
        self.instructions.push(instruction);
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Number of retained elements, the container included.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Top-level elements in placement order.
    pub fn mounted(&self) -> Vec<ElementId> {
        self.get(self.container).child_elements()
    }

    /// Effect failures collected since the last call.
    pub fn take_effect_errors(&mut self) -> Vec<EffectError> {
        mem::take(&mut self.effect_errors)
    }

    /// Arena access for ids the engine itself holds. A miss is an engine bug.
    pub(crate) fn get(&self, id: ElementId) -> &Element {
        match self.elements.get(id) {
            Some(element) => element,
            None => panic!("element {id:?} is missing from the arena"),
        }
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> &mut Element {
        match self.elements.get_mut(id) {
            Some(element) => element,
            None => panic!("element {id:?} is missing from the arena"),
        }
    }

    /// Host handle of an element, if it has one yet.
    pub(crate) fn host_of(&self, id: Option<ElementId>) -> Option<ElementId> {
        id.and_then(|id| self.elements.get(id)).and_then(|e| e.host)
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}
