//! Engine - the retained tree data model.
//!
//! - [`Seed`] / [`Node`]: per-pass immutable description of a slot
//! - [`Element`]: persistent node, one per tree position, stored in an arena
//! - [`Instruction`]: one ordered host edit
//! - [`Root`]: arena + instruction buffer + scheduler queue
//!
//! # Architecture
//!
//! Elements are NOT linked by pointers. They live in a slotmap arena owned by
//! their root and refer to each other by [`ElementId`]:
//!
//! ```text
//! container ─results─▶ [li#1] ⇄ [li#2] ⇄ [Counter]
//!                                             │ output
//!                                             ▼
//!                                          [span]
//! ```
//!
//! Generational ids make a stale reference (a task or setter outliving its
//! element) a clean miss instead of aliasing a reused slot.

mod element;
mod instruction;
mod root;
mod seed;

pub use element::{Element, ElementId, ElementState};
pub use instruction::{Instruction, InstructionKind, count_kind};
pub use root::Root;
pub use seed::{Node, Seed, SeedBuilder, SeedKind};

pub(crate) use element::{ChildKey, CustomState, ElementKind, ResultMap, ResultRecord};
pub(crate) use seed::same_children;
