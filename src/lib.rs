//! # spark-reconciler
//!
//! Keyed tree reconciler and priority scheduler for declarative UIs.
//!
//! ## Architecture
//!
//! Render functions describe a tree; the reconciler diffs each new description
//! against the retained tree and records the host edits as an ordered
//! instruction log. Hosts apply the log; nothing in the core touches a host.
//!
//! ```text
//! Node → Seed → evaluate (retained Elements) → Instructions → Applier → Renderer
//!                  ▲
//!                  └── Scheduler ◀── State setters / Effects
//! ```
//!
//! Work after the first render is scheduled: state changes and effects become
//! prioritized tasks on the root's queue, drained by the host.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Value, Key, NativeType, Props)
//! - [`engine`] - Seeds, retained elements, instructions, the Root
//! - [`reconciler`] - evaluate, keyed children diff, teardown
//! - [`scheduler`] - priorities, task queue, drain loop, async effects
//! - [`hooks`] - Scope, State and Effect hooks
//! - [`primitives`] - Components and seed builders
//! - [`renderer`] - Renderer trait, Applier, in-memory host
//!
//! ## Example
//!
//! ```ignore
//! use spark_reconciler::{native, Applier, Component, MemoryRenderer, Root};
//!
//! let counter = Component::new("Counter", |scope, _props, _children| {
//!     let count = scope.use_state((), || 0);
//!     native("button").child(count.get()).into()
//! });
//!
//! let mut root = Root::new();
//! let host = MemoryRenderer::new();
//! let mount = host.root();
//! let mut applier = Applier::new(host, root.container(), mount);
//!
//! root.render(counter.seed())?;
//! applier.apply(root.take_instructions())?;
//! assert_eq!(applier.renderer().to_markup(), "<button>0</button>");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod primitives;
pub mod reconciler;
pub mod renderer;
pub mod scheduler;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::Config;

pub use engine::{
    Element, ElementId, ElementState, Instruction, InstructionKind, Node, Root, Seed,
    SeedBuilder, SeedKind, count_kind,
};

pub use error::{ApplyError, EffectError, Error, Result};

pub use hooks::{
    EffectKind, EffectOptions, Scope, Setup, SetupResult, State, StateKind, StateOptions,
};

pub use primitives::{Cleanup, Component, RenderFn, fragment, native, plain};

pub use renderer::{Applier, HostId, MemoryRenderer, Renderer};

pub use scheduler::{Priority, Task, TaskId};
