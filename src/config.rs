//! Root configuration.
//!
//! Hook options fall back to these defaults when they leave a priority unset.
//!
//! ```ignore
//! let root = Root::with_config(
//!     Config::default()
//!         .with_state_priority(Priority::User)
//!         .with_tick_budget(Duration::from_millis(8)),
//! );
//! ```

use std::time::Duration;

use crate::scheduler::Priority;

/// Tunables for one [`Root`](crate::Root).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Priority of effects whose options leave it unset.
    pub effect_priority: Priority,
    /// Priority of the evaluation a state setter requests when its options
    /// leave it unset.
    pub state_priority: Priority,
    /// Time budget of one [`Root::tick`](crate::Root::tick). `None` drains
    /// until the queue is empty.
    pub tick_budget: Option<Duration>,
    /// Log duplicate keys in a child list.
    pub warn_duplicate_keys: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            effect_priority: Priority::Minimum,
            state_priority: Priority::Minimum,
            tick_budget: None,
            warn_duplicate_keys: true,
        }
    }
}

impl Config {
    pub fn with_effect_priority(mut self, priority: Priority) -> Self {
        self.effect_priority = priority;
        self
    }

    pub fn with_state_priority(mut self, priority: Priority) -> Self {
        self.state_priority = priority;
        self
    }

    pub fn with_tick_budget(mut self, budget: Duration) -> Self {
        self.tick_budget = Some(budget);
        self
    }

    pub fn with_duplicate_key_warnings(mut self, enabled: bool) -> Self {
        self.warn_duplicate_keys = enabled;
        self
    }
}
