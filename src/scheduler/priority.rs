//! Task priorities.

use std::fmt;

/// Urgency of a scheduled task.
///
/// Ordered from least to most urgent, so `Priority::User > Priority::Store`.
///
/// | Priority   | Value | Queued                         |
/// |------------|-------|--------------------------------|
/// | `Realtime` | 7     | never: executes synchronously  |
/// | `Maximum`  | 6     | bucket 5                       |
/// | `User`     | 5     | bucket 4                       |
/// | `Network`  | 4     | bucket 3                       |
/// | `Store`    | 3     | bucket 2                       |
/// | `Other`    | 2     | bucket 1                       |
/// | `Minimum`  | 1     | bucket 0                       |
/// | `Disabled` | -1    | never: the task is dropped     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Disabled,
    #[default]
    Minimum,
    Other,
    Store,
    Network,
    User,
    Maximum,
    Realtime,
}

/// Number of queue buckets (`Minimum..=Maximum`).
pub(crate) const BUCKETS: usize = 6;

impl Priority {
    /// Every priority, most urgent first.
    pub const ALL: [Priority; 8] = [
        Priority::Realtime,
        Priority::Maximum,
        Priority::User,
        Priority::Network,
        Priority::Store,
        Priority::Other,
        Priority::Minimum,
        Priority::Disabled,
    ];

    /// Numeric urgency. Higher is more urgent.
    pub fn value(self) -> i8 {
        match self {
            Priority::Disabled => -1,
            Priority::Minimum => 1,
            Priority::Other => 2,
            Priority::Store => 3,
            Priority::Network => 4,
            Priority::User => 5,
            Priority::Maximum => 6,
            Priority::Realtime => 7,
        }
    }

    /// Queue bucket, `None` for the two priorities that never queue.
    pub(crate) fn bucket(self) -> Option<usize> {
        match self {
            Priority::Disabled | Priority::Realtime => None,
            other => Some(other.value() as usize - 1),
        }
    }

    pub(crate) fn from_bucket(bucket: usize) -> Priority {
        match bucket {
            0 => Priority::Minimum,
            1 => Priority::Other,
            2 => Priority::Store,
            3 => Priority::Network,
            4 => Priority::User,
            5 => Priority::Maximum,
            _ => panic!("no queue bucket {bucket}"),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Disabled => "disabled",
            Priority::Minimum => "minimum",
            Priority::Other => "other",
            Priority::Store => "store",
            Priority::Network => "network",
            Priority::User => "user",
            Priority::Maximum => "maximum",
            Priority::Realtime => "realtime",
        };
        f.write_str(name)
    }
}
