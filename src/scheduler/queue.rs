//! Priority queue - six FIFO buckets over one task arena.
//!
//! Every queued task lives in a slotmap and carries `prev`/`next` links to
//! its bucket neighbours, so each bucket is an index-linked list:
//!
//! ```text
//! segments[User]    first ─▶ [t3] ⇄ [t7] ◀─ last
//! segments[Minimum] first ─▶ [t1] ⇄ [t2] ⇄ [t5] ◀─ last
//! ```
//!
//! Enqueue appends at `last`, dequeue splices a task out through its links,
//! both O(1). An occupancy mask keeps one bit per non-empty bucket; the
//! highest set bit names the bucket [`Queue::pop`] serves next.

use bitflags::bitflags;
use slotmap::SlotMap;

use super::priority::{BUCKETS, Priority};
use super::task::{Task, TaskId};

bitflags! {
    /// One bit per non-empty bucket, bit `n` for bucket `n`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct Occupied: u8 {
        const MINIMUM = 1 << 0;
        const OTHER = 1 << 1;
        const STORE = 1 << 2;
        const NETWORK = 1 << 3;
        const USER = 1 << 4;
        const MAXIMUM = 1 << 5;
    }
}

impl Occupied {
    fn bucket(bucket: usize) -> Self {
        Occupied::from_bits_retain(1 << bucket)
    }

    /// Most urgent non-empty bucket.
    fn highest(self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(7 - self.bits().leading_zeros() as usize)
        }
    }
}

struct Entry {
    task: Task,
    priority: Priority,
    prev: Option<TaskId>,
    next: Option<TaskId>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Segment {
    first: Option<TaskId>,
    last: Option<TaskId>,
    len: usize,
}

/// FIFO buckets drained in strict descending priority.
pub(crate) struct Queue {
    entries: SlotMap<TaskId, Entry>,
    segments: [Segment; BUCKETS],
    occupied: Occupied,
}

impl Queue {
    pub(crate) fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            segments: [Segment::default(); BUCKETS],
            occupied: Occupied::empty(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len_at(&self, priority: Priority) -> usize {
        priority.bucket().map_or(0, |b| self.segments[b].len)
    }

    pub(crate) fn contains(&self, id: TaskId) -> bool {
        self.entries.contains_key(id)
    }

    pub(crate) fn priority(&self, id: TaskId) -> Option<Priority> {
        self.entries.get(id).map(|entry| entry.priority)
    }

    /// Append `task` to the bucket of `priority`.
    ///
    /// Panics for `Realtime` and `Disabled`; those never reach the queue.
    pub(crate) fn enqueue(&mut self, task: Task, priority: Priority) -> TaskId {
        let Some(bucket) = priority.bucket() else {
            panic!("{priority} tasks are never queued");
        };

        let last = self.segments[bucket].last;
        let id = self.entries.insert(Entry {
            task,
            priority,
            prev: last,
            next: None,
        });

        match last {
            Some(last) => self.entries[last].next = Some(id),
            None => self.segments[bucket].first = Some(id),
        }

        let segment = &mut self.segments[bucket];
        segment.last = Some(id);
        segment.len += 1;
        self.occupied.insert(Occupied::bucket(bucket));
        id
    }

    /// Splice a task out of its bucket. `None` if it already left the queue.
    pub(crate) fn dequeue(&mut self, id: TaskId) -> Option<Task> {
        let entry = self.entries.remove(id)?;
        let bucket = entry
            .priority
            .bucket()
            .unwrap_or_else(|| panic!("queued task {id:?} carries {}", entry.priority));

        match entry.prev {
            Some(prev) => self.entries[prev].next = entry.next,
            None => self.segments[bucket].first = entry.next,
        }
        match entry.next {
            Some(next) => self.entries[next].prev = entry.prev,
            None => self.segments[bucket].last = entry.prev,
        }

        let segment = &mut self.segments[bucket];
        segment.len -= 1;
        if segment.len == 0 {
            debug_assert!(segment.first.is_none() && segment.last.is_none());
            self.occupied.remove(Occupied::bucket(bucket));
        }
        Some(entry.task)
    }

    /// Bucket [`pop`](Self::pop) serves next.
    pub(crate) fn highest(&self) -> Option<Priority> {
        self.occupied.highest().map(Priority::from_bucket)
    }

    /// Remove the oldest task of the most urgent non-empty bucket.
    pub(crate) fn pop(&mut self) -> Option<(TaskId, Task, Priority)> {
        let bucket = self.occupied.highest()?;
        let Some(id) = self.segments[bucket].first else {
            panic!("bucket {bucket} is marked occupied but has no first task");
        };
        let priority = Priority::from_bucket(bucket);
        let task = self.dequeue(id)?;
        Some((id, task, priority))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ElementId;

    fn ids(n: usize) -> Vec<ElementId> {
        let mut arena: SlotMap<ElementId, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    #[test]
    fn test_pop_strict_priority_then_fifo() {
        let e = ids(4);
        let mut queue = Queue::new();

        queue.enqueue(Task::Evaluation(e[0]), Priority::Minimum);
        queue.enqueue(Task::Evaluation(e[1]), Priority::User);
        queue.enqueue(Task::Evaluation(e[2]), Priority::Minimum);
        queue.enqueue(Task::Evaluation(e[3]), Priority::User);

        let order: Vec<ElementId> = std::iter::from_fn(|| queue.pop())
            .map(|(_, task, _)| task.element())
            .collect();

        assert_eq!(order, vec![e[1], e[3], e[0], e[2]]);
        assert!(queue.is_empty());
        assert_eq!(queue.highest(), None);
    }

    #[test]
    fn test_dequeue_middle_keeps_links() {
        let e = ids(3);
        let mut queue = Queue::new();

        queue.enqueue(Task::Evaluation(e[0]), Priority::Store);
        let middle = queue.enqueue(Task::Evaluation(e[1]), Priority::Store);
        queue.enqueue(Task::Evaluation(e[2]), Priority::Store);

        assert_eq!(queue.dequeue(middle), Some(Task::Evaluation(e[1])));
        assert_eq!(queue.dequeue(middle), None, "second dequeue is a miss");
        assert_eq!(queue.len_at(Priority::Store), 2);

        assert_eq!(queue.pop().map(|(_, t, _)| t), Some(Task::Evaluation(e[0])));
        assert_eq!(queue.pop().map(|(_, t, _)| t), Some(Task::Evaluation(e[2])));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_occupancy_tracks_buckets() {
        let e = ids(2);
        let mut queue = Queue::new();

        let low = queue.enqueue(Task::Evaluation(e[0]), Priority::Other);
        let high = queue.enqueue(Task::Teardown(e[1]), Priority::Maximum);
        assert_eq!(queue.highest(), Some(Priority::Maximum));

        queue.dequeue(high);
        assert_eq!(queue.highest(), Some(Priority::Other));
        assert_eq!(queue.priority(low), Some(Priority::Other));

        queue.dequeue(low);
        assert_eq!(queue.highest(), None);
        assert!(!queue.contains(low));
    }

    #[test]
    fn test_enqueue_after_pop_mid_drain() {
        let e = ids(3);
        let mut queue = Queue::new();

        queue.enqueue(Task::Evaluation(e[0]), Priority::Minimum);
        queue.enqueue(Task::Evaluation(e[1]), Priority::Minimum);

        let (_, first, _) = queue.pop().expect("queued");
        assert_eq!(first, Task::Evaluation(e[0]));

        // A more urgent task arriving mid-drain jumps the remaining backlog.
        queue.enqueue(Task::Evaluation(e[2]), Priority::Network);
        let (_, next, priority) = queue.pop().expect("queued");
        assert_eq!(next, Task::Evaluation(e[2]));
        assert_eq!(priority, Priority::Network);
    }

    #[test]
    #[should_panic]
    fn test_realtime_is_never_queued() {
        let e = ids(1);
        Queue::new().enqueue(Task::Evaluation(e[0]), Priority::Realtime);
    }
}
