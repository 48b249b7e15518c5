//! Job Queue Module
//!
//! Pending jobs grouped by priority tier, FIFO within a tier.

use std::collections::VecDeque;

use crate::jobs::{JobId, JobPriority};

// == Queued Job ==
/// The parts of a job the queue needs for ordering and readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedJob {
    pub id: JobId,
    pub priority: JobPriority,
    pub scheduled_at: u64,
}

impl QueuedJob {
    pub fn is_ready(&self, now: u64) -> bool {
        self.scheduled_at <= now
    }
}

// == Job Queue ==
/// Priority-ordered queue of pending jobs.
///
/// A job is inserted immediately before the first queued job of strictly
/// lower priority, so tiers stay in rank order and each tier is FIFO by
/// insertion time. Readiness does not affect position.
#[derive(Debug, Default)]
pub struct JobQueue {
    items: VecDeque<QueuedJob>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // == Push ==
    /// Inserts a job at its priority position.
    pub fn push(&mut self, job: QueuedJob) {
        let rank = job.priority.rank();
        let position = self
            .items
            .iter()
            .position(|queued| queued.priority.rank() > rank)
            .unwrap_or(self.items.len());
        self.items.insert(position, job);
    }

    // == Pop ==
    /// Removes and returns the head of the queue.
    pub fn pop_front(&mut self) -> Option<QueuedJob> {
        self.items.pop_front()
    }

    /// Removes and returns the first job, in queue order, that is ready at `now`.
    pub fn pop_first_ready(&mut self, now: u64) -> Option<QueuedJob> {
        let position = self.items.iter().position(|queued| queued.is_ready(now))?;
        self.items.remove(position)
    }

    pub fn peek(&self) -> Option<&QueuedJob> {
        self.items.front()
    }

    // == Remove ==
    /// Removes a job by id. Returns false if it was not queued.
    pub fn remove(&mut self, id: JobId) -> bool {
        match self.items.iter().position(|queued| queued.id == id) {
            Some(position) => {
                self.items.remove(position);
                true
            }
            None => false,
        }
    }

    /// Queued job ids in execution order.
    pub fn ids(&self) -> Vec<JobId> {
        self.items.iter().map(|queued| queued.id).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn queued(priority: JobPriority, scheduled_at: u64) -> QueuedJob {
        QueuedJob {
            id: Uuid::new_v4(),
            priority,
            scheduled_at,
        }
    }

    #[test]
    fn test_fifo_within_priority() {
        let mut queue = JobQueue::new();
        let a = queued(JobPriority::Medium, 0);
        let b = queued(JobPriority::Medium, 0);
        queue.push(a);
        queue.push(b);

        assert_eq!(queue.ids(), vec![a.id, b.id]);
    }

    #[test]
    fn test_higher_priority_jumps_ahead() {
        let mut queue = JobQueue::new();
        let low = queued(JobPriority::Low, 0);
        let medium = queued(JobPriority::Medium, 0);
        let critical = queued(JobPriority::Critical, 0);
        let high = queued(JobPriority::High, 0);

        queue.push(low);
        queue.push(medium);
        queue.push(critical);
        queue.push(high);

        assert_eq!(queue.ids(), vec![critical.id, high.id, medium.id, low.id]);
    }

    #[test]
    fn test_reinsert_goes_behind_same_tier() {
        let mut queue = JobQueue::new();
        let first = queued(JobPriority::High, 100);
        let second = queued(JobPriority::High, 0);
        let low = queued(JobPriority::Low, 0);
        queue.push(first);
        queue.push(second);
        queue.push(low);

        let head = queue.pop_front().unwrap();
        queue.push(head);

        assert_eq!(queue.ids(), vec![second.id, first.id, low.id]);
    }

    #[test]
    fn test_pop_first_ready_skips_delayed() {
        let mut queue = JobQueue::new();
        let delayed = queued(JobPriority::Critical, 500);
        let ready = queued(JobPriority::Low, 0);
        queue.push(delayed);
        queue.push(ready);

        assert_eq!(queue.pop_first_ready(100).map(|q| q.id), Some(ready.id));
        assert_eq!(queue.pop_first_ready(100), None);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut queue = JobQueue::new();
        let a = queued(JobPriority::Medium, 0);
        queue.push(a);

        assert!(queue.ids().contains(&a.id));
        assert!(queue.remove(a.id));
        assert!(!queue.remove(a.id));
        assert!(queue.is_empty());
        assert!(queue.peek().is_none());
    }
}
