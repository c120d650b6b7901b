use serde::{Deserialize, Serialize};

use crate::core::ScopeKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredTaskKind {
    /// Re-check the restoring flags and unlock the scope's Bar once clear.
    BarUnlockRetry { attempts_remaining: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredTask {
    pub id: u64,
    pub scope: ScopeKey,
    pub due_at_ms: u64,
    pub kind: DeferredTaskKind,
}

/// Scope-owned scheduled continuations pumped by the host clock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeferredQueue {
    next_id: u64,
    now_ms: u64,
    tasks: Vec<DeferredTask>,
}

impl DeferredQueue {
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, scope: ScopeKey, delay_ms: u64, kind: DeferredTaskKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(DeferredTask {
            id,
            scope,
            due_at_ms: self.now_ms.saturating_add(delay_ms),
            kind,
        });
        id
    }

    /// Drops every pending task owned by `scope`.
    pub fn cancel_scope(&mut self, scope: &ScopeKey) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| &task.scope != scope);
        before - self.tasks.len()
    }

    /// Advances the clock and removes the tasks that became due, oldest first.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<DeferredTask> {
        self.now_ms = self.now_ms.max(now_ms);
        let now = self.now_ms;
        let (mut due, pending): (Vec<DeferredTask>, Vec<DeferredTask>) = self
            .tasks
            .drain(..)
            .partition(|task| task.due_at_ms <= now);
        self.tasks = pending;
        due.sort_by_key(|task| (task.due_at_ms, task.id));
        due
    }

    #[must_use]
    pub fn pending_for(&self, scope: &ScopeKey) -> usize {
        self.tasks.iter().filter(|task| &task.scope == scope).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETRY: DeferredTaskKind = DeferredTaskKind::BarUnlockRetry {
        attempts_remaining: 3,
    };

    #[test]
    fn due_tasks_are_returned_in_schedule_order() {
        let mut queue = DeferredQueue::default();
        queue.schedule(ScopeKey::Root, 200, RETRY);
        queue.schedule(ScopeKey::container("a"), 100, RETRY);

        assert!(queue.take_due(50).is_empty());
        let due = queue.take_due(250);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].scope, ScopeKey::container("a"));
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_scope_only_touches_that_scope() {
        let mut queue = DeferredQueue::default();
        queue.schedule(ScopeKey::Root, 100, RETRY);
        queue.schedule(ScopeKey::container("a"), 100, RETRY);

        assert_eq!(queue.cancel_scope(&ScopeKey::Root), 1);
        assert_eq!(queue.pending_for(&ScopeKey::Root), 0);
        assert_eq!(queue.pending_for(&ScopeKey::container("a")), 1);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut queue = DeferredQueue::default();
        queue.take_due(500);
        queue.take_due(100);
        assert_eq!(queue.now_ms(), 500);
    }
}
