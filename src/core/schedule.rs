//! Queue of heals due at an absolute simulation time.
//!
//! Delayed effects are keyed by sim time rather than per-entry countdowns
//! so draining them is a single pass per tick.

/// A heal waiting for its due time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingHeal {
    pub due_at: f64,
    pub target_index: usize,
    pub amount: f64,
}

#[derive(Debug, Default)]
pub struct ScheduledHeals {
    pending: Vec<PendingHeal>,
}

impl ScheduledHeals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, due_at: f64, target_index: usize, amount: f64) {
        self.pending.push(PendingHeal {
            due_at,
            target_index,
            amount,
        });
    }

    /// Removes and returns every heal whose due time has passed, in
    /// due-time order.
    pub fn drain_due(&mut self, now: f64) -> Vec<PendingHeal> {
        let mut due: Vec<PendingHeal> = Vec::new();
        self.pending.retain(|heal| {
            if heal.due_at <= now {
                due.push(*heal);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_at.total_cmp(&b.due_at));
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops everything still pending. Round transitions call this so a
    /// heal never lands on the next round's roster.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
