//! The healer's mana pool: regeneration, spell cost deduction, and the
//! cross-round projection shown on the post-round screen before it is
//! committed by the next round.

use crate::core::constants::*;
use serde::{Deserialize, Serialize};

/// Precomputed mana/max pair for the upcoming round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManaProjection {
    pub mana: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManaPool {
    current: f64,
    max: f64,
    regen_per_second: f64,
    projected: Option<ManaProjection>,
    end_of_round_snapshot: Option<f64>,
}

/// Clamp a possibly-corrupt value into [0, max], mapping NaN to 0.
fn clamp_or_zero(value: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

impl ManaPool {
    pub fn new() -> Self {
        Self {
            current: STARTING_MANA,
            max: STARTING_MAX_MANA,
            regen_per_second: STARTING_MANA_REGEN,
            projected: None,
            end_of_round_snapshot: None,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn regen_per_second(&self) -> f64 {
        self.regen_per_second
    }

    pub fn projection(&self) -> Option<ManaProjection> {
        self.projected
    }

    /// Regenerate for `dt` seconds, clamped to the pool maximum.
    /// The round controller only calls this while a round is active.
    pub fn regen(&mut self, dt: f64) {
        self.current = clamp_or_zero(self.current + self.regen_per_second * dt, self.max);
    }

    /// Deducts `cost` iff enough mana is available. A failed deduction is a
    /// normal rejection with no state change, not an error.
    pub fn try_deduct(&mut self, cost: f64) -> bool {
        if self.current >= cost {
            self.current = clamp_or_zero(self.current - cost, self.max);
            true
        } else {
            false
        }
    }

    /// Adds mana (spell restore effects), clamped to max.
    pub fn add(&mut self, amount: f64) {
        self.current = clamp_or_zero(self.current + amount, self.max);
    }

    /// Operator tooling only: direct top-up bypassing cost checks.
    pub fn debug_add(&mut self, amount: f64) {
        self.add(amount);
        log::debug!("debug mana top-up: +{amount}, now {:.0}/{:.0}", self.current, self.max);
    }

    /// Stores current mana as the base for the upcoming projection.
    pub fn snapshot_end_of_round(&mut self) {
        self.end_of_round_snapshot = Some(self.current);
    }

    /// Computes the projected mana/max pair for `next_round`.
    ///
    /// Max grows by 10 every 3 rounds; half of the new max is granted on
    /// top of the end-of-round snapshot. Every 5th round past round 5 also
    /// permanently raises the regeneration rate.
    pub fn project_for(&mut self, next_round: u32) {
        let projected_max =
            MANA_MAX_BASE + MANA_MAX_STEP * ((next_round.saturating_sub(1)) / MANA_MAX_STEP_ROUNDS) as f64;
        let base = self.end_of_round_snapshot.unwrap_or(self.current);
        let projected_mana =
            (base + projected_max * MANA_CARRYOVER_FRACTION).min(projected_max);
        self.projected = Some(ManaProjection {
            mana: projected_mana,
            max: projected_max,
        });
        if next_round > MILESTONE_ROUND_INTERVAL && next_round % MILESTONE_ROUND_INTERVAL == 0 {
            self.regen_per_second += MANA_REGEN_INCREMENT;
            log::info!(
                "mana scaling: max {projected_max:.0}, regen {:.1}/s",
                self.regen_per_second
            );
        }
    }

    /// Commits the pending projection into current/max and clears it.
    ///
    /// Calling with no projection pending is a recoverable no-op.
    pub fn apply_projection(&mut self) {
        match self.projected.take() {
            Some(p) => {
                self.max = p.max;
                self.current = clamp_or_zero(p.mana, p.max);
                self.end_of_round_snapshot = None;
            }
            None => {
                log::warn!("apply_projection called with no projection pending");
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ManaPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regen_clamps_to_max() {
        let mut pool = ManaPool::new();
        pool.try_deduct(30.0);
        pool.regen(5.0); // 15 mana at 3/s
        assert_eq!(pool.current(), 85.0);
        pool.regen(100.0);
        assert_eq!(pool.current(), 100.0);
    }

    #[test]
    fn test_deduct_rejects_without_mutation() {
        let mut pool = ManaPool::new();
        assert!(pool.try_deduct(40.0));
        assert_eq!(pool.current(), 60.0);
        assert!(!pool.try_deduct(61.0));
        assert_eq!(pool.current(), 60.0);
    }

    #[test]
    fn test_projection_formula() {
        let mut pool = ManaPool::new();
        pool.try_deduct(80.0); // 20 left
        pool.snapshot_end_of_round();
        pool.project_for(7);
        let p = pool.projection().expect("projection pending");
        // max = 100 + 10 * floor(6/3) = 120; mana = min(120, 20 + 60) = 80
        assert_eq!(p.max, 120.0);
        assert_eq!(p.mana, 80.0);
    }

    #[test]
    fn test_projection_caps_at_projected_max() {
        let mut pool = ManaPool::new();
        pool.snapshot_end_of_round(); // full 100
        pool.project_for(2);
        let p = pool.projection().expect("projection pending");
        assert_eq!(p.max, 100.0);
        assert_eq!(p.mana, 100.0);
    }

    #[test]
    fn test_apply_projection_commits_and_clears() {
        let mut pool = ManaPool::new();
        pool.try_deduct(80.0);
        pool.snapshot_end_of_round();
        pool.project_for(7);
        pool.apply_projection();
        assert_eq!(pool.max(), 120.0);
        assert_eq!(pool.current(), 80.0);
        assert!(pool.projection().is_none());

        // Second apply without recomputation is a no-op, not a crash.
        pool.apply_projection();
        assert_eq!(pool.max(), 120.0);
        assert_eq!(pool.current(), 80.0);
    }

    #[test]
    fn test_regen_increment_on_later_milestones() {
        let mut pool = ManaPool::new();
        pool.project_for(5);
        assert_eq!(pool.regen_per_second(), STARTING_MANA_REGEN);
        pool.project_for(10);
        assert!((pool.regen_per_second() - (STARTING_MANA_REGEN + MANA_REGEN_INCREMENT)).abs() < 1e-9);
    }

    #[test]
    fn test_nan_amount_clamps_to_zero() {
        let mut pool = ManaPool::new();
        pool.add(f64::NAN);
        assert_eq!(pool.current(), 0.0);
        pool.add(50.0);
        assert_eq!(pool.current(), 50.0);
    }
}
