use crate::core::constants::*;
use serde::{Deserialize, Serialize};

/// Armor class decides base max health and which damage patterns a target
/// can roll at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorClass {
    Heavy,
    Medium,
    Light,
}

impl ArmorClass {
    pub fn base_health(self) -> f64 {
        match self {
            ArmorClass::Heavy => HEAVY_BASE_HEALTH,
            ArmorClass::Medium => MEDIUM_BASE_HEALTH,
            ArmorClass::Light => LIGHT_BASE_HEALTH,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArmorClass::Heavy => "Heavy",
            ArmorClass::Medium => "Medium",
            ArmorClass::Light => "Light",
        }
    }
}

/// How a target hurts itself each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DamagePattern {
    /// Fires `amount` when the countdown reaches 0, then rewinds to
    /// `interval`. `warning_threshold` drives the UI warning flash.
    Burst {
        amount: f64,
        interval: f64,
        warning_threshold: f64,
    },
    /// Continuous damage.
    Sustained { rate: f64 },
    /// Continuous damage until the dot timer runs out.
    Dot { rate: f64, duration: f64 },
    /// Dot whose rate climbs one escalation step every `step_seconds`.
    EscalatingDot {
        initial_rate: f64,
        escalation_per_step: f64,
        step_seconds: f64,
        duration: f64,
    },
}

/// One roster member. Status fields all start zeroed; pattern-local
/// counters are seeded from the pattern by [`Target::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub health: f64,
    pub max_health: f64,
    pub armor: ArmorClass,
    pub pattern: DamagePattern,

    // Pattern-local counters
    pub next_tick: f64,
    pub dot_time_remaining: f64,
    pub warning_active: bool,

    // Status effects
    pub shield: f64,
    pub shield_time_remaining: f64,
    pub shield_heal_on_end: Option<f64>,
    pub hot_amount: f64,
    pub hot_time_remaining: f64,
    pub damage_reduction: f64,
    pub damage_reduction_time_remaining: f64,
    pub damage_prevention_time_remaining: f64,
    pub death_prevention_time_remaining: f64,
    pub linked_target: Option<usize>,
    pub link_heal_percentage: f64,

    // Clones
    pub is_clone: bool,
    pub clone_duration_remaining: f64,
    pub clone_heal_rate: f64,

    pub high_damage: bool,
}

impl Target {
    pub fn new(armor: ArmorClass, pattern: DamagePattern, health: f64, max_health: f64) -> Self {
        let (next_tick, dot_time_remaining) = match &pattern {
            DamagePattern::Burst { interval, .. } => (*interval, 0.0),
            DamagePattern::Dot { duration, .. }
            | DamagePattern::EscalatingDot { duration, .. } => (0.0, *duration),
            DamagePattern::Sustained { .. } => (0.0, 0.0),
        };
        Self {
            health: health.min(max_health),
            max_health,
            armor,
            pattern,
            next_tick,
            dot_time_remaining,
            warning_active: false,
            shield: 0.0,
            shield_time_remaining: 0.0,
            shield_heal_on_end: None,
            hot_amount: 0.0,
            hot_time_remaining: 0.0,
            damage_reduction: 0.0,
            damage_reduction_time_remaining: 0.0,
            damage_prevention_time_remaining: 0.0,
            death_prevention_time_remaining: 0.0,
            linked_target: None,
            link_heal_percentage: 0.0,
            is_clone: false,
            clone_duration_remaining: 0.0,
            clone_heal_rate: 0.0,
            high_damage: false,
        }
    }

    /// The pre-run / post-reset placeholder target.
    pub fn baseline() -> Self {
        Target::new(
            ArmorClass::Medium,
            DamagePattern::Sustained {
                rate: BASELINE_TARGET_RATE,
            },
            BASELINE_TARGET_HEALTH,
            MEDIUM_BASE_HEALTH,
        )
    }

    /// A temporary clone summoned by a spell. Deals no damage, heals the
    /// rest of the roster through its aura, and expires mid-round.
    pub fn clone_spirit(duration: f64, heal_rate: f64) -> Self {
        let mut t = Target::new(
            ArmorClass::Light,
            DamagePattern::Sustained { rate: 0.0 },
            CLONE_HEALTH,
            CLONE_HEALTH,
        );
        t.is_clone = true;
        t.clone_duration_remaining = duration;
        t.clone_heal_rate = heal_rate;
        t
    }

    pub fn is_full_health(&self) -> bool {
        self.health >= self.max_health
    }

    /// Applies a heal capped at max health, guarding against NaN.
    /// Returns the amount actually healed.
    pub fn apply_heal(&mut self, amount: f64) -> f64 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Applies damage that has already passed through the status pipeline.
    /// Death prevention floors health at 1 instead of 0.
    pub fn apply_damage(&mut self, amount: f64) {
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        let floor = if self.death_prevention_time_remaining > 0.0 {
            1.0
        } else {
            0.0
        };
        self.health = (self.health - amount).max(floor);
    }
}

/// A one-time roster-wide effect rolled at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundModifier {
    /// All damage rates and burst amounts scaled up.
    DamageSurge,
    /// Burst intervals (and pending countdowns) halved.
    RapidBursts,
    /// One target starts the round at critically low health.
    CriticalCondition,
}

impl RoundModifier {
    pub const ALL: [RoundModifier; 3] = [
        RoundModifier::DamageSurge,
        RoundModifier::RapidBursts,
        RoundModifier::CriticalCondition,
    ];

    pub fn message(self) -> &'static str {
        match self {
            RoundModifier::DamageSurge => "High Damage Round!",
            RoundModifier::RapidBursts => "Rapid Bursts Round!",
            RoundModifier::CriticalCondition => "Critical Condition Round!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_seeds_burst_countdown() {
        let t = Target::new(
            ArmorClass::Heavy,
            DamagePattern::Burst {
                amount: 10.0,
                interval: 4.0,
                warning_threshold: 1.5,
            },
            100.0,
            150.0,
        );
        assert_eq!(t.next_tick, 4.0);
        assert_eq!(t.dot_time_remaining, 0.0);
    }

    #[test]
    fn test_new_seeds_dot_duration() {
        let t = Target::new(
            ArmorClass::Light,
            DamagePattern::Dot {
                rate: 2.0,
                duration: 6.0,
            },
            80.0,
            80.0,
        );
        assert_eq!(t.dot_time_remaining, 6.0);
    }

    #[test]
    fn test_heal_caps_at_max_health() {
        let mut t = Target::baseline();
        let healed = t.apply_heal(1000.0);
        assert_eq!(t.health, t.max_health);
        assert_eq!(healed, t.max_health - BASELINE_TARGET_HEALTH);
    }

    #[test]
    fn test_heal_ignores_nan() {
        let mut t = Target::baseline();
        assert_eq!(t.apply_heal(f64::NAN), 0.0);
        assert_eq!(t.health, BASELINE_TARGET_HEALTH);
    }

    #[test]
    fn test_damage_floors_at_one_under_death_prevention() {
        let mut t = Target::baseline();
        t.death_prevention_time_remaining = 3.0;
        t.apply_damage(10_000.0);
        assert_eq!(t.health, 1.0);
    }
}
