//! Procedural roster generation, invoked once per round start.
//!
//! Every round gets exactly one heavy-armor anchor target plus a ramping
//! number of additional targets. Half the time a round modifier fires
//! instead of a composition branch; a fallback fill guarantees the roster
//! never stays heavy-only when additional slots were due.

use crate::core::constants::*;
use crate::targets::types::{ArmorClass, DamagePattern, RoundModifier, Target};
use rand::Rng;

/// Result of one generation pass.
#[derive(Debug, Clone)]
pub struct GeneratedRoster {
    pub targets: Vec<Target>,
    pub modifier: Option<RoundModifier>,
}

/// Round-derived multiplier on base max health.
pub fn health_multiplier(round: u32) -> f64 {
    1.0 + (round.saturating_sub(1) / 10) as f64 * HEALTH_SCALE_PER_DECADE
}

/// Number of non-heavy slots for this round: 1 at round 1, then a linear
/// ramp toward the cap by round 20.
pub fn additional_target_count(round: u32) -> usize {
    if round <= 1 {
        1
    } else {
        let ramped = ((round - 1) as f64 / ADDITIONAL_TARGET_RAMP).floor() as usize;
        ramped.min(MAX_ADDITIONAL_TARGETS as usize)
    }
}

fn rounds_past_five(round: u32) -> f64 {
    round.saturating_sub(5) as f64
}

fn heavy_pattern(round: u32) -> DamagePattern {
    DamagePattern::Sustained {
        rate: 4.0 + 0.5 * rounds_past_five(round),
    }
}

fn medium_patterns(round: u32) -> [DamagePattern; 3] {
    let rate = 2.0 + 0.3 * rounds_past_five(round);
    [
        DamagePattern::Sustained { rate },
        DamagePattern::Burst {
            amount: 10.0 + rounds_past_five(round),
            interval: 6.0,
            warning_threshold: 1.5,
        },
        DamagePattern::Dot {
            rate: rate * 1.5,
            duration: 8.0,
        },
    ]
}

fn light_patterns(round: u32) -> [DamagePattern; 3] {
    let rate = 1.5 + 0.2 * rounds_past_five(round);
    [
        DamagePattern::Dot {
            rate: rate * 1.5,
            duration: 6.0,
        },
        DamagePattern::EscalatingDot {
            initial_rate: rate,
            escalation_per_step: 0.5,
            step_seconds: 2.0,
            duration: 10.0,
        },
        DamagePattern::Burst {
            amount: 8.0 + 0.5 * rounds_past_five(round),
            interval: 5.0,
            warning_threshold: 1.5,
        },
    ]
}

fn make_target<R: Rng>(armor: ArmorClass, round: u32, rng: &mut R) -> Target {
    let pattern = match armor {
        ArmorClass::Heavy => heavy_pattern(round),
        ArmorClass::Medium => {
            let set = medium_patterns(round);
            set[rng.gen_range(0..set.len())].clone()
        }
        ArmorClass::Light => {
            let set = light_patterns(round);
            set[rng.gen_range(0..set.len())].clone()
        }
    };
    let health = armor.base_health() * health_multiplier(round);
    Target::new(armor, pattern, health, health)
}

fn scale_pattern_damage(pattern: &mut DamagePattern, factor: f64) {
    match pattern {
        DamagePattern::Burst { amount, .. } => *amount *= factor,
        DamagePattern::Sustained { rate } => *rate *= factor,
        DamagePattern::Dot { rate, .. } => *rate *= factor,
        DamagePattern::EscalatingDot {
            initial_rate,
            escalation_per_step,
            ..
        } => {
            *initial_rate *= factor;
            *escalation_per_step *= factor;
        }
    }
}

fn apply_modifier<R: Rng>(modifier: RoundModifier, targets: &mut [Target], rng: &mut R) {
    match modifier {
        RoundModifier::DamageSurge => {
            for target in targets.iter_mut() {
                scale_pattern_damage(&mut target.pattern, DAMAGE_SURGE_MULTIPLIER);
            }
        }
        RoundModifier::RapidBursts => {
            for target in targets.iter_mut() {
                if let DamagePattern::Burst { interval, .. } = &mut target.pattern {
                    *interval /= 2.0;
                    target.next_tick /= 2.0;
                }
            }
        }
        RoundModifier::CriticalCondition => {
            if !targets.is_empty() {
                let index = rng.gen_range(0..targets.len());
                targets[index].health = CRITICAL_CONDITION_HEALTH;
            }
        }
    }
}

/// Generates the roster for `round`.
pub fn generate_roster<R: Rng>(round: u32, rng: &mut R) -> GeneratedRoster {
    let mut targets = vec![make_target(ArmorClass::Heavy, round, rng)];
    let additional = additional_target_count(round);
    let mut modifier = None;
    let mut flagged_index = None;

    if rng.gen_bool(0.5) {
        let picked = RoundModifier::ALL[rng.gen_range(0..RoundModifier::ALL.len())];
        apply_modifier(picked, &mut targets, rng);
        modifier = Some(picked);
    } else {
        match rng.gen_range(0..3) {
            0 => {
                for _ in 0..additional {
                    targets.push(make_target(ArmorClass::Light, round, rng));
                }
            }
            1 => {
                for _ in 0..additional {
                    targets.push(make_target(ArmorClass::Medium, round, rng));
                }
            }
            _ => {
                // Heavy-only for now; one index of the eventual roster is
                // flagged for double damage output.
                flagged_index = Some(rng.gen_range(0..=additional));
            }
        }
    }

    // Fallback: a round that still only has its heavy anchor gets a random
    // medium/light mix for the due slots.
    if targets.len() == 1 {
        for _ in 0..additional {
            let armor = if rng.gen_bool(0.5) {
                ArmorClass::Medium
            } else {
                ArmorClass::Light
            };
            targets.push(make_target(armor, round, rng));
        }
    }

    if let Some(index) = flagged_index {
        let index = index.min(targets.len() - 1);
        targets[index].high_damage = true;
    }

    GeneratedRoster { targets, modifier }
}
