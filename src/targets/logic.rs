//! Per-tick damage and status resolution for the roster.
//!
//! Every target runs the same fixed pipeline each tick: pattern damage,
//! damage prevention, damage reduction, shield absorption, health
//! application, heal-over-time, linked-heal propagation, clone aura.
//! The order is load-bearing; reordering changes outcomes on lethal ticks.

use crate::core::constants::*;
use crate::targets::types::{DamagePattern, Target};

/// Events the round controller forwards to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetEvent {
    CloneExpired { index: usize },
}

/// Round-derived multiplier on all pattern damage.
pub fn round_damage_multiplier(round: u32) -> f64 {
    1.0 + (round.saturating_sub(1) / 10) as f64 * DAMAGE_SCALE_PER_DECADE
}

/// Evaluates one target's damage pattern for `dt` seconds and returns raw
/// damage, advancing the pattern-local counters.
fn evaluate_pattern(target: &mut Target, dt: f64) -> f64 {
    match target.pattern.clone() {
        DamagePattern::Burst {
            amount,
            interval,
            warning_threshold,
        } => {
            target.next_tick -= dt;
            let mut damage = 0.0;
            if target.next_tick <= 0.0 {
                damage = amount;
                target.next_tick = interval;
            }
            target.warning_active = target.next_tick <= warning_threshold;
            damage
        }
        DamagePattern::Sustained { rate } => rate * dt,
        DamagePattern::Dot { rate, .. } => {
            if target.dot_time_remaining > 0.0 {
                // The final tick only covers what is left of the window.
                let window = dt.min(target.dot_time_remaining);
                target.dot_time_remaining = (target.dot_time_remaining - dt).max(0.0);
                rate * window
            } else {
                0.0
            }
        }
        DamagePattern::EscalatingDot {
            initial_rate,
            escalation_per_step,
            step_seconds,
            duration,
        } => {
            if target.dot_time_remaining > 0.0 {
                let elapsed = duration - target.dot_time_remaining;
                let steps = (elapsed / step_seconds).floor();
                let rate = initial_rate + escalation_per_step * steps;
                let window = dt.min(target.dot_time_remaining);
                target.dot_time_remaining = (target.dot_time_remaining - dt).max(0.0);
                rate * window
            } else {
                0.0
            }
        }
    }
}

/// Heals `targets[index]` and propagates one hop along its heal link.
/// Returns the amount actually healed on the primary target.
pub fn heal_target(targets: &mut [Target], index: usize, amount: f64) -> f64 {
    if index >= targets.len() {
        return 0.0;
    }
    let healed = targets[index].apply_heal(amount);
    if healed > 0.0 {
        if let Some(link) = targets[index].linked_target {
            if link != index && link < targets.len() {
                let pct = targets[index].link_heal_percentage;
                targets[link].apply_heal(healed * pct);
            }
        }
    }
    healed
}

/// Runs the full damage/status pipeline over the roster for one tick.
///
/// `clone_rate_multiplier` comes from the synergy tracker and scales every
/// clone aura. Expired clones are removed; regular targets never leave the
/// roster mid-round.
pub fn update_targets(
    targets: &mut Vec<Target>,
    dt: f64,
    round: u32,
    clone_rate_multiplier: f64,
) -> Vec<TargetEvent> {
    let multiplier = round_damage_multiplier(round);

    for i in 0..targets.len() {
        // 1. Pattern damage
        let mut damage = evaluate_pattern(&mut targets[i], dt) * multiplier;
        if targets[i].high_damage {
            damage *= 2.0;
        }

        // 2. Damage prevention beats reduction
        if targets[i].damage_prevention_time_remaining > 0.0 {
            damage = 0.0;
            targets[i].damage_prevention_time_remaining =
                (targets[i].damage_prevention_time_remaining - dt).max(0.0);
        } else if targets[i].damage_reduction_time_remaining > 0.0 {
            // 3. Damage reduction
            damage *= 1.0 - targets[i].damage_reduction;
            targets[i].damage_reduction_time_remaining -= dt;
            if targets[i].damage_reduction_time_remaining <= 0.0 {
                targets[i].damage_reduction = 0.0;
                targets[i].damage_reduction_time_remaining = 0.0;
            }
        }

        // 4. Shield absorption; the shield is time-limited independent of
        //    how much it has absorbed.
        if targets[i].shield > 0.0 {
            let absorbed = damage.min(targets[i].shield);
            targets[i].shield -= absorbed;
            damage -= absorbed;
        }
        if targets[i].shield_time_remaining > 0.0 {
            targets[i].shield_time_remaining -= dt;
            if targets[i].shield_time_remaining <= 0.0 {
                targets[i].shield = 0.0;
                targets[i].shield_time_remaining = 0.0;
                if let Some(heal) = targets[i].shield_heal_on_end.take() {
                    heal_target(targets, i, heal);
                }
            }
        }

        // 5. Health application
        if targets[i].death_prevention_time_remaining > 0.0 {
            targets[i].apply_damage(damage);
            targets[i].death_prevention_time_remaining =
                (targets[i].death_prevention_time_remaining - dt).max(0.0);
        } else {
            targets[i].apply_damage(damage);
        }

        // 6. Heal-over-time, which also feeds the heal link (7).
        if targets[i].hot_time_remaining > 0.0 {
            let tick_heal = targets[i].hot_amount * dt;
            heal_target(targets, i, tick_heal);
            targets[i].hot_time_remaining -= dt;
            if targets[i].hot_time_remaining <= 0.0 {
                targets[i].hot_time_remaining = 0.0;
                targets[i].hot_amount = 0.0;
            }
        }

        // 8. Clone aura over every non-clone target
        if targets[i].clone_heal_rate > 0.0 {
            let aura = targets[i].clone_heal_rate * clone_rate_multiplier * dt;
            for j in 0..targets.len() {
                if !targets[j].is_clone {
                    targets[j].apply_heal(aura);
                }
            }
        }
        if targets[i].is_clone {
            targets[i].clone_duration_remaining -= dt;
        }
    }

    remove_expired_clones(targets)
}

/// Drops clones whose duration has elapsed and remaps heal-link indices to
/// the compacted roster.
fn remove_expired_clones(targets: &mut Vec<Target>) -> Vec<TargetEvent> {
    let mut events = Vec::new();
    let expired: Vec<usize> = targets
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_clone && t.clone_duration_remaining <= 0.0)
        .map(|(i, _)| i)
        .collect();
    if expired.is_empty() {
        return events;
    }

    // Old index -> new index, None for removed entries.
    let mut remap = Vec::with_capacity(targets.len());
    let mut next = 0usize;
    for i in 0..targets.len() {
        if expired.contains(&i) {
            remap.push(None);
        } else {
            remap.push(Some(next));
            next += 1;
        }
    }

    for &i in &expired {
        events.push(TargetEvent::CloneExpired { index: i });
    }

    let mut index = 0usize;
    targets.retain(|_| {
        let keep = matches!(remap.get(index), Some(Some(_)));
        index += 1;
        keep
    });
    for target in targets.iter_mut() {
        if let Some(link) = target.linked_target {
            target.linked_target = remap.get(link).copied().flatten();
        }
    }
    events
}
