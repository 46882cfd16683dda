//! Integration test: damage patterns and the status pipeline.
//!
//! Scenario-style coverage of the per-tick resolution order: shields
//! absorbing pattern damage, wards, death prevention, linked heals, and
//! clone auras interacting over multi-second windows.

use wardkeeper::targets::logic::{heal_target, update_targets, TargetEvent};
use wardkeeper::targets::types::{ArmorClass, DamagePattern, Target};

fn sustained(rate: f64, health: f64, max: f64) -> Target {
    Target::new(ArmorClass::Medium, DamagePattern::Sustained { rate }, health, max)
}

/// Run the pipeline in 100ms ticks for `seconds`.
fn run(targets: &mut Vec<Target>, seconds: f64, round: u32) -> Vec<TargetEvent> {
    let mut events = Vec::new();
    let steps = (seconds / 0.1).round() as usize;
    for _ in 0..steps {
        events.extend(update_targets(targets, 0.1, round, 1.0));
    }
    events
}

#[test]
fn test_shield_absorbs_before_health() {
    let mut targets = vec![sustained(50.0, 100.0, 100.0)];
    targets[0].shield = 30.0;
    targets[0].shield_time_remaining = 5.0;

    run(&mut targets, 0.5, 1);

    // 25 damage went into the shield; health untouched.
    assert!((targets[0].shield - 5.0).abs() < 1e-9);
    assert_eq!(targets[0].health, 100.0);

    run(&mut targets, 0.5, 1);
    // Shield broke partway; the remainder reached health.
    assert_eq!(targets[0].shield, 0.0);
    assert!((targets[0].health - 80.0).abs() < 1e-9);
}

#[test]
fn test_shield_expiry_can_heal_on_end() {
    let mut targets = vec![sustained(0.0, 50.0, 100.0)];
    targets[0].shield = 20.0;
    targets[0].shield_time_remaining = 0.25;
    targets[0].shield_heal_on_end = Some(10.0);

    run(&mut targets, 0.5, 1);

    assert_eq!(targets[0].shield, 0.0);
    assert!((targets[0].health - 60.0).abs() < 1e-9);
}

#[test]
fn test_burst_pattern_fires_on_interval_with_warning() {
    let mut targets = vec![Target::new(
        ArmorClass::Light,
        DamagePattern::Burst {
            amount: 12.0,
            interval: 2.0,
            warning_threshold: 1.5,
        },
        80.0,
        80.0,
    )];

    run(&mut targets, 0.4, 1);
    assert_eq!(targets[0].health, 80.0);
    assert!(!targets[0].warning_active);

    run(&mut targets, 0.4, 1);
    assert!(targets[0].warning_active); // inside the warning window

    run(&mut targets, 1.3, 1);
    assert!((targets[0].health - 68.0).abs() < 1e-9); // one burst landed
}

#[test]
fn test_escalating_dot_outpaces_flat_dot() {
    let mut flat = vec![Target::new(
        ArmorClass::Light,
        DamagePattern::Dot {
            rate: 3.0,
            duration: 8.0,
        },
        80.0,
        80.0,
    )];
    let mut escalating = vec![Target::new(
        ArmorClass::Light,
        DamagePattern::EscalatingDot {
            initial_rate: 3.0,
            escalation_per_step: 1.0,
            step_seconds: 2.0,
            duration: 8.0,
        },
        80.0,
        80.0,
    )];

    run(&mut flat, 8.0, 1);
    run(&mut escalating, 8.0, 1);
    assert!(escalating[0].health < flat[0].health);

    // Both are spent; at most a fractional tick of residue remains.
    let after = (flat[0].health, escalating[0].health);
    run(&mut flat, 2.0, 1);
    run(&mut escalating, 2.0, 1);
    assert!((flat[0].health - after.0).abs() < 0.5);
    assert!((escalating[0].health - after.1).abs() < 1.0);
}

#[test]
fn test_damage_prevention_outranks_reduction() {
    let mut targets = vec![sustained(40.0, 100.0, 100.0)];
    targets[0].damage_prevention_time_remaining = 0.5;
    targets[0].damage_reduction = 0.5;
    targets[0].damage_reduction_time_remaining = 10.0;

    run(&mut targets, 0.6, 1);
    assert_eq!(targets[0].health, 100.0);

    // Prevention expired; reduction now halves the incoming stream.
    run(&mut targets, 1.0, 1);
    assert!((targets[0].health - 80.0).abs() < 1e-6);
}

#[test]
fn test_death_prevention_floors_health_at_one() {
    let mut targets = vec![sustained(100.0, 5.0, 100.0)];
    targets[0].death_prevention_time_remaining = 1.0;

    run(&mut targets, 1.0, 1);
    assert_eq!(targets[0].health, 1.0);

    run(&mut targets, 0.5, 1);
    assert_eq!(targets[0].health, 0.0);
}

#[test]
fn test_link_propagates_one_hop_only() {
    let mut targets = vec![
        sustained(0.0, 50.0, 100.0),
        sustained(0.0, 50.0, 100.0),
        sustained(0.0, 50.0, 100.0),
    ];
    targets[0].linked_target = Some(1);
    targets[0].link_heal_percentage = 0.5;
    targets[1].linked_target = Some(2);
    targets[1].link_heal_percentage = 0.5;

    heal_target(&mut targets, 0, 20.0);

    assert_eq!(targets[0].health, 70.0);
    assert_eq!(targets[1].health, 60.0);
    // No chaining through the second link.
    assert_eq!(targets[2].health, 50.0);
}

#[test]
fn test_clone_aura_heals_roster_then_expires_with_remap() {
    let mut targets = vec![sustained(0.0, 50.0, 100.0), sustained(0.0, 50.0, 100.0)];
    targets[1].linked_target = Some(0);
    let mut clone = Target::clone_spirit(1.0, 2.0);
    clone.clone_duration_remaining = 1.0;
    targets.insert(0, clone);
    // Fix the link for the inserted clone.
    targets[2].linked_target = Some(1);

    let events = run(&mut targets, 1.5, 1);

    assert!(events
        .iter()
        .any(|e| matches!(e, TargetEvent::CloneExpired { index: 0 })));
    assert_eq!(targets.len(), 2);
    // ~2 hp/s of aura for the clone's 1s lifetime.
    assert!(targets[0].health > 50.0 && targets[0].health <= 53.0);
    // Link indices were remapped when the clone left the roster.
    assert_eq!(targets[1].linked_target, Some(0));
}

#[test]
fn test_round_scaling_multiplies_pattern_damage() {
    let mut early = vec![sustained(10.0, 100.0, 100.0)];
    let mut late = vec![sustained(10.0, 100.0, 100.0)];
    let mut focused = vec![sustained(10.0, 100.0, 100.0)];
    focused[0].high_damage = true;

    run(&mut early, 1.0, 1);
    run(&mut late, 1.0, 11); // 1.05x
    run(&mut focused, 1.0, 1); // 2x

    assert!((early[0].health - 90.0).abs() < 1e-6);
    assert!((late[0].health - 89.5).abs() < 1e-6);
    assert!((focused[0].health - 80.0).abs() < 1e-6);
}
