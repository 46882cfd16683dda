//! The spell book: input resolution, the active-cast state machine, effect
//! application, and unlocks.
//!
//! Casting is fallible in exactly one way visible to callers: a
//! [`CastRejection`]. A rejected cast mutates nothing. Instant spells
//! resolve inside `cast()`; channeled spells install the single
//! [`ActiveCast`] and resolve in `update_casting()`.

use crate::core::constants::DEFAULT_CLONE_HEAL_RATE;
use crate::core::schedule::ScheduledHeals;
use crate::mana::ManaPool;
use crate::spells::types::{
    ActiveCast, CastButton, Effect, Modifiers, SpellDefinition, SpellId, default_spell_table,
};
use crate::synergy::{SynergyEffect, SynergyTracker, TriggeredSynergy};
use crate::targets::logic::heal_target;
use crate::targets::types::Target;
use thiserror::Error;

/// Why a cast request was refused. All rejections are silent no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CastRejection {
    #[error("a cast is already in progress")]
    AlreadyCasting,
    #[error("spell is not enabled")]
    SpellDisabled,
    #[error("spell cannot be cast directly")]
    NotCastable,
    #[error("not enough mana")]
    InsufficientMana,
    #[error("target is at full health")]
    TargetFullHealth,
    #[error("no such target")]
    NoSuchTarget,
    #[error("no enabled spell bound to that input")]
    UnboundInput,
    #[error("no round in progress")]
    NotInRound,
}

/// Events produced by casting, for the round controller / presentation.
#[derive(Debug, Clone, PartialEq)]
pub enum SpellEvent {
    CastStarted { spell: SpellId, target_index: usize },
    CastCompleted { spell: SpellId, target_index: usize },
    /// The cast finished but its target no longer exists; the effect is
    /// dropped, the mana stays spent.
    CastFizzled { spell: SpellId },
    EffectApplied { spell: SpellId, target_index: usize },
    SynergyTriggered { name: &'static str },
}

/// Everything effect application may touch, borrowed from the encounter.
pub struct CastContext<'a> {
    pub mana: &'a mut ManaPool,
    pub targets: &'a mut Vec<Target>,
    pub synergy: &'a mut SynergyTracker,
    pub scheduled: &'a mut ScheduledHeals,
    pub sim_time: f64,
}

#[derive(Debug)]
pub struct SpellBook {
    spells: Vec<SpellDefinition>,
    base_table: Vec<SpellDefinition>,
    active_cast: Option<ActiveCast>,
    mana_per_cast_amount: f64,
    mana_per_cast_remaining: u32,
}

impl SpellBook {
    pub fn new() -> Self {
        Self::from_table(default_spell_table())
    }

    /// Builds a run's spell book from a base table. The base is kept so
    /// `reset()` restores baseline enablement without sharing rows.
    pub fn from_table(table: Vec<SpellDefinition>) -> Self {
        Self {
            spells: table.clone(),
            base_table: table,
            active_cast: None,
            mana_per_cast_amount: 0.0,
            mana_per_cast_remaining: 0,
        }
    }

    pub fn reset(&mut self) {
        self.spells = self.base_table.clone();
        self.active_cast = None;
        self.mana_per_cast_amount = 0.0;
        self.mana_per_cast_remaining = 0;
    }

    pub fn definitions(&self) -> &[SpellDefinition] {
        &self.spells
    }

    pub fn get(&self, id: SpellId) -> Option<&SpellDefinition> {
        self.spells.iter().find(|d| d.id == id)
    }

    pub fn is_enabled(&self, id: SpellId) -> bool {
        self.get(id).map(|d| d.enabled).unwrap_or(false)
    }

    pub fn active_cast(&self) -> Option<&ActiveCast> {
        self.active_cast.as_ref()
    }

    /// Sum of heal boosts from enabled passive spells.
    pub fn passive_heal_boost(&self) -> f64 {
        self.spells
            .iter()
            .filter(|d| d.enabled)
            .filter_map(|d| match d.effect {
                Effect::Passive { heal_boost } => Some(heal_boost),
                _ => None,
            })
            .sum()
    }

    /// Maps a button+modifier input to an enabled spell.
    ///
    /// Bound spells match exactly; the unmodified primary input falls back
    /// to the best enabled instant-heal tier.
    pub fn resolve_input(&self, button: CastButton, modifiers: Modifiers) -> Option<SpellId> {
        for def in self.spells.iter().filter(|d| d.enabled) {
            if let Some(binding) = def.binding {
                if binding.matches(button, modifiers) {
                    return Some(def.id);
                }
            }
        }
        if button == CastButton::Primary && modifiers.is_none() {
            for tier in [SpellId::GreaterHeal, SpellId::Heal, SpellId::LesserHeal] {
                if self.is_enabled(tier) {
                    return Some(tier);
                }
            }
        }
        None
    }

    /// Attempts a cast. On success either resolves immediately (instant
    /// spells) or installs the active cast (channeled spells).
    pub fn cast(
        &mut self,
        id: SpellId,
        target_index: usize,
        ctx: &mut CastContext,
    ) -> Result<Vec<SpellEvent>, CastRejection> {
        if self.active_cast.is_some() {
            return Err(CastRejection::AlreadyCasting);
        }
        let def = self.get(id).ok_or(CastRejection::SpellDisabled)?;
        if !def.enabled {
            return Err(CastRejection::SpellDisabled);
        }
        if matches!(def.effect, Effect::Passive { .. }) {
            return Err(CastRejection::NotCastable);
        }
        if ctx.mana.current() < def.mana_cost {
            return Err(CastRejection::InsufficientMana);
        }
        let target = ctx
            .targets
            .get(target_index)
            .ok_or(CastRejection::NoSuchTarget)?;
        if target.is_full_health() && !def.effect.allowed_on_full_health() {
            return Err(CastRejection::TargetFullHealth);
        }

        let cast_time = def.cast_time;
        let mana_cost = def.mana_cost;
        let effect = def.effect.clone();
        ctx.mana.try_deduct(mana_cost);
        self.refund_mana_per_cast(ctx.mana);

        if cast_time == 0.0 {
            let mut events = self.apply_effect(id, &effect, target_index, ctx);
            events.push(SpellEvent::CastCompleted {
                spell: id,
                target_index,
            });
            Ok(events)
        } else {
            self.active_cast = Some(ActiveCast {
                spell: id,
                target_index,
                progress: 0.0,
                duration: cast_time,
            });
            Ok(vec![SpellEvent::CastStarted {
                spell: id,
                target_index,
            }])
        }
    }

    /// Advances the active cast, resolving it when progress completes.
    /// The target is re-validated at completion; it may have expired.
    pub fn update_casting(&mut self, dt: f64, ctx: &mut CastContext) -> Vec<SpellEvent> {
        let finished = match &mut self.active_cast {
            Some(cast) => {
                cast.progress += dt;
                cast.progress >= cast.duration
            }
            None => return Vec::new(),
        };
        if !finished {
            return Vec::new();
        }
        let Some(cast) = self.active_cast.take() else {
            return Vec::new();
        };
        if cast.target_index >= ctx.targets.len() {
            log::debug!("cast of {:?} fizzled: target gone", cast.spell);
            return vec![SpellEvent::CastFizzled { spell: cast.spell }];
        }
        let effect = match self.get(cast.spell) {
            Some(def) => def.effect.clone(),
            None => return vec![SpellEvent::CastFizzled { spell: cast.spell }],
        };
        let mut events = self.apply_effect(cast.spell, &effect, cast.target_index, ctx);
        events.push(SpellEvent::CastCompleted {
            spell: cast.spell,
            target_index: cast.target_index,
        });
        events
    }

    /// Discards an in-progress cast with no effect applied. Used by the
    /// round controller on round end.
    pub fn interrupt(&mut self) -> Option<ActiveCast> {
        self.active_cast.take()
    }

    /// Enables a spell. Heal tiers replace each other so at most one tier
    /// of the primary heal is ever enabled.
    pub fn unlock(&mut self, id: SpellId) {
        match id {
            SpellId::Heal => self.set_enabled(SpellId::LesserHeal, false),
            SpellId::GreaterHeal => {
                self.set_enabled(SpellId::Heal, false);
                self.set_enabled(SpellId::LesserHeal, false);
            }
            _ => {}
        }
        self.set_enabled(id, true);
        log::info!("spell unlocked: {id:?}");
    }

    fn set_enabled(&mut self, id: SpellId, enabled: bool) {
        if let Some(def) = self.spells.iter_mut().find(|d| d.id == id) {
            def.enabled = enabled;
        }
    }

    /// Pending Innervate-style refund; consumed one charge per cast.
    fn refund_mana_per_cast(&mut self, mana: &mut ManaPool) {
        if self.mana_per_cast_remaining > 0 {
            mana.add(self.mana_per_cast_amount);
            self.mana_per_cast_remaining -= 1;
        }
    }

    fn heal_multiplier(&self, ctx: &CastContext, target_index: usize) -> f64 {
        (1.0 + self.passive_heal_boost())
            * (1.0 + ctx.synergy.active_heal_boost(target_index, ctx.sim_time))
    }

    fn apply_effect(
        &mut self,
        spell: SpellId,
        effect: &Effect,
        target_index: usize,
        ctx: &mut CastContext,
    ) -> Vec<SpellEvent> {
        let mut events = Vec::new();
        match *effect {
            Effect::Heal { amount } => {
                let boosted = amount * self.heal_multiplier(ctx, target_index);
                heal_target(ctx.targets, target_index, boosted);
            }
            Effect::ChainHeal {
                amount,
                secondary_amount,
            } => {
                let boosted = amount * self.heal_multiplier(ctx, target_index);
                heal_target(ctx.targets, target_index, boosted);
                // One adjacent hop, wrapping around the roster.
                if ctx.targets.len() > 1 {
                    let next = (target_index + 1) % ctx.targets.len();
                    if !ctx.targets[next].is_full_health() {
                        let boosted = secondary_amount * self.heal_multiplier(ctx, next);
                        heal_target(ctx.targets, next, boosted);
                    }
                }
            }
            Effect::HealOverTime { amount, duration } => {
                let boost = self.heal_multiplier(ctx, target_index);
                let target = &mut ctx.targets[target_index];
                target.hot_amount = amount / duration * boost;
                target.hot_time_remaining = duration;
            }
            Effect::Shield {
                amount,
                duration,
                heal_on_end,
            } => {
                let target = &mut ctx.targets[target_index];
                target.shield = amount;
                target.shield_time_remaining = duration;
                target.shield_heal_on_end = heal_on_end;
            }
            Effect::DamageReduction { amount, duration } => {
                let target = &mut ctx.targets[target_index];
                target.damage_reduction = amount;
                target.damage_reduction_time_remaining = duration;
            }
            Effect::DamagePrevention { duration } => {
                let target = &mut ctx.targets[target_index];
                target.damage_prevention_time_remaining =
                    target.damage_prevention_time_remaining.max(duration);
            }
            Effect::DeathPrevention { duration } => {
                let target = &mut ctx.targets[target_index];
                target.death_prevention_time_remaining =
                    target.death_prevention_time_remaining.max(duration);
            }
            Effect::LinkHeal { percentage } => {
                // Links the target to the heavy anchor; the anchor itself
                // links forward instead.
                let link = if target_index == 0 {
                    if ctx.targets.len() > 1 { Some(1) } else { None }
                } else {
                    Some(0)
                };
                let target = &mut ctx.targets[target_index];
                target.linked_target = link;
                target.link_heal_percentage = percentage;
            }
            Effect::DelayedHeal { amount, delay } => {
                ctx.scheduled.push(ctx.sim_time + delay, target_index, amount);
            }
            Effect::SpawnClone { duration, heal_rate } => {
                ctx.targets.push(Target::clone_spirit(
                    duration,
                    heal_rate.unwrap_or(DEFAULT_CLONE_HEAL_RATE),
                ));
            }
            Effect::ManaRestore { amount } => {
                ctx.mana.add(amount);
            }
            Effect::ManaPerCast { amount, casts } => {
                self.mana_per_cast_amount = amount;
                self.mana_per_cast_remaining = casts;
            }
            Effect::Cleanse { prevent_duration } => {
                let target = &mut ctx.targets[target_index];
                target.dot_time_remaining = 0.0;
                target.damage_prevention_time_remaining = target
                    .damage_prevention_time_remaining
                    .max(prevent_duration);
            }
            Effect::HealMissingPercent { percentage } => {
                let missing = ctx.targets[target_index].max_health
                    - ctx.targets[target_index].health;
                let boosted = missing * percentage * self.heal_multiplier(ctx, target_index);
                heal_target(ctx.targets, target_index, boosted);
            }
            Effect::SpreadHeal { percentage } => {
                for j in 0..ctx.targets.len() {
                    let boosted =
                        ctx.targets[j].max_health * percentage * self.heal_multiplier(ctx, j);
                    heal_target(ctx.targets, j, boosted);
                }
            }
            Effect::Passive { .. } => {
                // Rejected in cast(); unreachable through the public API.
            }
        }
        events.push(SpellEvent::EffectApplied {
            spell,
            target_index,
        });

        let window = effect.synergy_window();
        let triggered = ctx
            .synergy
            .record(spell, target_index, window, ctx.sim_time);
        events.extend(apply_triggered_synergies(&triggered, ctx.targets));
        events
    }
}

impl Default for SpellBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies roster-touching synergy effects; tracker-internal ones were
/// registered during the check.
fn apply_triggered_synergies(
    triggered: &[TriggeredSynergy],
    targets: &mut [Target],
) -> Vec<SpellEvent> {
    let mut events = Vec::new();
    for synergy in triggered {
        match synergy.effect {
            SynergyEffect::ExtendHot { seconds } => {
                if let Some(target) = targets.get_mut(synergy.target_index) {
                    if target.hot_time_remaining > 0.0 {
                        target.hot_time_remaining += seconds;
                    }
                }
            }
            SynergyEffect::ExtendShield { seconds } => {
                if let Some(target) = targets.get_mut(synergy.target_index) {
                    if target.shield_time_remaining > 0.0 {
                        target.shield_time_remaining += seconds;
                    }
                }
            }
            SynergyEffect::HealBoost { .. } | SynergyEffect::CloneRateBonus { .. } => {}
        }
        events.push(SpellEvent::SynergyTriggered { name: synergy.name });
    }
    events
}
