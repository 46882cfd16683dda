//! The round controller: the single context object that owns every piece
//! of run state and advances it on a fixed tick.
//!
//! All mutation goes through requests (`cast_request`, `unlock_request`,
//! `advance_round_request`, ...) so the presentation layer never touches
//! the pools directly. `tick()` drives time; everything else is
//! edge-triggered.

use rand::Rng;
use serde::Serialize;

use crate::core::clock::sanitize_delta;
use crate::core::constants::*;
use crate::core::schedule::ScheduledHeals;
use crate::core::view::{BannerView, CastView, ManaView, Snapshot, SpellRowView, TargetView, UnlockView};
use crate::mana::ManaPool;
use crate::spells::logic::{CastContext, CastRejection, SpellBook, SpellEvent};
use crate::spells::types::{CastButton, Modifiers, SpellDefinition, SpellId};
use crate::synergy::SynergyTracker;
use crate::targets::generation::generate_roster;
use crate::targets::logic::{heal_target, update_targets, TargetEvent};
use crate::targets::types::{RoundModifier, Target};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundPhase {
    NotStarted,
    InRound,
    PostRound,
    Ended,
}

/// Everything a tick or request can report back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum EncounterEvent {
    RoundStarted { round: u32 },
    RoundCompleted { round: u32 },
    /// An unlock choice is open until the next round starts.
    MilestoneReached { round: u32 },
    Defeat { round: u32, target_index: usize },
    CloneExpired { index: usize },
    Spell(SpellEvent),
}

/// Round timer: the first round is short, later rounds grow slowly to a cap.
pub fn round_time_seconds(round: u32) -> f64 {
    if round <= 1 {
        ROUND_ONE_TIME_SECONDS
    } else {
        let grown = ROUND_TIME_BASE_SECONDS + (round.saturating_sub(1) / 3) as f64;
        grown.min(ROUND_TIME_CAP_SECONDS)
    }
}

#[derive(Debug)]
pub struct Encounter {
    round: u32,
    phase: RoundPhase,
    time_remaining: f64,
    sim_time: f64,
    mana: ManaPool,
    spellbook: SpellBook,
    targets: Vec<Target>,
    synergy: SynergyTracker,
    scheduled: ScheduledHeals,
    modifier: Option<RoundModifier>,
    banner_remaining: f64,
    unlock_pending: bool,
    last_status_log: f64,
}

impl Encounter {
    pub fn new() -> Self {
        Self::with_spell_table(crate::spells::types::default_spell_table())
    }

    pub fn with_spell_table(table: Vec<SpellDefinition>) -> Self {
        Self {
            round: 1,
            phase: RoundPhase::NotStarted,
            time_remaining: round_time_seconds(1),
            sim_time: 0.0,
            mana: ManaPool::new(),
            spellbook: SpellBook::from_table(table),
            targets: vec![Target::baseline()],
            synergy: SynergyTracker::new(),
            scheduled: ScheduledHeals::new(),
            modifier: None,
            banner_remaining: 0.0,
            unlock_pending: false,
            last_status_log: 0.0,
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn time_remaining(&self) -> f64 {
        self.time_remaining
    }

    pub fn mana(&self) -> &ManaPool {
        &self.mana
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn spellbook(&self) -> &SpellBook {
        &self.spellbook
    }

    /// Begins the run: rolls the first roster and opens round one.
    pub fn start<R: Rng>(&mut self, rng: &mut R) -> Vec<EncounterEvent> {
        if self.phase != RoundPhase::NotStarted {
            return Vec::new();
        }
        self.install_roster(rng);
        self.time_remaining = round_time_seconds(self.round);
        self.phase = RoundPhase::InRound;
        log::info!("encounter started");
        vec![EncounterEvent::RoundStarted { round: self.round }]
    }

    /// Advances the simulation by `dt_raw` seconds. Out-of-range deltas
    /// (pauses, clock jumps) collapse to zero rather than fast-forwarding.
    pub fn tick(&mut self, dt_raw: f64) -> Vec<EncounterEvent> {
        let dt = sanitize_delta(dt_raw);
        if self.phase != RoundPhase::InRound {
            return Vec::new();
        }
        let mut events = Vec::new();

        // 1. Time and resources
        self.sim_time += dt;
        self.mana.regen(dt);
        self.time_remaining -= dt;
        if self.banner_remaining > 0.0 {
            self.banner_remaining = (self.banner_remaining - dt).max(0.0);
        }

        // 2. Damage and status pipeline
        let clone_rate = self.synergy.clone_rate_multiplier(self.sim_time);
        for event in update_targets(&mut self.targets, dt, self.round, clone_rate) {
            match event {
                TargetEvent::CloneExpired { index } => {
                    events.push(EncounterEvent::CloneExpired { index });
                }
            }
        }

        // 3. Casting
        let mut ctx = CastContext {
            mana: &mut self.mana,
            targets: &mut self.targets,
            synergy: &mut self.synergy,
            scheduled: &mut self.scheduled,
            sim_time: self.sim_time,
        };
        events.extend(
            self.spellbook
                .update_casting(dt, &mut ctx)
                .into_iter()
                .map(EncounterEvent::Spell),
        );

        // 4. Delayed heals and synergy expiry
        self.synergy.update(self.sim_time);
        let boost = 1.0 + self.spellbook.passive_heal_boost();
        for heal in self.scheduled.drain_due(self.sim_time) {
            if heal.target_index < self.targets.len() {
                let synergy_boost = 1.0
                    + self
                        .synergy
                        .active_heal_boost(heal.target_index, self.sim_time);
                heal_target(
                    &mut self.targets,
                    heal.target_index,
                    heal.amount * boost * synergy_boost,
                );
            }
        }

        // 5. Periodic status log
        if self.sim_time - self.last_status_log >= STATUS_LOG_INTERVAL_SECONDS {
            self.last_status_log = self.sim_time;
            log::info!("{}", self.status_line());
        }

        // 6. Defeat beats round completion on the same tick
        if let Some(index) = self
            .targets
            .iter()
            .position(|t| !t.is_clone && t.health <= 0.0)
        {
            self.spellbook.interrupt();
            self.phase = RoundPhase::Ended;
            log::info!("run ended on round {}", self.round);
            events.push(EncounterEvent::Defeat {
                round: self.round,
                target_index: index,
            });
            return events;
        }

        // 7. Round timer
        if self.time_remaining <= 0.0 {
            self.time_remaining = 0.0;
            events.extend(self.complete_round());
        }
        events
    }

    /// Maps a raw input to a spell and casts it on `target_index`.
    pub fn cast_request(
        &mut self,
        button: CastButton,
        modifiers: Modifiers,
        target_index: usize,
    ) -> Result<Vec<EncounterEvent>, CastRejection> {
        let spell = self
            .spellbook
            .resolve_input(button, modifiers)
            .ok_or(CastRejection::UnboundInput)?;
        self.cast_spell(spell, target_index)
    }

    pub fn cast_spell(
        &mut self,
        spell: SpellId,
        target_index: usize,
    ) -> Result<Vec<EncounterEvent>, CastRejection> {
        if self.phase != RoundPhase::InRound {
            return Err(CastRejection::NotInRound);
        }
        let mut ctx = CastContext {
            mana: &mut self.mana,
            targets: &mut self.targets,
            synergy: &mut self.synergy,
            scheduled: &mut self.scheduled,
            sim_time: self.sim_time,
        };
        let events = self.spellbook.cast(spell, target_index, &mut ctx)?;
        Ok(events.into_iter().map(EncounterEvent::Spell).collect())
    }

    /// Spells offered at the current milestone, tier-gated. Empty outside
    /// an open milestone window.
    pub fn available_unlocks(&self) -> Vec<&SpellDefinition> {
        if !self.unlock_pending {
            return Vec::new();
        }
        self.spellbook
            .definitions()
            .iter()
            .filter(|def| !def.enabled)
            .filter(|def| match def.id {
                SpellId::LesserHeal => false,
                SpellId::Heal => self.spellbook.is_enabled(SpellId::LesserHeal),
                SpellId::GreaterHeal => self.spellbook.is_enabled(SpellId::Heal),
                _ => true,
            })
            .collect()
    }

    /// Takes the milestone unlock. Only one pick per window; choices not
    /// on offer are ignored.
    pub fn unlock_request(&mut self, spell: SpellId) -> bool {
        if !self.available_unlocks().iter().any(|def| def.id == spell) {
            return false;
        }
        self.spellbook.unlock(spell);
        self.unlock_pending = false;
        true
    }

    /// Opens the next round: applies the mana projection, rolls a roster,
    /// resets per-round trackers.
    pub fn advance_round_request<R: Rng>(&mut self, rng: &mut R) -> Vec<EncounterEvent> {
        if self.phase != RoundPhase::PostRound {
            return Vec::new();
        }
        self.mana.apply_projection();
        self.round += 1;
        self.time_remaining = round_time_seconds(self.round);
        self.install_roster(rng);
        self.scheduled.clear();
        self.synergy.clear_records();
        self.unlock_pending = false;
        self.phase = RoundPhase::InRound;
        log::info!("round {} started", self.round);
        vec![EncounterEvent::RoundStarted { round: self.round }]
    }

    /// Debug helper: ends the current round immediately.
    pub fn skip_round_request(&mut self) -> Vec<EncounterEvent> {
        if self.phase != RoundPhase::InRound {
            return Vec::new();
        }
        self.time_remaining = 0.0;
        self.complete_round()
    }

    /// Debug helper: grants mana up to the cap.
    pub fn debug_add_mana(&mut self, amount: f64) {
        self.mana.debug_add(amount);
    }

    /// Returns the run to its pre-start baseline. Safe to call from any
    /// phase, repeatedly.
    pub fn reset(&mut self) {
        self.round = 1;
        self.phase = RoundPhase::NotStarted;
        self.time_remaining = round_time_seconds(1);
        self.sim_time = 0.0;
        self.mana.reset();
        self.spellbook.reset();
        self.targets = vec![Target::baseline()];
        self.synergy.reset();
        self.scheduled.clear();
        self.modifier = None;
        self.banner_remaining = 0.0;
        self.unlock_pending = false;
        self.last_status_log = 0.0;
        log::info!("encounter reset");
    }

    pub fn snapshot(&self) -> Snapshot {
        let projection = self.mana.projection();
        Snapshot {
            round: self.round,
            phase: self.phase,
            time_remaining: self.time_remaining.max(0.0),
            mana: ManaView {
                current: self.mana.current(),
                max: self.mana.max(),
                regen_per_second: self.mana.regen_per_second(),
                projected_mana: projection.map(|p| p.mana),
                projected_max: projection.map(|p| p.max),
            },
            targets: self
                .targets
                .iter()
                .enumerate()
                .map(|(index, t)| TargetView {
                    index,
                    label: t.armor.label(),
                    health: t.health,
                    max_health: t.max_health,
                    shield: t.shield,
                    warning_active: t.warning_active,
                    hot_active: t.hot_time_remaining > 0.0,
                    protected: t.damage_prevention_time_remaining > 0.0
                        || t.damage_reduction_time_remaining > 0.0,
                    is_clone: t.is_clone,
                    high_damage: t.high_damage,
                })
                .collect(),
            cast: self.spellbook.active_cast().map(|cast| CastView {
                spell: cast.spell,
                name: self
                    .spellbook
                    .get(cast.spell)
                    .map(|d| d.display_name.clone())
                    .unwrap_or_default(),
                target_index: cast.target_index,
                progress: cast.progress,
                duration: cast.duration,
            }),
            banner: match (self.modifier, self.banner_remaining > 0.0) {
                (Some(modifier), true) => Some(BannerView {
                    message: modifier.message(),
                    remaining: self.banner_remaining,
                }),
                _ => None,
            },
            available_unlocks: self
                .available_unlocks()
                .into_iter()
                .map(|def| UnlockView {
                    id: def.id,
                    name: def.display_name.clone(),
                })
                .collect(),
            spells: self
                .spellbook
                .definitions()
                .iter()
                .filter(|def| def.enabled)
                .map(|def| SpellRowView {
                    id: def.id,
                    name: def.display_name.clone(),
                    binding: match (&def.binding, &def.effect) {
                        (Some(binding), _) => binding.label(),
                        (None, crate::spells::types::Effect::Passive { .. }) => {
                            "Passive".to_string()
                        }
                        (None, _) => "LMB".to_string(),
                    },
                    mana_cost: def.mana_cost,
                    cast_time: def.cast_time,
                })
                .collect(),
        }
    }

    fn install_roster<R: Rng>(&mut self, rng: &mut R) {
        let roster = generate_roster(self.round, rng);
        self.targets = roster.targets;
        self.modifier = roster.modifier;
        self.banner_remaining = if roster.modifier.is_some() {
            MODIFIER_BANNER_SECONDS
        } else {
            0.0
        };
        if let Some(modifier) = roster.modifier {
            log::info!("round {} modifier: {}", self.round, modifier.message());
        }
    }

    fn complete_round(&mut self) -> Vec<EncounterEvent> {
        self.spellbook.interrupt();
        self.mana.snapshot_end_of_round();
        self.mana.project_for(self.round + 1);
        self.phase = RoundPhase::PostRound;
        let mut events = vec![EncounterEvent::RoundCompleted { round: self.round }];
        if self.round % MILESTONE_ROUND_INTERVAL == 0 {
            self.unlock_pending = true;
            events.push(EncounterEvent::MilestoneReached { round: self.round });
            log::info!("milestone at round {}: spell unlock available", self.round);
        }
        events
    }

    /// One log line summarising the round: timer, mana, and every
    /// target's current health.
    fn status_line(&self) -> String {
        let healths: Vec<String> = self
            .targets
            .iter()
            .map(|t| format!("{:.0}/{:.0}", t.health, t.max_health))
            .collect();
        format!(
            "round {} | {:.0}s left | mana {:.0}/{:.0} | targets [{}]",
            self.round,
            self.time_remaining.max(0.0),
            self.mana.current(),
            self.mana.max(),
            healths.join(", ")
        )
    }
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new()
    }
}
