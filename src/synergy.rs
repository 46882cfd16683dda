//! Cross-spell synergy detection.
//!
//! Completed casts are logged as [`CastRecord`]s that live for their
//! effect's duration. Whenever a new record lands, every configured rule is
//! checked against the live log; a rule fires at most once per record pair,
//! so two spells staying "active" together never re-trigger their bonus.

use crate::core::constants::SYNERGY_WINDOW_SECONDS;
use crate::spells::types::SpellId;
use std::collections::HashSet;

/// A completed cast, pruned once `effect_duration` has elapsed.
#[derive(Debug, Clone)]
pub struct CastRecord {
    pub id: u64,
    pub spell: SpellId,
    pub target_index: usize,
    pub cast_at: f64,
    pub effect_duration: f64,
}

impl CastRecord {
    fn live_at(&self, now: f64) -> bool {
        now - self.cast_at < self.effect_duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynergyCondition {
    /// Both casts must have landed on the same target.
    SameTarget,
    /// Any two live casts of the pair qualify.
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SynergyEffect {
    /// Add seconds to the target's running heal-over-time.
    ExtendHot { seconds: f64 },
    /// Add seconds to the target's running shield.
    ExtendShield { seconds: f64 },
    /// Timed percentage boost on heals landing on the target.
    HealBoost { percent: f64, duration: f64 },
    /// Timed multiplier on every clone aura.
    CloneRateBonus { multiplier: f64, duration: f64 },
}

/// An unordered spell pair plus the bonus it unlocks.
#[derive(Debug, Clone)]
pub struct SynergyRule {
    pub name: &'static str,
    pub pair: (SpellId, SpellId),
    pub condition: SynergyCondition,
    pub effect: SynergyEffect,
}

impl SynergyRule {
    fn matches(&self, a: SpellId, b: SpellId) -> bool {
        (self.pair.0 == a && self.pair.1 == b) || (self.pair.0 == b && self.pair.1 == a)
    }
}

/// A rule that just fired; roster-touching effects are applied by the
/// round controller, tracker-internal ones are already registered.
#[derive(Debug, Clone)]
pub struct TriggeredSynergy {
    pub name: &'static str,
    pub effect: SynergyEffect,
    pub target_index: usize,
}

#[derive(Debug, Clone)]
struct HealBoostEntry {
    target_index: usize,
    percent: f64,
    expires_at: f64,
}

#[derive(Debug, Clone)]
struct CloneBonusEntry {
    multiplier: f64,
    expires_at: f64,
}

pub fn default_rules() -> Vec<SynergyRule> {
    vec![
        SynergyRule {
            name: "Renewing Ward",
            pair: (SpellId::Renew, SpellId::Shield),
            condition: SynergyCondition::SameTarget,
            effect: SynergyEffect::ExtendShield { seconds: 3.0 },
        },
        SynergyRule {
            name: "Lingering Light",
            pair: (SpellId::FlashHeal, SpellId::Renew),
            condition: SynergyCondition::SameTarget,
            effect: SynergyEffect::ExtendHot { seconds: 4.0 },
        },
        SynergyRule {
            name: "Mending Chorus",
            pair: (SpellId::ChainHeal, SpellId::PrayerOfMending),
            condition: SynergyCondition::Any,
            effect: SynergyEffect::HealBoost {
                percent: 0.25,
                duration: 8.0,
            },
        },
        SynergyRule {
            name: "Spirit Echo",
            pair: (SpellId::MirrorSpirit, SpellId::ManaTide),
            condition: SynergyCondition::Any,
            effect: SynergyEffect::CloneRateBonus {
                multiplier: 1.5,
                duration: 10.0,
            },
        },
    ]
}

#[derive(Debug)]
pub struct SynergyTracker {
    rules: Vec<SynergyRule>,
    records: Vec<CastRecord>,
    next_record_id: u64,
    fired: HashSet<(usize, u64, u64)>,
    boosts: Vec<HealBoostEntry>,
    clone_bonuses: Vec<CloneBonusEntry>,
}

impl SynergyTracker {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<SynergyRule>) -> Self {
        Self {
            rules,
            records: Vec::new(),
            next_record_id: 0,
            fired: HashSet::new(),
            boosts: Vec::new(),
            clone_bonuses: Vec::new(),
        }
    }

    /// Logs a completed cast and returns every rule that newly fires.
    ///
    /// `effect_duration` of 0 or below falls back to the default synergy
    /// window so instant effects still participate.
    pub fn record(
        &mut self,
        spell: SpellId,
        target_index: usize,
        effect_duration: f64,
        now: f64,
    ) -> Vec<TriggeredSynergy> {
        let duration = if effect_duration > 0.0 {
            effect_duration
        } else {
            SYNERGY_WINDOW_SECONDS
        };
        let id = self.next_record_id;
        self.next_record_id += 1;
        self.records.push(CastRecord {
            id,
            spell,
            target_index,
            cast_at: now,
            effect_duration: duration,
        });
        self.check_synergies(now)
    }

    fn check_synergies(&mut self, now: f64) -> Vec<TriggeredSynergy> {
        let mut triggered = Vec::new();
        for (rule_index, rule) in self.rules.iter().enumerate() {
            for a in 0..self.records.len() {
                for b in (a + 1)..self.records.len() {
                    let (ra, rb) = (&self.records[a], &self.records[b]);
                    if !ra.live_at(now) || !rb.live_at(now) {
                        continue;
                    }
                    if !rule.matches(ra.spell, rb.spell) {
                        continue;
                    }
                    if rule.condition == SynergyCondition::SameTarget
                        && ra.target_index != rb.target_index
                    {
                        continue;
                    }
                    let key = (rule_index, ra.id.min(rb.id), ra.id.max(rb.id));
                    if !self.fired.insert(key) {
                        continue;
                    }
                    // The later cast decides where a targeted bonus lands.
                    let target_index = rb.target_index;
                    match rule.effect {
                        SynergyEffect::HealBoost { percent, duration } => {
                            self.boosts.push(HealBoostEntry {
                                target_index,
                                percent,
                                expires_at: now + duration,
                            });
                        }
                        SynergyEffect::CloneRateBonus {
                            multiplier,
                            duration,
                        } => {
                            self.clone_bonuses.push(CloneBonusEntry {
                                multiplier,
                                expires_at: now + duration,
                            });
                        }
                        SynergyEffect::ExtendHot { .. } | SynergyEffect::ExtendShield { .. } => {}
                    }
                    log::info!("synergy triggered: {}", rule.name);
                    triggered.push(TriggeredSynergy {
                        name: rule.name,
                        effect: rule.effect,
                        target_index,
                    });
                }
            }
        }
        triggered
    }

    /// Prunes expired records, boosts, and clone bonuses.
    pub fn update(&mut self, now: f64) {
        let live_ids: HashSet<u64> = self
            .records
            .iter()
            .filter(|r| r.live_at(now))
            .map(|r| r.id)
            .collect();
        self.records.retain(|r| live_ids.contains(&r.id));
        self.fired
            .retain(|(_, a, b)| live_ids.contains(a) || live_ids.contains(b));
        self.boosts.retain(|b| b.expires_at > now);
        self.clone_bonuses.retain(|c| c.expires_at > now);
    }

    /// Largest heal boost currently live for the target, else 0.
    pub fn active_heal_boost(&self, target_index: usize, now: f64) -> f64 {
        self.boosts
            .iter()
            .filter(|b| b.target_index == target_index && b.expires_at > now)
            .map(|b| b.percent)
            .fold(0.0, f64::max)
    }

    /// Multiplier applied to every clone aura; 1.0 when no bonus is live.
    pub fn clone_rate_multiplier(&self, now: f64) -> f64 {
        self.clone_bonuses
            .iter()
            .filter(|c| c.expires_at > now)
            .map(|c| c.multiplier)
            .fold(1.0, f64::max)
    }

    /// Drops records between rounds; the roster they referenced is gone.
    pub fn clear_records(&mut self) {
        self.records.clear();
        self.fired.clear();
        self.boosts.clear();
        self.clone_bonuses.clear();
    }

    pub fn reset(&mut self) {
        self.clear_records();
        self.next_record_id = 0;
    }
}

impl Default for SynergyTracker {
    fn default() -> Self {
        Self::new()
    }
}
