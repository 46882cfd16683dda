//! Spell data model: definitions, effects, input bindings and the default
//! spell table a fresh run starts from.
//!
//! Definitions are data, not behavior. A run gets its own freshly built
//! table (loaded from disk or the built-in defaults), so unlocks never
//! leak across runs.

use crate::core::constants::SYNERGY_WINDOW_SECONDS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellId {
    LesserHeal,
    Heal,
    GreaterHeal,
    FlashHeal,
    Renew,
    ChainHeal,
    Shield,
    BarrierWard,
    Sanctuary,
    GuardianSpirit,
    SoulLink,
    EchoHeal,
    MirrorSpirit,
    ManaTide,
    Innervate,
    Cleanse,
    BindingLight,
    PrayerOfMending,
    Blessing,
}

/// Which mouse button a cast request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastButton {
    Primary,
    Secondary,
}

/// Modifier keys held during a cast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub fn shift() -> Self {
        Modifiers {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Modifiers {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Modifiers {
            alt: true,
            ..Self::NONE
        }
    }

    pub fn is_none(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt
    }
}

/// Button-plus-modifiers predicate selecting a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBinding {
    pub button: CastButton,
    pub modifiers: Modifiers,
}

impl InputBinding {
    /// Human-readable label, e.g. "Ctrl+Shift+LMB".
    pub fn label(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if self.modifiers.ctrl {
            parts.push("Ctrl");
        }
        if self.modifiers.shift {
            parts.push("Shift");
        }
        if self.modifiers.alt {
            parts.push("Alt");
        }
        parts.push(match self.button {
            CastButton::Primary => "LMB",
            CastButton::Secondary => "RMB",
        });
        parts.join("+")
    }

    pub fn matches(&self, button: CastButton, modifiers: Modifiers) -> bool {
        self.button == button && self.modifiers == modifiers
    }
}

/// What a spell does when its cast resolves against a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Heal { amount: f64 },
    ChainHeal { amount: f64, secondary_amount: f64 },
    HealOverTime { amount: f64, duration: f64 },
    Shield { amount: f64, duration: f64, heal_on_end: Option<f64> },
    DamageReduction { amount: f64, duration: f64 },
    DamagePrevention { duration: f64 },
    DeathPrevention { duration: f64 },
    LinkHeal { percentage: f64 },
    DelayedHeal { amount: f64, delay: f64 },
    SpawnClone { duration: f64, heal_rate: Option<f64> },
    ManaRestore { amount: f64 },
    ManaPerCast { amount: f64, casts: u32 },
    Cleanse { prevent_duration: f64 },
    HealMissingPercent { percentage: f64 },
    SpreadHeal { percentage: f64 },
    Passive { heal_boost: f64 },
}

impl Effect {
    /// Hots and shields may land on full-health targets; everything else
    /// is rejected there.
    pub fn allowed_on_full_health(&self) -> bool {
        matches!(self, Effect::HealOverTime { .. } | Effect::Shield { .. })
    }

    /// How long a completed cast of this effect stays visible to the
    /// synergy tracker.
    pub fn synergy_window(&self) -> f64 {
        match self {
            Effect::HealOverTime { duration, .. }
            | Effect::Shield { duration, .. }
            | Effect::DamageReduction { duration, .. }
            | Effect::DamagePrevention { duration }
            | Effect::DeathPrevention { duration }
            | Effect::SpawnClone { duration, .. } => *duration,
            _ => SYNERGY_WINDOW_SECONDS,
        }
    }
}

/// One row of the spell table. `enabled` is the only field that mutates
/// during a run, and only through unlock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellDefinition {
    pub id: SpellId,
    pub display_name: String,
    pub enabled: bool,
    pub cast_time: f64,
    pub mana_cost: f64,
    pub binding: Option<InputBinding>,
    pub effect: Effect,
}

/// A channeled cast in flight. At most one exists per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveCast {
    pub spell: SpellId,
    pub target_index: usize,
    pub progress: f64,
    pub duration: f64,
}

#[derive(Debug, Error)]
pub enum SpellTableError {
    #[error("failed to read spell table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse spell table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("spell table defines {0:?} more than once")]
    DuplicateSpell(SpellId),
}

fn spell(
    id: SpellId,
    display_name: &str,
    enabled: bool,
    cast_time: f64,
    mana_cost: f64,
    binding: Option<InputBinding>,
    effect: Effect,
) -> SpellDefinition {
    SpellDefinition {
        id,
        display_name: display_name.to_string(),
        enabled,
        cast_time,
        mana_cost,
        binding,
        effect,
    }
}

fn bound(button: CastButton, modifiers: Modifiers) -> Option<InputBinding> {
    Some(InputBinding { button, modifiers })
}

/// The built-in base table. Only Lesser Heal starts enabled; the heal
/// tiers carry no binding because the unmodified primary input resolves
/// to the best enabled tier.
pub fn default_spell_table() -> Vec<SpellDefinition> {
    use CastButton::{Primary, Secondary};
    vec![
        spell(
            SpellId::LesserHeal,
            "Lesser Heal",
            true,
            2.0,
            10.0,
            None,
            Effect::Heal { amount: 20.0 },
        ),
        spell(
            SpellId::Heal,
            "Heal",
            false,
            2.5,
            20.0,
            None,
            Effect::Heal { amount: 30.0 },
        ),
        spell(
            SpellId::GreaterHeal,
            "Greater Heal",
            false,
            3.0,
            30.0,
            None,
            Effect::Heal { amount: 50.0 },
        ),
        spell(
            SpellId::FlashHeal,
            "Flash Heal",
            false,
            1.0,
            15.0,
            bound(Secondary, Modifiers::NONE),
            Effect::Heal { amount: 40.0 },
        ),
        spell(
            SpellId::Renew,
            "Renew",
            false,
            0.0,
            25.0,
            bound(Primary, Modifiers::shift()),
            Effect::HealOverTime {
                amount: 50.0,
                duration: 10.0,
            },
        ),
        spell(
            SpellId::ChainHeal,
            "Chain Heal",
            false,
            2.0,
            35.0,
            bound(Primary, Modifiers::ctrl()),
            Effect::ChainHeal {
                amount: 30.0,
                secondary_amount: 15.0,
            },
        ),
        spell(
            SpellId::Shield,
            "Shield",
            false,
            0.0,
            20.0,
            bound(Primary, Modifiers::alt()),
            Effect::Shield {
                amount: 30.0,
                duration: 5.0,
                heal_on_end: None,
            },
        ),
        spell(
            SpellId::BarrierWard,
            "Barrier Ward",
            false,
            0.0,
            25.0,
            bound(Secondary, Modifiers::ctrl()),
            Effect::DamageReduction {
                amount: 0.5,
                duration: 6.0,
            },
        ),
        spell(
            SpellId::Sanctuary,
            "Sanctuary",
            false,
            0.0,
            40.0,
            bound(Secondary, Modifiers::alt()),
            Effect::DamagePrevention { duration: 3.0 },
        ),
        spell(
            SpellId::GuardianSpirit,
            "Guardian Spirit",
            false,
            0.0,
            30.0,
            bound(Secondary, Modifiers::shift()),
            Effect::DeathPrevention { duration: 6.0 },
        ),
        spell(
            SpellId::SoulLink,
            "Soul Link",
            false,
            0.0,
            30.0,
            bound(
                Primary,
                Modifiers {
                    ctrl: true,
                    shift: true,
                    alt: false,
                },
            ),
            Effect::LinkHeal { percentage: 0.5 },
        ),
        spell(
            SpellId::EchoHeal,
            "Echo Heal",
            false,
            1.0,
            20.0,
            bound(
                Secondary,
                Modifiers {
                    ctrl: true,
                    shift: true,
                    alt: false,
                },
            ),
            Effect::DelayedHeal {
                amount: 35.0,
                delay: 3.0,
            },
        ),
        spell(
            SpellId::MirrorSpirit,
            "Mirror Spirit",
            false,
            2.0,
            45.0,
            bound(
                Primary,
                Modifiers {
                    ctrl: false,
                    shift: true,
                    alt: true,
                },
            ),
            Effect::SpawnClone {
                duration: 10.0,
                heal_rate: Some(2.0),
            },
        ),
        spell(
            SpellId::ManaTide,
            "Mana Tide",
            false,
            0.0,
            0.0,
            bound(
                Primary,
                Modifiers {
                    ctrl: true,
                    shift: false,
                    alt: true,
                },
            ),
            Effect::ManaRestore { amount: 30.0 },
        ),
        spell(
            SpellId::Innervate,
            "Innervate",
            false,
            0.0,
            10.0,
            bound(
                Secondary,
                Modifiers {
                    ctrl: false,
                    shift: true,
                    alt: true,
                },
            ),
            Effect::ManaPerCast {
                amount: 5.0,
                casts: 3,
            },
        ),
        spell(
            SpellId::Cleanse,
            "Cleanse",
            false,
            0.0,
            15.0,
            bound(
                Secondary,
                Modifiers {
                    ctrl: true,
                    shift: false,
                    alt: true,
                },
            ),
            Effect::Cleanse {
                prevent_duration: 2.0,
            },
        ),
        spell(
            SpellId::BindingLight,
            "Binding Light",
            false,
            1.5,
            25.0,
            bound(
                Secondary,
                Modifiers {
                    ctrl: true,
                    shift: true,
                    alt: true,
                },
            ),
            Effect::HealMissingPercent { percentage: 0.4 },
        ),
        spell(
            SpellId::PrayerOfMending,
            "Prayer of Mending",
            false,
            2.5,
            40.0,
            bound(
                Primary,
                Modifiers {
                    ctrl: true,
                    shift: true,
                    alt: true,
                },
            ),
            Effect::SpreadHeal { percentage: 0.15 },
        ),
        spell(
            SpellId::Blessing,
            "Blessing",
            false,
            0.0,
            0.0,
            None,
            Effect::Passive { heal_boost: 0.15 },
        ),
    ]
}

/// Loads a spell table from a JSON file, validating id uniqueness.
pub fn load_spell_table(path: &Path) -> Result<Vec<SpellDefinition>, SpellTableError> {
    let raw = std::fs::read_to_string(path)?;
    let table: Vec<SpellDefinition> = serde_json::from_str(&raw)?;
    let mut seen = std::collections::HashSet::new();
    for definition in &table {
        if !seen.insert(definition.id) {
            return Err(SpellTableError::DuplicateSpell(definition.id));
        }
    }
    Ok(table)
}

/// Loads `path` if given, falling back to the defaults on any failure.
pub fn spell_table_or_default(path: Option<&Path>) -> Vec<SpellDefinition> {
    match path {
        Some(p) => match load_spell_table(p) {
            Ok(table) => table,
            Err(e) => {
                log::warn!("using default spell table: {e}");
                default_spell_table()
            }
        },
        None => default_spell_table(),
    }
}
