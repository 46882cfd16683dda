//! Read-only snapshot of encounter state for presentation layers.
//!
//! The TUI renders from a [`Snapshot`] each frame instead of reaching into
//! the controller, and the whole thing serializes for debug dumps.

use serde::Serialize;

use crate::spells::types::SpellId;

#[derive(Debug, Clone, Serialize)]
pub struct ManaView {
    pub current: f64,
    pub max: f64,
    pub regen_per_second: f64,
    pub projected_mana: Option<f64>,
    pub projected_max: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetView {
    pub index: usize,
    pub label: &'static str,
    pub health: f64,
    pub max_health: f64,
    pub shield: f64,
    pub warning_active: bool,
    pub hot_active: bool,
    pub protected: bool,
    pub is_clone: bool,
    pub high_damage: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CastView {
    pub spell: SpellId,
    pub name: String,
    pub target_index: usize,
    pub progress: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BannerView {
    pub message: &'static str,
    pub remaining: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnlockView {
    pub id: SpellId,
    pub name: String,
}

/// One enabled spell, with a human-readable input label for the sidebar.
#[derive(Debug, Clone, Serialize)]
pub struct SpellRowView {
    pub id: SpellId,
    pub name: String,
    pub binding: String,
    pub mana_cost: f64,
    pub cast_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub round: u32,
    pub phase: super::encounter::RoundPhase,
    pub time_remaining: f64,
    pub mana: ManaView,
    pub targets: Vec<TargetView>,
    pub cast: Option<CastView>,
    pub banner: Option<BannerView>,
    pub available_unlocks: Vec<UnlockView>,
    pub spells: Vec<SpellRowView>,
}
