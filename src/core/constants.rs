// Tick and timing
pub const TICK_INTERVAL_MS: u64 = 100;
pub const ROUND_ONE_TIME_SECONDS: f64 = 10.0;
pub const ROUND_TIME_BASE_SECONDS: f64 = 20.0;
pub const ROUND_TIME_CAP_SECONDS: f64 = 30.0;
pub const STATUS_LOG_INTERVAL_SECONDS: f64 = 5.0;

// Mana
pub const STARTING_MANA: f64 = 100.0;
pub const STARTING_MAX_MANA: f64 = 100.0;
pub const STARTING_MANA_REGEN: f64 = 3.0;
pub const MANA_REGEN_INCREMENT: f64 = 0.2;
pub const MANA_MAX_BASE: f64 = 100.0;
pub const MANA_MAX_STEP: f64 = 10.0;
pub const MANA_MAX_STEP_ROUNDS: u32 = 3;
pub const MANA_CARRYOVER_FRACTION: f64 = 0.5;

// Rounds
pub const MILESTONE_ROUND_INTERVAL: u32 = 5;
pub const MODIFIER_BANNER_SECONDS: f64 = 5.0;

// Targets
pub const HEAVY_BASE_HEALTH: f64 = 150.0;
pub const MEDIUM_BASE_HEALTH: f64 = 100.0;
pub const LIGHT_BASE_HEALTH: f64 = 80.0;
pub const BASELINE_TARGET_HEALTH: f64 = 75.0;
pub const BASELINE_TARGET_RATE: f64 = 2.0;
pub const MAX_ADDITIONAL_TARGETS: u32 = 9;
// Additional targets ramp from 1 toward MAX by round 20
pub const ADDITIONAL_TARGET_RAMP: f64 = 20.0 / 9.0;
pub const CLONE_HEALTH: f64 = 50.0;
pub const DEFAULT_CLONE_HEAL_RATE: f64 = 1.0;

// Round modifiers
pub const DAMAGE_SURGE_MULTIPLIER: f64 = 1.2;
pub const CRITICAL_CONDITION_HEALTH: f64 = 10.0;

// Difficulty scaling steps, both per 10 rounds
pub const DAMAGE_SCALE_PER_DECADE: f64 = 0.05;
pub const HEALTH_SCALE_PER_DECADE: f64 = 0.1;

// Synergy
pub const SYNERGY_WINDOW_SECONDS: f64 = 5.0;

// Leaderboard
pub const LEADERBOARD_MAX_ENTRIES: usize = 10;
pub const LEADERBOARD_NAME_MAX_CHARS: usize = 20;
