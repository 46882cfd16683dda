//! Wardkeeper - Terminal Encounter-Healing Game Library
//!
//! This module exposes the simulation logic for testing and external use.

// Allow dead code in library - some functions are only used by the binary
#![allow(dead_code)]

pub mod core;
pub mod leaderboard;
pub mod mana;
pub mod spells;
pub mod synergy;
pub mod targets;

// UI module is not exposed as it's tightly coupled to the terminal
mod ui;
