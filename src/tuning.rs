//! Data-driven game balance
//!
//! Every number that shapes a run lives here so tests and hosts can build
//! worlds with different rules (no spawning, slower ramp, ...).

use serde::{Deserialize, Serialize};

/// What happens once the run passes the last biome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BiomePolicy {
    /// Cycle back to the first biome
    #[default]
    Wrap,
    /// Stay in the last biome forever
    Plateau,
}

/// Balance knobs for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    // === Spawning (probability per step) ===
    pub obstacle_chance: f32,
    pub power_up_chance: f32,
    pub lore_chance: f32,
    /// Obstacles never spawn while this many are alive
    pub max_obstacles: usize,

    // === Player physics (per nominal frame) ===
    pub gravity: f32,
    pub jump_impulse: f32,
    /// Run bobbing amplitude in pixels
    pub bob_amplitude: f32,
    /// Run bobbing phase advance per frame
    pub bob_rate: f32,

    // === World speed (pixels per nominal frame) ===
    pub start_speed: f32,
    pub speed_ramp: f32,
    /// Slow-down effects never push speed below this
    pub min_speed: f32,

    // === Progression ===
    /// Distance covered per biome
    pub biome_distance: f32,
    pub biome_policy: BiomePolicy,

    /// Invincibility granted by a revive (milliseconds)
    pub revive_shield_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            obstacle_chance: 0.02,
            power_up_chance: 0.005,
            lore_chance: 0.002,
            max_obstacles: 5,

            gravity: 0.8,
            jump_impulse: -15.0,
            bob_amplitude: 3.0,
            bob_rate: 0.4,

            start_speed: 5.0,
            speed_ramp: 0.001,
            min_speed: 1.0,

            biome_distance: 5000.0,
            biome_policy: BiomePolicy::Wrap,

            revive_shield_ms: 2000.0,
        }
    }
}

impl Tuning {
    /// Same rules, but nothing ever spawns on its own
    pub fn without_spawns() -> Self {
        Self {
            obstacle_chance: 0.0,
            power_up_chance: 0.0,
            lore_chance: 0.0,
            ..Self::default()
        }
    }
}
