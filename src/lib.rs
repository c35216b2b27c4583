//! Edge of the World - a biome-cycling side-scrolling runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, spawning, collisions, biomes)
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Input mapping and frame timing shared by both hosts
//! - `persistence`: Lore store client and codex reconciliation
//! - `audio`: Procedural sound cues (Web Audio)
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the rate the balance numbers were tuned at)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default playfield size (replaced by the canvas size on the web)
    pub const DEFAULT_FIELD_WIDTH: f32 = 800.0;
    pub const DEFAULT_FIELD_HEIGHT: f32 = 600.0;
    /// Height of the painted ground band at the bottom of the field
    pub const GROUND_HEIGHT: f32 = 20.0;

    /// Player defaults
    pub const PLAYER_X: f32 = 50.0;
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;

    /// Lore fragment defaults
    pub const LORE_WIDTH: f32 = 15.0;
    pub const LORE_HEIGHT: f32 = 25.0;
    /// Lore fragments float this far above the floor line
    pub const LORE_FLOAT_HEIGHT: f32 = 100.0;
}
