//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod biome;
pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use biome::{BIOMES, Biome, Color, ObstacleKind, PowerUpEffect, PowerUpKind, Shape};
pub use collision::Aabb;
pub use state::{
    Body, Field, GameEvent, GamePhase, GameState, LoreDiscovery, LoreFragment, Obstacle, Player,
    PowerUp, TimedEffect,
};
pub use tick::{TickInput, tick};
