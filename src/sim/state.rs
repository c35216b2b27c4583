//! Game state and core simulation types
//!
//! Everything a run mutates lives in `GameState`. It is created at game
//! start, stepped by `tick`, and thrown away at game over.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::biome::{self, Anchor, Biome, Color, ObstacleKind, PowerUpEffect, PowerUpKind};
use super::collision::Aabb;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Start screen, waiting for the first input
    Ready,
    /// Active gameplay
    Playing,
    /// Run ended (terminal)
    GameOver,
}

/// Things that happened during a step, drained by the host
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started,
    Jumped,
    PowerUpCollected(PowerUpKind),
    LoreCollected(LoreDiscovery),
    BiomeChanged { index: usize },
    ObstacleCleared { score: u64 },
    /// A fatal hit was absorbed by the banked revive
    Revived,
    GameOver { score: u64 },
}

/// Payload handed to the lore store on pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoreDiscovery {
    pub title: &'static str,
    pub content: &'static str,
    pub biome: &'static str,
}

/// Position (top-left) and size of an entity in field coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Scroll left by `dx`
    #[inline]
    pub fn scroll(&mut self, dx: f32) {
        self.pos.x -= dx;
    }
}

/// A running timed effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEffect {
    pub remaining_ms: f32,
    /// World speed change made at pickup, undone on expiry
    pub speed_delta: f32,
}

impl TimedEffect {
    pub fn new(duration_ms: f32) -> Self {
        Self {
            remaining_ms: duration_ms.max(0.0),
            speed_delta: 0.0,
        }
    }

    /// Count down; true once the timer has hit exactly zero
    pub fn countdown(&mut self, dt_ms: f32) -> bool {
        self.remaining_ms = (self.remaining_ms - dt_ms).max(0.0);
        self.remaining_ms == 0.0
    }
}

/// Step a timer slot, returning the effect if it expired this step
fn countdown_slot(slot: &mut Option<TimedEffect>, dt_ms: f32) -> Option<TimedEffect> {
    let expired = slot
        .as_mut()
        .is_some_and(|effect| effect.countdown(dt_ms));
    if expired { slot.take() } else { None }
}

/// The runner
#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    /// Vertical velocity (pixels per nominal frame, positive is down)
    pub dy: f32,
    pub grounded: bool,
    pub color: Color,
    /// Steps since the run started, drives the bobbing animation
    pub run_frame: u32,
    pub invincible: Option<TimedEffect>,
    pub speed_boost: Option<TimedEffect>,
    pub slow_down: Option<TimedEffect>,
    /// One-shot life saver
    pub has_revive: bool,
}

impl Player {
    /// A player standing on the floor line
    pub fn new(floor_y: f32) -> Self {
        Self {
            body: Body::new(
                PLAYER_X,
                floor_y - PLAYER_HEIGHT,
                PLAYER_WIDTH,
                PLAYER_HEIGHT,
            ),
            dy: 0.0,
            grounded: true,
            color: Color::PLAYER,
            run_frame: 0,
            invincible: None,
            speed_boost: None,
            slow_down: None,
            has_revive: false,
        }
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincible.is_some()
    }

    /// Jump if standing; returns whether the jump happened
    pub fn jump(&mut self, impulse: f32) -> bool {
        if !self.grounded {
            return false;
        }
        self.dy = impulse;
        self.grounded = false;
        true
    }

    /// Put the player back on the floor line at rest
    pub fn land(&mut self, floor_y: f32) {
        self.body.pos.y = floor_y - self.body.size.y;
        self.dy = 0.0;
        self.grounded = true;
    }

    /// Advance animation, effect timers and physics by `dt` seconds
    ///
    /// Returns the world speed change caused by expiring speed effects.
    pub fn update(&mut self, dt: f32, floor_y: f32, tuning: &Tuning) -> f32 {
        let frames = dt / SIM_DT;
        let dt_ms = dt * 1000.0;
        let mut speed_change = 0.0;

        self.run_frame = self.run_frame.wrapping_add(1);

        if countdown_slot(&mut self.invincible, dt_ms).is_some() {
            self.color = Color::PLAYER;
        }
        if let Some(expired) = countdown_slot(&mut self.speed_boost, dt_ms) {
            speed_change -= expired.speed_delta;
        }
        if let Some(expired) = countdown_slot(&mut self.slow_down, dt_ms) {
            speed_change -= expired.speed_delta;
        }

        self.dy += tuning.gravity * frames;
        self.body.pos.y += self.dy * frames;

        if self.body.bottom() >= floor_y {
            self.land(floor_y);
        }

        speed_change
    }

    /// Vertical run-cycle offset applied when drawing
    pub fn bob_offset(&self, tuning: &Tuning) -> f32 {
        if self.grounded {
            (self.run_frame as f32 * tuning.bob_rate).sin() * tuning.bob_amplitude
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub color: Color,
    pub anchor: Anchor,
    pub body: Body,
}

#[derive(Debug, Clone)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub color: Color,
    pub effect: PowerUpEffect,
    pub duration_ms: f32,
    pub body: Body,
}

#[derive(Debug, Clone)]
pub struct LoreFragment {
    pub color: Color,
    pub discovery: LoreDiscovery,
    pub body: Body,
}

/// Playfield dimensions; the floor line is the bottom edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            width: DEFAULT_FIELD_WIDTH,
            height: DEFAULT_FIELD_HEIGHT,
        }
    }
}

impl Field {
    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.height
    }
}

/// Complete state of a run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub field: Field,
    pub phase: GamePhase,
    pub player: Player,
    /// Active entities, in spawn order
    pub obstacles: Vec<Obstacle>,
    pub power_ups: Vec<PowerUp>,
    pub lore_fragments: Vec<LoreFragment>,
    /// Cumulative distance scrolled
    pub distance: f32,
    /// World speed (pixels per nominal frame)
    pub speed: f32,
    /// Obstacles survived
    pub score: u64,
    /// Lore fragments picked up this run
    pub lore_collected: u32,
    /// Progression stage, `floor(distance / biome_distance)`
    pub biome_stage: u32,
    pub biome_index: usize,
    /// Simulation step counter
    pub time_ticks: u64,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new run with default balance and field size
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default(), Field::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning, field: Field) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            speed: tuning.start_speed,
            tuning,
            field,
            phase: GamePhase::Ready,
            player: Player::new(field.floor_y()),
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            lore_fragments: Vec::new(),
            distance: 0.0,
            score: 0,
            lore_collected: 0,
            biome_stage: 0,
            biome_index: 0,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// The biome currently in play
    #[inline]
    pub fn biome(&self) -> &'static Biome {
        biome::biome(self.biome_index)
    }

    /// Activate a biome and let the host know about it
    pub fn set_biome(&mut self, index: usize) {
        self.biome_index = index % biome::BIOMES.len();
        log::info!("Entering biome {}", self.biome().name);
        self.push_event(GameEvent::BiomeChanged {
            index: self.biome_index,
        });
    }

    /// Distance shown in the HUD
    #[inline]
    pub fn display_distance(&self) -> u64 {
        (self.distance / 100.0).floor() as u64
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand all pending events to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Resize the playfield, keeping everything floor-relative on the floor
    pub fn resize(&mut self, width: f32, height: f32) {
        let shift = height - self.field.height;
        self.field = Field { width, height };
        self.player.land(self.field.floor_y());

        for obstacle in &mut self.obstacles {
            if obstacle.anchor == Anchor::Ground {
                obstacle.body.pos.y += shift;
            }
        }
        for power_up in &mut self.power_ups {
            power_up.body.pos.y += shift;
        }
        for fragment in &mut self.lore_fragments {
            fragment.body.pos.y += shift;
        }
    }
}
