//! Fixed timestep simulation tick
//!
//! Core game loop that advances a run deterministically: player physics and
//! effects, spawning, entity scrolling, collisions, scoring and biome
//! progression.

use super::biome::{Color, PowerUpEffect, biome_index_for_stage, biome_stage};
use super::spawn::spawn_entities;
use super::state::{GameEvent, GamePhase, GameState, PowerUp, TimedEffect};
use crate::consts::SIM_DT;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Leave the start screen
    pub start: bool,
    /// Jump (ignored mid-air)
    pub jump: bool,
}

/// Advance the game state by one timestep of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    match state.phase {
        GamePhase::Ready => {
            if input.start {
                begin(state);
            }
            return;
        }
        GamePhase::GameOver => return,
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;
    let frames = dt / SIM_DT;
    let floor_y = state.field.floor_y();

    if input.jump && state.player.jump(state.tuning.jump_impulse) {
        state.push_event(GameEvent::Jumped);
    }

    // Player physics and timed effects
    let speed_change = state.player.update(dt, floor_y, &state.tuning);
    if speed_change != 0.0 {
        let target = state.speed + speed_change;
        let speed = target.max(state.tuning.min_speed);
        // Whatever the clamp absorbed is owed back by the running slow-down
        if let Some(slow_down) = state.player.slow_down.as_mut() {
            slow_down.speed_delta += speed - target;
        }
        state.speed = speed;
    }

    spawn_entities(state);

    let dx = state.speed * frames;

    // Obstacles
    for obstacle in &mut state.obstacles {
        obstacle.body.scroll(dx);
    }
    let player_box = state.player.body.aabb();
    let hit = state
        .obstacles
        .iter()
        .any(|o| o.body.aabb().overlaps(&player_box));
    if hit && !state.player.is_invincible() && !resolve_fatal_hit(state) {
        return;
    }

    let before = state.obstacles.len();
    state
        .obstacles
        .retain(|o| !o.body.aabb().is_past_left_edge());
    for _ in state.obstacles.len()..before {
        state.score += 1;
        state.push_event(GameEvent::ObstacleCleared { score: state.score });
    }

    state.distance += dx;
    advance_biome(state);

    // Power-ups
    let player_box = state.player.body.aabb();
    let mut collected = Vec::new();
    state.power_ups.retain_mut(|p| {
        p.body.scroll(dx);
        let aabb = p.body.aabb();
        if aabb.overlaps(&player_box) {
            collected.push(p.clone());
            return false;
        }
        !aabb.is_past_left_edge()
    });
    for power_up in &collected {
        apply_power_up(state, power_up);
    }

    // Lore fragments
    let mut discovered = Vec::new();
    state.lore_fragments.retain_mut(|l| {
        l.body.scroll(dx);
        let aabb = l.body.aabb();
        if aabb.overlaps(&player_box) {
            discovered.push(l.discovery);
            return false;
        }
        !aabb.is_past_left_edge()
    });
    for discovery in discovered {
        state.lore_collected += 1;
        state.push_event(GameEvent::LoreCollected(discovery));
    }

    // Increase speed over time
    state.speed += state.tuning.speed_ramp * frames;
}

/// Leave the start screen and activate the first biome
fn begin(state: &mut GameState) {
    log::info!("Run started (seed {})", state.seed);
    state.phase = GamePhase::Playing;
    state.push_event(GameEvent::Started);
    state.set_biome(state.biome_index);
}

/// Move to the biome for the current distance, if it changed
pub fn advance_biome(state: &mut GameState) {
    let stage = biome_stage(state.distance, state.tuning.biome_distance);
    if stage <= state.biome_stage {
        return;
    }
    state.biome_stage = stage;
    let index = biome_index_for_stage(stage, state.tuning.biome_policy);
    if index != state.biome_index {
        state.set_biome(index);
    }
}

/// Apply a collected power-up to the player and world
pub fn apply_power_up(state: &mut GameState, power_up: &PowerUp) {
    let player = &mut state.player;
    match power_up.effect {
        PowerUpEffect::Invincibility => {
            player.invincible = Some(TimedEffect::new(power_up.duration_ms));
            player.color = power_up.color;
        }
        PowerUpEffect::SpeedBoost { magnitude } => {
            if player.speed_boost.is_none() {
                let before = state.speed;
                state.speed += magnitude;
                player.speed_boost = Some(TimedEffect {
                    speed_delta: state.speed - before,
                    ..TimedEffect::new(power_up.duration_ms)
                });
            }
        }
        PowerUpEffect::SlowDown { magnitude } => {
            if player.slow_down.is_none() {
                let before = state.speed;
                state.speed = (state.speed - magnitude).max(state.tuning.min_speed);
                player.slow_down = Some(TimedEffect {
                    speed_delta: state.speed - before,
                    ..TimedEffect::new(power_up.duration_ms)
                });
            }
        }
        PowerUpEffect::Revive => player.has_revive = true,
    }
    state.push_event(GameEvent::PowerUpCollected(power_up.kind));
}

/// Handle an unshielded obstacle hit
///
/// Returns true when a banked revive absorbed it, false when the run ended.
pub fn resolve_fatal_hit(state: &mut GameState) -> bool {
    if state.player.has_revive {
        let floor_y = state.field.floor_y();
        let player = &mut state.player;
        player.has_revive = false;
        player.land(floor_y);
        player.invincible = Some(TimedEffect::new(state.tuning.revive_shield_ms));
        player.color = Color::REVIVE_SHIELD;

        let half = state.field.width / 2.0;
        state.obstacles.retain(|o| o.body.pos.x > half);

        log::info!("Revive consumed at distance {}", state.display_distance());
        state.push_event(GameEvent::Revived);
        return true;
    }

    state.phase = GamePhase::GameOver;
    log::info!(
        "Game over: score {}, distance {}, lore {}",
        state.score,
        state.display_distance(),
        state.lore_collected
    );
    state.push_event(GameEvent::GameOver { score: state.score });
    false
}
