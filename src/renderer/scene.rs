//! Scene assembly
//!
//! Turns a `GameState` into a flat triangle list in field pixels. Pure, so
//! it runs (and is tested) without a GPU.

use glam::Vec2;

use super::shapes;
use super::vertex::Vertex;
use crate::consts::GROUND_HEIGHT;
use crate::settings::Settings;
use crate::sim::{Color, GameState, Shape};

const LORE_GLOW_SPREAD: f32 = 10.0;
const REVIVE_GLOW_SPREAD: f32 = 15.0;
const GLOW_LAYERS: u32 = 4;

/// Clear color for the current frame
pub fn background(state: &GameState) -> [f32; 4] {
    state.biome().background.to_linear(1.0)
}

/// Build all geometry for one frame, back to front
pub fn build_scene(state: &GameState, settings: &Settings) -> Vec<Vertex> {
    let field = state.field;
    let biome = state.biome();
    let mut vertices = Vec::with_capacity(
        6 * (2 + state.obstacles.len() + state.power_ups.len())
            + 6 * (1 + GLOW_LAYERS as usize) * (1 + state.lore_fragments.len()),
    );

    // Ground strip
    vertices.extend(shapes::rect(
        Vec2::new(0.0, field.height - GROUND_HEIGHT),
        Vec2::new(field.width, GROUND_HEIGHT),
        biome.ground.to_linear(1.0),
    ));

    for obstacle in &state.obstacles {
        let color = obstacle.color.to_linear(1.0);
        let body = &obstacle.body;
        match obstacle.kind.shape() {
            Shape::Rect => vertices.extend(shapes::rect(body.pos, body.size, color)),
            Shape::DownTriangle => {
                vertices.extend(shapes::down_triangle(body.pos, body.size, color))
            }
        }
    }

    for power_up in &state.power_ups {
        vertices.extend(shapes::rect(
            power_up.body.pos,
            power_up.body.size,
            power_up.color.to_linear(1.0),
        ));
    }

    for lore in &state.lore_fragments {
        let color = lore.color.to_linear(1.0);
        vertices.extend(shapes::glow(
            lore.body.pos,
            lore.body.size,
            color,
            LORE_GLOW_SPREAD,
            GLOW_LAYERS,
        ));
        vertices.extend(shapes::rect(lore.body.pos, lore.body.size, color));
    }

    // Player
    let player = &state.player;
    let bob = if settings.bobbing_enabled() {
        player.bob_offset(&state.tuning)
    } else {
        0.0
    };
    // Bob moves the top edge only; the feet stay on the body's bottom
    let pos = player.body.pos + Vec2::new(0.0, bob);
    let size = player.body.size - Vec2::new(0.0, bob);
    if player.has_revive {
        vertices.extend(shapes::glow(
            pos,
            size,
            Color::REVIVE_GLOW.to_linear(1.0),
            REVIVE_GLOW_SPREAD,
            GLOW_LAYERS,
        ));
    }
    vertices.extend(shapes::rect(pos, size, player.color.to_linear(1.0)));

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::BIOMES;
    use crate::sim::spawn::spawn_obstacle_from;

    #[test]
    fn test_empty_scene_is_ground_and_player() {
        let state = GameState::new(1);
        let verts = build_scene(&state, &Settings::default());
        assert_eq!(verts.len(), 12);

        // Ground strip hugs the bottom edge
        let ground_top = verts[..6]
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MAX, f32::min);
        assert_eq!(ground_top, state.field.height - GROUND_HEIGHT);
    }

    #[test]
    fn test_icicle_draws_as_triangle() {
        let mut state = GameState::new(1);
        let icicle = BIOMES[0].obstacles[1];
        spawn_obstacle_from(&mut state, &icicle);
        let verts = build_scene(&state, &Settings::default());
        assert_eq!(verts.len(), 12 + 3);
    }

    #[test]
    fn test_revive_adds_glow() {
        let mut state = GameState::new(1);
        state.player.has_revive = true;
        let verts = build_scene(&state, &Settings::default());
        assert_eq!(verts.len(), 12 + 6 * GLOW_LAYERS as usize);
    }

    #[test]
    fn test_reduced_motion_disables_bob() {
        let mut state = GameState::new(1);
        state.player.run_frame = 4;
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let verts = build_scene(&state, &settings);
        let player_top = verts[6..]
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MAX, f32::min);
        assert_eq!(player_top, state.player.body.pos.y);
    }

    #[test]
    fn test_bob_keeps_feet_on_floor() {
        let mut state = GameState::new(1);
        state.player.run_frame = 4;
        let bob = state.player.bob_offset(&state.tuning);
        assert!(bob.abs() > 0.0);

        let verts = build_scene(&state, &Settings::default());
        let ys = verts[6..].iter().map(|v| v.position[1]);
        let top = ys.clone().fold(f32::MAX, f32::min);
        let bottom = ys.fold(f32::MIN, f32::max);
        assert!((top - (state.player.body.pos.y + bob)).abs() < 1e-4);
        assert!((bottom - state.player.body.bottom()).abs() < 1e-4);
    }

    #[test]
    fn test_background_follows_biome() {
        let mut state = GameState::new(1);
        let first = background(&state);
        state.set_biome(2);
        assert_ne!(first, background(&state));
    }
}
