//! Entity spawner
//!
//! Each step rolls independently for an obstacle, a power-up and a lore
//! fragment, then instantiates a template from the active biome at the right
//! edge of the field.

use rand::Rng;

use super::biome::{Anchor, Color, LoreTemplate, ObstacleTemplate, PowerUpTemplate};
use super::state::{Body, GameState, LoreDiscovery, LoreFragment, Obstacle, PowerUp};
use crate::consts::{GROUND_HEIGHT, LORE_FLOAT_HEIGHT, LORE_HEIGHT, LORE_WIDTH};

/// Roll the spawn dice for this step
pub fn spawn_entities(state: &mut GameState) {
    // Always draw all three values so the RNG stream does not depend on caps
    let obstacle_roll: f32 = state.rng.random();
    let power_up_roll: f32 = state.rng.random();
    let lore_roll: f32 = state.rng.random();

    if obstacle_roll < state.tuning.obstacle_chance
        && state.obstacles.len() < state.tuning.max_obstacles
    {
        spawn_obstacle(state);
    }
    if power_up_roll < state.tuning.power_up_chance {
        spawn_power_up(state);
    }
    if lore_roll < state.tuning.lore_chance {
        spawn_lore_fragment(state);
    }
}

/// Top edge of an obstacle for its anchor
pub fn obstacle_y<R: Rng>(anchor: Anchor, height: f32, floor_y: f32, rng: &mut R) -> f32 {
    match anchor {
        Anchor::Ground => floor_y - height,
        Anchor::Air { y } => y,
        Anchor::AirRandom { min, span } => min + rng.random::<f32>() * span,
    }
}

/// Spawn a random obstacle from the active biome (if it has any)
pub fn spawn_obstacle(state: &mut GameState) -> bool {
    let templates = state.biome().obstacles;
    if templates.is_empty() {
        return false;
    }
    let template = templates[state.rng.random_range(0..templates.len())];
    spawn_obstacle_from(state, &template);
    true
}

pub fn spawn_obstacle_from(state: &mut GameState, template: &ObstacleTemplate) {
    let y = obstacle_y(
        template.anchor,
        template.height,
        state.field.floor_y(),
        &mut state.rng,
    );
    state.obstacles.push(Obstacle {
        kind: template.kind,
        color: template.color,
        anchor: template.anchor,
        body: Body::new(state.field.width, y, template.width, template.height),
    });
}

/// Spawn a random power-up from the active biome (if it has any)
pub fn spawn_power_up(state: &mut GameState) -> bool {
    let templates = state.biome().power_ups;
    if templates.is_empty() {
        return false;
    }
    let template = templates[state.rng.random_range(0..templates.len())];
    spawn_power_up_from(state, &template);
    true
}

pub fn spawn_power_up_from(state: &mut GameState, template: &PowerUpTemplate) {
    let y = state.field.floor_y() - template.height - GROUND_HEIGHT;
    state.power_ups.push(PowerUp {
        kind: template.kind,
        color: template.color,
        effect: template.effect,
        duration_ms: template.duration_ms,
        body: Body::new(state.field.width, y, template.width, template.height),
    });
}

/// Spawn a random lore fragment from the active biome (if it has any)
pub fn spawn_lore_fragment(state: &mut GameState) -> bool {
    let biome = state.biome();
    if biome.lore.is_empty() {
        return false;
    }
    let template = biome.lore[state.rng.random_range(0..biome.lore.len())];
    spawn_lore_from(state, &template, biome.name);
    true
}

pub fn spawn_lore_from(state: &mut GameState, template: &LoreTemplate, biome: &'static str) {
    let y = state.field.floor_y() - LORE_FLOAT_HEIGHT;
    state.lore_fragments.push(LoreFragment {
        color: Color::LORE,
        discovery: LoreDiscovery {
            title: template.title,
            content: template.content,
            biome,
        },
        body: Body::new(state.field.width, y, LORE_WIDTH, LORE_HEIGHT),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::biome::{BIOMES, ObstacleKind};
    use crate::sim::state::Field;
    use crate::tuning::Tuning;

    fn quiet_state() -> GameState {
        GameState::with_tuning(42, Tuning::without_spawns(), Field::default())
    }

    #[test]
    fn test_ground_obstacle_sits_on_floor() {
        let mut state = quiet_state();
        let log = BIOMES[1].obstacles[0];
        assert_eq!(log.kind, ObstacleKind::Log);
        spawn_obstacle_from(&mut state, &log);

        let obstacle = &state.obstacles[0];
        assert_eq!(obstacle.body.pos.x, state.field.width);
        assert_eq!(obstacle.body.bottom(), state.field.floor_y());
    }

    #[test]
    fn test_air_obstacle_uses_fixed_height() {
        let mut state = quiet_state();
        let icicle = BIOMES[0].obstacles[1];
        spawn_obstacle_from(&mut state, &icicle);
        assert_eq!(state.obstacles[0].body.pos.y, 0.0);
    }

    #[test]
    fn test_ember_rerolls_height_each_spawn() {
        let mut state = quiet_state();
        let ember = BIOMES[4].obstacles[1];
        assert_eq!(ember.kind, ObstacleKind::Ember);
        for _ in 0..20 {
            spawn_obstacle_from(&mut state, &ember);
        }
        let heights: Vec<f32> = state.obstacles.iter().map(|o| o.body.pos.y).collect();
        assert!(heights.iter().all(|y| (50.0..=150.0).contains(y)));
        assert!(heights.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_power_up_floats_above_ground_band() {
        let mut state = quiet_state();
        spawn_power_up_from(&mut state, &BIOMES[0].power_ups[0]);
        let power_up = &state.power_ups[0];
        assert_eq!(
            power_up.body.bottom(),
            state.field.floor_y() - GROUND_HEIGHT
        );
    }

    #[test]
    fn test_lore_fragment_carries_biome() {
        let mut state = quiet_state();
        state.biome_index = 3;
        assert!(spawn_lore_fragment(&mut state));
        let fragment = &state.lore_fragments[0];
        assert_eq!(fragment.discovery.biome, "Sunken City of Atlantis");
        assert_eq!(fragment.discovery.title, "The Silent Depths");
        assert_eq!(fragment.body.pos.y, state.field.floor_y() - LORE_FLOAT_HEIGHT);
    }

    #[test]
    fn test_spawned_obstacle_comes_from_active_biome() {
        let mut state = quiet_state();
        state.biome_index = 2;
        for _ in 0..10 {
            spawn_obstacle(&mut state);
        }
        assert!(
            state
                .obstacles
                .iter()
                .all(|o| matches!(o.kind, ObstacleKind::Dune | ObstacleKind::Scorpion))
        );
    }

    #[test]
    fn test_obstacle_cap() {
        let mut state = GameState::with_tuning(
            9,
            Tuning {
                obstacle_chance: 1.0,
                ..Tuning::without_spawns()
            },
            Field::default(),
        );
        for _ in 0..20 {
            spawn_entities(&mut state);
        }
        assert_eq!(state.obstacles.len(), state.tuning.max_obstacles);
    }

    #[test]
    fn test_zero_chances_never_spawn() {
        let mut state = quiet_state();
        for _ in 0..1000 {
            spawn_entities(&mut state);
        }
        assert!(state.obstacles.is_empty());
        assert!(state.power_ups.is_empty());
        assert!(state.lore_fragments.is_empty());
    }

    fn state_with(seed: u64, tuning: Tuning) -> GameState {
        GameState::with_tuning(seed, tuning, Field::default())
    }

    #[test]
    fn test_power_up_gate_spawns_active_biome_power_up() {
        let mut state = state_with(
            5,
            Tuning {
                power_up_chance: 1.0,
                ..Tuning::without_spawns()
            },
        );
        state.biome_index = 1;
        for _ in 0..10 {
            spawn_entities(&mut state);
        }
        assert_eq!(state.power_ups.len(), 10);
        assert!(state.obstacles.is_empty());
        assert!(state.lore_fragments.is_empty());
        assert!(
            state
                .power_ups
                .iter()
                .all(|p| p.kind == BIOMES[1].power_ups[0].kind)
        );
    }

    #[test]
    fn test_lore_gate_spawns_active_biome_lore() {
        let mut state = state_with(
            6,
            Tuning {
                lore_chance: 1.0,
                ..Tuning::without_spawns()
            },
        );
        state.biome_index = 4;
        for _ in 0..3 {
            spawn_entities(&mut state);
        }
        assert_eq!(state.lore_fragments.len(), 3);
        assert!(state.obstacles.is_empty());
        assert!(state.power_ups.is_empty());
        assert!(
            state
                .lore_fragments
                .iter()
                .all(|l| l.discovery.biome == BIOMES[4].name)
        );
    }

    #[test]
    fn test_template_choice_follows_seed() {
        let tuning = Tuning {
            obstacle_chance: 1.0,
            max_obstacles: 100,
            ..Tuning::without_spawns()
        };
        let mut first = state_with(77, tuning.clone());
        let mut second = state_with(77, tuning);
        for _ in 0..50 {
            spawn_entities(&mut first);
            spawn_entities(&mut second);
        }

        let kinds: Vec<ObstacleKind> = first.obstacles.iter().map(|o| o.kind).collect();
        let replay: Vec<ObstacleKind> = second.obstacles.iter().map(|o| o.kind).collect();
        assert_eq!(kinds.len(), 50);
        assert_eq!(kinds, replay);
        // Both Frozen Wastelands templates get picked
        assert!(kinds.contains(&ObstacleKind::IceCrack));
        assert!(kinds.contains(&ObstacleKind::Icicle));
    }
}
