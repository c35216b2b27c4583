//! Biome tables and progression
//!
//! Biomes are static templates. The run only ever changes which one is
//! active, derived from cumulative distance.

use serde::{Deserialize, Serialize};

use crate::tuning::BiomePolicy;

/// An sRGB color packed as 0xRRGGBB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const PLAYER: Color = Color(0xff0000);
    pub const REVIVE_SHIELD: Color = Color(0xfdd835);
    pub const REVIVE_GLOW: Color = Color(0xffab00);
    pub const LORE: Color = Color(0xff00ff);

    #[inline]
    pub fn channels(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xff) as u8,
            ((self.0 >> 8) & 0xff) as u8,
            (self.0 & 0xff) as u8,
        )
    }

    /// Linear RGBA for the GPU (surface formats are sRGB)
    pub fn to_linear(self, alpha: f32) -> [f32; 4] {
        fn decode(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let (r, g, b) = self.channels();
        [decode(r), decode(g), decode(b), alpha]
    }

    /// CSS hex string (`#rrggbb`)
    pub fn to_css(self) -> String {
        format!("#{:06x}", self.0 & 0xff_ffff)
    }
}

/// How an entity is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Rect,
    /// Base along the top edge, tip pointing down
    DownTriangle,
}

/// Obstacle types across all biomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    IceCrack,
    Icicle,
    Log,
    Vine,
    Dune,
    Scorpion,
    CoralReef,
    Pillar,
    LavaPit,
    Ember,
}

impl ObstacleKind {
    pub fn shape(self) -> Shape {
        match self {
            ObstacleKind::Icicle => Shape::DownTriangle,
            _ => Shape::Rect,
        }
    }
}

/// Power-up types across all biomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Torch,
    JaguarSpirit,
    WaterFlask,
    Trident,
    PhoenixFeather,
}

/// What a power-up does when collected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpEffect {
    Invincibility,
    SpeedBoost { magnitude: f32 },
    SlowDown { magnitude: f32 },
    Revive,
}

/// Vertical placement of a spawned obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Resting on the floor line
    Ground,
    /// Fixed distance from the top of the field
    Air { y: f32 },
    /// Re-rolled on every spawn: `min + U(0, 1) * span` from the top
    AirRandom { min: f32, span: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleTemplate {
    pub kind: ObstacleKind,
    pub color: Color,
    pub width: f32,
    pub height: f32,
    pub anchor: Anchor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpTemplate {
    pub kind: PowerUpKind,
    pub color: Color,
    pub width: f32,
    pub height: f32,
    pub effect: PowerUpEffect,
    /// Effect duration in milliseconds (unused by revive)
    pub duration_ms: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoreTemplate {
    pub title: &'static str,
    pub content: &'static str,
}

/// A themed world segment
#[derive(Debug)]
pub struct Biome {
    pub name: &'static str,
    pub background: Color,
    pub ground: Color,
    pub obstacles: &'static [ObstacleTemplate],
    pub power_ups: &'static [PowerUpTemplate],
    pub lore: &'static [LoreTemplate],
}

pub const BIOMES: &[Biome] = &[
    Biome {
        name: "Frozen Wastelands",
        background: Color(0xa2d5f2),
        ground: Color(0xe0f7fa),
        obstacles: &[
            ObstacleTemplate {
                kind: ObstacleKind::IceCrack,
                color: Color(0xffffff),
                width: 100.0,
                height: 15.0,
                anchor: Anchor::Ground,
            },
            ObstacleTemplate {
                kind: ObstacleKind::Icicle,
                color: Color(0xffffff),
                width: 20.0,
                height: 40.0,
                anchor: Anchor::Air { y: 0.0 },
            },
        ],
        power_ups: &[PowerUpTemplate {
            kind: PowerUpKind::Torch,
            color: Color(0xff6d00),
            width: 20.0,
            height: 40.0,
            effect: PowerUpEffect::Invincibility,
            duration_ms: 5000.0,
        }],
        lore: &[LoreTemplate {
            title: "The Long Winter",
            content: "A journal entry speaks of a winter that never ended, a sun that vanished.",
        }],
    },
    Biome {
        name: "Deep Jungle",
        background: Color(0x2e7d32),
        ground: Color(0x558b2f),
        obstacles: &[
            ObstacleTemplate {
                kind: ObstacleKind::Log,
                color: Color(0x8d6e63),
                width: 50.0,
                height: 40.0,
                anchor: Anchor::Ground,
            },
            ObstacleTemplate {
                kind: ObstacleKind::Vine,
                color: Color(0x1b5e20),
                width: 10.0,
                height: 100.0,
                anchor: Anchor::Air { y: 0.0 },
            },
        ],
        power_ups: &[PowerUpTemplate {
            kind: PowerUpKind::JaguarSpirit,
            color: Color(0xffeb3b),
            width: 30.0,
            height: 30.0,
            effect: PowerUpEffect::SpeedBoost { magnitude: 5.0 },
            duration_ms: 3000.0,
        }],
        lore: &[LoreTemplate {
            title: "Whispers of the Canopy",
            content: "The trees here are said to hold the memories of the world.",
        }],
    },
    Biome {
        name: "Desert of Illusions",
        background: Color(0xffca28),
        ground: Color(0xffd54f),
        obstacles: &[
            ObstacleTemplate {
                kind: ObstacleKind::Dune,
                color: Color(0xd2691e),
                width: 80.0,
                height: 30.0,
                anchor: Anchor::Ground,
            },
            ObstacleTemplate {
                kind: ObstacleKind::Scorpion,
                color: Color(0x3e2723),
                width: 30.0,
                height: 20.0,
                anchor: Anchor::Ground,
            },
        ],
        power_ups: &[PowerUpTemplate {
            kind: PowerUpKind::WaterFlask,
            color: Color(0x4fc3f7),
            width: 25.0,
            height: 25.0,
            effect: PowerUpEffect::SlowDown { magnitude: 2.0 },
            duration_ms: 4000.0,
        }],
        lore: &[LoreTemplate {
            title: "Mirage of Time",
            content: "Travelers speak of seeing cities in the sand that were never there.",
        }],
    },
    Biome {
        name: "Sunken City of Atlantis",
        background: Color(0x0d47a1),
        ground: Color(0xb2dfdb),
        obstacles: &[
            ObstacleTemplate {
                kind: ObstacleKind::CoralReef,
                color: Color(0xff8a80),
                width: 60.0,
                height: 35.0,
                anchor: Anchor::Ground,
            },
            ObstacleTemplate {
                kind: ObstacleKind::Pillar,
                color: Color(0x78909c),
                width: 40.0,
                height: 120.0,
                anchor: Anchor::Ground,
            },
        ],
        power_ups: &[PowerUpTemplate {
            kind: PowerUpKind::Trident,
            color: Color(0xfdd835),
            width: 20.0,
            height: 50.0,
            effect: PowerUpEffect::Invincibility,
            duration_ms: 5000.0,
        }],
        lore: &[LoreTemplate {
            title: "The Silent Depths",
            content: "A once-great city, now sleeping under the waves, waiting to be awoken.",
        }],
    },
    Biome {
        name: "Volcanic Peaks of Ash",
        background: Color(0xbf360c),
        ground: Color(0x212121),
        obstacles: &[
            ObstacleTemplate {
                kind: ObstacleKind::LavaPit,
                color: Color(0xff3d00),
                width: 70.0,
                height: 20.0,
                anchor: Anchor::Ground,
            },
            ObstacleTemplate {
                kind: ObstacleKind::Ember,
                color: Color(0xff9100),
                width: 15.0,
                height: 15.0,
                anchor: Anchor::AirRandom {
                    min: 50.0,
                    span: 100.0,
                },
            },
        ],
        power_ups: &[PowerUpTemplate {
            kind: PowerUpKind::PhoenixFeather,
            color: Color(0xffab00),
            width: 25.0,
            height: 40.0,
            effect: PowerUpEffect::Revive,
            duration_ms: 0.0,
        }],
        lore: &[LoreTemplate {
            title: "Heart of the Mountain",
            content: "The world was forged in fire, and here, the fire still burns.",
        }],
    },
];

/// Progression stage reached after covering `distance`
///
/// Pure and monotonic in `distance`; spawn randomness never feeds into it.
#[inline]
pub fn biome_stage(distance: f32, biome_distance: f32) -> u32 {
    if distance <= 0.0 || biome_distance <= 0.0 {
        return 0;
    }
    (distance / biome_distance).floor() as u32
}

/// Index into `BIOMES` for a stage
pub fn biome_index_for_stage(stage: u32, policy: BiomePolicy) -> usize {
    let count = BIOMES.len();
    let stage = stage as usize;
    match policy {
        BiomePolicy::Wrap => stage % count,
        BiomePolicy::Plateau => stage.min(count - 1),
    }
}

#[inline]
pub fn biome(index: usize) -> &'static Biome {
    &BIOMES[index % BIOMES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_every_biome_has_obstacles_and_lore() {
        for biome in BIOMES {
            assert!(!biome.obstacles.is_empty(), "{} has no obstacles", biome.name);
            assert!(!biome.lore.is_empty(), "{} has no lore", biome.name);
        }
    }

    #[test]
    fn test_only_icicle_is_a_triangle() {
        for biome in BIOMES {
            for template in biome.obstacles {
                let expected = if template.kind == ObstacleKind::Icicle {
                    Shape::DownTriangle
                } else {
                    Shape::Rect
                };
                assert_eq!(template.kind.shape(), expected);
            }
        }
    }

    #[test]
    fn test_stage_boundaries() {
        assert_eq!(biome_stage(0.0, 5000.0), 0);
        assert_eq!(biome_stage(4999.9, 5000.0), 0);
        assert_eq!(biome_stage(5000.0, 5000.0), 1);
        assert_eq!(biome_stage(12_500.0, 5000.0), 2);
    }

    #[test]
    fn test_wrap_and_plateau() {
        let last = BIOMES.len() - 1;
        assert_eq!(biome_index_for_stage(last as u32, BiomePolicy::Wrap), last);
        assert_eq!(biome_index_for_stage(BIOMES.len() as u32, BiomePolicy::Wrap), 0);
        assert_eq!(
            biome_index_for_stage(BIOMES.len() as u32 + 3, BiomePolicy::Plateau),
            last
        );
    }

    #[test]
    fn test_color_helpers() {
        assert_eq!(Color(0xfdd835).channels(), (0xfd, 0xd8, 0x35));
        assert_eq!(Color(0x0d47a1).to_css(), "#0d47a1");
        let white = Color(0xffffff).to_linear(1.0);
        assert!((white[0] - 1.0).abs() < 1e-6);
        assert_eq!(Color(0x000000).to_linear(0.5), [0.0, 0.0, 0.0, 0.5]);
    }

    proptest! {
        #[test]
        fn stage_is_monotonic(a in 0.0f32..1.0e7, b in 0.0f32..1.0e7) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(biome_stage(lo, 5000.0) <= biome_stage(hi, 5000.0));
        }

        #[test]
        fn index_always_in_range(stage in 0u32..10_000) {
            prop_assert!(biome_index_for_stage(stage, BiomePolicy::Wrap) < BIOMES.len());
            prop_assert!(biome_index_for_stage(stage, BiomePolicy::Plateau) < BIOMES.len());
        }
    }
}
