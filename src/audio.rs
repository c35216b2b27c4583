//! Audio system using Web Audio API
//!
//! Procedurally generated cues, no sample files. The event-to-cue mapping
//! is shared; playback exists only in the browser.

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

#[cfg(target_arch = "wasm32")]
use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player left the ground
    Jump,
    /// Power-up picked up
    Collect,
    /// Lore fragment picked up
    Lore,
    /// Revive consumed on a fatal hit
    Revive,
    /// Entered a new biome
    BiomeChange,
    GameOver,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped => Some(Self::Jump),
            GameEvent::PowerUpCollected(_) => Some(Self::Collect),
            GameEvent::LoreCollected(_) => Some(Self::Lore),
            GameEvent::Revived => Some(Self::Revive),
            GameEvent::BiomeChanged { index } if *index > 0 => Some(Self::BiomeChange),
            GameEvent::GameOver { .. } => Some(Self::GameOver),
            GameEvent::Started
            | GameEvent::BiomeChanged { .. }
            | GameEvent::ObstacleCleared { .. } => None,
        }
    }
}

/// Audio manager for the game
#[cfg(target_arch = "wasm32")]
pub struct AudioManager {
    ctx: Option<AudioContext>,
    /// Effect gain from preferences
    volume: f32,
    /// Temporary silence (window blur)
    muted: bool,
}

#[cfg(target_arch = "wasm32")]
impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: Settings::default().effective_sfx_volume(),
            muted: false,
        }
    }

    /// Take volumes and mute state from player preferences
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.effective_sfx_volume();
        self.muted = false;
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Silence or restore audio without touching preferences
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = if self.muted { 0.0 } else { self.volume };
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Jump => self.play_jump(ctx, vol),
            SoundEffect::Collect => {
                self.play_arpeggio(ctx, vol, &[600.0, 800.0, 1000.0], 0.08)
            }
            SoundEffect::Lore => self.play_lore(ctx, vol),
            SoundEffect::Revive => self.play_revive(ctx, vol),
            SoundEffect::BiomeChange => {
                self.play_arpeggio(ctx, vol, &[400.0, 500.0, 600.0, 800.0], 0.1)
            }
            SoundEffect::GameOver => self.play_game_over(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Jump - quick upward chirp
    fn play_jump(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 250.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.15, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(250.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(700.0, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Rising sequence of short notes
    fn play_arpeggio(&self, ctx: &AudioContext, vol: f32, freqs: &[f32], step: f64) {
        for (i, freq) in freqs.iter().enumerate() {
            let delay = i as f64 * step;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.25).ok();
            }
        }
    }

    /// Lore - two soft bell tones
    fn play_lore(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        for (freq, level) in [(880.0, 0.2), (1320.0, 0.1)] {
            if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) {
                gain.gain().set_value_at_time(vol * level, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.7).ok();
            }
        }
    }

    /// Revive - swell upward
    fn play_revive(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();
        osc.frequency().set_value_at_time(200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(1200.0, t + 0.4)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.55).ok();
    }

    /// Game over - sad descending
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
            let delay = i as f64 * 0.2;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{LoreDiscovery, PowerUpKind};

    #[test]
    fn test_event_cues() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Jumped),
            Some(SoundEffect::Jump)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::PowerUpCollected(PowerUpKind::Torch)),
            Some(SoundEffect::Collect)
        );
        let lore = LoreDiscovery {
            title: "t",
            content: "c",
            biome: "b",
        };
        assert_eq!(
            SoundEffect::for_event(&GameEvent::LoreCollected(lore)),
            Some(SoundEffect::Lore)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::GameOver { score: 3 }),
            Some(SoundEffect::GameOver)
        );
    }

    #[test]
    fn test_silent_events() {
        assert_eq!(SoundEffect::for_event(&GameEvent::Started), None);
        assert_eq!(
            SoundEffect::for_event(&GameEvent::ObstacleCleared { score: 1 }),
            None
        );
        // Entering the first biome is covered by Started
        assert_eq!(
            SoundEffect::for_event(&GameEvent::BiomeChanged { index: 0 }),
            None
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::BiomeChanged { index: 1 }),
            Some(SoundEffect::BiomeChange)
        );
    }
}
