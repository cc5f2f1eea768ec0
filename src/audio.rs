//! Sound cues for simulation events
//!
//! The simulation never talks to an audio device. It raises [`GameEvent`]s;
//! the [`AudioManager`] turns the audible ones into [`SoundEffect`]s and hands
//! them to whatever [`AudioBackend`] the host provides. Without a backend every
//! cue is dropped and the game runs exactly the same.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Bomb dropped
    BombPlace,
    /// Bomb went off
    BombExplode,
    /// Power-up picked up
    PowerUp,
    /// Out of lives
    GameOver,
    /// Last enemy down
    Victory,
}

impl SoundEffect {
    /// Cue for an event, if the event is audible
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::BombPlaced { .. } => Some(SoundEffect::BombPlace),
            GameEvent::BombExploded { .. } => Some(SoundEffect::BombExplode),
            GameEvent::PowerUpCollected { .. } => Some(SoundEffect::PowerUp),
            GameEvent::GameOver => Some(SoundEffect::GameOver),
            GameEvent::Victory => Some(SoundEffect::Victory),
            _ => None,
        }
    }

    /// Asset-style name, for backends that play sample files
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::BombPlace => "bomb_place",
            SoundEffect::BombExplode => "bomb_explode",
            SoundEffect::PowerUp => "powerup",
            SoundEffect::GameOver => "game_over",
            SoundEffect::Victory => "you_win",
        }
    }
}

/// Device-side sink for cues
pub trait AudioBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Backend that only logs cues; used by the headless runner
#[derive(Debug, Default)]
pub struct LogBackend {
    pub played: Vec<SoundEffect>,
}

impl AudioBackend for LogBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::trace!("sfx {} at {:.2}", effect.name(), volume);
        self.played.push(effect);
    }
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: Option<B>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    /// Wrap a backend; `None` means no device could be opened
    pub fn new(backend: Option<B>) -> Self {
        if backend.is_none() {
            log::warn!("No audio backend available - audio disabled");
        }
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.play(effect, vol);
        }
    }

    /// Play the cue for every audible event, in order
    pub fn play_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }
}
