//! Sound effect dispatch
//!
//! The simulation only emits `GameEvent`s; this maps them to sound effects
//! and hands them to whatever `AudioSink` the host provides.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player volley
    PlayerShoot,
    /// Bullet connects with an enemy
    EnemyHit,
    /// Player takes damage
    PlayerHit,
    /// Level threshold crossed
    LevelUp,
    /// Merchant shows up for the break
    MerchantArrival,
    /// Wave cleared
    WaveClear,
    /// Chest finished opening
    ChestOpen,
    /// Game over
    GameOver,
}

impl SoundEffect {
    /// Map a simulation event to its sound, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::ShotFired => Some(SoundEffect::PlayerShoot),
            GameEvent::EnemyHit { .. } => Some(SoundEffect::EnemyHit),
            GameEvent::PlayerDamaged { .. } => Some(SoundEffect::PlayerHit),
            GameEvent::LevelUp { .. } => Some(SoundEffect::LevelUp),
            GameEvent::MerchantArrived => Some(SoundEffect::MerchantArrival),
            GameEvent::WaveCleared { .. } => Some(SoundEffect::WaveClear),
            GameEvent::ChestOpened { .. } => Some(SoundEffect::ChestOpen),
            GameEvent::GameOver => Some(SoundEffect::GameOver),
            GameEvent::EnemyKilled { .. }
            | GameEvent::MoneyDropped { .. }
            | GameEvent::WaveStarted { .. }
            | GameEvent::ScreenShake => None,
        }
    }

    /// Per-effect volume before settings are applied
    pub fn base_volume(&self) -> f32 {
        match self {
            // Frequent, keep quiet
            SoundEffect::PlayerShoot | SoundEffect::LevelUp => 0.3,
            SoundEffect::EnemyHit => 0.4,
            SoundEffect::PlayerHit | SoundEffect::MerchantArrival => 0.5,
            SoundEffect::WaveClear | SoundEffect::ChestOpen | SoundEffect::GameOver => 0.6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::PlayerShoot => "player_shoot",
            SoundEffect::EnemyHit => "enemy_hit",
            SoundEffect::PlayerHit => "player_hit",
            SoundEffect::LevelUp => "level_up",
            SoundEffect::MerchantArrival => "merchant_arrival",
            SoundEffect::WaveClear => "wave_clear",
            SoundEffect::ChestOpen => "chest_open",
            SoundEffect::GameOver => "game_over",
        }
    }
}

/// Host-provided audio output
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Writes each effect to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::trace!("sfx {} @ {:.2}", effect.name(), volume);
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullAudio))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self { sink, muted: false }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume for an effect
    fn effective_volume(&self, effect: SoundEffect, settings: &Settings) -> f32 {
        if self.muted {
            0.0
        } else {
            effect.base_volume() * settings.effects_gain()
        }
    }

    /// Play the sound for an event, if it has one and is audible
    pub fn dispatch(&mut self, event: &GameEvent, settings: &Settings) {
        let Some(effect) = SoundEffect::for_event(event) else {
            return;
        };
        let volume = self.effective_volume(effect, settings);
        if volume > 0.0 {
            self.sink.play(effect, volume);
        }
    }
}
