//! Wave Arena - simulation core for a top-down wave survival game
//!
//! Core modules:
//! - `sim`: Simulation (entities, combat, spawning, waves, upgrades, shop)
//! - `engine`: Command surface used by the presentation layer
//! - `tuning`: Data-driven game balance
//! - `settings`: Cosmetic preferences (never touch simulation math)
//! - `audio`: Sound effect sink driven by simulation events

pub mod audio;
pub mod engine;
pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use engine::{Engine, HudSnapshot, UpgradeReroll};
pub use error::{CommandError, ShopError, TuningError};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Engine-wide constants (not balance knobs - those live in `tuning`)
pub mod consts {
    /// Frame duration all per-tick movement is normalized against (60 Hz)
    pub const TARGET_FRAME_MS: f32 = 1000.0 / 60.0;
    /// Maximum frame delta fed into the simulation to prevent spiral of death
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Cards shown on level-up
    pub const UPGRADE_CHOICES: usize = 3;
    /// Entries in a shop offer
    pub const SHOP_OFFER_SIZE: usize = 3;
}

/// Scale factor turning a frame delta into "frames at 60 Hz"
#[inline]
pub fn frame_factor(dt_ms: f32) -> f32 {
    dt_ms / consts::TARGET_FRAME_MS
}

/// Unit direction from `from` toward `to` and the distance between them.
/// Returns `None` when the points coincide.
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Option<(Vec2, f32)> {
    let delta = to - from;
    let dist = delta.length();
    if dist <= f32::EPSILON {
        None
    } else {
        Some((delta / dist, dist))
    }
}

/// Unit vector for an angle in radians
#[inline]
pub fn angle_to_dir(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
