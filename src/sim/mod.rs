//! Simulation module
//!
//! All gameplay logic lives here. The module is deterministic given its inputs:
//! - Time arrives as absolute milliseconds from a `Clock`
//! - Randomness only through `RandomSource`
//! - Stable iteration order (insertion order)
//! - No rendering, audio, or platform dependencies

pub mod champion;
pub mod chests;
pub mod clock;
pub mod collision;
pub mod combat;
pub mod rng;
pub mod shop;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod upgrades;
pub mod waves;
pub mod weapons;
pub mod xp;

pub use champion::{ChampionId, ChampionStats};
pub use chests::{Chest, ChestRarity, ChestReward};
pub use clock::{Clock, ManualClock, SystemClock};
pub use rng::{PcgSource, RandomSource, ScriptedSource};
pub use shop::{OfferSlot, ShopState};
pub use state::{
    BoostStat, Bullet, Enemy, EnemyKind, EnemyProjectile, EntityStore, GameEvent, GamePhase,
    GameState, Player, XpOrb,
};
pub use tick::{Frame, TickInput, start_run, tick};
pub use upgrades::{UpgradeChoice, UpgradeCount, UpgradeId, UpgradeTier};
pub use waves::{ModifierStat, WaveModifier, WaveState};
