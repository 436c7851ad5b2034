//! Treasure chests
//!
//! Chests drop on a play-time cadence that slowly tightens. Standing on one
//! opens it after a delay; walking away cancels.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use super::state::{BoostStat, GameEvent, GameState, Player};
use crate::tuning::{ChestTuning, LevelTuning, Tuning};

/// Extra slack on the pickup radius so chests are easy to step on
const PICKUP_BUFFER: f32 = 16.0;
/// Extra slack before an opening is cancelled
const CANCEL_BUFFER: f32 = 20.0;
/// Placement attempts per chest before giving up
const PLACEMENT_ATTEMPTS: usize = 50;
const BOOST_DURATION_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChestRarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChestReward {
    Money(u32),
    Xp(u32),
    Health(f32),
    TemporaryBoost {
        stat: BoostStat,
        amount: f32,
        duration_ms: u64,
    },
    PermanentBoost {
        stat: BoostStat,
        amount: f32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chest {
    pub pos: Vec2,
    pub rarity: ChestRarity,
    /// Play time the opening started
    pub opening_since: Option<u64>,
    pub reward: Option<ChestReward>,
}

/// Cumulative roll over the common/uncommon/rare thresholds
pub fn roll_rarity(tuning: &ChestTuning, rng: &mut dyn RandomSource) -> ChestRarity {
    let roll = rng.unit();
    let [common, uncommon, rare] = tuning.rarity_chances;
    if roll < common {
        ChestRarity::Common
    } else if roll < common + uncommon {
        ChestRarity::Uncommon
    } else if roll < common + uncommon + rare {
        ChestRarity::Rare
    } else {
        ChestRarity::Legendary
    }
}

/// Uniform integer in `min..=max`
fn roll_amount(min: u32, max: u32, rng: &mut dyn RandomSource) -> u32 {
    min + rng.index((max - min + 1) as usize) as u32
}

fn temporary(stat: BoostStat) -> ChestReward {
    ChestReward::TemporaryBoost {
        stat,
        amount: 1.0,
        duration_ms: BOOST_DURATION_MS,
    }
}

/// Pick one reward from the rarity's table
pub fn roll_reward(rarity: ChestRarity, rng: &mut dyn RandomSource) -> ChestReward {
    let table: u32 = match rarity {
        ChestRarity::Common => 3,
        ChestRarity::Uncommon | ChestRarity::Rare | ChestRarity::Legendary => 4,
    };
    let slot = roll_amount(0, table - 1, rng);
    match (rarity, slot) {
        (ChestRarity::Common, 0) => ChestReward::Money(roll_amount(5, 10, rng)),
        (ChestRarity::Common, 1) => ChestReward::Xp(roll_amount(25, 50, rng)),
        (ChestRarity::Common, _) => ChestReward::Health(roll_amount(10, 20, rng) as f32),

        (ChestRarity::Uncommon, 0) => ChestReward::Money(roll_amount(15, 25, rng)),
        (ChestRarity::Uncommon, 1) => ChestReward::Xp(roll_amount(75, 100, rng)),
        (ChestRarity::Uncommon, 2) => ChestReward::Health(roll_amount(30, 50, rng) as f32),
        (ChestRarity::Uncommon, _) => temporary(BoostStat::Speed),

        (ChestRarity::Rare, 0) => ChestReward::Money(roll_amount(30, 50, rng)),
        (ChestRarity::Rare, 1) => ChestReward::Xp(roll_amount(150, 200, rng)),
        (ChestRarity::Rare, 2) => temporary(BoostStat::Damage),
        (ChestRarity::Rare, _) => temporary(BoostStat::FireRate),

        (ChestRarity::Legendary, 0) => ChestReward::Money(roll_amount(75, 100, rng)),
        (ChestRarity::Legendary, 1) => ChestReward::Xp(roll_amount(300, 400, rng)),
        (ChestRarity::Legendary, 2) => ChestReward::PermanentBoost {
            stat: BoostStat::Damage,
            amount: 0.1,
        },
        (ChestRarity::Legendary, _) => ChestReward::PermanentBoost {
            stat: BoostStat::Speed,
            amount: 0.05,
        },
    }
}

/// Apply a reward. Returns true if it caused a level-up.
pub fn apply_reward(
    reward: ChestReward,
    player: &mut Player,
    play_ms: u64,
    level: &LevelTuning,
) -> bool {
    match reward {
        ChestReward::Money(amount) => player.money += amount,
        ChestReward::Xp(amount) => return player.add_xp(amount, level),
        ChestReward::Health(amount) => player.heal(amount),
        ChestReward::TemporaryBoost {
            stat,
            amount,
            duration_ms,
        } => player.apply_temporary_boost(stat, amount, play_ms + duration_ms),
        ChestReward::PermanentBoost { stat, amount } => player.apply_permanent_boost(stat, amount),
    }
    false
}

/// Place 1-2 chests at random spots away from the player and each other
pub fn spawn_chests(
    existing: &mut Vec<Chest>,
    player_pos: Vec2,
    tuning: &Tuning,
    rng: &mut dyn RandomSource,
) {
    let cfg = &tuning.chests;
    let count = roll_amount(cfg.min_per_spawn, cfg.max_per_spawn, rng);
    let start = existing.len();
    for _ in 0..count {
        for _ in 0..PLACEMENT_ATTEMPTS {
            let pos = Vec2::new(
                rng.range(0.0, tuning.arena.width),
                rng.range(0.0, tuning.arena.height),
            );
            let clear_of_player = pos.distance(player_pos) >= cfg.min_player_distance;
            let clear_of_batch = existing[start..]
                .iter()
                .all(|c| c.pos.distance(pos) >= cfg.min_spacing);
            if clear_of_player && clear_of_batch {
                let rarity = roll_rarity(cfg, rng);
                existing.push(Chest {
                    pos,
                    rarity,
                    opening_since: None,
                    reward: None,
                });
                break;
            }
        }
    }
    log::debug!("Spawned {} chests", existing.len() - start);
}

/// Chest cadence and opening progress. Returns true if a reward levelled
/// the player up.
pub fn update_chests(
    state: &mut GameState,
    now: u64,
    tuning: &Tuning,
    rng: &mut dyn RandomSource,
) -> bool {
    let cfg = &tuning.chests;
    let play_ms = state.play_ms(now);

    if play_ms >= state.next_chest_at {
        let player_pos = state.store.player.pos;
        spawn_chests(&mut state.store.chests, player_pos, tuning, rng);
        state.chest_interval_ms = ((state.chest_interval_ms as f32 * cfg.interval_decay).round()
            as u64)
            .max(cfg.min_interval_ms);
        state.next_chest_at = play_ms + state.chest_interval_ms;
    }

    let (player_pos, player_radius) = (state.store.player.pos, state.store.player.radius);
    let pickup = (cfg.size + player_radius) / 2.0 + PICKUP_BUFFER;
    let keep_open = cfg.size + player_radius + CANCEL_BUFFER;
    let mut leveled = false;
    let mut i = 0;
    while i < state.store.chests.len() {
        let chest = &mut state.store.chests[i];
        let distance = chest.pos.distance(player_pos);
        let opening = chest.opening_since;
        match opening {
            None => {
                if distance <= pickup {
                    chest.opening_since = Some(play_ms);
                    chest.reward = Some(roll_reward(chest.rarity, rng));
                }
            }
            Some(_) if distance > keep_open => {
                chest.opening_since = None;
                chest.reward = None;
            }
            Some(started) if play_ms.saturating_sub(started) >= cfg.opening_ms => {
                let chest = state.store.chests.remove(i);
                if let Some(reward) = chest.reward {
                    log::info!("Opened {:?} chest: {:?}", chest.rarity, reward);
                    leveled |= apply_reward(reward, &mut state.store.player, play_ms, &tuning.level);
                }
                state.emit(GameEvent::ChestOpened {
                    rarity: chest.rarity,
                });
                continue;
            }
            Some(_) => {}
        }
        i += 1;
    }
    leveled
}
