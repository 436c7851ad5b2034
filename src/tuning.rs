//! Data-driven game balance
//!
//! Every knob has a shipped default; a JSON file only needs to name the
//! values it overrides. Distances are world pixels, durations milliseconds,
//! and "per frame" speeds are normalized against a 60 Hz frame.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;
use crate::sim::waves::{ModifierStat, WaveModifier};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        // 3x a 1920x1080 viewport
        Self {
            width: 5760.0,
            height: 3240.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Collision radius
    pub radius: f32,
    /// Pixels per frame for one point of move speed
    pub move_scale: f32,
    /// Invulnerability window after taking a hit
    pub iframe_ms: u64,
    /// Time without damage before regeneration kicks in
    pub regen_delay_ms: u64,
    /// Hard cap on lifesteal
    pub lifesteal_cap: f32,
    /// Hard cap on crit chance
    pub crit_cap: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 24.0,
            move_scale: 7.5,
            iframe_ms: 800,
            regen_delay_ms: 3000,
            lifesteal_cap: 0.5,
            crit_cap: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletTuning {
    pub speed: f32,
    /// Hit-box width (axis aligned, centered on the bullet)
    pub width: f32,
    /// Hit-box height
    pub height: f32,
    /// Angle between neighbouring multishot bullets (radians)
    pub spread_step: f32,
    /// Slack beyond the world edge before projectiles are culled
    pub cull_margin: f32,
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            speed: 24.0,
            width: 18.0,
            height: 36.0,
            spread_step: 0.17,
            cull_margin: 10.0,
        }
    }
}

/// Base stats for one enemy type (before wave scaling)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub speed: f32,
    pub health: f32,
    pub damage: f32,
    pub size: f32,
    pub xp_value: u32,
    pub money_value: u32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            speed: 4.2,
            health: 3.0,
            damage: 5.0,
            size: 30.0,
            xp_value: 10,
            money_value: 1,
        }
    }
}

/// Ranged behaviour of shooter enemies
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    pub base: EnemyTuning,
    pub preferred_distance: f32,
    pub distance_threshold: f32,
    pub cooldown_ms: u64,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub max_range: f32,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            base: EnemyTuning {
                speed: 3.36,
                health: 4.5,
                damage: 10.0,
                size: 30.0,
                xp_value: 15,
                money_value: 2,
            },
            preferred_distance: 600.0,
            distance_threshold: 60.0,
            cooldown_ms: 2000,
            projectile_speed: 12.0,
            projectile_radius: 18.0,
            max_range: 1800.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingTuning {
    pub hp_growth: f32,
    pub damage_growth: f32,
    /// No growth before this wave
    pub scaling_floor: u32,
}

impl Default for ScalingTuning {
    fn default() -> Self {
        Self {
            hp_growth: 1.05,
            damage_growth: 1.06,
            scaling_floor: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTuning {
    /// `threshold(level) = base_xp * level`
    pub base_xp: u32,
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self { base_xp: 50 }
    }
}

impl LevelTuning {
    pub fn threshold(&self, level: u32) -> u32 {
        self.base_xp * level
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    pub first_wave_chasers: u32,
    pub chaser_increase: u32,
    pub modifier_chance: f32,
    pub modifiers: Vec<WaveModifier>,
    pub shooter_start_wave: u32,
    /// A shooter is added every this many waves after the start wave
    pub shooter_every: u32,
    pub spawn_interval_ms: u64,
    /// Fraction of overlap resolved per tick by the separation step
    pub separation_strength: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            first_wave_chasers: 5,
            chaser_increase: 4,
            modifier_chance: 0.5,
            modifiers: vec![
                WaveModifier::new("Speed Boost", ModifierStat::Speed, 1.15),
                WaveModifier::new("Damage Boost", ModifierStat::Damage, 1.25),
                WaveModifier::new("HP Boost", ModifierStat::Health, 1.20),
                WaveModifier::new("Rapid Spawn", ModifierStat::SpawnInterval, 0.85),
            ],
            shooter_start_wave: 4,
            shooter_every: 2,
            spawn_interval_ms: 200,
            separation_strength: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    pub get_ready_ms: u64,
    pub break_ms: u64,
    pub wave_banner_ms: u64,
    pub wave_complete_ms: u64,
    pub hit_flash_ms: u64,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            get_ready_ms: 1000,
            break_ms: 5000,
            wave_banner_ms: 1500,
            wave_complete_ms: 2000,
            hit_flash_ms: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    pub money_drop_chance: f32,
    pub scaling_waves: u32,
    pub scaling_multiplier: f32,
    pub min_wave_for_scaling: u32,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            money_drop_chance: 0.3,
            scaling_waves: 4,
            scaling_multiplier: 1.10,
            min_wave_for_scaling: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopTuning {
    pub base_chance: f32,
    pub pity_increment: f32,
    pub guaranteed_after: u32,
    pub min_wave: u32,
    pub purchase_limit: u32,
    pub base_reroll_cost: u32,
    pub reroll_cost_increment: u32,
    pub price_scaling_waves: u32,
    pub price_multiplier: f32,
}

impl Default for ShopTuning {
    fn default() -> Self {
        Self {
            base_chance: 0.25,
            pity_increment: 0.05,
            guaranteed_after: 4,
            min_wave: 2,
            purchase_limit: 1,
            base_reroll_cost: 5,
            reroll_cost_increment: 5,
            price_scaling_waves: 3,
            price_multiplier: 1.15,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeTuning {
    /// Only tier I is offered before this wave
    pub tier_gate_wave: u32,
    pub tier3_chance: f32,
    pub tier2_chance: f32,
    pub base_reroll_cost: u32,
    pub reroll_cost_increment: u32,
    pub attack_speed_step: f32,
    pub move_speed_step: f32,
    pub damage_step: f32,
    pub crit_step: f32,
    /// Fractional magnet radius growth per tier-I pick
    pub magnet_step: f32,
}

impl Default for UpgradeTuning {
    fn default() -> Self {
        Self {
            tier_gate_wave: 4,
            tier3_chance: 0.05,
            tier2_chance: 0.20,
            base_reroll_cost: 3,
            reroll_cost_increment: 3,
            attack_speed_step: 0.2,
            move_speed_step: 0.2,
            damage_step: 0.3,
            crit_step: 0.05,
            magnet_step: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct XpTuning {
    pub magnet_radius: f32,
    pub move_speed: f32,
    pub orb_size: f32,
}

impl Default for XpTuning {
    fn default() -> Self {
        Self {
            magnet_radius: 384.0,
            move_speed: 18.0,
            orb_size: 18.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChestTuning {
    pub initial_interval_ms: u64,
    pub min_interval_ms: u64,
    pub interval_decay: f32,
    pub min_per_spawn: u32,
    pub max_per_spawn: u32,
    pub min_player_distance: f32,
    pub min_spacing: f32,
    pub opening_ms: u64,
    pub size: f32,
    /// Rarity roll thresholds: common, uncommon, rare (legendary takes the rest)
    pub rarity_chances: [f32; 3],
}

impl Default for ChestTuning {
    fn default() -> Self {
        Self {
            initial_interval_ms: 45_000,
            min_interval_ms: 20_000,
            interval_decay: 0.99,
            min_per_spawn: 1,
            max_per_spawn: 2,
            min_player_distance: 50.0,
            min_spacing: 80.0,
            opening_ms: 3000,
            size: 64.0,
            rarity_chances: [0.60, 0.25, 0.12],
        }
    }
}

/// Auto-targeting shots granted by the hurricane shop item
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HurricaneTuning {
    pub interval_ms: u64,
    pub damage_factor: f32,
    pub speed: f32,
    pub max_stacks: u32,
}

impl Default for HurricaneTuning {
    fn default() -> Self {
        Self {
            interval_ms: 667,
            damage_factor: 0.5,
            speed: 18.0,
            max_stacks: 6,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub player: PlayerTuning,
    pub bullet: BulletTuning,
    pub chaser: EnemyTuning,
    pub shooter: ShooterTuning,
    pub scaling: ScalingTuning,
    pub level: LevelTuning,
    pub waves: WaveTuning,
    pub timing: TimingTuning,
    pub economy: EconomyTuning,
    pub shop: ShopTuning,
    pub upgrades: UpgradeTuning,
    pub xp: XpTuning,
    pub chests: ChestTuning,
    pub hurricane: HurricaneTuning,
}

impl Tuning {
    /// Parse and validate a (possibly partial) JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would make downstream math go negative or infinite
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |msg: &str| Err(TuningError::Invalid(msg.to_string()));

        if self.arena.width <= 0.0 || self.arena.height <= 0.0 {
            return invalid("arena dimensions must be positive");
        }
        if self.scaling.hp_growth < 1.0 || self.scaling.damage_growth < 1.0 {
            return invalid("enemy growth rates must be >= 1");
        }
        if self.shop.price_multiplier < 1.0 || self.economy.scaling_multiplier < 1.0 {
            return invalid("price multipliers must be >= 1");
        }
        if self.shop.price_scaling_waves == 0 || self.economy.scaling_waves == 0 {
            return invalid("scaling intervals must be non-zero");
        }
        if self.shop.guaranteed_after == 0 {
            return invalid("shop guarantee must be at least one break");
        }
        if !(0.0..=1.0).contains(&self.player.lifesteal_cap)
            || !(0.0..=1.0).contains(&self.player.crit_cap)
        {
            return invalid("lifesteal and crit caps must be within [0, 1]");
        }
        if self.level.base_xp == 0 {
            return invalid("base xp must be non-zero");
        }
        if self.waves.shooter_every == 0 {
            return invalid("shooter cadence must be non-zero");
        }
        if self.chests.min_per_spawn > self.chests.max_per_spawn {
            return invalid("chest spawn range is inverted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "shop": { "guaranteed_after": 2 } }"#).unwrap();
        assert_eq!(tuning.shop.guaranteed_after, 2);
        assert_eq!(tuning.shop.base_reroll_cost, 5);
        assert_eq!(tuning.level.base_xp, 50);
        assert_eq!(tuning.waves.modifiers.len(), 4);
    }

    #[test]
    fn test_round_trip_default() {
        let json = Tuning::default().to_json().unwrap();
        let parsed = Tuning::from_json(&json).unwrap();
        assert_eq!(parsed.chaser.xp_value, 10);
        assert_eq!(parsed.shooter.cooldown_ms, 2000);
    }

    #[test]
    fn test_rejects_shrinking_prices() {
        let err = Tuning::from_json(r#"{ "shop": { "price_multiplier": 0.9 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_level_threshold_linear() {
        let level = LevelTuning::default();
        assert_eq!(level.threshold(1), 50);
        assert_eq!(level.threshold(3), 150);
    }
}
