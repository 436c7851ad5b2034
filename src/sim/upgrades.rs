//! Level-up upgrades
//!
//! Three distinct stats are offered per level-up, each with a tier that
//! scales its base increment.

use serde::{Deserialize, Serialize};

use super::rng::{RandomSource, shuffle};
use super::state::Player;
use crate::consts::UPGRADE_CHOICES;
use crate::tuning::{Tuning, UpgradeTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeId {
    Multishot,
    AttackSpeed,
    Magnet,
    MoveSpeed,
    Damage,
    CritChance,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 6] = [
        UpgradeId::Multishot,
        UpgradeId::AttackSpeed,
        UpgradeId::Magnet,
        UpgradeId::MoveSpeed,
        UpgradeId::Damage,
        UpgradeId::CritChance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeId::Multishot => "multishot",
            UpgradeId::AttackSpeed => "attack_speed",
            UpgradeId::Magnet => "magnet",
            UpgradeId::MoveSpeed => "move_speed",
            UpgradeId::Damage => "damage",
            UpgradeId::CritChance => "crit_chance",
        }
    }

    /// Accepts both `attack_speed` and `attackSpeed` spellings
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "multishot" => Some(UpgradeId::Multishot),
            "attackspeed" => Some(UpgradeId::AttackSpeed),
            "magnet" => Some(UpgradeId::Magnet),
            "movespeed" => Some(UpgradeId::MoveSpeed),
            "damage" => Some(UpgradeId::Damage),
            "critchance" => Some(UpgradeId::CritChance),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UpgradeId::Multishot => "Multishot",
            UpgradeId::AttackSpeed => "Attack Speed",
            UpgradeId::Magnet => "Magnet",
            UpgradeId::MoveSpeed => "Move Speed",
            UpgradeId::Damage => "Damage",
            UpgradeId::CritChance => "Crit Chance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeTier {
    I,
    II,
    III,
}

impl UpgradeTier {
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(UpgradeTier::I),
            2 => Some(UpgradeTier::II),
            3 => Some(UpgradeTier::III),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            UpgradeTier::I => 1,
            UpgradeTier::II => 2,
            UpgradeTier::III => 3,
        }
    }

    pub fn multiplier(&self) -> f32 {
        match self {
            UpgradeTier::I => 1.0,
            UpgradeTier::II => 1.5,
            UpgradeTier::III => 2.0,
        }
    }

    pub fn numeral(&self) -> &'static str {
        match self {
            UpgradeTier::I => "I",
            UpgradeTier::II => "II",
            UpgradeTier::III => "III",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeChoice {
    pub id: UpgradeId,
    pub tier: UpgradeTier,
}

impl UpgradeChoice {
    /// Card title, e.g. "Damage II"
    pub fn title(&self) -> String {
        format!("{} {}", self.id.name(), self.tier.numeral())
    }
}

/// Picks per stat, for display and eligibility
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCount {
    pub multishot: u32,
    pub attack_speed: u32,
    pub magnet: u32,
    pub move_speed: u32,
    pub damage: u32,
    pub crit_chance: u32,
}

/// Tier for one offered card. Always tier I before the gate wave.
pub fn roll_tier(wave: u32, tuning: &UpgradeTuning, rng: &mut dyn RandomSource) -> UpgradeTier {
    if wave < tuning.tier_gate_wave {
        return UpgradeTier::I;
    }
    let roll = rng.unit();
    if roll < tuning.tier3_chance {
        UpgradeTier::III
    } else if roll < tuning.tier3_chance + tuning.tier2_chance {
        UpgradeTier::II
    } else {
        UpgradeTier::I
    }
}

/// Offer distinct stats in random order. Crit chance is left out once capped.
pub fn generate_choices(
    crit_chance: f32,
    wave: u32,
    tuning: &UpgradeTuning,
    crit_cap: f32,
    rng: &mut dyn RandomSource,
) -> Vec<UpgradeChoice> {
    let mut pool: Vec<UpgradeId> = UpgradeId::ALL
        .into_iter()
        .filter(|id| *id != UpgradeId::CritChance || crit_chance < crit_cap)
        .collect();
    shuffle(&mut pool, rng);
    pool.into_iter()
        .take(UPGRADE_CHOICES)
        .map(|id| UpgradeChoice {
            id,
            tier: roll_tier(wave, tuning, rng),
        })
        .collect()
}

/// Apply a picked upgrade to the player and bump its counter
pub fn apply_upgrade(
    player: &mut Player,
    count: &mut UpgradeCount,
    choice: UpgradeChoice,
    tuning: &Tuning,
) {
    let steps = &tuning.upgrades;
    let mult = choice.tier.multiplier();
    match choice.id {
        UpgradeId::Multishot => {
            let extra = mult.floor() as u32;
            player.multishot += extra;
            count.multishot += extra;
        }
        UpgradeId::AttackSpeed => {
            player.champion_attack_speed += steps.attack_speed_step * mult;
            count.attack_speed += 1;
        }
        UpgradeId::Magnet => {
            player.magnet_multiplier *= 1.0 + steps.magnet_step * mult;
            count.magnet += 1;
        }
        UpgradeId::MoveSpeed => {
            player.base_speed += steps.move_speed_step * mult;
            count.move_speed += 1;
        }
        UpgradeId::Damage => {
            player.champion_damage += steps.damage_step * mult;
            count.damage += 1;
        }
        UpgradeId::CritChance => {
            player.crit_chance =
                (player.crit_chance + steps.crit_step * mult).min(tuning.player.crit_cap);
            count.crit_chance += 1;
        }
    }
    log::info!("Upgrade applied: {}", choice.title());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::champion::ChampionId;
    use crate::sim::rng::{PcgSource, ScriptedSource};

    #[test]
    fn test_parse_spellings() {
        assert_eq!(UpgradeId::parse("attackSpeed"), Some(UpgradeId::AttackSpeed));
        assert_eq!(UpgradeId::parse("attack_speed"), Some(UpgradeId::AttackSpeed));
        assert_eq!(UpgradeId::parse("critChance"), Some(UpgradeId::CritChance));
        assert_eq!(UpgradeId::parse("laser"), None);
        for id in UpgradeId::ALL {
            assert_eq!(UpgradeId::parse(id.as_str()), Some(id));
        }
    }

    #[test]
    fn test_tier_gated_by_wave() {
        let tuning = UpgradeTuning::default();
        let mut rng = ScriptedSource::constant(0.0);
        assert_eq!(roll_tier(3, &tuning, &mut rng), UpgradeTier::I);
        assert_eq!(roll_tier(4, &tuning, &mut rng), UpgradeTier::III);
        assert_eq!(
            roll_tier(4, &tuning, &mut ScriptedSource::constant(0.1)),
            UpgradeTier::II
        );
        assert_eq!(
            roll_tier(4, &tuning, &mut ScriptedSource::constant(0.5)),
            UpgradeTier::I
        );
    }

    #[test]
    fn test_choices_distinct() {
        let tuning = UpgradeTuning::default();
        let mut rng = PcgSource::new(11);
        for _ in 0..50 {
            let choices = generate_choices(0.0, 5, &tuning, 1.0, &mut rng);
            assert_eq!(choices.len(), 3);
            assert_ne!(choices[0].id, choices[1].id);
            assert_ne!(choices[1].id, choices[2].id);
            assert_ne!(choices[0].id, choices[2].id);
        }
    }

    #[test]
    fn test_crit_excluded_at_cap() {
        let tuning = UpgradeTuning::default();
        let mut rng = PcgSource::new(5);
        for _ in 0..50 {
            let choices = generate_choices(1.0, 5, &tuning, 1.0, &mut rng);
            assert!(choices.iter().all(|c| c.id != UpgradeId::CritChance));
        }
    }

    #[test]
    fn test_apply_scales_with_tier() {
        let tuning = Tuning::default();
        let mut player = Player::new(ChampionId::Sascha, &tuning);
        let mut count = UpgradeCount::default();

        apply_upgrade(
            &mut player,
            &mut count,
            UpgradeChoice {
                id: UpgradeId::AttackSpeed,
                tier: UpgradeTier::III,
            },
            &tuning,
        );
        assert!((player.champion_attack_speed - 1.4).abs() < 1e-6);
        assert_eq!(count.attack_speed, 1);

        apply_upgrade(
            &mut player,
            &mut count,
            UpgradeChoice {
                id: UpgradeId::Multishot,
                tier: UpgradeTier::II,
            },
            &tuning,
        );
        assert_eq!(player.multishot, 2);
        assert_eq!(count.multishot, 1);
    }

    #[test]
    fn test_crit_capped() {
        let tuning = Tuning::default();
        let mut player = Player::new(ChampionId::Sascha, &tuning);
        player.crit_chance = 0.98;
        let mut count = UpgradeCount::default();
        apply_upgrade(
            &mut player,
            &mut count,
            UpgradeChoice {
                id: UpgradeId::CritChance,
                tier: UpgradeTier::III,
            },
            &tuning,
        );
        assert_eq!(player.crit_chance, 1.0);
    }
}
