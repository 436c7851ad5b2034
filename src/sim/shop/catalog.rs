//! Merchant catalog
//!
//! Perks stack forever; items carry their own availability predicate.

use serde::{Deserialize, Serialize};

use crate::sim::state::Player;
use crate::sim::upgrades::UpgradeCount;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Perk,
    Item,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
}

impl ShopRarity {
    /// Relative draw weight (higher = more likely)
    pub fn weight(&self) -> f32 {
        match self {
            ShopRarity::Common => 50.0,
            ShopRarity::Uncommon => 30.0,
            ShopRarity::Rare => 15.0,
            ShopRarity::Epic => 5.0,
        }
    }
}

/// What buying an entry does
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShopEffect {
    /// Attacks per second
    AttackSpeed(f32),
    /// Move speed stat
    MoveSpeed(f32),
    /// Raises max health and heals by the same amount
    MaxHealth(f32),
    /// HP per second
    Regen(f32),
    /// Lifesteal fraction, clamped to the cap
    Lifesteal(f32),
    /// One more auto-targeting shot
    Hurricane,
}

#[derive(Debug, Clone, Copy)]
pub struct ShopEntry {
    pub id: &'static str,
    pub kind: EntryKind,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: ShopRarity,
    pub base_cost: u32,
    pub effect: ShopEffect,
}

impl ShopEntry {
    pub fn is_available(&self, player: &Player, tuning: &Tuning) -> bool {
        match self.effect {
            ShopEffect::Lifesteal(_) => player.lifesteal < tuning.player.lifesteal_cap,
            ShopEffect::Hurricane => player.hurricane_shots < tuning.hurricane.max_stacks,
            _ => true,
        }
    }

    pub fn apply(&self, player: &mut Player, count: &mut UpgradeCount, tuning: &Tuning) {
        match self.effect {
            ShopEffect::AttackSpeed(amount) => {
                player.champion_attack_speed += amount;
                count.attack_speed += 1;
            }
            ShopEffect::MoveSpeed(amount) => {
                player.base_speed += amount;
                count.move_speed += 1;
            }
            ShopEffect::MaxHealth(amount) => {
                player.max_health += amount;
                player.heal(amount);
            }
            ShopEffect::Regen(amount) => player.hp_regen_rate += amount,
            ShopEffect::Lifesteal(amount) => {
                player.lifesteal = (player.lifesteal + amount).min(tuning.player.lifesteal_cap);
            }
            ShopEffect::Hurricane => {
                player.hurricane_shots = (player.hurricane_shots + 1).min(tuning.hurricane.max_stacks);
            }
        }
    }
}

pub static CATALOG: [ShopEntry; 6] = [
    ShopEntry {
        id: "dagger",
        kind: EntryKind::Perk,
        name: "Dagger",
        description: "+20% attack speed",
        rarity: ShopRarity::Common,
        base_cost: 10,
        effect: ShopEffect::AttackSpeed(0.2),
    },
    ShopEntry {
        id: "boots_of_speed",
        kind: EntryKind::Perk,
        name: "Boots of Speed",
        description: "+20% movement speed",
        rarity: ShopRarity::Common,
        base_cost: 10,
        effect: ShopEffect::MoveSpeed(0.2),
    },
    ShopEntry {
        id: "ruby_crystal",
        kind: EntryKind::Item,
        name: "Ruby Crystal",
        description: "+25 max HP and heal +25 HP",
        rarity: ShopRarity::Common,
        base_cost: 9,
        effect: ShopEffect::MaxHealth(25.0),
    },
    ShopEntry {
        id: "rejuvenation_bead",
        kind: EntryKind::Item,
        name: "Rejuvenation Bead",
        description: "+0.2 HP/sec after 3s without damage",
        rarity: ShopRarity::Uncommon,
        base_cost: 12,
        effect: ShopEffect::Regen(0.2),
    },
    ShopEntry {
        id: "vampiric_scepter",
        kind: EntryKind::Item,
        name: "Vampiric Scepter",
        description: "+10% lifesteal (max 50%)",
        rarity: ShopRarity::Uncommon,
        base_cost: 12,
        effect: ShopEffect::Lifesteal(0.10),
    },
    ShopEntry {
        id: "runaans_hurricane",
        kind: EntryKind::Item,
        name: "Runaan's Hurricane",
        description: "Auto-targeting shot at nearby enemy",
        rarity: ShopRarity::Uncommon,
        base_cost: 14,
        effect: ShopEffect::Hurricane,
    },
];

pub fn find(id: &str) -> Option<&'static ShopEntry> {
    CATALOG.iter().find(|e| e.id == id)
}
