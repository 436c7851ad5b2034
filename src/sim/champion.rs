//! Playable champions and their absolute base stats

use serde::{Deserialize, Serialize};

/// Base stats a run starts from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChampionStats {
    pub damage: f32,
    /// Attacks per second
    pub attack_speed: f32,
    pub multishot: u32,
    pub crit_chance: f32,
    pub move_speed: f32,
    pub max_health: f32,
    /// Bullet travel limit in world pixels (None = until it leaves the world)
    pub bullet_range: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChampionId {
    /// Balanced all-rounder
    #[default]
    Sascha,
    /// Heavy hitter with a short reach
    Byczan,
}

impl ChampionId {
    pub const ALL: [ChampionId; 2] = [ChampionId::Sascha, ChampionId::Byczan];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChampionId::Sascha => "sascha",
            ChampionId::Byczan => "byczan",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sascha" => Some(ChampionId::Sascha),
            "byczan" => Some(ChampionId::Byczan),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChampionId::Sascha => "Sascha",
            ChampionId::Byczan => "Byczan",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChampionId::Sascha => "Balanced warrior with standard abilities",
            ChampionId::Byczan => "High damage, limited range specialist",
        }
    }

    pub fn stats(&self) -> ChampionStats {
        match self {
            ChampionId::Sascha => ChampionStats {
                damage: 1.0,
                attack_speed: 1.0,
                multishot: 1,
                crit_chance: 0.0,
                move_speed: 1.2,
                max_health: 75.0,
                bullet_range: Some(1200.0),
            },
            ChampionId::Byczan => ChampionStats {
                damage: 1.7,
                attack_speed: 1.0,
                multishot: 2,
                crit_chance: 0.05,
                move_speed: 1.0,
                max_health: 100.0,
                bullet_range: Some(450.0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for id in ChampionId::ALL {
            assert_eq!(ChampionId::parse(id.as_str()), Some(id));
        }
        assert_eq!(ChampionId::parse("BYCZAN"), Some(ChampionId::Byczan));
        assert_eq!(ChampionId::parse("nobody"), None);
    }

    #[test]
    fn test_multishot_at_least_one() {
        for id in ChampionId::ALL {
            assert!(id.stats().multishot >= 1);
        }
    }
}
