//! Game state and core simulation types
//!
//! `EntityStore` owns every entity collection; `GameState` wraps it with the
//! wave, shop, and upgrade state machines. Nothing outside `sim` mutates these.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::champion::ChampionId;
use super::chests::{Chest, ChestRarity};
use super::shop::ShopState;
use super::upgrades::{UpgradeChoice, UpgradeCount};
use super::waves::WaveState;
use crate::tuning::{LevelTuning, Tuning};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Champion select, nothing simulated
    #[default]
    Intro,
    /// Short "get ready" message before the first break
    GetReady,
    /// Break between waves (deadline driven)
    Countdown,
    /// Wave in progress
    Playing,
    /// Wave cleared banner, world keeps running
    WaveComplete,
    /// Waiting for an upgrade pick; simulation frozen
    LevelUp,
    /// Player died; terminal until restart
    GameOver,
}

/// Discrete things that happened during a tick, for audio and presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired,
    EnemyHit { pos: Vec2, damage: f32, crit: bool },
    EnemyKilled { pos: Vec2, kind: EnemyKind },
    MoneyDropped { pos: Vec2, amount: u32 },
    PlayerDamaged { amount: f32 },
    LevelUp { level: u32 },
    WaveStarted { wave: u32 },
    WaveCleared { wave: u32 },
    MerchantArrived,
    ChestOpened { rarity: ChestRarity },
    ScreenShake,
    GameOver,
}

/// Stats a boost can affect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostStat {
    Speed,
    Damage,
    FireRate,
}

/// A multiplier bonus that expires at a play-time deadline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedBoost {
    pub amount: f32,
    pub until_play_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveBoosts {
    pub speed: Option<TimedBoost>,
    pub damage: Option<TimedBoost>,
    pub fire_rate: Option<TimedBoost>,
}

impl ActiveBoosts {
    fn slot(&mut self, stat: BoostStat) -> &mut Option<TimedBoost> {
        match stat {
            BoostStat::Speed => &mut self.speed,
            BoostStat::Damage => &mut self.damage,
            BoostStat::FireRate => &mut self.fire_rate,
        }
    }

    fn amount(boost: &Option<TimedBoost>) -> f32 {
        boost.map(|b| b.amount).unwrap_or(0.0)
    }

    /// Drop boosts whose deadline has passed
    pub fn expire(&mut self, play_ms: u64) {
        for stat in [BoostStat::Speed, BoostStat::Damage, BoostStat::FireRate] {
            let slot = self.slot(stat);
            if slot.is_some_and(|b| play_ms >= b.until_play_ms) {
                *slot = None;
            }
        }
    }
}

/// The player avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub champion: ChampionId,
    pub pos: Vec2,
    pub radius: f32,
    /// Move speed stat (pixels per frame = base_speed * multiplier * move_scale)
    pub base_speed: f32,
    pub speed_multiplier: f32,
    pub fire_rate_multiplier: f32,
    pub damage_multiplier: f32,
    pub magnet_multiplier: f32,
    /// Absolute damage per bullet before multipliers
    pub champion_damage: f32,
    /// Absolute attacks per second before multipliers
    pub champion_attack_speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub invulnerable: bool,
    pub invulnerable_until: u64,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub multishot: u32,
    pub crit_chance: f32,
    pub lifesteal: f32,
    /// HP per second once the regen delay has passed
    pub hp_regen_rate: f32,
    pub last_damage_at: Option<u64>,
    pub money: u32,
    pub kill_count: u32,
    /// Auto-targeting shot stacks
    pub hurricane_shots: u32,
    pub bullet_range: Option<f32>,
    pub boosts: ActiveBoosts,
}

impl Player {
    /// Fresh player at the center of the arena with champion baseline stats
    pub fn new(champion: ChampionId, tuning: &Tuning) -> Self {
        let stats = champion.stats();
        Self {
            champion,
            pos: Vec2::new(tuning.arena.width / 2.0, tuning.arena.height / 2.0),
            radius: tuning.player.radius,
            base_speed: stats.move_speed,
            speed_multiplier: 1.0,
            fire_rate_multiplier: 1.0,
            damage_multiplier: 1.0,
            magnet_multiplier: 1.0,
            champion_damage: stats.damage,
            champion_attack_speed: stats.attack_speed,
            health: stats.max_health,
            max_health: stats.max_health,
            invulnerable: false,
            invulnerable_until: 0,
            level: 1,
            xp: 0,
            xp_to_next_level: tuning.level.threshold(1),
            multishot: stats.multishot.max(1),
            crit_chance: stats.crit_chance.clamp(0.0, tuning.player.crit_cap),
            lifesteal: 0.0,
            hp_regen_rate: 0.0,
            last_damage_at: None,
            money: 0,
            kill_count: 0,
            hurricane_shots: 0,
            bullet_range: stats.bullet_range,
            boosts: ActiveBoosts::default(),
        }
    }

    /// Damage per bullet including multipliers and active boosts
    pub fn damage(&self) -> f32 {
        self.champion_damage
            * (self.damage_multiplier + ActiveBoosts::amount(&self.boosts.damage))
    }

    /// Attacks per second including multipliers and active boosts
    pub fn attack_speed(&self) -> f32 {
        self.champion_attack_speed
            * (self.fire_rate_multiplier + ActiveBoosts::amount(&self.boosts.fire_rate))
    }

    /// Milliseconds between shots
    pub fn fire_interval_ms(&self) -> f32 {
        1000.0 / self.attack_speed().max(0.01)
    }

    /// Move speed stat (display value)
    pub fn move_speed(&self) -> f32 {
        (self.base_speed * (self.speed_multiplier + ActiveBoosts::amount(&self.boosts.speed)))
            .max(0.0)
    }

    pub fn magnet_radius(&self, base_radius: f32) -> f32 {
        base_radius * self.magnet_multiplier
    }

    pub fn is_invulnerable(&self, now: u64) -> bool {
        self.invulnerable && now < self.invulnerable_until
    }

    /// Clear the invulnerability flag once its window has passed
    pub fn update_iframes(&mut self, now: u64) {
        if self.invulnerable && now >= self.invulnerable_until {
            self.invulnerable = false;
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount.max(0.0)).min(self.max_health);
    }

    /// Apply damage unless invulnerable. Returns true if the player died.
    pub fn take_damage(&mut self, amount: f32, now: u64, iframe_ms: u64) -> bool {
        if self.is_invulnerable(now) {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        self.invulnerable = true;
        self.invulnerable_until = now + iframe_ms;
        self.last_damage_at = Some(now);
        self.health <= 0.0
    }

    /// Add XP; returns true if this crossed the level threshold
    pub fn add_xp(&mut self, amount: u32, level: &LevelTuning) -> bool {
        self.xp += amount;
        if self.xp >= self.xp_to_next_level {
            self.level += 1;
            self.xp = 0;
            self.xp_to_next_level = level.threshold(self.level);
            return true;
        }
        false
    }

    /// Heal over time once enough time has passed since the last hit
    pub fn regenerate(&mut self, now: u64, dt_ms: f32, delay_ms: u64) {
        if self.hp_regen_rate <= 0.0 || self.health >= self.max_health {
            return;
        }
        let since_hit = self
            .last_damage_at
            .map(|t| now.saturating_sub(t))
            .unwrap_or(u64::MAX);
        if since_hit >= delay_ms {
            self.heal(self.hp_regen_rate * dt_ms / 1000.0);
        }
    }

    pub fn apply_temporary_boost(&mut self, stat: BoostStat, amount: f32, until_play_ms: u64) {
        *self.boosts.slot(stat) = Some(TimedBoost {
            amount,
            until_play_ms,
        });
    }

    pub fn apply_permanent_boost(&mut self, stat: BoostStat, amount: f32) {
        match stat {
            BoostStat::Speed => self.speed_multiplier += amount,
            BoostStat::Damage => self.damage_multiplier += amount,
            BoostStat::FireRate => self.fire_rate_multiplier += amount,
        }
    }

    /// Spend currency if the balance covers it
    pub fn try_spend(&mut self, amount: u32) -> bool {
        if self.money < amount {
            return false;
        }
        self.money -= amount;
        true
    }
}

/// Enemy behaviour tag; only movement/targeting differs between kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Pursues the player directly and deals contact damage
    Chaser,
    /// Holds a distance band and fires projectiles
    Shooter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    /// Contact damage (chaser) or projectile damage (shooter)
    pub damage: f32,
    pub size: f32,
    pub xp_value: u32,
    pub money_value: u32,
    pub hit_flash_until: u64,
    /// Shooter cooldown bookkeeping
    pub last_shot_at: Option<u64>,
    /// Set once the enemy has walked inside the world bounds
    pub entered: bool,
}

impl Enemy {
    pub fn is_flashing(&self, now: u64) -> bool {
        now < self.hit_flash_until
    }

    /// Subtract health and start the hit flash. Returns true if dead.
    pub fn take_damage(&mut self, amount: f32, now: u64, flash_ms: u64) -> bool {
        self.health -= amount;
        self.hit_flash_until = now + flash_ms;
        self.health <= 0.0
    }
}

/// A player bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    /// Whether impact may roll a critical hit
    pub crit: bool,
    pub max_range: Option<f32>,
    pub traveled: f32,
}

/// A shooter projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyProjectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpOrb {
    pub pos: Vec2,
    pub value: u32,
    pub magnetized: bool,
}

/// Owner of every entity collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub projectiles: Vec<EnemyProjectile>,
    pub orbs: Vec<XpOrb>,
    pub chests: Vec<Chest>,
    next_id: u32,
}

impl EntityStore {
    pub fn new(champion: ChampionId, tuning: &Tuning) -> Self {
        Self {
            player: Player::new(champion, tuning),
            enemies: Vec::new(),
            bullets: Vec::new(),
            projectiles: Vec::new(),
            orbs: Vec::new(),
            chests: Vec::new(),
            next_id: 1,
        }
    }

    /// Clear every collection and restore the champion baseline
    pub fn reset_all(&mut self, champion: ChampionId, tuning: &Tuning) {
        *self = Self::new(champion, tuning);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_orb(&mut self, pos: Vec2, value: u32) {
        self.orbs.push(XpOrb {
            pos,
            value,
            magnetized: false,
        });
    }
}

/// Paused-time bookkeeping. Play time excludes every paused interval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PauseClock {
    pub paused: bool,
    pub started_at: u64,
    pub total_ms: u64,
}

impl PauseClock {
    /// Returns false if already paused
    pub fn pause(&mut self, now: u64) -> bool {
        if self.paused {
            return false;
        }
        self.paused = true;
        self.started_at = now;
        true
    }

    /// Returns false if not paused
    pub fn resume(&mut self, now: u64) -> bool {
        if !self.paused {
            return false;
        }
        self.total_ms += now.saturating_sub(self.started_at);
        self.paused = false;
        true
    }

    /// Time spent paused up to `now`, including an ongoing pause
    pub fn paused_ms(&self, now: u64) -> u64 {
        let ongoing = if self.paused {
            now.saturating_sub(self.started_at)
        } else {
            0
        };
        self.total_ms + ongoing
    }
}

/// Complete simulation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Phase to return to when a level-up resolves
    pub resume_phase: GamePhase,
    pub store: EntityStore,
    pub wave: WaveState,
    pub shop: ShopState,
    pub upgrade_count: UpgradeCount,
    pub pending_upgrades: Vec<UpgradeChoice>,
    /// Suggested cost of the next level-up reroll
    pub upgrade_reroll_cost: u32,
    pub pause: PauseClock,
    /// Wall time the first break began (play time origin)
    pub run_started_at: Option<u64>,
    pub get_ready_until: u64,
    pub wave_complete_until: u64,
    pub last_fire_at: Option<u64>,
    pub last_hurricane_at: Option<u64>,
    /// Chest cadence, in play time
    pub next_chest_at: u64,
    pub chest_interval_ms: u64,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(champion: ChampionId, tuning: &Tuning) -> Self {
        Self {
            phase: GamePhase::Intro,
            resume_phase: GamePhase::Playing,
            store: EntityStore::new(champion, tuning),
            wave: WaveState::new(tuning),
            shop: ShopState::new(&tuning.shop),
            upgrade_count: UpgradeCount::default(),
            pending_upgrades: Vec::new(),
            upgrade_reroll_cost: tuning.upgrades.base_reroll_cost,
            pause: PauseClock::default(),
            run_started_at: None,
            get_ready_until: 0,
            wave_complete_until: 0,
            last_fire_at: None,
            last_hurricane_at: None,
            next_chest_at: tuning.chests.initial_interval_ms,
            chest_interval_ms: tuning.chests.initial_interval_ms,
            events: Vec::new(),
        }
    }

    pub fn player(&self) -> &Player {
        &self.store.player
    }

    /// Milliseconds of unpaused play since the first break began
    pub fn play_ms(&self, now: u64) -> u64 {
        match self.run_started_at {
            Some(start) => now
                .saturating_sub(start)
                .saturating_sub(self.pause.paused_ms(now)),
            None => 0,
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(ChampionId::Sascha, &Tuning::default())
    }

    #[test]
    fn test_damage_arms_invulnerability() {
        let mut p = player();
        assert!(!p.take_damage(10.0, 1000, 800));
        assert_eq!(p.health, 65.0);
        // Ignored inside the window
        assert!(!p.take_damage(10.0, 1500, 800));
        assert_eq!(p.health, 65.0);
        p.update_iframes(1800);
        assert!(!p.invulnerable);
        p.take_damage(10.0, 1800, 800);
        assert_eq!(p.health, 55.0);
    }

    #[test]
    fn test_health_clamped() {
        let mut p = player();
        assert!(p.take_damage(500.0, 0, 800));
        assert_eq!(p.health, 0.0);
        p.heal(1000.0);
        assert_eq!(p.health, p.max_health);
    }

    #[test]
    fn test_level_up_resets_xp() {
        let level = LevelTuning::default();
        let mut p = player();
        assert!(!p.add_xp(40, &level));
        assert!(p.add_xp(10, &level));
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 0);
        assert_eq!(p.xp_to_next_level, 100);
    }

    #[test]
    fn test_regen_waits_for_delay() {
        let mut p = player();
        p.hp_regen_rate = 1.0;
        p.take_damage(10.0, 0, 800);
        p.regenerate(1000, 1000.0, 3000);
        assert_eq!(p.health, 65.0);
        p.regenerate(3000, 1000.0, 3000);
        assert_eq!(p.health, 66.0);
    }

    #[test]
    fn test_boosts_add_and_expire() {
        let mut p = player();
        p.apply_temporary_boost(BoostStat::Damage, 1.0, 5000);
        assert_eq!(p.damage(), 2.0);
        p.boosts.expire(4999);
        assert_eq!(p.damage(), 2.0);
        p.boosts.expire(5000);
        assert_eq!(p.damage(), 1.0);
        p.apply_permanent_boost(BoostStat::FireRate, 0.5);
        assert_eq!(p.attack_speed(), 1.5);
    }

    #[test]
    fn test_reset_all_restores_baseline() {
        let tuning = Tuning::default();
        let mut store = EntityStore::new(ChampionId::Sascha, &tuning);
        store.player.money = 99;
        store.spawn_orb(Vec2::ZERO, 10);
        store.reset_all(ChampionId::Byczan, &tuning);
        assert!(store.orbs.is_empty());
        assert_eq!(store.player.money, 0);
        assert_eq!(store.player.multishot, 2);
        assert_eq!(store.player.max_health, 100.0);
    }

    #[test]
    fn test_pause_clock_accumulates() {
        let mut clock = PauseClock::default();
        assert!(clock.pause(100));
        assert!(!clock.pause(150));
        assert_eq!(clock.paused_ms(300), 200);
        assert!(clock.resume(400));
        assert_eq!(clock.paused_ms(1000), 300);
        assert!(!clock.resume(1000));
    }
}
