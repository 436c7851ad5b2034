//! Engine: the command surface the presentation layer talks to
//!
//! Owns the simulation state exclusively. Callers get read views
//! (`world()`, `snapshot()`) and drained events, never a mutable reference.

use serde::Serialize;

use crate::audio::{AudioManager, AudioSink};
use crate::consts::MAX_FRAME_MS;
use crate::error::{CommandError, ShopError};
use crate::settings::Settings;
use crate::sim::champion::ChampionId;
use crate::sim::clock::{Clock, SystemClock};
use crate::sim::rng::{PcgSource, RandomSource};
use crate::sim::shop;
use crate::sim::state::{GameEvent, GamePhase, GameState};
use crate::sim::tick::{Frame, TickInput, start_run, tick};
use crate::sim::upgrades::{self, UpgradeChoice, UpgradeCount, UpgradeId, UpgradeTier};
use crate::sim::waves;
use crate::tuning::Tuning;

/// Result of a level-up reroll
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeReroll {
    pub success: bool,
    pub new_options: Vec<UpgradeChoice>,
}

/// Read-only HUD fields
#[derive(Debug, Clone, Serialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub champion: ChampionId,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub wave: u32,
    pub money: u32,
    pub kill_count: u32,
    pub damage: f32,
    pub attack_speed: f32,
    pub move_speed: f32,
    pub multishot: u32,
    pub crit_chance: f32,
    pub lifesteal: f32,
    pub hp_regen_rate: f32,
    pub hurricane_shots: u32,
    pub upgrade_count: UpgradeCount,
    pub countdown_remaining: u32,
    pub show_banner: bool,
    pub modifier: Option<String>,
    /// Unpaused play time in milliseconds
    pub survival_ms: u64,
    pub paused: bool,
    pub shop_available: bool,
    pub shop_open: bool,
    pub shop_reroll_cost: u32,
    pub upgrade_reroll_cost: u32,
}

pub struct Engine {
    state: GameState,
    tuning: Tuning,
    settings: Settings,
    rng: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
    audio: AudioManager,
    input: TickInput,
    events: Vec<GameEvent>,
}

impl Engine {
    pub fn new(
        tuning: Tuning,
        settings: Settings,
        rng: Box<dyn RandomSource>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let state = GameState::new(ChampionId::default(), &tuning);
        Self {
            state,
            tuning,
            settings,
            rng,
            clock,
            audio: AudioManager::default(),
            input: TickInput::default(),
            events: Vec::new(),
        }
    }

    /// Default balance, wall clock, seeded PCG
    pub fn seeded(seed: u64) -> Self {
        Self::new(
            Tuning::default(),
            Settings::default(),
            Box::new(PcgSource::new(seed)),
            Box::new(SystemClock::new()),
        )
    }

    pub fn with_audio(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio = AudioManager::new(sink);
        self
    }

    // === Lifecycle ===

    /// Leave the intro and begin a run
    pub fn start(&mut self) {
        if self.state.phase != GamePhase::Intro {
            log::debug!("start ignored in {:?}", self.state.phase);
            return;
        }
        let now = self.clock.now_ms();
        start_run(&mut self.state, now, &self.tuning);
    }

    /// Manual pause; freezes play time and the break deadline
    pub fn pause(&mut self) {
        match self.state.phase {
            GamePhase::Countdown | GamePhase::Playing | GamePhase::WaveComplete => {
                let now = self.clock.now_ms();
                waves::pause_game(&mut self.state, now);
            }
            _ => log::debug!("pause ignored in {:?}", self.state.phase),
        }
    }

    /// Undo a manual pause. Level-ups and an open shop resolve their own pause.
    pub fn resume(&mut self) {
        if self.state.phase == GamePhase::LevelUp || self.state.shop.is_open {
            log::debug!("resume ignored: modal open");
            return;
        }
        let now = self.clock.now_ms();
        waves::resume_game(&mut self.state, now, &self.tuning);
        self.flush_events();
    }

    /// Fresh run with the current champion
    pub fn restart(&mut self) {
        let champion = self.state.store.player.champion;
        self.state = GameState::new(champion, &self.tuning);
        self.input = TickInput::default();
        let now = self.clock.now_ms();
        start_run(&mut self.state, now, &self.tuning);
    }

    /// Pick a champion; only before a run or after it ended
    pub fn select_champion(&mut self, champion: ChampionId) -> bool {
        match self.state.phase {
            GamePhase::Intro | GamePhase::GameOver => {
                self.state.store.reset_all(champion, &self.tuning);
                true
            }
            _ => false,
        }
    }

    // === Per-frame ===

    pub fn set_input(&mut self, input: TickInput) {
        self.input = input;
    }

    /// Advance one rendered frame. `delta_ms` is clamped to avoid a spiral
    /// of death after a hitch.
    pub fn update(&mut self, delta_ms: f32) {
        let dt = delta_ms.clamp(0.0, MAX_FRAME_MS);
        let mut frame = Frame::new(self.clock.as_ref(), dt, &self.tuning, self.rng.as_mut());
        tick(&mut self.state, &self.input, &mut frame);
        self.flush_events();
    }

    // === Level-up ===

    /// Resolve the pending level-up with one of the offered choices
    /// (stat id and tier 1-3)
    pub fn apply_upgrade(&mut self, id: &str, tier: u8) -> Result<(), CommandError> {
        if self.state.phase != GamePhase::LevelUp {
            return Err(CommandError::NoPendingLevelUp);
        }
        let Some(id) = UpgradeId::parse(id) else {
            log::warn!("Ignoring unknown upgrade id `{}`", id);
            return Err(CommandError::UnknownUpgrade(id.to_string()));
        };
        let tier = UpgradeTier::from_level(tier).ok_or(CommandError::InvalidTier(tier))?;
        let choice = UpgradeChoice { id, tier };
        if !self.state.pending_upgrades.contains(&choice) {
            log::debug!("Upgrade {} was not offered", choice.title());
            return Err(CommandError::NotOffered(choice.title()));
        }

        upgrades::apply_upgrade(
            &mut self.state.store.player,
            &mut self.state.upgrade_count,
            choice,
            &self.tuning,
        );
        let now = self.clock.now_ms();
        waves::end_level_up(&mut self.state, now, &self.tuning);
        self.flush_events();
        Ok(())
    }

    /// Pay `cost` for a fresh set of level-up options
    pub fn reroll_upgrades(&mut self, cost: u32) -> UpgradeReroll {
        match self.try_reroll_upgrades(cost) {
            Ok(options) => UpgradeReroll {
                success: true,
                new_options: options,
            },
            Err(e) => {
                log::debug!("Upgrade reroll rejected: {}", e);
                UpgradeReroll {
                    success: false,
                    new_options: Vec::new(),
                }
            }
        }
    }

    fn try_reroll_upgrades(&mut self, cost: u32) -> Result<Vec<UpgradeChoice>, CommandError> {
        if self.state.phase != GamePhase::LevelUp {
            return Err(CommandError::NoPendingLevelUp);
        }
        let player = &mut self.state.store.player;
        if !player.try_spend(cost) {
            return Err(CommandError::InsufficientFunds {
                needed: cost,
                available: player.money,
            });
        }
        let options = upgrades::generate_choices(
            player.crit_chance,
            self.state.wave.current_wave,
            &self.tuning.upgrades,
            self.tuning.player.crit_cap,
            self.rng.as_mut(),
        );
        self.state.pending_upgrades = options.clone();
        self.state.upgrade_reroll_cost += self.tuning.upgrades.reroll_cost_increment;
        Ok(options)
    }

    // === Shop ===

    /// Open the merchant's shop during a break; pauses the break timer
    pub fn open_shop(&mut self) -> bool {
        let result = self.try_open_shop();
        if let Err(e) = &result {
            log::debug!("Shop open rejected: {}", e);
        }
        result.is_ok()
    }

    fn try_open_shop(&mut self) -> Result<(), ShopError> {
        if self.state.phase != GamePhase::Countdown || self.state.pause.paused {
            return Err(ShopError::NotAvailable);
        }
        shop::open_visit(&mut self.state, &self.tuning, self.rng.as_mut())?;
        let now = self.clock.now_ms();
        waves::pause_game(&mut self.state, now);
        Ok(())
    }

    pub fn close_shop(&mut self) {
        if !self.state.shop.is_open {
            return;
        }
        shop::close(&mut self.state.shop, &self.tuning.shop);
        let now = self.clock.now_ms();
        waves::resume_game(&mut self.state, now, &self.tuning);
        self.flush_events();
    }

    pub fn purchase(&mut self, entry_id: &str) -> bool {
        match shop::purchase(&mut self.state, entry_id, &self.tuning) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Purchase of `{}` rejected: {}", entry_id, e);
                false
            }
        }
    }

    pub fn reroll_shop(&mut self) -> bool {
        match shop::reroll(&mut self.state, &self.tuning, self.rng.as_mut()) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Shop reroll rejected: {}", e);
                false
            }
        }
    }

    // === Read views ===

    pub fn state(&self) -> GamePhase {
        self.state.phase
    }

    pub fn world(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn pending_upgrades(&self) -> &[UpgradeChoice] {
        &self.state.pending_upgrades
    }

    pub fn snapshot(&self) -> HudSnapshot {
        let now = self.clock.now_ms();
        let s = &self.state;
        let p = &s.store.player;
        HudSnapshot {
            phase: s.phase,
            champion: p.champion,
            health: p.health,
            max_health: p.max_health,
            level: p.level,
            xp: p.xp,
            xp_to_next_level: p.xp_to_next_level,
            wave: s.wave.current_wave,
            money: p.money,
            kill_count: p.kill_count,
            damage: p.damage(),
            attack_speed: p.attack_speed(),
            move_speed: p.move_speed(),
            multishot: p.multishot,
            crit_chance: p.crit_chance,
            lifesteal: p.lifesteal,
            hp_regen_rate: p.hp_regen_rate,
            hurricane_shots: p.hurricane_shots,
            upgrade_count: s.upgrade_count.clone(),
            countdown_remaining: s.wave.countdown_remaining,
            show_banner: s.wave.show_banner,
            modifier: s.wave.modifier.as_ref().map(|m| m.name.clone()),
            survival_ms: s.play_ms(now),
            paused: s.pause.paused,
            shop_available: s.wave.shop_available,
            shop_open: s.shop.is_open,
            shop_reroll_cost: s.shop.reroll_cost,
            upgrade_reroll_cost: s.upgrade_reroll_cost,
        }
    }

    /// Events since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Move simulation events to the outbox: cosmetic gating, then audio
    fn flush_events(&mut self) {
        for event in self.state.events.drain(..) {
            if event == GameEvent::ScreenShake && !self.settings.effective_screen_shake() {
                continue;
            }
            self.audio.dispatch(&event, &self.settings);
            self.events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::ManualClock;
    use crate::sim::rng::ScriptedSource;
    use glam::Vec2;

    fn engine(clock: &ManualClock, rng: ScriptedSource) -> Engine {
        Engine::new(
            Tuning::default(),
            Settings::default(),
            Box::new(rng),
            Box::new(clock.clone()),
        )
    }

    /// Advance the clock and tick once
    fn step(engine: &mut Engine, clock: &ManualClock, ms: u64) {
        clock.advance(ms);
        engine.update(ms as f32);
    }

    /// Start and run until the first break begins
    fn into_first_break(engine: &mut Engine, clock: &ManualClock) {
        engine.start();
        step(engine, clock, 1000);
        assert_eq!(engine.state(), GamePhase::Countdown);
    }

    fn force_level_up(engine: &mut Engine) {
        let now = engine.clock.now_ms();
        engine.state.phase = GamePhase::Playing;
        waves::begin_level_up(&mut engine.state, now, &engine.tuning, engine.rng.as_mut());
    }

    #[test]
    fn test_start_only_from_intro() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock, ScriptedSource::constant(0.9));
        engine.start();
        assert_eq!(engine.state(), GamePhase::GetReady);
        engine.start();
        assert_eq!(engine.state(), GamePhase::GetReady);
    }

    #[test]
    fn test_manual_pause_freezes_break() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock, ScriptedSource::constant(0.9));
        into_first_break(&mut engine, &clock);
        step(&mut engine, &clock, 2000);
        engine.pause();
        // An hour passes with the pause menu open
        for _ in 0..60 {
            step(&mut engine, &clock, 60_000);
        }
        assert_eq!(engine.state(), GamePhase::Countdown);
        engine.resume();
        assert_eq!(engine.world().wave.break_remaining_ms(clock.now_ms()), 3000);
        step(&mut engine, &clock, 3000);
        assert_eq!(engine.state(), GamePhase::Playing);
        assert_eq!(engine.snapshot().wave, 1);
        assert_eq!(engine.snapshot().survival_ms, 5000);
    }

    #[test]
    fn test_pause_ignored_before_first_break() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock, ScriptedSource::constant(0.9));
        engine.start();
        engine.pause();
        assert!(!engine.world().pause.paused);
        clock.advance(10_000);
        engine.resume();

        step(&mut engine, &clock, 16);
        assert_eq!(engine.state(), GamePhase::Countdown);
        step(&mut engine, &clock, 4999);
        assert_eq!(engine.state(), GamePhase::Countdown);
        step(&mut engine, &clock, 1);
        assert_eq!(engine.state(), GamePhase::Playing);
        assert_eq!(engine.snapshot().survival_ms, 5000);
    }

    #[test]
    fn test_seeded_engine_starts_in_intro() {
        let mut engine = Engine::seeded(7);
        assert_eq!(engine.state(), GamePhase::Intro);
        engine.start();
        assert_eq!(engine.state(), GamePhase::GetReady);
    }

    #[test]
    fn test_large_delta_clamped() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock, ScriptedSource::constant(0.9));
        into_first_break(&mut engine, &clock);
        engine.set_input(TickInput {
            movement: Vec2::X,
            aim: None,
        });
        let start = engine.world().store.player.pos.x;
        clock.advance(10);
        engine.update(5000.0);
        let moved = engine.world().store.player.pos.x - start;
        // 100ms worth: 6 frames of 9px
        assert!((moved - 54.0).abs() < 1e-2);
    }

    #[test]
    fn test_apply_upgrade_resolves_level_up() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock, ScriptedSource::constant(0.9));
        into_first_break(&mut engine, &clock);
        engine.state.phase = GamePhase::Playing;
        force_level_up(&mut engine);
        assert_eq!(engine.state(), GamePhase::LevelUp);

        // Resume is refused while the pick is pending
        engine.resume();
        assert!(engine.world().pause.paused);

        assert_eq!(
            engine.apply_upgrade("laser", 1),
            Err(CommandError::UnknownUpgrade("laser".to_string()))
        );
        assert_eq!(engine.state(), GamePhase::LevelUp);
        assert_eq!(
            engine.apply_upgrade("damage", 4),
            Err(CommandError::InvalidTier(4))
        );

        engine.state.pending_upgrades = vec![UpgradeChoice {
            id: UpgradeId::Damage,
            tier: UpgradeTier::II,
        }];
        assert_eq!(engine.apply_upgrade("damage", 2), Ok(()));
        assert_eq!(engine.state(), GamePhase::Playing);
        assert!(!engine.world().pause.paused);
        assert_eq!(engine.snapshot().upgrade_count.damage, 1);
        assert!((engine.snapshot().damage - 1.45).abs() < 1e-5);
        assert_eq!(
            engine.apply_upgrade("damage", 1),
            Err(CommandError::NoPendingLevelUp)
        );
    }

    #[test]
    fn test_apply_upgrade_rejects_unoffered_choice() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock, ScriptedSource::constant(0.9));
        into_first_break(&mut engine, &clock);
        force_level_up(&mut engine);
        engine.state.pending_upgrades = vec![
            UpgradeChoice {
                id: UpgradeId::Multishot,
                tier: UpgradeTier::I,
            },
            UpgradeChoice {
                id: UpgradeId::AttackSpeed,
                tier: UpgradeTier::I,
            },
            UpgradeChoice {
                id: UpgradeId::Magnet,
                tier: UpgradeTier::I,
            },
        ];
        let damage = engine.snapshot().damage;

        assert!(matches!(
            engine.apply_upgrade("damage", 3),
            Err(CommandError::NotOffered(_))
        ));
        // Right stat, wrong tier
        assert!(matches!(
            engine.apply_upgrade("magnet", 2),
            Err(CommandError::NotOffered(_))
        ));
        assert_eq!(engine.state(), GamePhase::LevelUp);
        assert_eq!(engine.world().pending_upgrades.len(), 3);
        assert_eq!(engine.snapshot().damage, damage);
        assert_eq!(engine.snapshot().upgrade_count.damage, 0);

        assert_eq!(engine.apply_upgrade("magnet", 1), Ok(()));
        assert_eq!(engine.state(), GamePhase::Playing);
    }

    #[test]
    fn test_reroll_upgrades_charges_cost() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock, ScriptedSource::new(vec![0.3, 0.7, 0.1, 0.9]));
        into_first_break(&mut engine, &clock);
        force_level_up(&mut engine);
        engine.state.store.player.money = 4;

        let reroll = engine.reroll_upgrades(3);
        assert!(reroll.success);
        assert_eq!(reroll.new_options.len(), 3);
        assert_eq!(engine.snapshot().money, 1);
        assert_eq!(engine.snapshot().upgrade_reroll_cost, 6);

        let broke = engine.reroll_upgrades(6);
        assert!(!broke.success);
        assert!(broke.new_options.is_empty());
        assert_eq!(engine.snapshot().money, 1);
    }

    #[test]
    fn test_shop_visit_pauses_break() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock, ScriptedSource::constant(0.9));
        into_first_break(&mut engine, &clock);
        assert!(!engine.open_shop());

        engine.state.wave.shop_available = true;
        engine.state.store.player.money = 50;
        assert!(engine.open_shop());
        assert!(engine.snapshot().shop_open);
        assert!(!engine.open_shop());

        // Break cannot run out while shopping
        step(&mut engine, &clock, 60_000);
        assert_eq!(engine.state(), GamePhase::Countdown);
        engine.resume();
        assert!(engine.snapshot().shop_open);

        assert!(engine.reroll_shop());
        assert_eq!(engine.snapshot().money, 45);
        assert_eq!(engine.snapshot().shop_reroll_cost, 10);
        let id = engine.world().shop.offer[0].id.clone();
        assert!(engine.purchase(&id));
        assert!(!engine.purchase(&id));

        engine.close_shop();
        assert!(!engine.world().pause.paused);
        assert_eq!(engine.snapshot().shop_reroll_cost, 5);
        // Full break still left
        step(&mut engine, &clock, 4999);
        assert_eq!(engine.state(), GamePhase::Countdown);
        step(&mut engine, &clock, 1);
        assert_eq!(engine.state(), GamePhase::Playing);
    }

    #[test]
    fn test_screen_shake_gated_by_settings() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock, ScriptedSource::constant(0.9));
        engine.set_settings(Settings {
            reduce_motion: true,
            ..Default::default()
        });
        engine.state.emit(GameEvent::ScreenShake);
        engine.state.emit(GameEvent::ShotFired);
        engine.flush_events();
        assert_eq!(engine.drain_events(), vec![GameEvent::ShotFired]);
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_restart_after_game_over() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock, ScriptedSource::constant(0.9));
        into_first_break(&mut engine, &clock);
        engine.state.phase = GamePhase::GameOver;
        engine.state.store.player.money = 77;

        assert!(engine.select_champion(ChampionId::Byczan));
        engine.restart();
        let hud = engine.snapshot();
        assert_eq!(hud.phase, GamePhase::GetReady);
        assert_eq!(hud.champion, ChampionId::Byczan);
        assert_eq!(hud.money, 0);
        assert_eq!(hud.wave, 1);
        assert_eq!(hud.max_health, 100.0);
        assert!(!engine.select_champion(ChampionId::Sascha));
    }
}
