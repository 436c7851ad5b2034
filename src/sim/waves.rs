//! Wave scheduler
//!
//! `WaveState` tracks wave composition and the break timer. The break is an
//! absolute deadline, never a decrementing counter: missed ticks cannot skew
//! it, and pausing snapshots the remaining time so a modal left open for an
//! hour neither skips nor doubles a break.
//!
//! Phase flow:
//! `Intro -> GetReady -> Countdown -> Playing -> WaveComplete -> Countdown -> ...`
//! with `LevelUp` interrupting and `GameOver` terminal.

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use super::shop;
use super::state::{GameEvent, GamePhase, GameState, PauseClock};
use super::upgrades;
use crate::tuning::{Tuning, WaveTuning};

/// Enemy stat a wave modifier scales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierStat {
    Speed,
    Damage,
    Health,
    SpawnInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveModifier {
    pub name: String,
    pub stat: ModifierStat,
    pub multiplier: f32,
}

impl WaveModifier {
    pub fn new(name: &str, stat: ModifierStat, multiplier: f32) -> Self {
        Self {
            name: name.to_string(),
            stat,
            multiplier,
        }
    }
}

/// Shooters in a given wave
pub fn shooters_for_wave(wave: u32, tuning: &WaveTuning) -> u32 {
    if wave >= tuning.shooter_start_wave {
        1 + (wave - tuning.shooter_start_wave) / tuning.shooter_every
    } else {
        0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveState {
    pub current_wave: u32,
    pub chasers_to_spawn: u32,
    pub chasers_spawned: u32,
    pub shooters_to_spawn: u32,
    pub shooters_spawned: u32,
    /// Chaser count carried between waves (modifier waves keep it)
    pub base_chaser_count: u32,
    pub wave_active: bool,
    pub show_banner: bool,
    pub banner_until: u64,
    pub modifier: Option<WaveModifier>,
    /// Display only, derived from the deadline
    pub countdown_remaining: u32,
    pub break_active: bool,
    pub break_deadline: Option<u64>,
    /// Remaining break time captured at pause
    pub break_remaining_snapshot: Option<u64>,
    /// Guards against starting the same wave twice
    pub next_wave_pending: bool,
    pub next_chaser_spawn_at: u64,
    pub next_shooter_spawn_at: u64,
    /// Merchant present this break
    pub shop_available: bool,
    /// Pity roll already performed this break
    pub shop_checked: bool,
}

impl WaveState {
    pub fn new(tuning: &Tuning) -> Self {
        let first = tuning.waves.first_wave_chasers;
        Self {
            current_wave: 1,
            chasers_to_spawn: first,
            chasers_spawned: 0,
            shooters_to_spawn: shooters_for_wave(1, &tuning.waves),
            shooters_spawned: 0,
            base_chaser_count: first,
            wave_active: false,
            show_banner: false,
            banner_until: 0,
            modifier: None,
            countdown_remaining: seconds_ceil(tuning.timing.break_ms),
            break_active: false,
            break_deadline: None,
            break_remaining_snapshot: None,
            next_wave_pending: false,
            next_chaser_spawn_at: 0,
            next_shooter_spawn_at: 0,
            shop_available: false,
            shop_checked: false,
        }
    }

    /// Begin a break ending `break_ms` from now
    pub fn start_break(&mut self, now: u64, break_ms: u64) {
        self.break_active = true;
        self.break_deadline = Some(now + break_ms);
        self.break_remaining_snapshot = None;
        self.next_wave_pending = true;
        self.wave_active = false;
        self.countdown_remaining = seconds_ceil(break_ms);
        self.shop_available = false;
        self.shop_checked = false;
    }

    /// Milliseconds left on the break deadline
    pub fn break_remaining_ms(&self, now: u64) -> u64 {
        self.break_deadline
            .map(|deadline| deadline.saturating_sub(now))
            .unwrap_or(0)
    }

    /// Refresh the countdown display; true once the break has run out
    pub fn update_break(&mut self, now: u64) -> bool {
        if !self.break_active || self.break_deadline.is_none() {
            return false;
        }
        let remaining = self.break_remaining_ms(now);
        self.countdown_remaining = seconds_ceil(remaining);
        remaining == 0 && self.next_wave_pending
    }

    /// Snapshot the remaining break time
    pub fn pause_break(&mut self, now: u64) {
        if self.break_active && self.break_deadline.is_some() {
            self.break_remaining_snapshot = Some(self.break_remaining_ms(now));
        }
    }

    /// Re-arm the deadline from the snapshot. Returns true if the break had
    /// already run out, in which case the caller starts the wave instead.
    pub fn resume_break(&mut self, now: u64) -> bool {
        if !self.break_active {
            return false;
        }
        match self.break_remaining_snapshot.take() {
            Some(0) => true,
            Some(remaining) => {
                self.break_deadline = Some(now + remaining);
                self.countdown_remaining = seconds_ceil(remaining);
                false
            }
            None => false,
        }
    }

    /// Single entry point for wave activation. Returns false if no wave was pending.
    pub fn start_next_wave(&mut self, now: u64, banner_ms: u64) -> bool {
        if !self.next_wave_pending {
            return false;
        }
        self.break_active = false;
        self.break_deadline = None;
        self.break_remaining_snapshot = None;
        self.next_wave_pending = false;
        self.shop_available = false;
        self.shop_checked = false;

        self.wave_active = true;
        self.show_banner = true;
        self.banner_until = now + banner_ms;
        self.chasers_spawned = 0;
        self.shooters_spawned = 0;
        self.next_chaser_spawn_at = now;
        self.next_shooter_spawn_at = now;
        true
    }

    /// Advance the wave number and decide its composition: either a random
    /// modifier on the same chaser count, or more chasers.
    pub fn prepare_next_wave(&mut self, tuning: &WaveTuning, rng: &mut dyn RandomSource) {
        self.current_wave += 1;
        self.shooters_to_spawn = shooters_for_wave(self.current_wave, tuning);
        self.shooters_spawned = 0;
        self.chasers_spawned = 0;

        if !tuning.modifiers.is_empty() && rng.chance(tuning.modifier_chance) {
            let modifier = tuning.modifiers[rng.index(tuning.modifiers.len())].clone();
            log::info!("Wave {} modifier: {}", self.current_wave, modifier.name);
            self.modifier = Some(modifier);
        } else {
            self.modifier = None;
            self.base_chaser_count += tuning.chaser_increase;
        }
        self.chasers_to_spawn = self.base_chaser_count;
    }

    pub fn update_banner(&mut self, now: u64) {
        if self.show_banner && now >= self.banner_until {
            self.show_banner = false;
        }
    }

    /// Multiplier the active modifier applies to `stat` (1.0 if none)
    pub fn modifier_factor(&self, stat: ModifierStat) -> f32 {
        match &self.modifier {
            Some(m) if m.stat == stat => m.multiplier,
            _ => 1.0,
        }
    }

    pub fn all_spawned(&self) -> bool {
        self.chasers_spawned >= self.chasers_to_spawn
            && self.shooters_spawned >= self.shooters_to_spawn
    }

    /// True exactly once: when every enemy of the wave has spawned and none
    /// remain alive.
    pub fn check_wave_cleared(&mut self, live_enemies: usize) -> bool {
        if self.wave_active && self.all_spawned() && live_enemies == 0 {
            self.wave_active = false;
            return true;
        }
        false
    }
}

fn seconds_ceil(ms: u64) -> u32 {
    ms.div_ceil(1000) as u32
}

/// Enter the first break after `GetReady` or the next one after `WaveComplete`.
/// Returns true when the tick should go on to simulate the world.
pub fn advance_phase(
    state: &mut GameState,
    now: u64,
    tuning: &Tuning,
    rng: &mut dyn RandomSource,
) -> bool {
    match state.phase {
        GamePhase::Intro | GamePhase::LevelUp | GamePhase::GameOver => return false,
        GamePhase::GetReady => {
            if now < state.get_ready_until {
                return false;
            }
            // First wave is already prepared
            state.phase = GamePhase::Countdown;
            if state.run_started_at.is_none() {
                // Play time starts here; earlier pauses never count against it
                state.run_started_at = Some(now);
                state.pause = PauseClock::default();
            }
            state.wave.start_break(now, tuning.timing.break_ms);
            log::info!("Break before wave {}", state.wave.current_wave);
        }
        GamePhase::WaveComplete => {
            if now >= state.wave_complete_until {
                state.phase = GamePhase::Countdown;
                state.wave.prepare_next_wave(&tuning.waves, rng);
                state.wave.start_break(now, tuning.timing.break_ms);
                log::info!("Break before wave {}", state.wave.current_wave);
            }
        }
        GamePhase::Countdown | GamePhase::Playing => {}
    }

    if state.phase == GamePhase::Countdown {
        if !state.wave.shop_checked {
            state.wave.shop_checked = true;
            let appeared = shop::roll_appearance(
                &mut state.shop,
                state.wave.current_wave,
                &tuning.shop,
                rng,
            );
            state.wave.shop_available = appeared;
            if appeared {
                state.emit(GameEvent::MerchantArrived);
            }
        }

        if state.wave.update_break(now) {
            begin_wave(state, now, tuning);
        }
    }

    true
}

fn begin_wave(state: &mut GameState, now: u64, tuning: &Tuning) {
    if state.wave.start_next_wave(now, tuning.timing.wave_banner_ms) {
        state.phase = GamePhase::Playing;
        if state.shop.is_open {
            shop::close(&mut state.shop, &tuning.shop);
        }
        log::info!(
            "Wave {} started: {} chasers, {} shooters",
            state.wave.current_wave,
            state.wave.chasers_to_spawn,
            state.wave.shooters_to_spawn
        );
        let wave = state.wave.current_wave;
        state.emit(GameEvent::WaveStarted { wave });
    }
}

/// Check the end-of-wave condition after combat
pub fn check_wave_clear(state: &mut GameState, now: u64, tuning: &Tuning) {
    if state.phase != GamePhase::Playing {
        return;
    }
    if state.wave.check_wave_cleared(state.store.enemies.len()) {
        state.phase = GamePhase::WaveComplete;
        state.wave_complete_until = now + tuning.timing.wave_complete_ms;
        let wave = state.wave.current_wave;
        log::info!("Wave {} cleared", wave);
        state.emit(GameEvent::WaveCleared { wave });
    }
}

/// Freeze play time and the break deadline
pub fn pause_game(state: &mut GameState, now: u64) {
    if state.pause.pause(now) {
        state.wave.pause_break(now);
    }
}

/// Unfreeze; starts the pending wave at once if the break ran out while paused.
/// The wave-complete banner deadline is pushed back by the paused time.
pub fn resume_game(state: &mut GameState, now: u64, tuning: &Tuning) {
    let paused_for = now.saturating_sub(state.pause.started_at);
    if !state.pause.resume(now) {
        return;
    }
    if state.phase == GamePhase::WaveComplete {
        state.wave_complete_until += paused_for;
    }
    if state.wave.resume_break(now) && state.phase == GamePhase::Countdown {
        begin_wave(state, now, tuning);
    }
}

/// Interrupt play for an upgrade pick
pub fn begin_level_up(state: &mut GameState, now: u64, tuning: &Tuning, rng: &mut dyn RandomSource) {
    if state.phase == GamePhase::LevelUp || state.phase == GamePhase::GameOver {
        return;
    }
    state.resume_phase = match state.phase {
        GamePhase::Countdown | GamePhase::WaveComplete => state.phase,
        _ => GamePhase::Playing,
    };
    state.phase = GamePhase::LevelUp;
    pause_game(state, now);
    state.pending_upgrades = upgrades::generate_choices(
        state.store.player.crit_chance,
        state.wave.current_wave,
        &tuning.upgrades,
        tuning.player.crit_cap,
        rng,
    );
    state.upgrade_reroll_cost = tuning.upgrades.base_reroll_cost;
    let level = state.store.player.level;
    log::info!("Level up: {}", level);
    state.emit(GameEvent::LevelUp { level });
}

/// Return from a resolved level-up to whatever it interrupted
pub fn end_level_up(state: &mut GameState, now: u64, tuning: &Tuning) {
    if state.phase != GamePhase::LevelUp {
        return;
    }
    state.phase = state.resume_phase;
    state.pending_upgrades.clear();
    resume_game(state, now, tuning);
}
