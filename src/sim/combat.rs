//! Combat resolution
//!
//! Bullet-vs-enemy hits, kill payouts, and damage to the player from contact
//! and shooter projectiles.

use glam::Vec2;

use super::collision::{circles_overlap, rect_circle_overlap};
use super::rng::RandomSource;
use super::state::{GameEvent, GameState};
use crate::tuning::{EconomyTuning, Tuning};

/// Damage multiplier of a critical hit
pub const CRIT_MULTIPLIER: f32 = 2.0;

/// Currency dropped by a kill, growing every `scaling_waves` waves
pub fn money_drop(base: u32, wave: u32, economy: &EconomyTuning) -> u32 {
    let intervals = wave.saturating_sub(economy.min_wave_for_scaling) / economy.scaling_waves;
    (base as f32 * economy.scaling_multiplier.powi(intervals as i32)).ceil() as u32
}

/// Heal granted by one hit; a pure function of the hit so repeated hits heal the same
#[inline]
pub fn lifesteal_heal(damage: f32, lifesteal: f32) -> f32 {
    damage * lifesteal
}

/// Resolve every bullet against the first enemy it overlaps.
/// Bullets that hit are consumed whether or not the enemy dies.
pub fn resolve_bullet_hits(
    state: &mut GameState,
    now: u64,
    tuning: &Tuning,
    rng: &mut dyn RandomSource,
) {
    let hitbox = Vec2::new(tuning.bullet.width, tuning.bullet.height);
    let mut i = 0;
    while i < state.store.bullets.len() {
        let bullet = &state.store.bullets[i];
        let target = state
            .store
            .enemies
            .iter()
            .position(|e| rect_circle_overlap(bullet.pos, hitbox, e.pos, e.size));
        let Some(j) = target else {
            i += 1;
            continue;
        };
        let bullet = state.store.bullets.remove(i);

        let player = &mut state.store.player;
        let crit = bullet.crit && rng.chance(player.crit_chance);
        let damage = if crit {
            bullet.damage * CRIT_MULTIPLIER
        } else {
            bullet.damage
        };
        if player.lifesteal > 0.0 {
            player.heal(lifesteal_heal(damage, player.lifesteal));
        }

        let enemy = &mut state.store.enemies[j];
        let pos = enemy.pos;
        let died = enemy.take_damage(damage, now, tuning.timing.hit_flash_ms);
        state.emit(GameEvent::EnemyHit { pos, damage, crit });

        if died {
            kill_enemy(state, j, tuning, rng);
        }
    }
}

/// Remove a dead enemy and pay out its rewards
fn kill_enemy(state: &mut GameState, index: usize, tuning: &Tuning, rng: &mut dyn RandomSource) {
    let enemy = state.store.enemies.remove(index);
    state.store.player.kill_count += 1;
    state.store.spawn_orb(enemy.pos, enemy.xp_value);

    if rng.chance(tuning.economy.money_drop_chance) {
        let amount = money_drop(enemy.money_value, state.wave.current_wave, &tuning.economy);
        state.store.player.money += amount;
        state.emit(GameEvent::MoneyDropped {
            pos: enemy.pos,
            amount,
        });
    }
    state.emit(GameEvent::EnemyKilled {
        pos: enemy.pos,
        kind: enemy.kind,
    });
}

/// Contact damage from enemies touching the player. At most one hit per
/// tick. Returns true if the player died.
pub fn resolve_enemy_contact(state: &mut GameState, now: u64, tuning: &Tuning) -> bool {
    let player = &state.store.player;
    if player.is_invulnerable(now) {
        return false;
    }
    let hit = state
        .store
        .enemies
        .iter()
        .find(|e| circles_overlap(player.pos, player.radius, e.pos, e.size))
        .map(|e| e.damage);
    match hit {
        Some(damage) => damage_player(state, damage, now, tuning),
        None => false,
    }
}

/// Shooter projectiles hitting the player. Projectiles that connect are
/// consumed. Returns true if the player died.
pub fn resolve_projectile_hits(state: &mut GameState, now: u64, tuning: &Tuning) -> bool {
    if state.store.player.is_invulnerable(now) {
        return false;
    }
    let (pos, radius) = (state.store.player.pos, state.store.player.radius);
    let mut died = false;
    let mut i = 0;
    while i < state.store.projectiles.len() {
        let p = &state.store.projectiles[i];
        if circles_overlap(p.pos, p.radius, pos, radius) {
            let projectile = state.store.projectiles.remove(i);
            died |= damage_player(state, projectile.damage, now, tuning);
        } else {
            i += 1;
        }
    }
    died
}

fn damage_player(state: &mut GameState, amount: f32, now: u64, tuning: &Tuning) -> bool {
    if state.store.player.is_invulnerable(now) {
        return false;
    }
    let died = state
        .store
        .player
        .take_damage(amount, now, tuning.player.iframe_ms);
    state.emit(GameEvent::PlayerDamaged { amount });
    state.emit(GameEvent::ScreenShake);
    died
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::champion::ChampionId;
    use crate::sim::rng::ScriptedSource;
    use crate::sim::state::{Bullet, Enemy, EnemyKind, EnemyProjectile};

    fn setup() -> (GameState, Tuning) {
        let tuning = Tuning::default();
        let state = GameState::new(ChampionId::Sascha, &tuning);
        (state, tuning)
    }

    fn chaser(pos: Vec2, health: f32) -> Enemy {
        Enemy {
            id: 1,
            kind: EnemyKind::Chaser,
            pos,
            health,
            max_health: health,
            speed: 4.2,
            damage: 5.0,
            size: 30.0,
            xp_value: 10,
            money_value: 1,
            hit_flash_until: 0,
            last_shot_at: None,
            entered: true,
        }
    }

    fn bullet(pos: Vec2, damage: f32) -> Bullet {
        Bullet {
            pos,
            vel: Vec2::new(0.0, -24.0),
            damage,
            crit: true,
            max_range: None,
            traveled: 0.0,
        }
    }

    #[test]
    fn test_three_hits_kill_three_hp_enemy() {
        let (mut state, tuning) = setup();
        let pos = Vec2::new(1000.0, 1000.0);
        state.store.enemies.push(chaser(pos, 3.0));
        // 0.9 never crits (chance 0) and never drops money (0.3)
        let mut rng = ScriptedSource::constant(0.9);

        for hit in 1..=3 {
            state.store.bullets.push(bullet(pos, 1.0));
            resolve_bullet_hits(&mut state, hit * 100, &tuning, &mut rng);
            assert!(state.store.bullets.is_empty());
            if hit < 3 {
                assert_eq!(state.store.enemies.len(), 1);
                assert!(state.store.enemies[0].is_flashing(hit * 100 + 10));
            }
        }

        assert!(state.store.enemies.is_empty());
        assert_eq!(state.store.orbs.len(), 1);
        assert_eq!(state.store.orbs[0].value, tuning.chaser.xp_value);
        assert_eq!(state.store.player.kill_count, 1);
        assert_eq!(state.store.player.money, 0);
    }

    #[test]
    fn test_bullet_hits_only_first_enemy() {
        let (mut state, tuning) = setup();
        let pos = Vec2::new(1000.0, 1000.0);
        state.store.enemies.push(chaser(pos, 5.0));
        state.store.enemies.push(chaser(pos, 5.0));
        state.store.bullets.push(bullet(pos, 1.0));
        resolve_bullet_hits(&mut state, 0, &tuning, &mut ScriptedSource::constant(0.9));
        assert_eq!(state.store.enemies[0].health, 4.0);
        assert_eq!(state.store.enemies[1].health, 5.0);
    }

    #[test]
    fn test_crit_doubles_damage() {
        let (mut state, tuning) = setup();
        state.store.player.crit_chance = 0.5;
        let pos = Vec2::new(1000.0, 1000.0);
        state.store.enemies.push(chaser(pos, 10.0));
        state.store.bullets.push(bullet(pos, 1.5));
        resolve_bullet_hits(&mut state, 0, &tuning, &mut ScriptedSource::constant(0.1));
        assert_eq!(state.store.enemies[0].health, 7.0);
        assert!(state.events.contains(&GameEvent::EnemyHit {
            pos,
            damage: 3.0,
            crit: true
        }));
    }

    #[test]
    fn test_no_crit_when_bullet_cannot_crit() {
        let (mut state, tuning) = setup();
        state.store.player.crit_chance = 1.0;
        let pos = Vec2::new(1000.0, 1000.0);
        state.store.enemies.push(chaser(pos, 10.0));
        let mut b = bullet(pos, 1.0);
        b.crit = false;
        state.store.bullets.push(b);
        resolve_bullet_hits(&mut state, 0, &tuning, &mut ScriptedSource::constant(0.0));
        assert_eq!(state.store.enemies[0].health, 9.0);
    }

    #[test]
    fn test_lifesteal_heals_same_amount_each_hit() {
        let (mut state, tuning) = setup();
        state.store.player.lifesteal = 0.25;
        state.store.player.health = 50.0;
        let pos = Vec2::new(1000.0, 1000.0);
        state.store.enemies.push(chaser(pos, 100.0));
        let mut rng = ScriptedSource::constant(0.9);

        state.store.bullets.push(bullet(pos, 2.0));
        resolve_bullet_hits(&mut state, 0, &tuning, &mut rng);
        let first = state.store.player.health - 50.0;
        state.store.bullets.push(bullet(pos, 2.0));
        resolve_bullet_hits(&mut state, 1, &tuning, &mut rng);
        let second = state.store.player.health - 50.0 - first;
        assert_eq!(first, 0.5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_money_drop_scaling() {
        let economy = EconomyTuning::default();
        assert_eq!(money_drop(1, 1, &economy), 1);
        assert_eq!(money_drop(2, 5, &economy), 2);
        // One interval: ceil(2 * 1.1)
        assert_eq!(money_drop(2, 6, &economy), 3);
        // Two intervals: ceil(1 * 1.21)
        assert_eq!(money_drop(1, 10, &economy), 2);
    }

    #[test]
    fn test_kill_drops_money_on_lucky_roll() {
        let (mut state, tuning) = setup();
        let pos = Vec2::new(1000.0, 1000.0);
        state.store.enemies.push(chaser(pos, 1.0));
        state.store.bullets.push(bullet(pos, 1.0));
        // Crit roll consumes 0.5 (chance 0), drop roll consumes 0.1
        let mut rng = ScriptedSource::new(vec![0.5, 0.1]);
        resolve_bullet_hits(&mut state, 0, &tuning, &mut rng);
        assert_eq!(state.store.player.money, 1);
    }

    #[test]
    fn test_one_contact_hit_per_tick() {
        let (mut state, tuning) = setup();
        let pos = state.store.player.pos;
        state.store.enemies.push(chaser(pos, 3.0));
        state.store.enemies.push(chaser(pos, 3.0));
        assert!(!resolve_enemy_contact(&mut state, 1000, &tuning));
        assert_eq!(state.store.player.health, 70.0);
        // Invulnerable for the next 800ms
        assert!(!resolve_enemy_contact(&mut state, 1500, &tuning));
        assert_eq!(state.store.player.health, 70.0);
        resolve_enemy_contact(&mut state, 1800, &tuning);
        assert_eq!(state.store.player.health, 65.0);
    }

    #[test]
    fn test_projectile_consumed_and_kills() {
        let (mut state, tuning) = setup();
        state.store.player.health = 5.0;
        let pos = state.store.player.pos;
        state.store.projectiles.push(EnemyProjectile {
            pos,
            vel: Vec2::ZERO,
            damage: 10.0,
            radius: 18.0,
        });
        assert!(resolve_projectile_hits(&mut state, 0, &tuning));
        assert!(state.store.projectiles.is_empty());
        assert_eq!(state.store.player.health, 0.0);
    }

    #[test]
    fn test_projectiles_ignored_while_invulnerable() {
        let (mut state, tuning) = setup();
        state.store.player.take_damage(1.0, 0, 800);
        let pos = state.store.player.pos;
        state.store.projectiles.push(EnemyProjectile {
            pos,
            vel: Vec2::ZERO,
            damage: 10.0,
            radius: 18.0,
        });
        assert!(!resolve_projectile_hits(&mut state, 100, &tuning));
        assert_eq!(state.store.projectiles.len(), 1);
        assert_eq!(state.store.player.health, 74.0);
    }
}
