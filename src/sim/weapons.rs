//! Player weapons: aimed multishot volleys and auto-targeting hurricane shots

use glam::Vec2;

use super::collision::inside_bounds;
use super::state::{Bullet, EntityStore, GameEvent, GameState};
use crate::tuning::Tuning;
use crate::{angle_to_dir, direction_to};

/// Aim points closer than this to the player are ignored
const MIN_AIM_DISTANCE: f32 = 1.0;

/// Angles of a multishot volley, spread symmetrically around `base`
pub fn spread_angles(base: f32, count: u32, step: f32) -> Vec<f32> {
    if count <= 1 {
        return vec![base];
    }
    let spread = (count - 1) as f32 * step;
    (0..count)
        .map(|i| base - spread / 2.0 + step * i as f32)
        .collect()
}

/// Fire a volley toward `aim` if the fire interval has elapsed.
/// Returns true if bullets were spawned.
pub fn fire_volley(state: &mut GameState, aim: Vec2, now: u64, tuning: &Tuning) -> bool {
    let player = &state.store.player;
    let ready = state
        .last_fire_at
        .is_none_or(|t| now.saturating_sub(t) as f32 >= player.fire_interval_ms());
    if !ready {
        return false;
    }
    let Some((dir, distance)) = direction_to(player.pos, aim) else {
        return false;
    };
    if distance <= MIN_AIM_DISTANCE {
        return false;
    }

    let base = dir.y.atan2(dir.x);
    let damage = player.damage();
    let origin = player.pos;
    let max_range = player.bullet_range;
    for angle in spread_angles(base, player.multishot, tuning.bullet.spread_step) {
        state.store.bullets.push(Bullet {
            pos: origin,
            vel: angle_to_dir(angle) * tuning.bullet.speed,
            damage,
            crit: true,
            max_range,
            traveled: 0.0,
        });
    }
    state.last_fire_at = Some(now);
    state.emit(GameEvent::ShotFired);
    true
}

/// One reduced-damage shot at each of the N nearest enemies, N being the
/// hurricane stack count. These never crit and have unlimited range.
pub fn fire_hurricane(state: &mut GameState, now: u64, tuning: &Tuning) {
    let stacks = state.store.player.hurricane_shots as usize;
    if stacks == 0 || state.store.enemies.is_empty() {
        return;
    }
    let due = state
        .last_hurricane_at
        .is_none_or(|t| now.saturating_sub(t) >= tuning.hurricane.interval_ms);
    if !due {
        return;
    }

    let origin = state.store.player.pos;
    let mut targets: Vec<Vec2> = state.store.enemies.iter().map(|e| e.pos).collect();
    targets.sort_by(|a, b| origin.distance_squared(*a).total_cmp(&origin.distance_squared(*b)));

    let damage = state.store.player.damage() * tuning.hurricane.damage_factor;
    for target in targets.into_iter().take(stacks) {
        let Some((dir, distance)) = direction_to(origin, target) else {
            continue;
        };
        if distance <= MIN_AIM_DISTANCE {
            continue;
        }
        state.store.bullets.push(Bullet {
            pos: origin,
            vel: dir * tuning.hurricane.speed,
            damage,
            crit: false,
            max_range: None,
            traveled: 0.0,
        });
    }
    state.last_hurricane_at = Some(now);
}

/// Advance bullets, dropping those past their range or outside the world
pub fn move_bullets(store: &mut EntityStore, frame_factor: f32, tuning: &Tuning) {
    let world = Vec2::new(tuning.arena.width, tuning.arena.height);
    let margin = tuning.bullet.cull_margin;
    store.bullets.retain_mut(|b| {
        let step = b.vel * frame_factor;
        b.pos += step;
        b.traveled += step.length();
        let in_range = b.max_range.is_none_or(|range| b.traveled < range);
        in_range && inside_bounds(b.pos, world, margin)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::champion::ChampionId;
    use crate::sim::state::{Enemy, EnemyKind};
    use proptest::prelude::*;

    fn setup() -> (GameState, Tuning) {
        let tuning = Tuning::default();
        (GameState::new(ChampionId::Sascha, &tuning), tuning)
    }

    fn enemy(pos: Vec2) -> Enemy {
        Enemy {
            id: 0,
            kind: EnemyKind::Chaser,
            pos,
            health: 3.0,
            max_health: 3.0,
            speed: 0.0,
            damage: 5.0,
            size: 30.0,
            xp_value: 10,
            money_value: 1,
            hit_flash_until: 0,
            last_shot_at: None,
            entered: true,
        }
    }

    #[test]
    fn test_single_shot_no_spread() {
        assert_eq!(spread_angles(0.3, 1, 0.17), vec![0.3]);
    }

    #[test]
    fn test_volley_respects_fire_rate() {
        let (mut state, tuning) = setup();
        let aim = state.store.player.pos + Vec2::new(100.0, 0.0);
        assert!(fire_volley(&mut state, aim, 0, &tuning));
        // Sascha attacks once per second
        assert!(!fire_volley(&mut state, aim, 999, &tuning));
        assert!(fire_volley(&mut state, aim, 1000, &tuning));
        assert_eq!(state.store.bullets.len(), 2);
    }

    #[test]
    fn test_volley_uses_multishot() {
        let tuning = Tuning::default();
        let mut state = GameState::new(ChampionId::Byczan, &tuning);
        let aim = state.store.player.pos + Vec2::new(0.0, -300.0);
        fire_volley(&mut state, aim, 0, &tuning);
        assert_eq!(state.store.bullets.len(), 2);
        assert!(state.store.bullets.iter().all(|b| b.max_range == Some(450.0)));
        assert!(state.store.bullets.iter().all(|b| b.damage == 1.7));
    }

    #[test]
    fn test_aim_on_player_does_not_fire() {
        let (mut state, tuning) = setup();
        let aim = state.store.player.pos;
        assert!(!fire_volley(&mut state, aim, 0, &tuning));
        assert!(state.last_fire_at.is_none());
    }

    #[test]
    fn test_hurricane_targets_nearest() {
        let (mut state, tuning) = setup();
        let origin = state.store.player.pos;
        state.store.player.hurricane_shots = 2;
        state.store.enemies.push(enemy(origin + Vec2::new(900.0, 0.0)));
        state.store.enemies.push(enemy(origin + Vec2::new(0.0, 100.0)));
        state.store.enemies.push(enemy(origin + Vec2::new(-200.0, 0.0)));

        fire_hurricane(&mut state, 0, &tuning);
        assert_eq!(state.store.bullets.len(), 2);
        assert!(state.store.bullets[0].vel.y > 0.0);
        assert!(state.store.bullets[1].vel.x < 0.0);
        assert!(state.store.bullets.iter().all(|b| !b.crit && b.max_range.is_none()));
        assert!(state.store.bullets.iter().all(|b| b.damage == 0.5));

        fire_hurricane(&mut state, 600, &tuning);
        assert_eq!(state.store.bullets.len(), 2);
        fire_hurricane(&mut state, 667, &tuning);
        assert_eq!(state.store.bullets.len(), 4);
    }

    #[test]
    fn test_bullet_range_limit() {
        let (mut state, tuning) = setup();
        let pos = state.store.player.pos;
        state.store.bullets.push(Bullet {
            pos,
            vel: Vec2::new(24.0, 0.0),
            damage: 1.0,
            crit: true,
            max_range: Some(48.0),
            traveled: 0.0,
        });
        move_bullets(&mut state.store, 1.0, &tuning);
        assert_eq!(state.store.bullets.len(), 1);
        move_bullets(&mut state.store, 1.0, &tuning);
        assert!(state.store.bullets.is_empty());
    }

    proptest! {
        #[test]
        fn prop_spread_is_symmetric(base in -3.0f32..3.0, count in 1u32..8, step in 0.01f32..0.5) {
            let angles = spread_angles(base, count, step);
            prop_assert_eq!(angles.len(), count as usize);
            let mean = angles.iter().sum::<f32>() / count as f32;
            prop_assert!((mean - base).abs() < 1e-4);
            for pair in angles.windows(2) {
                prop_assert!((pair[1] - pair[0] - step).abs() < 1e-4);
            }
        }
    }
}
