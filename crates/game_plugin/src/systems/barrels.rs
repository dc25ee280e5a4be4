// crates/game_plugin/src/systems/barrels.rs

use engine_shared::{Rect, Vec2};

use crate::config::{BARREL_SCORE, BARREL_SPEED, FLOATING_TEXT_SECS, GRID_SIZE};
use crate::physics;
use crate::state::GameState;

/// Region above a barrel in which the player earns the jump-over bonus: the
/// two cells directly on top of it.
fn bonus_zone(barrel: &Rect) -> Rect {
    Rect::new(barrel.pos.x, barrel.pos.y - barrel.size.y * 2.0, barrel.size.x, barrel.size.y * 2.0)
}

/// Hits, jump-over bonuses, rolling and despawn, in that order per barrel.
pub fn update_barrels(gs: &mut GameState) {
    let player = gs.player.rect();
    let player_on_ladder = physics::on_ladder(&gs.player, &gs.ladders);
    // Barrels that stall at or below the first level platform have reached
    // the bottom row and are done.
    let despawn_y = gs.platforms.get(1).or(gs.platforms.first()).map(|p| p.pos.y).unwrap_or(f64::MAX);

    let mut i = 0;
    while i < gs.barrels.len() {
        let barrel = &mut gs.barrels[i];
        let rect = barrel.body.rect();

        if rect.intersects(&player) {
            gs.barrels.remove(i);
            gs.lives = gs.lives.saturating_sub(1);
            tracing::debug!(lives = gs.lives, "player hit by barrel");
            continue;
        }

        if !barrel.jumped && !player_on_ladder && bonus_zone(&rect).intersects(&player) {
            barrel.jumped = true;
            let popup = barrel.body.pos - Vec2::new(0.0, GRID_SIZE / 2.0);
            gs.score = gs.score.saturating_add(BARREL_SCORE);
            gs.show_floating_text(format!("+{BARREL_SCORE}"), popup, FLOATING_TEXT_SECS);
        }

        let barrel = &mut gs.barrels[i];
        let direction = if barrel.body.vel.x < 0.0 { -1.0 } else { 1.0 };
        let rolling = direction * BARREL_SPEED * GRID_SIZE;
        barrel.body.vel.x = rolling;

        physics::update_physics(&mut barrel.body, &gs.platforms, gs.delta, gs.debug);

        if barrel.body.vel.x == 0.0 {
            barrel.body.vel.x = -rolling;
            if barrel.body.pos.y >= despawn_y {
                gs.barrels.remove(i);
                continue;
            }
        }

        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
    use crate::state::{Barrel, Entity};
    use crate::systems::test_support::{arena, DT};

    fn ground_barrel(x: f64) -> Barrel {
        Barrel::spawn_at(Vec2::new(x, SCREEN_HEIGHT - GRID_SIZE * 2.0))
    }

    #[test]
    fn collision_costs_a_life_and_removes_barrel() {
        let mut gs = arena(&[]);
        gs.barrels.push(Barrel::spawn_at(gs.player.pos));
        update_barrels(&mut gs);
        assert!(gs.barrels.is_empty());
        assert_eq!(gs.lives, 2);
    }

    #[test]
    fn lives_never_underflow() {
        let mut gs = arena(&[]);
        gs.lives = 0;
        gs.barrels.push(Barrel::spawn_at(gs.player.pos));
        gs.barrels.push(Barrel::spawn_at(gs.player.pos));
        update_barrels(&mut gs);
        assert_eq!(gs.lives, 0);
        assert!(gs.barrels.is_empty());
    }

    #[test]
    fn jump_bonus_is_awarded_once() {
        let mut gs = arena(&[]);
        gs.delta = 0.0;
        let barrel = ground_barrel(gs.player.pos.x);
        // Player hovering just above the barrel.
        gs.player.pos.y = barrel.body.pos.y - gs.player.size.y - 1.0;
        gs.barrels.push(barrel);

        for _ in 0..5 {
            update_barrels(&mut gs);
        }

        assert_eq!(gs.score, BARREL_SCORE);
        assert_eq!(gs.floating_texts.len(), 1);
        assert_eq!(gs.floating_texts[0].text, "+150");
        assert!(gs.barrels[0].jumped);
        assert_eq!(gs.barrels[0].body.size, Vec2::splat(GRID_SIZE));
    }

    #[test]
    fn no_bonus_while_climbing() {
        let mut gs = arena(&[]);
        gs.delta = 0.0;
        let barrel = ground_barrel(gs.player.pos.x);
        gs.player.pos.y = barrel.body.pos.y - gs.player.size.y - 1.0;
        gs.ladders.push(Entity::new(gs.player.pos - Vec2::splat(10.0), Vec2::new(60.0, 200.0)));
        gs.barrels.push(barrel);
        update_barrels(&mut gs);
        assert_eq!(gs.score, 0);
        assert!(!gs.barrels[0].jumped);
    }

    #[test]
    fn barrels_roll_at_constant_speed() {
        let mut gs = arena(&[]);
        gs.player.pos.x = 0.0;
        gs.barrels.push(ground_barrel(300.0));
        let start = gs.barrels[0].body.pos.x;
        for _ in 0..30 {
            update_barrels(&mut gs);
        }
        let travelled = gs.barrels[0].body.pos.x - start;
        let expected = 30.0 * DT * BARREL_SPEED * GRID_SIZE * crate::config::HORIZONTAL_DAMPING;
        assert!((travelled - expected).abs() < 1e-6, "{travelled} vs {expected}");
    }

    #[test]
    fn wall_hit_reverses_then_despawns_on_bottom_row() {
        let upper = Entity::new(Vec2::new(0.0, 300.0), Vec2::new(900.0, 30.0));
        let mut gs = arena(&[upper]);
        gs.player.pos.x = 0.0;

        // Rolling off the right edge of the screen on the upper platform bounces.
        let mut high = Barrel::spawn_at(Vec2::new(SCREEN_WIDTH - GRID_SIZE, 300.0 - GRID_SIZE));
        high.body.vel.x = 1.0;
        gs.barrels.push(high);
        update_barrels(&mut gs);
        assert_eq!(gs.barrels.len(), 1);
        assert!(gs.barrels[0].body.vel.x < 0.0);

        // The same on the ground row removes it.
        gs.barrels.clear();
        let mut low = ground_barrel(SCREEN_WIDTH - GRID_SIZE);
        low.body.vel.x = 1.0;
        gs.barrels.push(low);
        update_barrels(&mut gs);
        assert!(gs.barrels.is_empty());
    }

    #[test]
    fn removal_does_not_skip_the_next_barrel() {
        let mut gs = arena(&[]);
        gs.barrels.push(Barrel::spawn_at(gs.player.pos));
        gs.barrels.push(Barrel::spawn_at(gs.player.pos));
        gs.barrels.push(ground_barrel(0.0));
        update_barrels(&mut gs);
        assert_eq!(gs.lives, 1);
        assert_eq!(gs.barrels.len(), 1);
    }
}
