// crates/game_plugin/src/physics.rs
//! Integration and collision against the level's platforms and ladders.
//!
//! Everything here is a free function over plain slices so it can be called
//! while other fields of `GameState` are mutably borrowed.

use engine_shared::Vec2;
use tracing::debug;

use crate::config::{GRAVITY, GRID_SIZE, HORIZONTAL_DAMPING, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::state::Entity;

/// Which face of a platform an overlapping entity is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Entity lands on the platform's top.
    Bottom,
    /// Entity hits the platform's underside.
    Top,
    /// Entity is pushed out to the platform's left.
    Right,
    /// Entity is pushed out to the platform's right.
    Left,
}

/// First platform, in storage order, overlapping `entity`.
pub fn intersect_platform<'a>(entity: &Entity, platforms: &'a [Entity]) -> Option<&'a Entity> {
    let rect = entity.rect();
    platforms.iter().find(|p| rect.intersects(&p.rect()))
}

/// Classify an overlap with a fixed priority: bottom, top, right, left.
pub fn where_intersection(a: &Entity, b: &Entity) -> Side {
    let (ra, rb) = (a.rect(), b.rect());
    if ra.bottom() <= rb.bottom() {
        Side::Bottom
    } else if ra.top() >= rb.top() {
        Side::Top
    } else if ra.right() <= rb.right() {
        Side::Right
    } else if ra.left() >= rb.left() {
        Side::Left
    } else {
        // The entity encloses the platform on both axes; lift it out on top.
        Side::Bottom
    }
}

/// First ladder covering at least half of the entity on both axes.
pub fn intersect_ladder<'a>(entity: &Entity, ladders: &'a [Entity]) -> Option<&'a Entity> {
    let rect = entity.rect();
    ladders.iter().find(|ladder| {
        rect.intersection(&ladder.rect())
            .is_some_and(|i| i.size.y >= entity.size.y / 2.0 && i.size.x >= entity.size.x / 2.0)
    })
}

pub fn on_ladder(entity: &Entity, ladders: &[Entity]) -> bool {
    intersect_ladder(entity, ladders).is_some()
}

/// True when the entity, nudged one unit down, would be standing on a
/// platform. Peeking ahead tolerates float drift in the resting position.
pub fn can_jump(entity: &Entity, platforms: &[Entity]) -> bool {
    let mut probe = *entity;
    probe.pos.y += 1.0;
    intersect_platform(&probe, platforms).is_some_and(|p| where_intersection(&probe, p) == Side::Bottom)
}

/// Snap `entity` out of `platform` along `side`, zeroing the blocked velocity.
pub fn resolve_collision(entity: &mut Entity, platform: &Entity, side: Side) {
    match side {
        Side::Bottom => {
            entity.pos.y = platform.pos.y - entity.size.y;
            entity.vel.y = 0.0;
        }
        Side::Top => {
            entity.pos.y = platform.pos.y + platform.size.y;
            entity.vel.y = entity.vel.y.max(0.0);
        }
        Side::Right => {
            entity.pos.x = platform.pos.x - entity.size.x;
            entity.vel.x = 0.0;
        }
        Side::Left => {
            entity.pos.x = platform.pos.x + platform.size.x;
            entity.vel.x = 0.0;
        }
    }
}

/// Keep the entity fully on screen, zeroing velocity on a clamped axis.
pub fn clamp_to_screen(entity: &mut Entity) {
    let max = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT) - entity.size;

    if entity.pos.x > max.x {
        entity.pos.x = max.x;
        entity.vel.x = 0.0;
    } else if entity.pos.x < 0.0 {
        entity.pos.x = 0.0;
        entity.vel.x = 0.0;
    }

    if entity.pos.y > max.y {
        entity.pos.y = max.y;
        entity.vel.y = 0.0;
    } else if entity.pos.y < 0.0 {
        entity.pos.y = 0.0;
        entity.vel.y = 0.0;
    }
}

/// One physics step: damping, integration, platform resolution or gravity,
/// then the screen clamp.
pub fn update_physics(entity: &mut Entity, platforms: &[Entity], dt: f64, trace: bool) {
    entity.vel.x *= HORIZONTAL_DAMPING;
    entity.pos += entity.vel * dt;

    if let Some(platform) = intersect_platform(entity, platforms) {
        let side = where_intersection(entity, platform);
        if trace {
            debug!(?side, pos = ?entity.pos, "entity hit platform");
        }
        resolve_collision(entity, platform, side);
    } else {
        entity.vel.y += GRAVITY * GRID_SIZE * dt;
    }

    clamp_to_screen(entity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ground_platform;

    const DT: f64 = 1.0 / 60.0;

    fn ent(x: f64, y: f64, w: f64, h: f64) -> Entity {
        Entity::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    fn floor() -> Vec<Entity> {
        vec![ground_platform()]
    }

    #[test]
    fn falling_entity_lands_on_ground() {
        let platforms = floor();
        let mut player = ent(100.0, 500.0, 30.0, 60.0);
        for _ in 0..120 {
            update_physics(&mut player, &platforms, DT, false);
        }
        // Resting alternates between "snapped" and "one frame of gravity",
        // but the position never leaves the platform top.
        assert_eq!(player.pos.y, SCREEN_HEIGHT - GRID_SIZE - 60.0);
        assert!(can_jump(&player, &platforms));
        assert!(!player.rect().intersects(&platforms[0].rect()));
    }

    #[test]
    fn airborne_entity_gains_gravity() {
        let mut e = ent(100.0, 100.0, 30.0, 30.0);
        update_physics(&mut e, &floor(), 0.1, false);
        assert!((e.vel.y - GRAVITY * GRID_SIZE * 0.1).abs() < 1e-9);
    }

    #[test]
    fn priority_is_bottom_top_right_left() {
        let platform = ent(100.0, 100.0, 100.0, 30.0);
        // Feet inside the platform's top half.
        assert_eq!(where_intersection(&ent(120.0, 50.0, 30.0, 60.0), &platform), Side::Bottom);
        // Head poking into the underside.
        assert_eq!(where_intersection(&ent(120.0, 120.0, 30.0, 60.0), &platform), Side::Top);
        // Tall entity spanning the platform vertically, coming from the left.
        assert_eq!(where_intersection(&ent(80.0, 80.0, 30.0, 90.0), &platform), Side::Right);
        // Same, coming from the right.
        assert_eq!(where_intersection(&ent(190.0, 80.0, 30.0, 90.0), &platform), Side::Left);
    }

    #[test]
    fn resolution_separates_on_resolved_axis() {
        let platform = ent(100.0, 100.0, 100.0, 30.0);
        let cases = [
            ent(120.0, 50.0, 30.0, 60.0),
            ent(120.0, 120.0, 30.0, 60.0),
            ent(80.0, 80.0, 30.0, 90.0),
            ent(190.0, 80.0, 30.0, 90.0),
        ];
        for mut e in cases {
            let side = where_intersection(&e, &platform);
            resolve_collision(&mut e, &platform, side);
            assert!(!e.rect().intersects(&platform.rect()), "{side:?} still overlaps");
        }
    }

    #[test]
    fn underside_hit_keeps_downward_velocity() {
        let platform = ent(100.0, 100.0, 100.0, 30.0);
        let mut e = ent(120.0, 120.0, 30.0, 60.0);
        e.vel.y = -200.0;
        resolve_collision(&mut e, &platform, Side::Top);
        assert_eq!(e.vel.y, 0.0);
        e.vel.y = 50.0;
        resolve_collision(&mut e, &platform, Side::Top);
        assert_eq!(e.vel.y, 50.0);
    }

    #[test]
    fn first_platform_in_storage_order_wins() {
        let a = ent(0.0, 100.0, 200.0, 30.0);
        let b = ent(0.0, 90.0, 200.0, 30.0);
        let e = ent(10.0, 60.0, 30.0, 60.0);
        let platforms = [a, b];
        assert_eq!(intersect_platform(&e, &platforms), Some(&platforms[0]));
    }

    #[test]
    fn clamp_keeps_entities_on_screen() {
        let platforms: Vec<Entity> = Vec::new();
        let starts = [(-50.0, -50.0), (2000.0, 2000.0), (400.0, -10.0), (950.0, 300.0)];
        for (x, y) in starts {
            let mut e = ent(x, y, 30.0, 60.0);
            e.vel = Vec2::new(x.signum() * 900.0, y.signum() * 900.0);
            update_physics(&mut e, &platforms, DT, false);
            assert!(e.pos.x >= 0.0 && e.pos.x <= SCREEN_WIDTH - e.size.x);
            assert!(e.pos.y >= 0.0 && e.pos.y <= SCREEN_HEIGHT - e.size.y);
        }
    }

    #[test]
    fn clamp_zeroes_velocity_on_clamped_axis() {
        let mut e = ent(-5.0, 100.0, 30.0, 30.0);
        e.vel = Vec2::new(-100.0, 40.0);
        clamp_to_screen(&mut e);
        assert_eq!(e.vel, Vec2::new(0.0, 40.0));
    }

    #[test]
    fn horizontal_velocity_decays() {
        let platforms = floor();
        let mut e = ent(100.0, SCREEN_HEIGHT - GRID_SIZE - 30.0, 30.0, 30.0);
        e.vel.x = 100.0;
        update_physics(&mut e, &platforms, DT, false);
        assert!((e.vel.x - 80.0).abs() < 1e-9);
    }

    #[test]
    fn ladder_needs_half_overlap_on_both_axes() {
        let ladders = [ent(100.0, 100.0, 60.0, 300.0)];
        // Fully inside.
        assert!(on_ladder(&ent(110.0, 200.0, 30.0, 60.0), &ladders));
        // Only 40% of the height overlaps (feet on the ladder top).
        assert!(!on_ladder(&ent(110.0, 100.0 - 36.0, 30.0, 60.0), &ladders));
        // Exactly half the height.
        assert!(on_ladder(&ent(110.0, 100.0 - 30.0, 30.0, 60.0), &ladders));
        // Grazing the side by a third of the width.
        assert!(!on_ladder(&ent(140.0 + 10.0, 200.0, 30.0, 60.0), &ladders));
    }

    #[test]
    fn jump_eligibility_peeks_one_unit_down() {
        let platforms = floor();
        let ground_top = platforms[0].pos.y;

        let standing = ent(100.0, ground_top - 60.0, 30.0, 60.0);
        assert!(can_jump(&standing, &platforms));

        let hovering = ent(100.0, ground_top - 60.0 - 0.5, 30.0, 60.0);
        assert!(can_jump(&hovering, &platforms));

        let midair = ent(100.0, ground_top - 200.0, 30.0, 60.0);
        assert!(!can_jump(&midair, &platforms));
    }

    #[test]
    fn can_jump_right_after_landing() {
        let platforms = floor();
        let mut player = ent(100.0, 400.0, 30.0, 60.0);
        let mut landed = false;
        for _ in 0..240 {
            let was_airborne = !can_jump(&player, &platforms);
            update_physics(&mut player, &platforms, DT, false);
            if was_airborne && player.vel.y == 0.0 && player.pos.y > 400.0 {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(can_jump(&player, &platforms));
    }
}
