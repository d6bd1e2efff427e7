use blitkit::canvas::{Canvas, Color};
use blitkit::entity::*;
use blitkit::error::EngineError;
use blitkit::world::*;
use glam::IVec2;

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(320, 240)
    }

    fn block(x: i32, y: i32) -> EntityBuilder {
        Entity::builder().with_fill(Color::RED, 10, 10).at(x, y)
    }

    // -- spawn / kill / compact ---------------------------------------------

    #[test]
    fn killed_entities_linger_until_compaction() {
        let mut w = world();
        let a = w.spawn(block(0, 0)).unwrap();
        assert!(w.kill(a));
        assert!(!w.kill(a));
        assert!(!w.is_alive(a));
        assert!(w.contains(a));
        assert_eq!(w.len(), 0);

        assert_eq!(w.compact(), 1);
        assert!(!w.contains(a));
        assert!(w.get(a).is_none());
    }

    #[test]
    fn stale_ids_do_not_resolve_to_reused_slots() {
        let mut w = world();
        let a = w.spawn(block(0, 0)).unwrap();
        w.kill(a);
        w.compact();
        let b = w.spawn(block(5, 5)).unwrap();
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(w.get(a).is_none());
        assert_eq!(w.get(b).map(|e| e.pos), Some(IVec2::new(5, 5)));
    }

    #[test]
    fn iteration_follows_spawn_order() {
        let mut w = world();
        let ids: Vec<_> = (0..4).map(|i| w.spawn(block(i * 20, 0)).unwrap()).collect();
        w.kill(ids[1]);
        assert_eq!(w.ids(), vec![ids[0], ids[2], ids[3]]);
    }

    #[test]
    fn compaction_drops_dead_members_from_teams() {
        let mut w = world();
        let a = w.spawn(block(0, 0)).unwrap();
        let b = w.spawn(block(20, 0)).unwrap();
        let team = w.create_team("pair", vec![a, b]);
        w.kill(a);
        w.compact();
        assert_eq!(w.team(team).unwrap().members, vec![b]);
    }

    #[test]
    fn clear_removes_entities_and_teams() {
        let mut w = world();
        let a = w.spawn(block(0, 0)).unwrap();
        w.spawn(block(20, 0)).unwrap();
        w.create_team("t", vec![a]);
        assert_eq!(w.clear(), 2);
        assert!(w.is_empty());
        assert_eq!(w.enabled_team_count(), 0);
        assert!(w.get(a).is_none());
    }

    #[test]
    fn prune_keeps_only_live_ids() {
        let mut w = world();
        let a = w.spawn(block(0, 0)).unwrap();
        let b = w.spawn(block(20, 0)).unwrap();
        w.kill(a);
        let mut list = vec![a, b];
        w.prune(&mut list);
        assert_eq!(list, vec![b]);
    }

    // -- movement and collision ---------------------------------------------

    #[test]
    fn restrict_keeps_entity_inside_screen() {
        let mut w = world();
        let a = w.spawn(block(-1000, 1000)).unwrap();
        w.restrict(a);
        assert_eq!(w.get(a).unwrap().pos, IVec2::new(0, 230));
    }

    #[test]
    fn obstacle_on_shared_team_blocks_move() {
        let mut w = world();
        let player = w.spawn(block(10, 10)).unwrap();
        let wall = w.spawn(block(30, 10).obstacle()).unwrap();
        w.create_team("collision", vec![player, wall]);

        assert!(!w.move_entity(player, IVec2::new(20, 0), true));
        assert_eq!(w.get(player).unwrap().pos, IVec2::new(10, 10));

        assert!(w.move_entity(player, IVec2::new(20, 0), false));
        assert_eq!(w.get(player).unwrap().pos, IVec2::new(30, 10));
    }

    #[test]
    fn touching_an_obstacle_is_allowed() {
        let mut w = world();
        let player = w.spawn(block(10, 10)).unwrap();
        let wall = w.spawn(block(30, 10).obstacle()).unwrap();
        w.create_team("collision", vec![player, wall]);
        assert!(w.move_entity(player, IVec2::new(10, 0), true));
        assert_eq!(w.get(player).unwrap().right(), 30);
    }

    #[test]
    fn obstacles_outside_enabled_teams_do_not_block() {
        let mut w = world();
        let player = w.spawn(block(10, 10)).unwrap();
        let wall = w.spawn(block(30, 10).obstacle()).unwrap();
        w.spawn(block(10, 30).obstacle()).unwrap();
        let team = w.create_team("collision", vec![player, wall]);

        assert!(w.move_entity(player, IVec2::new(0, 20), true));
        w.disable_team(team);
        assert!(w.move_entity(player, IVec2::new(20, -20), true));
    }

    #[test]
    fn sprites_on_a_team_do_not_block() {
        let mut w = world();
        let player = w.spawn(block(10, 10)).unwrap();
        let other = w.spawn(block(30, 10)).unwrap();
        w.create_team("collision", vec![player, other]);
        assert!(w.move_entity(player, IVec2::new(20, 0), true));
    }

    #[test]
    fn enabling_a_team_twice_is_a_no_op() {
        let mut w = world();
        let team = w.create_team("t", Vec::new());
        assert!(w.is_team_enabled(team));
        w.enable_team(team);
        assert_eq!(w.enabled_team_count(), 1);
        w.disable_team(team);
        assert!(!w.is_team_enabled(team));
        assert_eq!(w.enabled_team_count(), 0);
    }

    #[test]
    fn huge_move_saturates_then_restricts_to_edge() {
        let mut w = world();
        let a = w.spawn(block(100, 50)).unwrap();
        assert!(w.move_entity(a, IVec2::new(i32::MAX, 0), false));
        assert_eq!(w.get(a).unwrap().pos.x, i32::MAX);
        w.restrict(a);
        let e = w.get(a).unwrap();
        assert_eq!(e.pos, IVec2::new(e.max_x(), 50));
    }

    #[test]
    fn huge_move_into_obstacle_team_is_checked_without_overflow() {
        let mut w = world();
        let player = w.spawn(block(100, 50)).unwrap();
        let wall = w.spawn(block(200, 50).obstacle()).unwrap();
        w.create_team("collision", vec![player, wall]);
        assert!(w.move_entity(player, IVec2::new(i32::MAX, 0), true));
        assert_eq!(w.get(player).unwrap().right(), i32::MAX);
    }

    // -- projectiles --------------------------------------------------------

    #[test]
    fn bouncing_projectile_stays_on_screen() {
        let mut w = world();
        let cat = w.spawn(block(0, 100).with_velocity(-5, 0).bouncing()).unwrap();
        w.update_projectiles();
        let e = w.get(cat).unwrap();
        assert_eq!(e.pos.x, 0);
        assert_eq!(e.motion().unwrap().velocity.x, 5);
    }

    #[test]
    fn bouncing_projectile_with_huge_velocity_lands_on_edge() {
        let mut w = world();
        let cat = w.spawn(block(300, 100).with_velocity(i32::MAX, 0).bouncing()).unwrap();
        w.update_projectiles();
        let e = w.get(cat).unwrap();
        assert_eq!(e.pos.x, e.max_x());
        assert_eq!(e.motion().unwrap().velocity.x, -i32::MAX);
        assert!(w.is_alive(cat));
    }

    #[test]
    fn projectile_far_outside_is_removed() {
        let mut w = world();
        let stray = w.spawn(block(-100, -100).with_velocity(-1, 0)).unwrap();
        w.update_projectiles();
        assert!(!w.is_alive(stray));
        w.compact();
        assert!(!w.contains(stray));
    }

    // -- bullets ------------------------------------------------------------

    fn bullet(shooter: EntityId, x: i32, y: i32) -> EntityBuilder {
        Entity::builder().with_fill(Color::YELLOW, 2, 2).at(x, y).bullet(shooter)
    }

    #[test]
    fn bullet_hits_nearby_target_and_is_spent() {
        let mut w = world();
        let shooter = w.spawn(block(0, 0)).unwrap();
        let target = w.spawn(block(102, 98)).unwrap();
        let b = w.spawn(bullet(shooter, 100, 100)).unwrap();

        let hits = w.check_bullet(b);
        assert_eq!(hits, vec![Hit { bullet: b, target, damaged: false }]);
        assert!(!w.is_alive(b));
        assert!(w.is_alive(target));
    }

    #[test]
    fn bullet_ignores_targets_outside_hit_box() {
        let mut w = world();
        let shooter = w.spawn(block(0, 0)).unwrap();
        w.spawn(block(100 + HIT_RADIUS, 100)).unwrap();
        let b = w.spawn(bullet(shooter, 100, 100)).unwrap();
        assert!(w.check_bullet(b).is_empty());
        assert!(w.is_alive(b));
    }

    #[test]
    fn bullet_never_hits_its_shooter() {
        let mut w = world();
        let shooter = w.spawn(block(100, 100)).unwrap();
        let b = w.spawn(bullet(shooter, 100, 100)).unwrap();
        assert!(w.check_bullet(b).is_empty());
        assert!(w.is_alive(shooter));
    }

    #[test]
    fn target_list_restricts_hits() {
        let mut w = world();
        let shooter = w.spawn(block(0, 0)).unwrap();
        let bystander = w.spawn(block(101, 100)).unwrap();
        let enemy = w.spawn(block(99, 100)).unwrap();
        let b = w
            .spawn(bullet(shooter, 100, 100).with_targets(vec![enemy]).with_hits(HitBudget::Unlimited))
            .unwrap();
        let hits = w.check_bullet(b);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, enemy);
        assert!(w.is_alive(bystander));
    }

    #[test]
    fn budget_limits_hits_per_check() {
        let mut w = world();
        let shooter = w.spawn(block(0, 0)).unwrap();
        w.spawn(block(101, 100)).unwrap();
        w.spawn(block(99, 100)).unwrap();
        w.spawn(block(100, 101)).unwrap();

        let two = w.spawn(bullet(shooter, 100, 100).with_hits(HitBudget::Remaining(2))).unwrap();
        assert_eq!(w.check_bullet(two).len(), 2);
        assert!(!w.is_alive(two));

        let piercing = w.spawn(bullet(shooter, 100, 100).with_hits(HitBudget::Unlimited)).unwrap();
        assert_eq!(w.check_bullet(piercing).len(), 3);
        assert!(w.is_alive(piercing));
    }

    #[test]
    fn damage_kills_depleted_targets() {
        let mut w = world();
        let shooter = w.spawn(block(0, 0)).unwrap();
        let dummy = w.spawn(block(100, 100).with_health(2)).unwrap();

        let b = w.spawn(bullet(shooter, 100, 100).with_damage(1)).unwrap();
        assert!(w.check_bullet(b)[0].damaged);
        assert_eq!(w.get(dummy).unwrap().health().map(|h| h.current), Some(1));
        assert!(w.is_alive(dummy));

        let b = w.spawn(bullet(shooter, 100, 100).with_damage(1)).unwrap();
        w.check_bullet(b);
        assert!(!w.is_alive(dummy));
    }

    #[test]
    fn fire_centres_bullet_on_shooter() {
        let mut w = world();
        let shooter = w.spawn(block(100, 100)).unwrap();
        let b = w
            .fire(shooter, Entity::builder().with_fill(Color::YELLOW, 2, 4).with_velocity(0, -10))
            .unwrap();
        let e = w.get(b).unwrap();
        assert_eq!(e.pos, IVec2::new(104, 103));
        assert_eq!(e.kind(), EntityKind::Bullet);
        assert_eq!(e.combat().unwrap().shooter, shooter);
    }

    #[test]
    fn firing_from_a_dead_shooter_fails() {
        let mut w = world();
        let shooter = w.spawn(block(100, 100)).unwrap();
        w.kill(shooter);
        let err = w.fire(shooter, Entity::builder().with_fill(Color::YELLOW, 2, 2));
        assert!(matches!(err, Err(EngineError::EntityNotFound(id)) if id == shooter));
    }

    #[test]
    fn moving_bullets_hit_during_update() {
        let mut w = world();
        let shooter = w.spawn(block(100, 200)).unwrap();
        let dummy = w.spawn(block(104, 180).with_health(1)).unwrap();
        let b = w
            .fire(shooter, Entity::builder().with_fill(Color::YELLOW, 2, 2).with_velocity(0, -20).with_damage(1))
            .unwrap();
        let hits = w.update_projectiles();
        assert_eq!(hits, vec![Hit { bullet: b, target: dummy, damaged: true }]);
        assert!(!w.is_alive(dummy));
        assert!(!w.is_alive(b));
    }

    // -- drawing ------------------------------------------------------------

    #[test]
    fn blit_all_skips_dead_entities() {
        let mut w = world();
        w.spawn(Entity::builder().with_fill(Color::GREEN, 4, 4).at(0, 0)).unwrap();
        let dead = w.spawn(Entity::builder().with_fill(Color::RED, 4, 4).at(10, 0)).unwrap();
        w.kill(dead);
        let mut canvas = Canvas::new(320, 240);
        canvas.fill(Color::BLACK);
        w.blit_all(&mut canvas);
        assert_eq!(canvas.pixel(1, 1), Some(Color::GREEN));
        assert_eq!(canvas.pixel(11, 1), Some(Color::BLACK));

        canvas.fill(Color::BLACK);
        w.blit_list(&[dead], &mut canvas);
        assert_eq!(canvas.pixel(1, 1), Some(Color::BLACK));
    }
}
