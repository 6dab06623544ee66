//! Multi-phase boss: shield, minions and a cycling attack pattern
//!
//! The boss is an `Enemy` (kind `Boss`) plus its own state. Phase is derived
//! from the health fraction and only ever moves forward; each forward step
//! refills the shield and calls in minions straight away. Entering phase 3
//! turns on rage once.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyCtx, EnemyKind};
use super::projectile::{Projectile, TargetRef};
use super::state::GameEvent;
use crate::Rgb;
use crate::consts::*;

const BARRAGE_COLOR: Rgb = Rgb(255, 50, 50);
const SHOCKWAVE_COLOR: Rgb = Rgb(255, 140, 0);
const SHOCKWAVE_PARTICLES: u32 = 30;

/// Attack patterns in cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossAttack {
    Barrage,
    Charge,
    GroundPound,
}

impl BossAttack {
    fn from_index(index: u8) -> Self {
        match index % 3 {
            0 => BossAttack::Barrage,
            1 => BossAttack::Charge,
            _ => BossAttack::GroundPound,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub enemy: Enemy,
    /// 1..=3, never decreases
    pub phase: u8,
    /// Index of the last dispatched attack, cycles 0, 1, 2
    pub attack_pattern: u8,
    pub attack_timer: f32,
    pub shield_active: bool,
    pub shield_health: i32,
    pub shield_max: i32,
    /// Owned outright; never in the top-level foe list
    pub minions: Vec<Enemy>,
    pub minion_spawn_timer: f32,
    pub rage_mode: bool,
    /// x the current charge is heading for
    pub charge_target: Option<f32>,
    /// Airborne from a ground-pound launch
    pub pounding: bool,
}

/// Phase for a health fraction: >66% is 1, >33% is 2, else 3
pub fn phase_for(health: i32, max_health: i32) -> u8 {
    let fraction = health as f32 / max_health.max(1) as f32;
    if fraction > 0.66 {
        1
    } else if fraction > 0.33 {
        2
    } else {
        3
    }
}

impl Boss {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            enemy: Enemy::new(id, pos, EnemyKind::Boss),
            phase: 1,
            attack_pattern: 0,
            attack_timer: 0.0,
            shield_active: false,
            shield_health: BOSS_SHIELD_MAX,
            shield_max: BOSS_SHIELD_MAX,
            minions: Vec::new(),
            minion_spawn_timer: 0.0,
            rage_mode: false,
            charge_target: None,
            pounding: false,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.enemy.body.pos
    }

    pub fn shield_fraction(&self) -> f32 {
        if !self.shield_active {
            return 0.0;
        }
        (self.shield_health as f32 / self.shield_max.max(1) as f32).clamp(0.0, 1.0)
    }

    pub fn live_minions(&self) -> usize {
        self.minions.iter().filter(|m| !m.is_dead()).count()
    }

    /// While shielded, damage drains the shield and never kills
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.shield_active {
            self.shield_health = (self.shield_health - amount).max(0);
            self.enemy.damaged_timer = ENEMY_FLASH_DURATION;
            false
        } else {
            self.enemy.take_damage(amount)
        }
    }

    pub fn update(&mut self, dt: f32, ctx: &mut EnemyCtx) {
        self.enemy.tick_timers(dt);

        let charge_from = self.charge_target.map(|tx| tx - self.enemy.body.pos.x);
        match self.charge_target {
            Some(tx) => {
                let dir = if tx > self.enemy.body.pos.x { 1.0 } else { -1.0 };
                self.enemy.body.vel.x = dir * BOSS_CHARGE_SPEED;
            }
            None => {
                self.enemy
                    .pursue(dt, ctx.player_pos, ctx.platforms, BASIC_STOP_DISTANCE)
            }
        }

        let contacts = self.enemy.step_physics(dt, ctx.platforms);

        if let (Some(tx), Some(before)) = (self.charge_target, charge_from) {
            let after = tx - self.enemy.body.pos.x;
            let blocked = contacts.iter().any(|c| c.contact.is_horizontal());
            if blocked || before * after <= 0.0 {
                self.charge_target = None;
            }
        }

        if self.pounding && self.enemy.body.on_ground {
            self.pounding = false;
            let feet = Vec2::new(self.enemy.body.pos.x, self.enemy.body.feet());
            ctx.events.push(GameEvent::Explosion {
                pos: feet,
                color: SHOCKWAVE_COLOR,
                count: SHOCKWAVE_PARTICLES,
            });
        }

        self.attack_timer -= dt;
        if self.attack_timer <= 0.0 {
            self.start_new_attack(ctx);
        }

        self.minion_spawn_timer -= dt;
        if self.minion_spawn_timer <= 0.0 && self.live_minions() < BOSS_MAX_MINIONS {
            self.spawn_minion(ctx);
        }

        if self.shield_active && self.shield_health <= 0 {
            self.shield_active = false;
            self.enemy.take_damage(BOSS_SHIELD_BREAK_DAMAGE);
            ctx.events.push(GameEvent::BossShieldBroken);
            log::debug!("Boss shield broken, health {}", self.enemy.health);
        }

        let current = phase_for(self.enemy.health, self.enemy.max_health);
        if current > self.phase {
            self.phase = current;
            self.on_phase_change(ctx);
        }

        for minion in &mut self.minions {
            minion.update(dt, ctx);
        }
        self.minions.retain(|m| !m.is_dead() && !m.fell_out());
    }

    fn on_phase_change(&mut self, ctx: &mut EnemyCtx) {
        if self.phase == 3 && !self.rage_mode {
            self.rage_mode = true;
            self.enemy.move_speed = BOSS_RAGE_MOVE_SPEED;
            self.enemy.shoot_delay *= BOSS_RAGE_SHOOT_FACTOR;
        }
        self.shield_active = true;
        self.shield_health = self.shield_max;
        self.minion_spawn_timer = 0.0;
        ctx.events.push(GameEvent::BossPhaseChanged { phase: self.phase });
        log::debug!("Boss entered phase {} (rage: {})", self.phase, self.rage_mode);
    }

    fn start_new_attack(&mut self, ctx: &mut EnemyCtx) {
        self.attack_pattern = (self.attack_pattern + 1) % 3;
        let attack = BossAttack::from_index(self.attack_pattern);
        match attack {
            BossAttack::Barrage => self.fire_barrage(ctx),
            BossAttack::Charge => self.charge_target = Some(ctx.player_pos.x),
            BossAttack::GroundPound => {
                self.enemy.body.vel.y = BOSS_POUND_VEL_Y;
                self.enemy.body.on_ground = false;
                self.pounding = true;
            }
        }
        self.attack_timer = BOSS_ATTACK_TIMERS[self.attack_pattern as usize];
        log::trace!("Boss attack {attack:?}, next in {:.2}s", self.attack_timer);
    }

    /// Fan of homing missiles across a quarter circle centred on the player
    fn fire_barrage(&mut self, ctx: &mut EnemyCtx) {
        let origin = self.enemy.body.pos;
        let to_player = ctx.player_pos - origin;
        let center = to_player.y.atan2(to_player.x);
        let step = BOSS_BARRAGE_ARC / (BOSS_BARRAGE_COUNT - 1) as f32;
        let first = center - BOSS_BARRAGE_ARC * 0.5;
        for i in 0..BOSS_BARRAGE_COUNT {
            let angle = first + step * i as f32;
            ctx.spawned.push(Projectile::homing(
                ctx.ids.next_id(),
                origin,
                Vec2::new(angle.cos(), angle.sin()) * MISSILE_SPEED,
                BARRAGE_COLOR,
                TargetRef::Player,
            ));
        }
    }

    fn spawn_minion(&mut self, ctx: &mut EnemyCtx) {
        let offset = ctx.rng.random_range(-100.0..=100.0f32);
        let kind = if ctx.rng.random_bool(0.5) {
            EnemyKind::Shooter
        } else {
            EnemyKind::Runner
        };
        let pos = self.enemy.body.pos + Vec2::new(offset, -50.0);
        self.minions.push(Enemy::new(ctx.ids.next_id(), pos, kind));
        self.minion_spawn_timer = BOSS_MINION_INTERVAL;
    }

    /// Remove dead minions and hand them back
    pub fn reap_minions(&mut self) -> Vec<Enemy> {
        let (dead, alive): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut self.minions)
            .into_iter()
            .partition(|m| m.is_dead());
        self.minions = alive;
        dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize_angle;
    use crate::sim::enemy::tests::{DT, Harness};
    use crate::sim::platform::{Platform, PlatformKind};

    fn arena() -> Vec<Platform> {
        vec![Platform::new(
            0,
            Vec2::new(0.0, 750.0),
            Vec2::new(SCREEN_WIDTH, 50.0),
            PlatformKind::Normal,
        )]
    }

    /// Boss standing on the arena floor, with attacks and minions parked
    fn quiet_boss() -> Boss {
        let mut boss = Boss::new(1, Vec2::new(600.0, 710.0));
        boss.enemy.body.on_ground = true;
        boss.attack_timer = 100.0;
        boss.minion_spawn_timer = 100.0;
        boss
    }

    const PLAYER: Vec2 = Vec2::new(1000.0, 720.0);

    #[test]
    fn test_phase_thresholds() {
        assert_eq!(phase_for(500, 500), 1);
        assert_eq!(phase_for(331, 500), 1);
        assert_eq!(phase_for(330, 500), 2);
        assert_eq!(phase_for(166, 500), 2);
        assert_eq!(phase_for(165, 500), 3);
        assert_eq!(phase_for(0, 500), 3);
    }

    #[test]
    fn test_shield_absorbs_damage() {
        let mut boss = quiet_boss();
        boss.shield_active = true;
        for _ in 0..10 {
            assert!(!boss.take_damage(400));
        }
        assert_eq!(boss.enemy.health, BOSS_MAX_HEALTH);
        assert_eq!(boss.shield_health, 0);
    }

    #[test]
    fn test_shield_break_applies_bonus_once() {
        let platforms = arena();
        let mut harness = Harness::new();
        let mut boss = quiet_boss();
        boss.shield_active = true;
        boss.shield_health = 20;
        boss.take_damage(50);
        assert_eq!(boss.enemy.health, BOSS_MAX_HEALTH);

        for _ in 0..5 {
            boss.update(DT, &mut harness.ctx(PLAYER, &platforms));
        }
        assert!(!boss.shield_active);
        assert_eq!(boss.enemy.health, BOSS_MAX_HEALTH - BOSS_SHIELD_BREAK_DAMAGE);
        let breaks = harness
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::BossShieldBroken))
            .count();
        assert_eq!(breaks, 1);
    }

    #[test]
    fn test_phase_is_monotonic_and_rage_applies_once() {
        let platforms = arena();
        let mut harness = Harness::new();
        let mut boss = quiet_boss();
        let mut visited = vec![boss.phase];

        let mut health = BOSS_MAX_HEALTH;
        while health > 10 {
            health -= 10;
            boss.enemy.health = boss.enemy.health.min(health);
            boss.shield_active = false;
            boss.update(DT, &mut harness.ctx(PLAYER, &platforms));
            if *visited.last().unwrap() != boss.phase {
                visited.push(boss.phase);
            }
        }
        assert_eq!(visited, vec![1, 2, 3]);
        assert!(boss.rage_mode);
        assert_eq!(boss.enemy.move_speed, BOSS_RAGE_MOVE_SPEED);
        assert_eq!(boss.enemy.shoot_delay, BOSS_SHOOT_DELAY * BOSS_RAGE_SHOOT_FACTOR);

        let changes: Vec<u8> = harness
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::BossPhaseChanged { phase } => Some(*phase),
                _ => None,
            })
            .collect();
        assert_eq!(changes, vec![2, 3]);
    }

    #[test]
    fn test_phase_change_refills_shield_and_calls_minions() {
        let platforms = arena();
        let mut harness = Harness::new();
        let mut boss = quiet_boss();
        boss.enemy.health = 300;
        boss.update(DT, &mut harness.ctx(PLAYER, &platforms));
        assert_eq!(boss.phase, 2);
        assert!(boss.shield_active);
        assert_eq!(boss.shield_health, boss.shield_max);
        assert!(boss.minions.is_empty());

        boss.update(DT, &mut harness.ctx(PLAYER, &platforms));
        assert_eq!(boss.minions.len(), 1);
        assert!(boss.minion_spawn_timer > 9.0);
    }

    #[test]
    fn test_barrage_fans_five_missiles_over_quarter_circle() {
        let platforms = arena();
        let mut harness = Harness::new();
        let mut boss = quiet_boss();
        boss.attack_pattern = 2;
        boss.attack_timer = 0.0;
        boss.update(DT, &mut harness.ctx(PLAYER, &platforms));

        assert_eq!(boss.attack_pattern, 0);
        assert_eq!(harness.spawned.len(), BOSS_BARRAGE_COUNT);
        let bearing = {
            let to = PLAYER - harness.spawned[0].pos;
            to.y.atan2(to.x)
        };
        let offsets: Vec<f32> = harness
            .spawned
            .iter()
            .map(|m| normalize_angle(m.vel.y.atan2(m.vel.x) - bearing))
            .collect();
        let quarter = std::f32::consts::FRAC_PI_4;
        assert!((offsets[0] + quarter).abs() < 0.05);
        assert!(offsets[2].abs() < 0.05);
        assert!((offsets[4] - quarter).abs() < 0.05);
        assert!((boss.attack_timer - BOSS_ATTACK_TIMERS[0]).abs() < 1e-6);
    }

    #[test]
    fn test_charge_runs_at_charge_speed_then_ends() {
        let platforms = arena();
        let mut harness = Harness::new();
        let mut boss = quiet_boss();
        boss.attack_pattern = 0;
        boss.attack_timer = 0.0;
        boss.update(DT, &mut harness.ctx(Vec2::new(800.0, 720.0), &platforms));
        assert_eq!(boss.charge_target, Some(800.0));
        assert_eq!(boss.attack_timer, BOSS_ATTACK_TIMERS[1]);

        boss.update(DT, &mut harness.ctx(Vec2::new(800.0, 720.0), &platforms));
        assert_eq!(boss.enemy.body.vel.x, BOSS_CHARGE_SPEED);

        for _ in 0..40 {
            boss.update(DT, &mut harness.ctx(Vec2::new(800.0, 720.0), &platforms));
        }
        assert_eq!(boss.charge_target, None);
        assert!((boss.pos().x - 800.0).abs() < 60.0);
    }

    #[test]
    fn test_ground_pound_lands_with_shockwave() {
        let platforms = arena();
        let mut harness = Harness::new();
        let mut boss = quiet_boss();
        boss.attack_pattern = 1;
        boss.attack_timer = 0.0;
        boss.update(DT, &mut harness.ctx(PLAYER, &platforms));
        assert!(boss.pounding);
        assert_eq!(boss.enemy.body.vel.y, BOSS_POUND_VEL_Y);

        for _ in 0..90 {
            boss.update(DT, &mut harness.ctx(PLAYER, &platforms));
        }
        assert!(!boss.pounding);
        assert!(
            harness
                .events
                .iter()
                .any(|e| matches!(
                    e,
                    GameEvent::Explosion { color, .. } if *color == SHOCKWAVE_COLOR
                ))
        );
    }

    #[test]
    fn test_rage_keeps_attack_timers() {
        let platforms = arena();
        let mut harness = Harness::new();
        let mut boss = quiet_boss();
        boss.enemy.health = 100;
        boss.update(DT, &mut harness.ctx(PLAYER, &platforms));
        assert!(boss.rage_mode);

        // One full cycle: charge, ground pound, barrage
        for expected_pattern in [1, 2, 0] {
            boss.attack_timer = 0.0;
            boss.pounding = false;
            boss.charge_target = None;
            boss.update(DT, &mut harness.ctx(PLAYER, &platforms));
            assert_eq!(boss.attack_pattern, expected_pattern);
            assert_eq!(boss.attack_timer, BOSS_ATTACK_TIMERS[expected_pattern as usize]);
        }
    }

    #[test]
    fn test_minions_capped_at_three() {
        let platforms = arena();
        let mut harness = Harness::new();
        let mut boss = quiet_boss();
        for _ in 0..10 {
            boss.minion_spawn_timer = 0.0;
            boss.update(DT, &mut harness.ctx(PLAYER, &platforms));
        }
        assert_eq!(boss.minions.len(), BOSS_MAX_MINIONS);
        assert!(
            boss.minions
                .iter()
                .all(|m| matches!(m.kind, EnemyKind::Shooter | EnemyKind::Runner))
        );
    }

    #[test]
    fn test_reap_returns_only_dead_minions() {
        let mut boss = quiet_boss();
        boss.minions.push(Enemy::new(10, Vec2::new(500.0, 700.0), EnemyKind::Runner));
        boss.minions.push(Enemy::new(11, Vec2::new(700.0, 700.0), EnemyKind::Shooter));
        boss.minions[0].take_damage(100);
        let dead = boss.reap_minions();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].id, 10);
        assert_eq!(boss.minions.len(), 1);
    }
}
