//! Enemy archetypes and their per-tick behaviors

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Body, PlatformContact};
use super::boss::Boss;
use super::collision::Aabb;
use super::platform::Platform;
use super::projectile::{Projectile, TargetRef};
use super::state::{EntityIds, GameEvent};
use crate::Rgb;
use crate::consts::*;

const MISSILE_COLOR: Rgb = Rgb(255, 100, 100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Basic,
    Runner,
    Tank,
    Shooter,
    Boss,
}

/// Starting numbers per archetype
#[derive(Debug, Clone, Copy)]
pub struct EnemyStats {
    pub size: f32,
    pub health: i32,
    pub move_speed: f32,
    pub shoot_delay: f32,
    pub points: u32,
}

impl EnemyKind {
    pub fn stats(self) -> EnemyStats {
        let base = EnemyStats {
            size: ENEMY_SIZE,
            health: 100,
            move_speed: 200.0,
            shoot_delay: 1.0,
            points: 100,
        };
        match self {
            EnemyKind::Basic => base,
            EnemyKind::Runner => EnemyStats {
                health: 50,
                move_speed: 300.0,
                points: 75,
                ..base
            },
            EnemyKind::Tank => EnemyStats {
                size: TANK_SIZE,
                health: 200,
                move_speed: 100.0,
                points: 150,
                ..base
            },
            EnemyKind::Shooter => EnemyStats {
                health: 75,
                move_speed: 150.0,
                shoot_delay: 0.75,
                points: 125,
                ..base
            },
            EnemyKind::Boss => EnemyStats {
                size: BOSS_SIZE,
                health: BOSS_MAX_HEALTH,
                move_speed: BOSS_MOVE_SPEED,
                shoot_delay: BOSS_SHOOT_DELAY,
                points: BOSS_POINTS,
            },
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            EnemyKind::Basic => Rgb(150, 150, 150),
            EnemyKind::Runner => Rgb(200, 50, 50),
            EnemyKind::Tank => Rgb(50, 150, 50),
            EnemyKind::Shooter => Rgb(50, 50, 200),
            EnemyKind::Boss => Rgb(120, 0, 120),
        }
    }
}

/// Everything an enemy may read or produce during its update.
///
/// Spawned projectiles and events are queued here and merged by the
/// orchestrator; enemies never touch the top-level collections.
pub struct EnemyCtx<'a> {
    pub player_pos: Vec2,
    pub platforms: &'a [Platform],
    pub ids: &'a mut EntityIds,
    pub spawned: &'a mut Vec<Projectile>,
    pub rng: &'a mut Pcg32,
    pub events: &'a mut Vec<GameEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub health: i32,
    pub max_health: i32,
    pub move_speed: f32,
    pub shoot_cooldown: f32,
    pub shoot_delay: f32,
    pub points: u32,
    pub facing_right: bool,
    /// Hit flash countdown
    pub damaged_timer: f32,
    pub elapsed: f32,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, kind: EnemyKind) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            body: Body::new(pos, Vec2::splat(stats.size)),
            health: stats.health,
            max_health: stats.health,
            move_speed: stats.move_speed,
            shoot_cooldown: 0.0,
            shoot_delay: stats.shoot_delay,
            points: stats.points,
            facing_right: true,
            damaged_timer: 0.0,
            elapsed: 0.0,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.body.aabb()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn is_flashing(&self) -> bool {
        self.damaged_timer > 0.0
    }

    /// Dropped out of the world below the screen
    pub fn fell_out(&self) -> bool {
        self.body.pos.y > SCREEN_HEIGHT + ENEMY_FALL_OUT_MARGIN
    }

    /// Apply damage; returns whether this killed the enemy.
    ///
    /// Removal and scoring are up to the caller.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health = (self.health - amount).max(0);
        self.damaged_timer = ENEMY_FLASH_DURATION;
        self.is_dead()
    }

    pub(crate) fn tick_timers(&mut self, dt: f32) {
        self.elapsed += dt;
        if self.damaged_timer > 0.0 {
            self.damaged_timer -= dt;
        }
        if self.shoot_cooldown > 0.0 {
            self.shoot_cooldown -= dt;
        }
    }

    pub fn update(&mut self, dt: f32, ctx: &mut EnemyCtx) {
        self.tick_timers(dt);
        match self.kind {
            EnemyKind::Basic | EnemyKind::Boss => {
                self.pursue(dt, ctx.player_pos, ctx.platforms, BASIC_STOP_DISTANCE)
            }
            EnemyKind::Runner => self.run(dt, ctx.player_pos, ctx.platforms),
            EnemyKind::Tank => self.hold_band(dt, ctx.player_pos, ctx.platforms),
            EnemyKind::Shooter => self.snipe(dt, ctx),
        }
        self.step_physics(dt, ctx.platforms);
    }

    fn probe_x(&self, dt: f32, dir: f32) -> f32 {
        let edge = self.body.pos.x + self.body.vel.x * dt + dir * self.body.size.x * 0.5;
        if dir > 0.0 { edge } else { edge - PROBE_WIDTH }
    }

    /// Is there a platform under the leading edge of next tick's position?
    pub fn has_ground_ahead(&self, dt: f32, platforms: &[Platform]) -> bool {
        let dir = if self.body.vel.x >= 0.0 { 1.0 } else { -1.0 };
        let probe = Aabb::from_top_left(
            Vec2::new(self.probe_x(dt, dir), self.body.feet()),
            Vec2::new(PROBE_WIDTH, PROBE_DEPTH),
        );
        platforms
            .iter()
            .any(|p| p.is_active && p.aabb().overlaps(&probe))
    }

    /// Is there a wall in front, between head and feet?
    pub fn has_wall_ahead(&self, dt: f32, platforms: &[Platform]) -> bool {
        let dir = if self.body.vel.x >= 0.0 { 1.0 } else { -1.0 };
        let top = self.body.pos.y - self.body.size.y * 0.5;
        let probe = Aabb::from_top_left(
            Vec2::new(self.probe_x(dt, dir), top),
            Vec2::new(PROBE_WIDTH, self.body.size.y - 2.0),
        );
        platforms
            .iter()
            .any(|p| p.is_active && p.aabb().overlaps(&probe))
    }

    /// Head for the target unless within `stop_distance`; turn back at ledges
    pub(crate) fn pursue(
        &mut self,
        dt: f32,
        target: Vec2,
        platforms: &[Platform],
        stop_distance: f32,
    ) {
        let delta = target - self.body.pos;
        let dist = delta.length();
        if dist <= stop_distance {
            self.body.vel.x = 0.0;
            return;
        }
        self.body.vel.x = delta.x / dist * self.move_speed;
        if !self.has_ground_ahead(dt, platforms) {
            self.body.vel.x = -self.body.vel.x;
        }
    }

    fn run(&mut self, dt: f32, target: Vec2, platforms: &[Platform]) {
        let delta = target - self.body.pos;
        let dist = delta.length();
        if dist <= RUNNER_STOP_DISTANCE {
            self.body.vel.x = 0.0;
            return;
        }
        self.body.vel.x = delta.x / dist * self.move_speed;
        let wall = self.has_wall_ahead(dt, platforms);
        let ground = self.has_ground_ahead(dt, platforms);
        if self.body.on_ground && (wall || !ground) {
            self.body.vel.y = RUNNER_JUMP_VEL;
            self.body.on_ground = false;
        } else if !ground {
            self.body.vel.x = -self.body.vel.x;
        }
    }

    /// Stop instead of stepping off a ledge
    fn halt_at_ledge(&mut self, dt: f32, platforms: &[Platform]) {
        if self.body.vel.x != 0.0 && !self.has_ground_ahead(dt, platforms) {
            self.body.vel.x = 0.0;
        }
    }

    fn hold_band(&mut self, dt: f32, target: Vec2, platforms: &[Platform]) {
        let dx = target.x - self.body.pos.x;
        let toward = if dx > 0.0 { 1.0 } else { -1.0 };
        let (near, far) = TANK_BAND;
        self.body.vel.x = if dx.abs() > far {
            toward * self.move_speed
        } else if dx.abs() < near {
            -toward * self.move_speed
        } else {
            0.0
        };
        self.halt_at_ledge(dt, platforms);
    }

    fn snipe(&mut self, dt: f32, ctx: &mut EnemyCtx) {
        let delta = ctx.player_pos - self.body.pos;
        let dist = delta.length();
        let (near, far) = SHOOTER_BAND;
        self.facing_right = delta.x > 0.0;
        if dist > far {
            self.body.vel.x = delta.x / dist * self.move_speed;
        } else if dist < near && dist > 0.0 {
            self.body.vel.x = -delta.x / dist * self.move_speed;
        } else {
            self.body.vel.x = 0.0;
            if self.shoot_cooldown <= 0.0 {
                self.shoot(ctx);
            }
        }
        self.halt_at_ledge(dt, ctx.platforms);
    }

    fn shoot(&mut self, ctx: &mut EnemyCtx) {
        let dir = (ctx.player_pos - self.body.pos).normalize_or(Vec2::X);
        ctx.spawned.push(Projectile::homing(
            ctx.ids.next_id(),
            self.body.pos,
            dir * MISSILE_SPEED,
            MISSILE_COLOR,
            TargetRef::Player,
        ));
        self.shoot_cooldown = self.shoot_delay;
    }

    /// Gravity, motion, facing and platform resolution
    pub(crate) fn step_physics(&mut self, dt: f32, platforms: &[Platform]) -> Vec<PlatformContact> {
        self.body.integrate(dt, ENEMY_MAX_FALL_SPEED);
        // Shooters face their prey, set while aiming
        if self.kind != EnemyKind::Shooter {
            if self.body.vel.x > 0.0 {
                self.facing_right = true;
            } else if self.body.vel.x < 0.0 {
                self.facing_right = false;
            }
        }
        self.body.resolve_platforms(platforms)
    }
}

/// A top-level hostile: a regular enemy or a boss (which owns minions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Foe {
    Regular(Enemy),
    Boss(Box<Boss>),
}

impl Foe {
    pub fn base(&self) -> &Enemy {
        match self {
            Foe::Regular(enemy) => enemy,
            Foe::Boss(boss) => &boss.enemy,
        }
    }

    pub fn base_mut(&mut self) -> &mut Enemy {
        match self {
            Foe::Regular(enemy) => enemy,
            Foe::Boss(boss) => &mut boss.enemy,
        }
    }

    pub fn id(&self) -> u32 {
        self.base().id
    }

    pub fn kind(&self) -> EnemyKind {
        self.base().kind
    }

    pub fn is_dead(&self) -> bool {
        self.base().is_dead()
    }

    pub fn update(&mut self, dt: f32, ctx: &mut EnemyCtx) {
        match self {
            Foe::Regular(enemy) => enemy.update(dt, ctx),
            Foe::Boss(boss) => boss.update(dt, ctx),
        }
    }

    /// Route damage through the boss shield when there is one
    pub fn take_damage(&mut self, amount: i32) -> bool {
        match self {
            Foe::Regular(enemy) => enemy.take_damage(amount),
            Foe::Boss(boss) => boss.take_damage(amount),
        }
    }

    pub fn minions(&self) -> &[Enemy] {
        match self {
            Foe::Regular(_) => &[],
            Foe::Boss(boss) => &boss.minions,
        }
    }

    pub fn minions_mut(&mut self) -> &mut [Enemy] {
        match self {
            Foe::Regular(_) => &mut [],
            Foe::Boss(boss) => &mut boss.minions,
        }
    }

    /// Drop dead minions; returns them so the caller can award points
    pub fn reap_minions(&mut self) -> Vec<Enemy> {
        match self {
            Foe::Regular(_) => Vec::new(),
            Foe::Boss(boss) => boss.reap_minions(),
        }
    }
}
