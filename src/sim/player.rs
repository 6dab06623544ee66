//! Player controller: movement, jumps, dash, wall slide, shooting and power-ups

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, PlatformContact};
use super::collision::Contact;
use super::platform::Platform;
use super::projectile::Projectile;
use super::state::EntityIds;
use crate::Rgb;
use crate::consts::*;

const BULLET_COLOR: Rgb = Rgb(0, 200, 255);
const EXPLOSIVE_COLOR: Rgb = Rgb(255, 165, 0);

/// Horizontal movement intent for this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveIntent {
    #[default]
    None,
    Left,
    Right,
}

/// Per-tick controls the player consumes during `update`
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerControls {
    pub intent: MoveIntent,
    /// Jump button is down (drives wall jumps)
    pub jump_held: bool,
    /// Dash requested this tick
    pub dash: bool,
}

/// Power-ups that run on a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimedPower {
    Speed,
    Jump,
    Shield,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePower {
    pub kind: TimedPower,
    pub remaining: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub health: i32,
    pub max_health: i32,
    pub facing_right: bool,
    /// Current move speed and jump power (power-ups change these)
    pub move_speed: f32,
    pub jump_power: f32,
    pub invulnerable: bool,
    pub invulnerable_timer: f32,
    pub can_double_jump: bool,
    pub dash_available: bool,
    pub dashing: bool,
    pub dash_timer: f32,
    /// Counts down from dash start
    pub dash_cooldown: f32,
    pub wall_sliding: bool,
    pub wall_jump_cooldown: f32,
    pub shoot_cooldown: f32,
    pub explosive_cooldown: f32,
    /// At most one power at a time
    pub power: Option<ActivePower>,
    /// Seconds since spawn, drives blink and run-cycle visuals
    pub elapsed: f32,
    pub run_frame: u8,
    run_timer: f32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            body: Body::new(pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            facing_right: true,
            move_speed: PLAYER_MOVE_SPEED,
            jump_power: PLAYER_JUMP_POWER,
            invulnerable: false,
            invulnerable_timer: 0.0,
            can_double_jump: true,
            dash_available: true,
            dashing: false,
            dash_timer: 0.0,
            dash_cooldown: 0.0,
            wall_sliding: false,
            wall_jump_cooldown: 0.0,
            shoot_cooldown: 0.0,
            explosive_cooldown: 0.0,
            power: None,
            elapsed: 0.0,
            run_frame: 0,
            run_timer: 0.0,
        }
    }

    /// Spawn point at the start of every level
    pub fn spawn_point() -> Vec2 {
        Vec2::new(SCREEN_WIDTH * 0.5, SCREEN_HEIGHT - 150.0)
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Set horizontal velocity from intent; ignored while dashing
    pub fn apply_movement_intent(&mut self, intent: MoveIntent) {
        if self.dashing {
            return;
        }
        match intent {
            MoveIntent::Left => {
                self.body.vel.x = -self.move_speed;
                self.facing_right = false;
            }
            MoveIntent::Right => {
                self.body.vel.x = self.move_speed;
                self.facing_right = true;
            }
            MoveIntent::None => self.body.vel.x = 0.0,
        }
    }

    /// Ground jump, else double jump.
    ///
    /// While wall-sliding this does nothing: the wall jump fires during
    /// collision resolution, where the wall side is known.
    pub fn jump(&mut self) {
        if self.body.on_ground {
            self.body.vel.y = self.jump_power;
            self.body.on_ground = false;
        } else if !self.wall_sliding && self.can_double_jump {
            self.body.vel.y = self.jump_power * DOUBLE_JUMP_FACTOR;
            self.can_double_jump = false;
        }
    }

    /// Dash recharge, 0.0 right after a dash up to 1.0 when available
    pub fn dash_ready(&self) -> f32 {
        if self.dash_available {
            1.0
        } else {
            (1.0 - self.dash_cooldown / DASH_COOLDOWN).clamp(0.0, 1.0)
        }
    }

    /// Start a dash in the facing direction if one is available
    pub fn dash(&mut self) -> bool {
        if !self.dash_available || self.dashing {
            return false;
        }
        self.dashing = true;
        self.dash_available = false;
        self.dash_timer = DASH_DURATION;
        self.dash_cooldown = DASH_COOLDOWN;
        self.body.vel.x = if self.facing_right {
            DASH_POWER
        } else {
            -DASH_POWER
        };
        self.body.vel.y = DASH_KICK_VEL_Y;
        true
    }

    fn muzzle(&self) -> (Vec2, f32) {
        let dir = if self.facing_right { 1.0 } else { -1.0 };
        let pos = self.body.pos + Vec2::new(dir * self.body.size.x * 0.5, CHEST_OFFSET_Y);
        (pos, dir)
    }

    /// Fire a bullet from the chest if the cooldown has elapsed
    pub fn shoot(&mut self, ids: &mut EntityIds) -> Option<Projectile> {
        if self.shoot_cooldown > 0.0 {
            return None;
        }
        let (pos, dir) = self.muzzle();
        self.shoot_cooldown = SHOOT_DELAY;
        Some(Projectile::bullet(
            ids.next_id(),
            pos,
            Vec2::new(dir * BULLET_SPEED, 0.0),
            BULLET_COLOR,
        ))
    }

    /// Secondary fire: an explosive round on its own cooldown
    pub fn fire_explosive(&mut self, ids: &mut EntityIds) -> Option<Projectile> {
        if self.explosive_cooldown > 0.0 {
            return None;
        }
        let (pos, dir) = self.muzzle();
        self.explosive_cooldown = EXPLOSIVE_SHOOT_DELAY;
        Some(Projectile::explosive(
            ids.next_id(),
            pos,
            Vec2::new(dir * BULLET_SPEED, 0.0),
            EXPLOSIVE_COLOR,
        ))
    }

    /// Take a hit. Returns `false` when invulnerable and nothing happened.
    pub fn take_damage(&mut self) -> bool {
        if self.invulnerable {
            return false;
        }
        self.health = (self.health - PLAYER_HIT_DAMAGE).max(0);
        self.invulnerable = true;
        self.invulnerable_timer = INVULNERABLE_DURATION;
        self.body.vel.y = KNOCKBACK_VEL_Y;
        true
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount.max(0)).min(self.max_health);
    }

    /// Replace any active power with `kind` for `duration` seconds
    pub fn activate_power(&mut self, kind: TimedPower, duration: f32) {
        self.deactivate_power();
        match kind {
            TimedPower::Speed => self.move_speed = PLAYER_MOVE_SPEED * SPEED_POWER_FACTOR,
            TimedPower::Jump => self.jump_power = PLAYER_JUMP_POWER * JUMP_POWER_FACTOR,
            TimedPower::Shield => {
                self.invulnerable = true;
                self.invulnerable_timer = duration;
            }
        }
        self.power = Some(ActivePower {
            kind,
            remaining: duration,
        });
        log::debug!("Power {kind:?} active for {duration:.1}s");
    }

    /// Drop the active power, restoring base stats
    pub fn deactivate_power(&mut self) {
        if let Some(active) = self.power.take() {
            match active.kind {
                TimedPower::Speed => self.move_speed = PLAYER_MOVE_SPEED,
                TimedPower::Jump => self.jump_power = PLAYER_JUMP_POWER,
                TimedPower::Shield => {}
            }
        }
    }

    fn update_timers(&mut self, dt: f32) {
        if self.invulnerable {
            self.invulnerable_timer -= dt;
            if self.invulnerable_timer <= 0.0 {
                self.invulnerable = false;
            }
        }

        if let Some(active) = &mut self.power {
            active.remaining -= dt;
            if active.remaining <= 0.0 {
                self.deactivate_power();
            }
        }

        if self.shoot_cooldown > 0.0 {
            self.shoot_cooldown -= dt;
        }
        if self.explosive_cooldown > 0.0 {
            self.explosive_cooldown -= dt;
        }
        if self.wall_jump_cooldown > 0.0 {
            self.wall_jump_cooldown -= dt;
        }
    }

    /// Advance one tick and resolve against the platforms.
    ///
    /// Returns every platform contact made this tick, in resolution order.
    pub fn update(
        &mut self,
        dt: f32,
        controls: &PlayerControls,
        platforms: &[Platform],
    ) -> Vec<PlatformContact> {
        self.elapsed += dt;
        self.update_timers(dt);

        self.apply_movement_intent(controls.intent);

        if self.dashing {
            self.dash_timer -= dt;
            if self.dash_timer <= 0.0 {
                self.dashing = false;
                self.body.vel.x *= DASH_EXIT_DAMPING;
            }
        }
        if !self.dash_available {
            self.dash_cooldown -= dt;
            if self.dash_cooldown <= 0.0 && !self.dashing {
                self.dash_available = true;
            }
        }
        if controls.dash {
            self.dash();
        }

        if !self.dashing {
            self.body.apply_gravity(dt, PLAYER_MAX_FALL_SPEED);
        }
        self.body.advance(dt);

        let was_on_ground = self.body.on_ground;
        let contacts = self.resolve_platforms(platforms, controls.jump_held);
        if self.body.on_ground && !was_on_ground {
            self.can_double_jump = true;
        }

        let half_w = self.body.size.x * 0.5;
        self.body.pos.x = self.body.pos.x.clamp(half_w, SCREEN_WIDTH - half_w);

        self.update_run_cycle(dt);
        contacts
    }

    fn resolve_platforms(
        &mut self,
        platforms: &[Platform],
        jump_held: bool,
    ) -> Vec<PlatformContact> {
        self.body.on_ground = false;
        self.wall_sliding = false;
        // Direction to launch, set when a wall jump fires against some wall
        let mut wall_jump: Option<f32> = None;
        let mut contacts = Vec::new();

        for platform in platforms.iter().filter(|p| p.is_active) {
            let falling = self.body.vel.y > 0.0;
            let Some(contact) = self.body.resolve_against(&platform.aabb()) else {
                continue;
            };
            if contact.is_horizontal() && falling && !self.body.on_ground {
                self.wall_sliding = true;
                self.body.vel.y = self.body.vel.y.min(WALL_SLIDE_MAX_FALL);
                if self.wall_jump_cooldown <= 0.0 && jump_held {
                    wall_jump = Some(if contact == Contact::Left { -1.0 } else { 1.0 });
                    self.wall_jump_cooldown = WALL_JUMP_COOLDOWN;
                }
            }
            contacts.push(PlatformContact {
                platform_id: platform.id,
                contact,
            });
        }

        if let Some(away) = wall_jump {
            self.body.vel.y = self.jump_power * WALL_JUMP_VERTICAL_FACTOR;
            self.body.vel.x = away * self.move_speed * WALL_JUMP_HORIZONTAL_FACTOR;
            self.facing_right = away > 0.0;
        }
        contacts
    }

    fn update_run_cycle(&mut self, dt: f32) {
        if self.body.vel.x.abs() > 50.0 && self.body.on_ground {
            self.run_timer += dt;
            if self.run_timer > 0.1 {
                self.run_frame = (self.run_frame + 1) % 4;
                self.run_timer = 0.0;
            }
        } else {
            self.run_frame = 0;
            self.run_timer = 0.0;
        }
    }

    /// Visual blink while invulnerable: on for 0.1s out of every 0.2s
    pub fn blink_on(&self) -> bool {
        self.invulnerable && (self.elapsed % 0.2) < 0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::platform::PlatformKind;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn ground() -> Platform {
        Platform::new(0, Vec2::new(0.0, 750.0), Vec2::new(SCREEN_WIDTH, 50.0), PlatformKind::Normal)
    }

    fn grounded_player() -> Player {
        let mut player = Player::new(Vec2::new(600.0, 720.0));
        player.body.on_ground = true;
        player
    }

    fn idle() -> PlayerControls {
        PlayerControls::default()
    }

    #[test]
    fn test_settles_on_ground() {
        let mut player = Player::new(Vec2::new(600.0, 600.0));
        for _ in 0..60 {
            player.update(DT, &idle(), &[ground()]);
        }
        assert!(player.body.on_ground);
        assert_eq!(player.body.pos.y, 720.0);
    }

    #[test]
    fn test_jump_then_double_jump_then_nothing() {
        let mut player = grounded_player();
        player.jump();
        assert_eq!(player.body.vel.y, PLAYER_JUMP_POWER);
        assert!(!player.body.on_ground);

        player.body.vel.y = 100.0;
        player.jump();
        assert_eq!(player.body.vel.y, PLAYER_JUMP_POWER * DOUBLE_JUMP_FACTOR);
        assert!(!player.can_double_jump);

        player.body.vel.y = 100.0;
        player.jump();
        assert_eq!(player.body.vel.y, 100.0);
    }

    #[test]
    fn test_double_jump_resets_on_landing() {
        let mut player = Player::new(Vec2::new(600.0, 600.0));
        player.can_double_jump = false;
        for _ in 0..60 {
            player.update(DT, &idle(), &[ground()]);
        }
        assert!(player.can_double_jump);
    }

    #[test]
    fn test_movement_intent_ignored_while_dashing() {
        let mut player = grounded_player();
        player.dash();
        player.apply_movement_intent(MoveIntent::Left);
        assert_eq!(player.body.vel.x, DASH_POWER);
        assert!(player.facing_right);
    }

    #[test]
    fn test_dash_damps_on_expiry_and_recharges_after_cooldown() {
        let mut player = grounded_player();
        let platforms = [ground()];
        assert!(player.dash());
        assert!(player.dashing);
        assert!(!player.dash_available);
        assert_eq!(player.body.vel.y, DASH_KICK_VEL_Y);

        let mut ticks = 0;
        while player.dashing {
            player.update(DT, &idle(), &platforms);
            ticks += 1;
            assert!(ticks < 20, "dash never ended");
        }
        assert!((player.body.vel.x - DASH_POWER * DASH_EXIT_DAMPING).abs() < 1e-3);
        assert!(!player.dash_available);

        // Cooldown runs from dash start: ~60 ticks in total
        while ticks < 55 {
            player.update(DT, &idle(), &platforms);
            ticks += 1;
        }
        assert!(!player.dash_available);
        while ticks < 62 {
            player.update(DT, &idle(), &platforms);
            ticks += 1;
        }
        assert!(player.dash_available);
    }

    #[test]
    fn test_dash_suspends_gravity() {
        let mut player = Player::new(Vec2::new(600.0, 300.0));
        player.dash();
        player.update(DT, &idle(), &[]);
        assert_eq!(player.body.vel.y, DASH_KICK_VEL_Y);
    }

    #[test]
    fn test_second_dash_request_is_refused() {
        let mut player = grounded_player();
        assert!(player.dash());
        assert!(!player.dash());
    }

    #[test]
    fn test_shoot_respects_cooldown() {
        let mut ids = EntityIds::default();
        let mut player = grounded_player();
        player.facing_right = false;
        let bullet = player.shoot(&mut ids).unwrap();
        assert_eq!(bullet.vel, Vec2::new(-BULLET_SPEED, 0.0));
        assert_eq!(bullet.pos, Vec2::new(580.0, 715.0));
        assert!(player.shoot(&mut ids).is_none());

        for _ in 0..16 {
            player.update(DT, &idle(), &[ground()]);
        }
        assert!(player.shoot(&mut ids).is_some());
    }

    #[test]
    fn test_explosive_has_separate_cooldown() {
        let mut ids = EntityIds::default();
        let mut player = grounded_player();
        assert!(player.shoot(&mut ids).is_some());
        let round = player.fire_explosive(&mut ids).unwrap();
        assert!(round.explosion_radius().is_some());
        assert!(player.fire_explosive(&mut ids).is_none());
    }

    #[test]
    fn test_damage_grants_invulnerability_and_knockback() {
        let mut player = grounded_player();
        assert!(player.take_damage());
        assert_eq!(player.health, 80);
        assert_eq!(player.body.vel.y, KNOCKBACK_VEL_Y);
        assert!(!player.take_damage());
        assert_eq!(player.health, 80);

        for _ in 0..95 {
            player.update(DT, &idle(), &[ground()]);
        }
        assert!(!player.invulnerable);
        assert!(player.take_damage());
        assert_eq!(player.health, 60);
    }

    #[test]
    fn test_speed_power_restores_base_on_expiry() {
        let mut player = grounded_player();
        player.activate_power(TimedPower::Speed, POWER_DURATION);
        player.activate_power(TimedPower::Speed, POWER_DURATION);
        assert_eq!(player.move_speed, PLAYER_MOVE_SPEED * SPEED_POWER_FACTOR);

        for _ in 0..310 {
            player.update(DT, &idle(), &[ground()]);
        }
        assert!(player.power.is_none());
        assert_eq!(player.move_speed, PLAYER_MOVE_SPEED);
    }

    #[test]
    fn test_new_power_replaces_old() {
        let mut player = grounded_player();
        player.activate_power(TimedPower::Jump, POWER_DURATION);
        player.activate_power(TimedPower::Speed, POWER_DURATION);
        assert_eq!(player.jump_power, PLAYER_JUMP_POWER);
        assert_eq!(player.power.map(|p| p.kind), Some(TimedPower::Speed));
    }

    #[test]
    fn test_shield_power_blocks_damage() {
        let mut player = grounded_player();
        player.activate_power(TimedPower::Shield, POWER_DURATION);
        assert!(!player.take_damage());
        assert_eq!(player.health, PLAYER_MAX_HEALTH);
    }

    #[test]
    fn test_wall_slide_caps_fall_and_wall_jump_launches_away() {
        // Wall to the right of the player
        let wall = Platform::new(
            1,
            Vec2::new(620.0, 0.0),
            Vec2::new(40.0, 700.0),
            PlatformKind::Normal,
        );
        let mut player = Player::new(Vec2::new(601.0, 300.0));
        player.body.vel.y = 600.0;
        let controls = PlayerControls {
            intent: MoveIntent::Right,
            ..Default::default()
        };
        player.update(DT, &controls, std::slice::from_ref(&wall));
        assert!(player.wall_sliding);
        assert_eq!(player.body.vel.y, WALL_SLIDE_MAX_FALL);

        let controls = PlayerControls {
            intent: MoveIntent::Right,
            jump_held: true,
            ..Default::default()
        };
        player.update(DT, &controls, std::slice::from_ref(&wall));
        assert_eq!(player.body.vel.y, PLAYER_JUMP_POWER * WALL_JUMP_VERTICAL_FACTOR);
        assert!(player.body.vel.x < 0.0);
        assert!(!player.facing_right);
        assert!(player.wall_jump_cooldown > 0.0);
    }

    #[test]
    fn test_clamped_to_screen() {
        let mut player = Player::new(Vec2::new(25.0, 300.0));
        let controls = PlayerControls {
            intent: MoveIntent::Left,
            ..Default::default()
        };
        player.update(DT, &controls, &[]);
        assert_eq!(player.body.pos.x, PLAYER_WIDTH * 0.5);
    }

    #[test]
    fn test_blink_cycles_while_invulnerable() {
        let mut player = grounded_player();
        assert!(!player.blink_on());
        player.take_damage();
        let mut seen = [false, false];
        for _ in 0..30 {
            player.update(DT, &idle(), &[ground()]);
            seen[player.blink_on() as usize] = true;
        }
        assert!(seen[0] && seen[1]);
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_range(
            ops in prop::collection::vec((any::<bool>(), 0i32..150), 0..50)
        ) {
            let mut player = grounded_player();
            for (damage, amount) in ops {
                if damage {
                    player.invulnerable = false;
                    player.take_damage();
                } else {
                    player.heal(amount);
                }
                prop_assert!((0..=player.max_health).contains(&player.health));
            }
        }
    }
}
