//! Ledge Runner - a 2D side-scrolling action platformer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, AI, game state)
//! - `settings`: Runtime configuration for the headless runner
//! - `error`: Failures at the loading edges (settings, level campaigns)
//!
//! Rendering, audio and input polling live outside this crate. The core
//! consumes resolved intents (`sim::TickInput`) and exposes a read-only
//! `sim::RenderSnapshot` plus a drained list of `sim::GameEvent`s.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::Settings;

use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (y grows downward)
    pub const SCREEN_WIDTH: f32 = 1200.0;
    pub const SCREEN_HEIGHT: f32 = 800.0;

    /// Upper bound on a single tick's dt; larger frame gaps are clamped
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Default fixed step for the headless runner
    pub const DEFAULT_DT: f32 = 1.0 / 60.0;

    /// Downward acceleration shared by every body (pixels/s²)
    pub const GRAVITY: f32 = 1500.0;

    /// Player body and movement
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;
    pub const PLAYER_MAX_HEALTH: i32 = 100;
    pub const PLAYER_MOVE_SPEED: f32 = 350.0;
    pub const PLAYER_JUMP_POWER: f32 = -700.0;
    pub const PLAYER_MAX_FALL_SPEED: f32 = 1000.0;
    pub const DOUBLE_JUMP_FACTOR: f32 = 0.8;
    pub const INVULNERABLE_DURATION: f32 = 1.5;
    pub const PLAYER_HIT_DAMAGE: i32 = 20;
    pub const KNOCKBACK_VEL_Y: f32 = -400.0;
    pub const SHOOT_DELAY: f32 = 0.25;
    pub const EXPLOSIVE_SHOOT_DELAY: f32 = 1.0;
    pub const BULLET_SPEED: f32 = 800.0;
    /// Bullets leave from the chest, slightly above centre
    pub const CHEST_OFFSET_Y: f32 = -5.0;

    /// Dash
    pub const DASH_POWER: f32 = 800.0;
    pub const DASH_DURATION: f32 = 0.15;
    pub const DASH_COOLDOWN: f32 = 1.0;
    pub const DASH_KICK_VEL_Y: f32 = -200.0;
    pub const DASH_EXIT_DAMPING: f32 = 0.3;

    /// Wall slide / wall jump
    pub const WALL_SLIDE_MAX_FALL: f32 = 150.0;
    pub const WALL_JUMP_COOLDOWN: f32 = 0.3;
    pub const WALL_JUMP_VERTICAL_FACTOR: f32 = 0.8;
    pub const WALL_JUMP_HORIZONTAL_FACTOR: f32 = 1.2;

    /// Power-ups
    pub const POWER_DURATION: f32 = 5.0;
    pub const SPEED_POWER_FACTOR: f32 = 1.5;
    pub const JUMP_POWER_FACTOR: f32 = 1.3;
    pub const HEALTH_PICKUP_AMOUNT: i32 = 20;
    pub const POWERUP_SIZE: f32 = 30.0;
    pub const POWERUP_SCORE: u64 = 50;

    /// Enemies
    pub const ENEMY_SIZE: f32 = 40.0;
    pub const TANK_SIZE: f32 = 50.0;
    pub const ENEMY_MAX_FALL_SPEED: f32 = 800.0;
    pub const ENEMY_FLASH_DURATION: f32 = 0.1;
    pub const BASIC_STOP_DISTANCE: f32 = 50.0;
    pub const RUNNER_STOP_DISTANCE: f32 = 30.0;
    pub const RUNNER_JUMP_VEL: f32 = -500.0;
    pub const TANK_BAND: (f32, f32) = (150.0, 250.0);
    pub const SHOOTER_BAND: (f32, f32) = (250.0, 350.0);
    pub const PROBE_WIDTH: f32 = 5.0;
    pub const PROBE_DEPTH: f32 = 50.0;
    /// Enemies this far below the screen are gone for good
    pub const ENEMY_FALL_OUT_MARGIN: f32 = 200.0;

    /// Combat
    pub const BULLET_DAMAGE: i32 = 50;
    pub const SPLASH_DAMAGE: i32 = 30;

    /// Boss
    pub const BOSS_SIZE: f32 = 80.0;
    pub const BOSS_MAX_HEALTH: i32 = 500;
    pub const BOSS_MOVE_SPEED: f32 = 150.0;
    pub const BOSS_RAGE_MOVE_SPEED: f32 = 200.0;
    pub const BOSS_SHOOT_DELAY: f32 = 2.0;
    pub const BOSS_RAGE_SHOOT_FACTOR: f32 = 0.7;
    pub const BOSS_POINTS: u32 = 1000;
    pub const BOSS_SHIELD_MAX: i32 = 100;
    pub const BOSS_SHIELD_BREAK_DAMAGE: i32 = 50;
    pub const BOSS_MAX_MINIONS: usize = 3;
    pub const BOSS_MINION_INTERVAL: f32 = 10.0;
    pub const BOSS_CHARGE_SPEED: f32 = 500.0;
    pub const BOSS_POUND_VEL_Y: f32 = -400.0;
    pub const BOSS_BARRAGE_COUNT: usize = 5;
    pub const BOSS_BARRAGE_ARC: f32 = std::f32::consts::FRAC_PI_2;
    /// Attack pattern timers, indexed by pattern
    pub const BOSS_ATTACK_TIMERS: [f32; 3] = [3.0, 4.0, 5.0];

    /// Projectiles
    pub const BULLET_RADIUS: f32 = 6.0;
    pub const BULLET_LIFESPAN: f32 = 2.0;
    pub const BULLET_TRAIL_LENGTH: usize = 10;
    pub const OFFSCREEN_MARGIN: f32 = 50.0;
    pub const MISSILE_SPEED: f32 = 300.0;
    pub const MISSILE_TURN_SPEED: f32 = 5.0;
    pub const MISSILE_LIFESPAN: f32 = 5.0;
    pub const MISSILE_TRAIL_LENGTH: usize = 20;
    pub const MISSILE_WAVE_RATE: f32 = 10.0;
    pub const MISSILE_WAVE_AMPLITUDE: f32 = 0.4;
    pub const EXPLOSIVE_RADIUS: f32 = 8.0;
    pub const EXPLOSION_RADIUS: f32 = 80.0;
    pub const EXPLOSION_DURATION: f32 = 0.3;

    /// Platforms
    pub const MOVING_PLATFORM_SPEED: f32 = 100.0;
    pub const MOVING_PLATFORM_DISTANCE: f32 = 200.0;
    pub const FALLING_INITIAL_SPEED: f32 = 50.0;
    pub const FALLING_ACCELERATION: f32 = 500.0;
    pub const FALLING_DESPAWN_MARGIN: f32 = 100.0;
    pub const CRUMBLE_DELAY: f32 = 0.5;
    pub const BOUNCE_POWER: f32 = -1000.0;
    pub const GROUND_HEIGHT: f32 = 50.0;

    /// Session
    pub const STARTING_LIVES: u8 = 3;
}

/// 8-bit RGB colour, handed through to the effects/rendering collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
    pub const CYAN: Rgb = Rgb(0, 255, 255);
    pub const PURPLE: Rgb = Rgb(128, 0, 128);

    /// Shift every channel by `delta`, saturating at 0 and 255
    pub fn shade(self, delta: i16) -> Rgb {
        let ch = |c: u8| (c as i16 + delta).clamp(0, 255) as u8;
        Rgb(ch(self.0), ch(self.1), ch(self.2))
    }
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
