//! Collectible power-ups

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::player::{Player, TimedPower};
use crate::Rgb;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerKind {
    Health,
    Speed,
    Jump,
    Shield,
}

impl PowerKind {
    pub const ALL: [PowerKind; 4] = [
        PowerKind::Health,
        PowerKind::Speed,
        PowerKind::Jump,
        PowerKind::Shield,
    ];

    pub fn color(self) -> Rgb {
        match self {
            PowerKind::Health => Rgb::RED,
            PowerKind::Speed => Rgb::YELLOW,
            PowerKind::Jump => Rgb::CYAN,
            PowerKind::Shield => Rgb::PURPLE,
        }
    }

    /// The timed effect, if this kind has one
    pub fn timed(self) -> Option<TimedPower> {
        match self {
            PowerKind::Health => None,
            PowerKind::Speed => Some(TimedPower::Speed),
            PowerKind::Jump => Some(TimedPower::Jump),
            PowerKind::Shield => Some(TimedPower::Shield),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    /// Centre of the pickup box
    pub pos: Vec2,
    pub kind: PowerKind,
    /// One-way; a collected pickup is inert until removed
    pub collected: bool,
    /// Seconds since spawn, drives the bob and spin visuals
    pub elapsed: f32,
}

impl PowerUp {
    pub fn new(id: u32, pos: Vec2, kind: PowerKind) -> Self {
        Self {
            id,
            pos,
            kind,
            collected: false,
            elapsed: 0.0,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(POWERUP_SIZE))
    }

    pub fn update(&mut self, dt: f32) {
        if !self.collected {
            self.elapsed += dt;
        }
    }

    /// Vertical bob offset for rendering
    pub fn bob_offset(&self) -> f32 {
        5.0 * (self.elapsed * 1000.0 / 300.0).sin()
    }

    /// Spin angle in degrees for rendering
    pub fn rotation(&self) -> f32 {
        (self.elapsed * 60.0) % 360.0
    }

    /// Apply the effect to the player. Returns the score award, or `None`
    /// if this pickup was already collected.
    pub fn collect(&mut self, player: &mut Player) -> Option<u64> {
        if self.collected {
            return None;
        }
        self.collected = true;
        match self.kind.timed() {
            Some(power) => player.activate_power(power, POWER_DURATION),
            None => player.heal(HEALTH_PICKUP_AMOUNT),
        }
        Some(POWERUP_SCORE)
    }
}
