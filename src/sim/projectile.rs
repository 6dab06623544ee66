//! Projectiles: plain bullets, homing missiles and explosive rounds

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;
use crate::{Rgb, normalize_angle};

/// Non-owning reference to whatever a missile is chasing.
///
/// Resolved by id against the live tables every tick; ids are never reused,
/// so a removed target simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    Player,
    Enemy(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Bullet,
    Homing {
        target: TargetRef,
        /// Max steering rate (radians/sec)
        turn_speed: f32,
        speed: f32,
        /// Steered heading, before the wave offset is added
        heading: f32,
        /// Phase of the sinusoidal wobble
        wave_angle: f32,
    },
    Explosive {
        has_exploded: bool,
        explosion_radius: f32,
        explosion_timer: f32,
    },
}

/// A projectile; `pos` is the centre of its round hitbox
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Rgb,
    /// Seconds left before expiry
    pub lifespan: f32,
    pub kind: ProjectileKind,
    /// Recent positions, oldest first
    pub trail: VecDeque<Vec2>,
    pub max_trail: usize,
}

impl Projectile {
    pub fn bullet(id: u32, pos: Vec2, vel: Vec2, color: Rgb) -> Self {
        Self {
            id,
            pos,
            vel,
            radius: BULLET_RADIUS,
            color,
            lifespan: BULLET_LIFESPAN,
            kind: ProjectileKind::Bullet,
            trail: VecDeque::with_capacity(BULLET_TRAIL_LENGTH + 1),
            max_trail: BULLET_TRAIL_LENGTH,
        }
    }

    pub fn homing(id: u32, pos: Vec2, vel: Vec2, color: Rgb, target: TargetRef) -> Self {
        Self {
            lifespan: MISSILE_LIFESPAN,
            max_trail: MISSILE_TRAIL_LENGTH,
            trail: VecDeque::with_capacity(MISSILE_TRAIL_LENGTH + 1),
            kind: ProjectileKind::Homing {
                target,
                turn_speed: MISSILE_TURN_SPEED,
                speed: MISSILE_SPEED,
                heading: vel.y.atan2(vel.x),
                wave_angle: 0.0,
            },
            ..Self::bullet(id, pos, vel, color)
        }
    }

    pub fn explosive(id: u32, pos: Vec2, vel: Vec2, color: Rgb) -> Self {
        Self {
            radius: EXPLOSIVE_RADIUS,
            kind: ProjectileKind::Explosive {
                has_exploded: false,
                explosion_radius: EXPLOSION_RADIUS,
                explosion_timer: 0.0,
            },
            ..Self::bullet(id, pos, vel, color)
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.radius * 2.0))
    }

    pub fn target(&self) -> Option<TargetRef> {
        match self.kind {
            ProjectileKind::Homing { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Steered heading of a homing missile
    pub fn heading(&self) -> Option<f32> {
        match self.kind {
            ProjectileKind::Homing { heading, .. } => Some(heading),
            _ => None,
        }
    }

    pub fn has_exploded(&self) -> bool {
        matches!(
            self.kind,
            ProjectileKind::Explosive {
                has_exploded: true,
                ..
            }
        )
    }

    pub fn explosion_radius(&self) -> Option<f32> {
        match self.kind {
            ProjectileKind::Explosive {
                explosion_radius, ..
            } => Some(explosion_radius),
            _ => None,
        }
    }

    /// 0.0 at detonation, 1.0 when the blast is over
    pub fn explosion_progress(&self) -> Option<f32> {
        match self.kind {
            ProjectileKind::Explosive {
                has_exploded: true,
                explosion_timer,
                ..
            } => Some((1.0 - explosion_timer / EXPLOSION_DURATION).clamp(0.0, 1.0)),
            _ => None,
        }
    }

    /// Can this projectile still hit something?
    pub fn is_live(&self) -> bool {
        !self.has_exploded() && !self.is_expired()
    }

    /// Advance one tick.
    ///
    /// `target_pos` is the resolved position of a homing missile's target, or
    /// `None` when the target is gone or defeated (the missile then flies
    /// straight). Ignored by other kinds.
    pub fn update(&mut self, dt: f32, target_pos: Option<Vec2>) {
        match &mut self.kind {
            ProjectileKind::Explosive {
                has_exploded: true,
                explosion_timer,
                ..
            } => {
                *explosion_timer -= dt;
                if *explosion_timer <= 0.0 {
                    self.lifespan = 0.0;
                }
                return;
            }
            ProjectileKind::Homing {
                turn_speed,
                speed,
                heading,
                wave_angle,
                ..
            } => {
                if let Some(target) = target_pos {
                    let to_target = target - self.pos;
                    let bearing = to_target.y.atan2(to_target.x);
                    let max_turn = *turn_speed * dt;
                    let diff = normalize_angle(bearing - *heading).clamp(-max_turn, max_turn);
                    *heading = normalize_angle(*heading + diff);

                    *wave_angle += MISSILE_WAVE_RATE * dt;
                    let flight = *heading + wave_angle.sin() * MISSILE_WAVE_AMPLITUDE;
                    self.vel = Vec2::new(flight.cos(), flight.sin()) * *speed;
                }
            }
            _ => {}
        }

        self.pos += self.vel * dt;
        self.trail.push_back(self.pos);
        while self.trail.len() > self.max_trail {
            self.trail.pop_front();
        }
        self.lifespan -= dt;
    }

    /// Detonate an explosive round: stop, and start the blast countdown.
    ///
    /// Returns `true` only for the first detonation.
    pub fn explode(&mut self) -> bool {
        match &mut self.kind {
            ProjectileKind::Explosive {
                has_exploded,
                explosion_timer,
                ..
            } if !*has_exploded => {
                *has_exploded = true;
                *explosion_timer = EXPLOSION_DURATION;
                self.vel = Vec2::ZERO;
                true
            }
            _ => false,
        }
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.x < -OFFSCREEN_MARGIN
            || self.pos.x > SCREEN_WIDTH + OFFSCREEN_MARGIN
            || self.pos.y < -OFFSCREEN_MARGIN
            || self.pos.y > SCREEN_HEIGHT + OFFSCREEN_MARGIN
    }

    pub fn is_expired(&self) -> bool {
        self.lifespan <= 0.0 || self.is_off_screen()
    }
}

/// Every point within `radius` (strictly) of `center`, by index
pub fn within_blast(
    center: Vec2,
    radius: f32,
    points: impl IntoIterator<Item = Vec2>,
) -> Vec<usize> {
    points
        .into_iter()
        .enumerate()
        .filter(|(_, p)| p.distance(center) < radius)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_bullet_moves_straight_and_keeps_bounded_trail() {
        let mut b = Projectile::bullet(
            1,
            Vec2::new(100.0, 100.0),
            Vec2::new(600.0, 0.0),
            Rgb::CYAN,
        );
        for _ in 0..30 {
            b.update(DT, None);
        }
        assert!((b.pos.x - 400.0).abs() < 0.01);
        assert_eq!(b.pos.y, 100.0);
        assert_eq!(b.trail.len(), BULLET_TRAIL_LENGTH);
        // Oldest first, newest equals current position
        assert_eq!(*b.trail.back().unwrap(), b.pos);
        assert!(b.trail.front().unwrap().x < b.pos.x);
    }

    #[test]
    fn test_bullet_expires_on_lifespan() {
        let mut b = Projectile::bullet(1, Vec2::new(600.0, 400.0), Vec2::ZERO, Rgb::CYAN);
        for _ in 0..119 {
            b.update(DT, None);
        }
        assert!(!b.is_expired());
        for _ in 0..2 {
            b.update(DT, None);
        }
        assert!(b.is_expired());
    }

    #[test]
    fn test_bullet_expires_off_screen() {
        let mut b = Projectile::bullet(
            1,
            Vec2::new(1240.0, 400.0),
            Vec2::new(800.0, 0.0),
            Rgb::CYAN,
        );
        assert!(!b.is_expired());
        b.update(DT, None);
        assert!(b.is_expired());
    }

    #[test]
    fn test_homing_without_target_flies_straight() {
        let vel = Vec2::new(0.0, -300.0);
        let mut m = Projectile::homing(
            1,
            Vec2::new(500.0, 500.0),
            vel,
            Rgb::RED,
            TargetRef::Player,
        );
        for _ in 0..20 {
            m.update(DT, None);
        }
        assert_eq!(m.vel, vel);
        assert!((m.pos.x - 500.0).abs() < 1e-3);
        assert!((m.lifespan - (MISSILE_LIFESPAN - 20.0 * DT)).abs() < 1e-4);
    }

    #[test]
    fn test_homing_turn_is_rate_limited() {
        // Target straight behind: a full reversal would need π radians
        let mut m = Projectile::homing(
            1,
            Vec2::new(500.0, 400.0),
            Vec2::new(300.0, 0.0),
            Rgb::RED,
            TargetRef::Player,
        );
        let before = m.heading().unwrap();
        m.update(DT, Some(Vec2::new(100.0, 400.0)));
        let turned = normalize_angle(m.heading().unwrap() - before).abs();
        assert!(turned <= MISSILE_TURN_SPEED * DT + 1e-5);
        assert!(turned > 0.0);
    }

    #[test]
    fn test_homing_heading_error_shrinks_monotonically() {
        let target = Vec2::new(1000.0, 0.0);
        let mut m = Projectile::homing(
            1,
            Vec2::ZERO,
            Vec2::new(0.0, -300.0),
            Rgb::RED,
            TargetRef::Player,
        );
        let error = |m: &Projectile| {
            let to = target - m.pos;
            normalize_angle(to.y.atan2(to.x) - m.heading().unwrap()).abs()
        };

        let step = MISSILE_TURN_SPEED * DT;
        let mut prev = error(&m);
        for _ in 0..120 {
            m.update(DT, Some(target));
            let err = error(&m);
            if prev > step {
                assert!(err < prev, "error grew from {prev} to {err}");
                // Line of sight drifts a little as the missile wobbles
                assert!(prev - err <= step + 0.01);
            } else {
                assert!(err <= step);
            }
            prev = err;
        }
        assert!(prev < 0.01);
    }

    #[test]
    fn test_homing_lateral_deviation_bounded_by_wave() {
        let target = Vec2::new(1000.0, 0.0);
        let mut m = Projectile::homing(
            1,
            Vec2::ZERO,
            Vec2::new(MISSILE_SPEED, 0.0),
            Rgb::RED,
            TargetRef::Player,
        );
        // Integrated wobble: speed * amplitude * (1 - cos) / rate peaks at 2x this
        let bound = 2.0 * MISSILE_SPEED * MISSILE_WAVE_AMPLITUDE / MISSILE_WAVE_RATE;
        let mut max_dev: f32 = 0.0;
        for _ in 0..120 {
            m.update(DT, Some(target));
            max_dev = max_dev.max(m.pos.y.abs());
        }
        assert!(max_dev > 1.0, "wave had no effect");
        assert!(max_dev <= bound * 1.1, "deviation {max_dev} exceeds {bound}");
        assert!(m.pos.x > 500.0);
    }

    #[test]
    fn test_explosive_stops_and_despawns_after_blast() {
        let mut b = Projectile::explosive(
            1,
            Vec2::new(500.0, 300.0),
            Vec2::new(800.0, 0.0),
            Rgb::YELLOW,
        );
        assert!(b.explode());
        assert!(!b.explode());
        assert_eq!(b.vel, Vec2::ZERO);
        assert!(!b.is_live());
        assert_eq!(b.explosion_progress(), Some(0.0));

        for _ in 0..10 {
            b.update(DT, None);
        }
        assert_eq!(b.pos, Vec2::new(500.0, 300.0));
        assert!(!b.is_expired());
        for _ in 0..10 {
            b.update(DT, None);
        }
        assert!(b.is_expired());
        assert_eq!(b.lifespan, 0.0);
    }

    #[test]
    fn test_plain_bullet_cannot_explode() {
        let mut b = Projectile::bullet(1, Vec2::ZERO, Vec2::X, Rgb::CYAN);
        assert!(!b.explode());
        assert_eq!(b.vel, Vec2::X);
    }

    #[test]
    fn test_within_blast_is_strict() {
        let center = Vec2::new(500.0, 300.0);
        let points = [
            Vec2::new(579.9, 300.0),
            Vec2::new(580.0, 300.0),
            Vec2::new(500.0, 220.0),
            Vec2::new(540.0, 340.0),
            Vec2::new(700.0, 300.0),
        ];
        assert_eq!(within_blast(center, 80.0, points), vec![0, 3]);
    }
}
