//! Level geometry: static slabs and the behavioral platform variants

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::Rgb;
use crate::consts::*;

/// Platform types as they appear in level layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    #[default]
    Normal,
    Bounce,
    Moving,
    Falling,
    Crumbling,
}

/// Per-kind mutable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlatformBehavior {
    Normal,
    Bounce {
        power: f32,
    },
    Moving {
        /// +1 right, -1 left
        direction: f32,
        traveled: f32,
        speed: f32,
        max_distance: f32,
    },
    Falling {
        fall_speed: f32,
        triggered: bool,
    },
    Crumbling {
        timer: f32,
        /// Visual stage 0-3
        stage: u8,
        triggered: bool,
    },
}

impl PlatformBehavior {
    fn for_kind(kind: PlatformKind) -> Self {
        match kind {
            PlatformKind::Normal => Self::Normal,
            PlatformKind::Bounce => Self::Bounce {
                power: BOUNCE_POWER,
            },
            PlatformKind::Moving => Self::Moving {
                direction: 1.0,
                traveled: 0.0,
                speed: MOVING_PLATFORM_SPEED,
                max_distance: MOVING_PLATFORM_DISTANCE,
            },
            PlatformKind::Falling => Self::Falling {
                fall_speed: 0.0,
                triggered: false,
            },
            PlatformKind::Crumbling => Self::Crumbling {
                timer: 0.0,
                stage: 0,
                triggered: false,
            },
        }
    }
}

/// A platform. `pos` is the top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub behavior: PlatformBehavior,
    /// Once false, stays false until the level is reloaded
    pub is_active: bool,
    pub color: Rgb,
}

impl Platform {
    pub fn new(id: u32, pos: Vec2, size: Vec2, kind: PlatformKind) -> Self {
        Self {
            id,
            pos,
            size,
            behavior: PlatformBehavior::for_kind(kind),
            is_active: true,
            color: Rgb(100, 100, 100),
        }
    }

    /// Override travel speed and distance (no-op for non-moving platforms)
    pub fn with_motion(mut self, speed: f32, distance: f32) -> Self {
        if let PlatformBehavior::Moving {
            speed: s,
            max_distance,
            ..
        } = &mut self.behavior
        {
            *s = speed;
            *max_distance = distance;
        }
        self
    }

    pub fn kind(&self) -> PlatformKind {
        match self.behavior {
            PlatformBehavior::Normal => PlatformKind::Normal,
            PlatformBehavior::Bounce { .. } => PlatformKind::Bounce,
            PlatformBehavior::Moving { .. } => PlatformKind::Moving,
            PlatformBehavior::Falling { .. } => PlatformKind::Falling,
            PlatformBehavior::Crumbling { .. } => PlatformKind::Crumbling,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_top_left(self.pos, self.size)
    }

    /// Advance moving/falling/crumbling state
    pub fn update(&mut self, dt: f32) {
        if !self.is_active {
            return;
        }

        match &mut self.behavior {
            PlatformBehavior::Moving {
                direction,
                traveled,
                speed,
                max_distance,
            } => {
                let step = *speed * dt * *direction;
                self.pos.x += step;
                *traveled += step.abs();
                if *traveled >= *max_distance {
                    *direction = -*direction;
                    *traveled = 0.0;
                }
            }
            PlatformBehavior::Falling {
                fall_speed,
                triggered,
            } => {
                if *triggered {
                    *fall_speed += FALLING_ACCELERATION * dt;
                    self.pos.y += *fall_speed * dt;
                    if self.pos.y > SCREEN_HEIGHT + FALLING_DESPAWN_MARGIN {
                        self.is_active = false;
                    }
                }
            }
            PlatformBehavior::Crumbling {
                timer,
                stage,
                triggered,
            } => {
                if *triggered {
                    *timer -= dt;
                    let progress = 1.0 - (*timer / CRUMBLE_DELAY);
                    *stage = ((progress * 4.0).max(0.0) as u8).min(3);
                    if *timer <= 0.0 {
                        self.is_active = false;
                    }
                }
            }
            PlatformBehavior::Normal | PlatformBehavior::Bounce { .. } => {}
        }
    }

    /// Start a falling platform's drop (once)
    pub fn trigger_fall(&mut self) {
        if let PlatformBehavior::Falling {
            fall_speed,
            triggered,
        } = &mut self.behavior
        {
            if !*triggered {
                *triggered = true;
                *fall_speed = FALLING_INITIAL_SPEED;
            }
        }
    }

    /// Start a crumbling platform's countdown (once)
    pub fn trigger_crumble(&mut self) {
        if let PlatformBehavior::Crumbling {
            timer, triggered, ..
        } = &mut self.behavior
        {
            if !*triggered {
                *triggered = true;
                *timer = CRUMBLE_DELAY;
            }
        }
    }

    /// Launch velocity for bounce platforms
    pub fn bounce_power(&self) -> Option<f32> {
        match self.behavior {
            PlatformBehavior::Bounce { power } => Some(power),
            _ => None,
        }
    }

    /// Crumble stage for rendering (0 when intact or not crumbling)
    pub fn crumble_stage(&self) -> u8 {
        match self.behavior {
            PlatformBehavior::Crumbling { stage, .. } => stage,
            _ => 0,
        }
    }
}
