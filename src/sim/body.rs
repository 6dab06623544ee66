//! Kinematic body shared by the player, enemies and the boss

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Contact, box_contact};
use super::platform::Platform;
use crate::consts::GRAVITY;

/// A contact produced while resolving a body against the platform list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformContact {
    pub platform_id: u32,
    pub contact: Contact,
}

/// Position is the box centre; `size` is the full width and height.
///
/// The bounding box is never stored. `aabb()` derives it from the current
/// position on every call, so a collision query can't see a stale box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            on_ground: false,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    /// y of the body's bottom edge
    #[inline]
    pub fn feet(&self) -> f32 {
        self.pos.y + self.size.y * 0.5
    }

    /// Accelerate downward, capped at `max_fall`
    pub fn apply_gravity(&mut self, dt: f32, max_fall: f32) {
        self.vel.y = (self.vel.y + GRAVITY * dt).min(max_fall);
    }

    pub fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Gravity then motion
    pub fn integrate(&mut self, dt: f32, max_fall: f32) {
        self.apply_gravity(dt, max_fall);
        self.advance(dt);
    }

    /// Push the body out of `solid` along the shallower axis.
    ///
    /// Horizontal resolution snaps to the solid's edge and zeroes `vel.x`.
    /// Vertical resolution snaps, zeroes `vel.y`, and marks the body grounded
    /// only when it landed on the top face. A body that doesn't penetrate the
    /// solid is left untouched.
    pub fn resolve_against(&mut self, solid: &Aabb) -> Option<Contact> {
        let contact = box_contact(&self.aabb(), solid)?;
        let half = self.size * 0.5;
        match contact {
            Contact::Left => {
                self.pos.x = solid.left() - half.x;
                self.vel.x = 0.0;
            }
            Contact::Right => {
                self.pos.x = solid.right() + half.x;
                self.vel.x = 0.0;
            }
            Contact::Top => {
                self.pos.y = solid.top() - half.y;
                self.vel.y = 0.0;
                self.on_ground = true;
            }
            Contact::Bottom => {
                self.pos.y = solid.bottom() + half.y;
                self.vel.y = 0.0;
            }
        }
        Some(contact)
    }

    /// Resolve against every active platform in list order.
    ///
    /// Each resolution sees the position left by the previous one; the result
    /// is the cumulative effect of the sequence, not a simultaneous solve.
    pub fn resolve_platforms(&mut self, platforms: &[Platform]) -> Vec<PlatformContact> {
        self.on_ground = false;
        let mut contacts = Vec::new();
        for platform in platforms.iter().filter(|p| p.is_active) {
            if let Some(contact) = self.resolve_against(&platform.aabb()) {
                contacts.push(PlatformContact {
                    platform_id: platform.id,
                    contact,
                });
            }
        }
        contacts
    }
}
