//! Read-only render view of the world
//!
//! Built fresh from `GameState` whenever a renderer wants a frame. Holds
//! plain data only (positions, sizes, variants and transient visual state),
//! so a renderer never needs access to the simulation types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind, Foe};
use super::level::Theme;
use super::platform::{Platform, PlatformKind};
use super::player::{Player, TimedPower};
use super::powerup::{PowerKind, PowerUp};
use super::projectile::{Projectile, ProjectileKind};
use super::state::{GamePhase, GameState};
use crate::Rgb;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub facing_right: bool,
    /// Invulnerability blink is in its visible half
    pub visible: bool,
    pub dashing: bool,
    /// Dash recharge, 0.0..=1.0
    pub dash_ready: f32,
    pub wall_sliding: bool,
    pub power: Option<TimedPower>,
    pub run_frame: u8,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            pos: player.pos(),
            size: player.body.size,
            health: player.health,
            max_health: player.max_health,
            facing_right: player.facing_right,
            visible: !player.invulnerable || player.blink_on(),
            dashing: player.dashing,
            dash_ready: player.dash_ready(),
            wall_sliding: player.wall_sliding,
            power: player.power.map(|p| p.kind),
            run_frame: player.run_frame,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformView {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: PlatformKind,
    pub color: Rgb,
    pub crumble_stage: u8,
}

impl From<&Platform> for PlatformView {
    fn from(platform: &Platform) -> Self {
        Self {
            id: platform.id,
            pos: platform.pos,
            size: platform.size,
            kind: platform.kind(),
            color: platform.color,
            crumble_stage: platform.crumble_stage(),
        }
    }
}

/// Boss-only overlay on an enemy view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossView {
    pub phase: u8,
    pub shield_active: bool,
    /// Remaining shield, 0.0..=1.0
    pub shield_fraction: f32,
    pub rage_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub color: Rgb,
    pub health: i32,
    pub max_health: i32,
    pub facing_right: bool,
    pub flashing: bool,
    pub boss: Option<BossView>,
}

impl From<&Enemy> for EnemyView {
    fn from(enemy: &Enemy) -> Self {
        Self {
            id: enemy.id,
            kind: enemy.kind,
            pos: enemy.pos(),
            size: enemy.body.size,
            color: enemy.kind.color(),
            health: enemy.health,
            max_health: enemy.max_health,
            facing_right: enemy.facing_right,
            flashing: enemy.is_flashing(),
            boss: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileShape {
    Bullet,
    Missile,
    Explosive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: u32,
    pub shape: ProjectileShape,
    pub pos: Vec2,
    pub radius: f32,
    pub color: Rgb,
    /// Oldest first
    pub trail: Vec<Vec2>,
    /// Missile heading in radians
    pub heading: Option<f32>,
    /// Blast progress 0.0..=1.0 once an explosive has detonated
    pub explosion_progress: Option<f32>,
    pub explosion_radius: Option<f32>,
}

impl From<&Projectile> for ProjectileView {
    fn from(p: &Projectile) -> Self {
        let shape = match p.kind {
            ProjectileKind::Bullet => ProjectileShape::Bullet,
            ProjectileKind::Homing { .. } => ProjectileShape::Missile,
            ProjectileKind::Explosive { .. } => ProjectileShape::Explosive,
        };
        Self {
            id: p.id,
            shape,
            pos: p.pos,
            radius: p.radius,
            color: p.color,
            trail: p.trail.iter().copied().collect(),
            heading: p.heading(),
            explosion_progress: p.explosion_progress(),
            explosion_radius: p.explosion_radius(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpView {
    pub id: u32,
    pub kind: PowerKind,
    /// Centre including the bob offset
    pub pos: Vec2,
    pub color: Rgb,
    /// Degrees
    pub rotation: f32,
}

impl From<&PowerUp> for PowerUpView {
    fn from(p: &PowerUp) -> Self {
        Self {
            id: p.id,
            kind: p.kind,
            pos: p.pos + Vec2::new(0.0, p.bob_offset()),
            color: p.kind.color(),
            rotation: p.rotation(),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub theme: Theme,
    pub sky: Rgb,
    pub phase: GamePhase,
    /// 0-based
    pub level_index: u32,
    pub score: u64,
    pub lives: u8,
    pub player: PlayerView,
    pub platforms: Vec<PlatformView>,
    /// Foes first, each boss followed by its minions
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub powerups: Vec<PowerUpView>,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let theme = state.theme();
        let mut enemies = Vec::with_capacity(state.foes.len());
        for foe in &state.foes {
            let mut view = EnemyView::from(foe.base());
            if let Foe::Boss(boss) = foe {
                view.boss = Some(BossView {
                    phase: boss.phase,
                    shield_active: boss.shield_active,
                    shield_fraction: boss.shield_fraction(),
                    rage_mode: boss.rage_mode,
                });
            }
            enemies.push(view);
            enemies.extend(foe.minions().iter().map(EnemyView::from));
        }

        Self {
            theme,
            sky: theme.sky(),
            phase: state.phase,
            level_index: state.level_index,
            score: state.score,
            lives: state.lives,
            player: PlayerView::from(&state.player),
            platforms: state
                .platforms
                .iter()
                .filter(|p| p.is_active)
                .map(PlatformView::from)
                .collect(),
            enemies,
            projectiles: state
                .bullets
                .iter()
                .chain(&state.enemy_bullets)
                .map(ProjectileView::from)
                .collect(),
            powerups: state.powerups.iter().map(PowerUpView::from).collect(),
        }
    }
}
