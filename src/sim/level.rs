//! Level campaigns: themes, platform layouts, enemy rosters and pickups
//!
//! A campaign is a list of `LevelLayout`s. The built-in one has five themed
//! levels ending in a boss arena; others can be loaded from JSON. Layouts
//! are plain data. Entities are built from them when a level (re)starts,
//! drawing all randomness from the game's RNG.

use std::path::Path;

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::enemy::{Enemy, EnemyKind, Foe};
use super::platform::{Platform, PlatformKind};
use super::powerup::{PowerKind, PowerUp};
use super::state::EntityIds;
use crate::Rgb;
use crate::consts::*;
use crate::error::{self, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Forest,
    Ice,
    Desert,
    Volcano,
    Tech,
}

impl Theme {
    /// Base and accent colours for platforms
    pub fn palette(self) -> (Rgb, Rgb) {
        match self {
            Theme::Forest => (Rgb(76, 153, 0), Rgb(102, 51, 0)),
            Theme::Ice => (Rgb(173, 216, 230), Rgb(240, 248, 255)),
            Theme::Desert => (Rgb(210, 180, 140), Rgb(244, 164, 96)),
            Theme::Volcano => (Rgb(139, 0, 0), Rgb(255, 69, 0)),
            Theme::Tech => (Rgb(70, 130, 180), Rgb(211, 211, 211)),
        }
    }

    pub fn sky(self) -> Rgb {
        match self {
            Theme::Forest => Rgb(135, 206, 235),
            Theme::Ice => Rgb(200, 230, 255),
            Theme::Desert => Rgb(255, 230, 180),
            Theme::Volcano => Rgb(70, 20, 20),
            Theme::Tech => Rgb(20, 20, 40),
        }
    }

    pub fn platform_color(self, kind: PlatformKind) -> Rgb {
        let (base, accent) = self.palette();
        match kind {
            PlatformKind::Normal => base,
            PlatformKind::Moving => base.shade(20),
            PlatformKind::Bounce => accent,
            PlatformKind::Falling => base.shade(-30),
            PlatformKind::Crumbling => base.shade(-15),
        }
    }
}

/// One platform in a layout. `x`/`y` are the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub kind: PlatformKind,
    /// Moving platforms only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}

impl PlatformSpec {
    pub fn new(x: f32, y: f32, width: f32, height: f32, kind: PlatformKind) -> Self {
        Self {
            x,
            y,
            width,
            height,
            kind,
            speed: None,
            distance: None,
        }
    }

    fn moving(x: f32, y: f32, width: f32, speed: f32, distance: f32) -> Self {
        Self {
            speed: Some(speed),
            distance: Some(distance),
            ..Self::new(x, y, width, 20.0, PlatformKind::Moving)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub x: f32,
    pub y: f32,
    pub kind: EnemyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EnemyRoster {
    /// `count` enemies of random `kinds` on random raised platforms
    Random { count: u32, kinds: Vec<EnemyKind> },
    Fixed { spawns: Vec<EnemySpawn> },
    /// A single boss at the given centre
    Boss { x: f32, y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpSpawn {
    pub x: f32,
    pub y: f32,
    pub kind: PowerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PowerUpPlan {
    /// Between `min` and `max` (inclusive) random pickups on raised platforms
    Random { min: u32, max: u32 },
    Fixed { spawns: Vec<PowerUpSpawn> },
}

impl Default for PowerUpPlan {
    fn default() -> Self {
        PowerUpPlan::Random { min: 2, max: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    #[serde(default)]
    pub theme: Theme,
    /// The first entry is the ground; random placement skips it
    pub platforms: Vec<PlatformSpec>,
    pub enemies: EnemyRoster,
    #[serde(default)]
    pub powerups: PowerUpPlan,
}

impl LevelLayout {
    pub fn is_boss_level(&self) -> bool {
        matches!(self.enemies, EnemyRoster::Boss { .. })
    }

    pub fn validate(&self) -> Result<()> {
        if self.platforms.is_empty() {
            return Err(Error::InvalidLayout("level has no platforms".into()));
        }
        for (i, spec) in self.platforms.iter().enumerate() {
            if spec.width <= 0.0 || spec.height <= 0.0 {
                return Err(Error::InvalidLayout(format!(
                    "platform {i} has non-positive size {}x{}",
                    spec.width, spec.height
                )));
            }
        }
        let raised = self.platforms.len() > 1;
        match &self.enemies {
            EnemyRoster::Random { count, kinds } if *count > 0 => {
                if kinds.is_empty() {
                    return Err(Error::InvalidLayout("random roster lists no kinds".into()));
                }
                if kinds.contains(&EnemyKind::Boss) {
                    return Err(Error::InvalidLayout(
                        "bosses must use the boss roster".into(),
                    ));
                }
                if !raised {
                    return Err(Error::InvalidLayout(
                        "random roster needs a platform besides the ground".into(),
                    ));
                }
            }
            EnemyRoster::Fixed { spawns } if spawns.iter().any(|s| s.kind == EnemyKind::Boss) => {
                return Err(Error::InvalidLayout(
                    "bosses must use the boss roster".into(),
                ));
            }
            _ => {}
        }
        if let PowerUpPlan::Random { min, max } = self.powerups {
            if min > max {
                return Err(Error::InvalidLayout(format!(
                    "power-up range {min}..={max} is empty"
                )));
            }
            if max > 0 && !raised {
                return Err(Error::InvalidLayout(
                    "random power-ups need a platform besides the ground".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn build_platforms(&self, ids: &mut EntityIds) -> Vec<Platform> {
        self.platforms
            .iter()
            .map(|spec| {
                let mut platform = Platform::new(
                    ids.next_id(),
                    Vec2::new(spec.x, spec.y),
                    Vec2::new(spec.width, spec.height),
                    spec.kind,
                );
                if spec.speed.is_some() || spec.distance.is_some() {
                    platform = platform.with_motion(
                        spec.speed.unwrap_or(MOVING_PLATFORM_SPEED),
                        spec.distance.unwrap_or(MOVING_PLATFORM_DISTANCE),
                    );
                }
                platform.color = self.theme.platform_color(spec.kind);
                platform
            })
            .collect()
    }

    /// Random point on top of a raised platform, `lift` pixels above it
    fn random_perch(&self, rng: &mut Pcg32, lift: f32) -> Option<Vec2> {
        let spec = self.platforms.get(1..)?.choose(rng)?;
        let inset = 20.0f32.min(spec.width * 0.5);
        let x = spec.x + rng.random_range(inset..=spec.width - inset);
        Some(Vec2::new(x, spec.y - lift))
    }

    pub fn spawn_foes(&self, ids: &mut EntityIds, rng: &mut Pcg32) -> Vec<Foe> {
        match &self.enemies {
            EnemyRoster::Random { count, kinds } => (0..*count)
                .filter_map(|_| {
                    let kind = *kinds.choose(rng)?;
                    let pos = self.random_perch(rng, 30.0)?;
                    Some(Foe::Regular(Enemy::new(ids.next_id(), pos, kind)))
                })
                .collect(),
            EnemyRoster::Fixed { spawns } => spawns
                .iter()
                .map(|s| Foe::Regular(Enemy::new(ids.next_id(), Vec2::new(s.x, s.y), s.kind)))
                .collect(),
            EnemyRoster::Boss { x, y } => {
                vec![Foe::Boss(Box::new(Boss::new(ids.next_id(), Vec2::new(*x, *y))))]
            }
        }
    }

    pub fn spawn_powerups(&self, ids: &mut EntityIds, rng: &mut Pcg32) -> Vec<PowerUp> {
        match &self.powerups {
            PowerUpPlan::Random { min, max } => {
                let count = rng.random_range(*min..=*max);
                (0..count)
                    .filter_map(|_| {
                        let pos = self.random_perch(rng, 20.0)?;
                        let kind = *PowerKind::ALL.choose(rng)?;
                        Some(PowerUp::new(ids.next_id(), pos, kind))
                    })
                    .collect()
            }
            PowerUpPlan::Fixed { spawns } => spawns
                .iter()
                .map(|s| PowerUp::new(ids.next_id(), Vec2::new(s.x, s.y), s.kind))
                .collect(),
        }
    }
}

/// An ordered campaign of levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub levels: Vec<LevelLayout>,
}

fn ground() -> PlatformSpec {
    PlatformSpec::new(
        0.0,
        SCREEN_HEIGHT - GROUND_HEIGHT,
        SCREEN_WIDTH,
        GROUND_HEIGHT,
        PlatformKind::Normal,
    )
}

fn slab(x: f32, y: f32, width: f32, kind: PlatformKind) -> PlatformSpec {
    PlatformSpec::new(x, y, width, 20.0, kind)
}

impl LevelSet {
    /// The five-level campaign: forest, ice, desert, volcano, then the boss
    pub fn builtin() -> Self {
        use EnemyKind::*;
        use PlatformKind::*;

        let random = |count, kinds: &[EnemyKind]| EnemyRoster::Random {
            count,
            kinds: kinds.to_vec(),
        };

        let forest = LevelLayout {
            theme: Theme::Forest,
            platforms: vec![
                ground(),
                slab(100.0, 600.0, 200.0, Normal),
                slab(400.0, 500.0, 200.0, Normal),
                slab(700.0, 400.0, 200.0, Normal),
                slab(400.0, 300.0, 200.0, Normal),
                slab(100.0, 200.0, 200.0, Normal),
            ],
            enemies: random(2, &[Basic]),
            powerups: PowerUpPlan::default(),
        };

        let ice = LevelLayout {
            theme: Theme::Ice,
            platforms: vec![
                ground(),
                slab(300.0, 600.0, 150.0, Normal),
                PlatformSpec::moving(600.0, 500.0, 150.0, 120.0, 300.0),
                slab(300.0, 400.0, 150.0, Normal),
                PlatformSpec::moving(600.0, 300.0, 150.0, 150.0, 300.0),
                slab(300.0, 200.0, 150.0, Normal),
            ],
            enemies: random(3, &[Basic, Runner]),
            powerups: PowerUpPlan::default(),
        };

        let desert = LevelLayout {
            theme: Theme::Desert,
            platforms: vec![
                ground(),
                slab(200.0, 600.0, 150.0, Bounce),
                slab(500.0, 450.0, 150.0, Normal),
                slab(800.0, 400.0, 150.0, Normal),
                slab(500.0, 250.0, 150.0, Bounce),
                slab(200.0, 150.0, 150.0, Normal),
            ],
            enemies: random(4, &[Basic, Runner, Tank]),
            powerups: PowerUpPlan::default(),
        };

        let volcano = LevelLayout {
            theme: Theme::Volcano,
            platforms: vec![
                ground(),
                slab(200.0, 600.0, 150.0, Normal),
                slab(400.0, 500.0, 150.0, Falling),
                slab(600.0, 400.0, 150.0, Crumbling),
                slab(800.0, 300.0, 150.0, Falling),
                slab(600.0, 200.0, 150.0, Normal),
                slab(400.0, 150.0, 150.0, Normal),
                slab(200.0, 100.0, 150.0, Crumbling),
            ],
            enemies: random(5, &[Basic, Runner, Tank, Shooter]),
            powerups: PowerUpPlan::default(),
        };

        let arena = LevelLayout {
            theme: Theme::Tech,
            platforms: vec![
                ground(),
                slab(200.0, 600.0, 200.0, Normal),
                slab(500.0, 600.0, 200.0, Normal),
                slab(800.0, 600.0, 200.0, Normal),
                slab(300.0, 450.0, 150.0, Moving),
                slab(700.0, 450.0, 150.0, Moving),
                slab(200.0, 300.0, 150.0, Normal),
                slab(500.0, 300.0, 200.0, Bounce),
                slab(800.0, 300.0, 150.0, Normal),
            ],
            enemies: EnemyRoster::Boss {
                x: SCREEN_WIDTH * 0.5,
                y: SCREEN_HEIGHT * 0.5,
            },
            powerups: PowerUpPlan::default(),
        };

        Self {
            levels: vec![forest, ice, desert, volcano, arena],
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let set: LevelSet = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let set = Self::from_json(&error::read_to_string(path)?)?;
        log::info!("Loaded {} levels from {}", set.len(), path.display());
        Ok(set)
    }

    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(Error::InvalidLayout("campaign has no levels".into()));
        }
        for (i, level) in self.levels.iter().enumerate() {
            level.validate().map_err(|err| match err {
                Error::InvalidLayout(reason) => {
                    Error::InvalidLayout(format!("level {i}: {reason}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: u32) -> Result<&LevelLayout> {
        self.levels.get(index as usize).ok_or(Error::UnknownLevel {
            index,
            count: self.levels.len() as u32,
        })
    }

    pub fn is_final(&self, index: u32) -> bool {
        index as usize + 1 >= self.levels.len()
    }
}

impl Default for LevelSet {
    fn default() -> Self {
        Self::builtin()
    }
}
