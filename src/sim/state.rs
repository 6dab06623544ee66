//! Game state and core simulation types
//!
//! `GameState` is the whole session: the campaign, the live entity tables,
//! score and lives, and the one RNG every random choice draws from. It is
//! serializable and deterministic for a given seed and input sequence.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{EnemyKind, Foe};
use super::level::{LevelLayout, LevelSet, Theme};
use super::platform::Platform;
use super::player::Player;
use super::powerup::{PowerKind, PowerUp};
use super::projectile::{Projectile, TargetRef};
use super::snapshot::RenderSnapshot;
use crate::Rgb;
use crate::consts::*;
use crate::error::{Error, Result};
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Every enemy on a non-final level is gone; waiting for `advance_level`
    LevelCleared,
    /// Final level cleared
    Victory,
    /// Out of lives
    GameOver,
}

/// Things that happened during a tick, for effects and game-flow collaborators.
///
/// Accumulated in `GameState::events` and drained by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Fire-and-forget particle burst request
    Explosion { pos: Vec2, color: Rgb, count: u32 },
    EnemyKilled { id: u32, kind: EnemyKind, points: u32 },
    PlayerDamaged { health: i32 },
    PowerUpCollected { kind: PowerKind },
    BossPhaseChanged { phase: u8 },
    BossShieldBroken,
    LevelCleared { level: u32 },
    PlayerDefeated { lives_remaining: u8 },
    GameCompleted { score: u64 },
}

/// Entity id allocator. Ids start at 1 and are never reused in a session,
/// so a stale id simply stops resolving.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityIds {
    last: u32,
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        self.last += 1;
        self.last
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub levels: LevelSet,
    /// Current level index (0-based)
    pub level_index: u32,
    pub lives: u8,
    pub starting_lives: u8,
    pub score: u64,
    /// Simulation tick counter (playing ticks only)
    pub time_ticks: u64,
    /// Simulated seconds (playing ticks only)
    pub elapsed: f32,
    /// Upper bound on a single tick's dt
    pub max_frame_dt: f32,
    pub phase: GamePhase,
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub foes: Vec<Foe>,
    /// Player projectiles
    pub bullets: Vec<Projectile>,
    /// Hostile projectiles
    pub enemy_bullets: Vec<Projectile>,
    pub powerups: Vec<PowerUp>,
    /// Pending events, oldest first
    pub events: Vec<GameEvent>,
    pub ids: EntityIds,
}

impl GameState {
    /// New session on the built-in campaign
    pub fn new(seed: u64) -> Self {
        let mut state = Self::empty(seed, LevelSet::builtin(), STARTING_LIVES);
        state.reset_level();
        state
    }

    /// New session on a custom campaign
    pub fn with_levels(seed: u64, levels: LevelSet, lives: u8) -> Result<Self> {
        levels.validate()?;
        if lives == 0 {
            return Err(Error::InvalidSettings("starting lives must be at least 1".into()));
        }
        let mut state = Self::empty(seed, levels, lives);
        state.reset_level();
        Ok(state)
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let levels = match &settings.levels_path {
            Some(path) => LevelSet::load(path)?,
            None => LevelSet::builtin(),
        };
        let mut state = Self::with_levels(settings.seed, levels, settings.starting_lives)?;
        state.max_frame_dt = settings.max_frame_dt;
        Ok(state)
    }

    fn empty(seed: u64, levels: LevelSet, lives: u8) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            levels,
            level_index: 0,
            lives,
            starting_lives: lives,
            score: 0,
            time_ticks: 0,
            elapsed: 0.0,
            max_frame_dt: MAX_FRAME_DT,
            phase: GamePhase::Playing,
            player: Player::new(Player::spawn_point()),
            platforms: Vec::new(),
            foes: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            powerups: Vec::new(),
            events: Vec::new(),
            ids: EntityIds::default(),
        }
    }

    pub fn current_level(&self) -> Option<&LevelLayout> {
        self.levels.levels.get(self.level_index as usize)
    }

    pub fn theme(&self) -> Theme {
        self.current_level().map(|l| l.theme).unwrap_or_default()
    }

    pub fn is_final_level(&self) -> bool {
        self.levels.is_final(self.level_index)
    }

    /// Rebuild every entity table for the current level.
    ///
    /// Score and lives are untouched.
    pub fn reset_level(&mut self) {
        let Some(layout) = self.levels.levels.get(self.level_index as usize) else {
            log::warn!("No layout for level {}", self.level_index);
            return;
        };
        self.player = Player::new(Player::spawn_point());
        self.platforms = layout.build_platforms(&mut self.ids);
        self.powerups = layout.spawn_powerups(&mut self.ids, &mut self.rng);
        self.foes = layout.spawn_foes(&mut self.ids, &mut self.rng);
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.phase = GamePhase::Playing;
        log::info!(
            "Level {} ({:?}): {} platforms, {} foes, {} power-ups",
            self.level_index + 1,
            layout.theme,
            self.platforms.len(),
            self.foes.len(),
            self.powerups.len()
        );
    }

    /// Move on from a cleared level to the next one
    pub fn advance_level(&mut self) -> Result<()> {
        if self.phase != GamePhase::LevelCleared {
            return Ok(());
        }
        let next = self.level_index + 1;
        self.levels.get(next)?;
        self.level_index = next;
        self.reset_level();
        Ok(())
    }

    /// Start the campaign over from the first level
    pub fn restart(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.level_index = 0;
        self.lives = self.starting_lives;
        self.score = 0;
        self.events.clear();
        self.reset_level();
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Resolve a missile target to a live position, if it still exists
    pub fn target_position(&self, target: TargetRef) -> Option<Vec2> {
        match target {
            TargetRef::Player => self.player.is_alive().then(|| self.player.pos()),
            TargetRef::Enemy(id) => self
                .foes
                .iter()
                .flat_map(|foe| std::iter::once(foe.base()).chain(foe.minions()))
                .find(|enemy| enemy.id == id && !enemy.is_dead())
                .map(|enemy| enemy.pos()),
        }
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::Enemy;

    #[test]
    fn test_new_loads_first_level() {
        let state = GameState::new(5);
        assert_eq!(state.level_index, 0);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.platforms.len(), 6);
        assert_eq!(state.foes.len(), 2);
        assert!((2..=3).contains(&state.powerups.len()));
        assert_eq!(state.player.pos(), Player::spawn_point());
    }

    #[test]
    fn test_ids_are_unique_and_not_reused() {
        let mut state = GameState::new(5);
        let first: Vec<u32> = state.foes.iter().map(Foe::id).collect();
        state.reset_level();
        let second: Vec<u32> = state.foes.iter().map(Foe::id).collect();
        assert!(second.iter().all(|id| !first.contains(id)));
    }

    #[test]
    fn test_target_position_tracks_live_entities() {
        let mut state = GameState::new(5);
        let id = state.foes[0].id();
        let pos = state.foes[0].base().pos();
        assert_eq!(state.target_position(TargetRef::Enemy(id)), Some(pos));
        assert_eq!(state.target_position(TargetRef::Player), Some(state.player.pos()));

        state.foes[0].take_damage(1000);
        assert_eq!(state.target_position(TargetRef::Enemy(id)), None);
        state.foes.remove(0);
        assert_eq!(state.target_position(TargetRef::Enemy(id)), None);
        assert_eq!(state.target_position(TargetRef::Enemy(9999)), None);

        state.player.health = 0;
        assert_eq!(state.target_position(TargetRef::Player), None);
    }

    #[test]
    fn test_advance_level_only_after_clear() {
        let mut state = GameState::new(5);
        state.advance_level().unwrap();
        assert_eq!(state.level_index, 0);

        state.phase = GamePhase::LevelCleared;
        state.advance_level().unwrap();
        assert_eq!(state.level_index, 1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.foes.len(), 3);
    }

    #[test]
    fn test_advance_past_final_level_fails() {
        let mut state = GameState::new(5);
        state.level_index = 4;
        state.reset_level();
        state.phase = GamePhase::LevelCleared;
        assert!(matches!(
            state.advance_level(),
            Err(Error::UnknownLevel { index: 5, count: 5 })
        ));
    }

    #[test]
    fn test_restart_is_reproducible() {
        let mut state = GameState::new(77);
        let spawns = |s: &GameState| s.foes.iter().map(|f| f.base().pos()).collect::<Vec<_>>();
        let first_run = spawns(&state);
        state.score = 900;
        state.lives = 1;
        state.foes.push(Foe::Regular(Enemy::new(999, Vec2::ZERO, EnemyKind::Tank)));
        state.restart();
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(spawns(&state), first_run);
    }

    #[test]
    fn test_with_levels_rejects_zero_lives() {
        assert!(matches!(
            GameState::with_levels(1, LevelSet::builtin(), 0),
            Err(Error::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_state_serializes() {
        let state = GameState::new(5);
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.foes.len(), state.foes.len());
        assert_eq!(back.level_index, state.level_index);
    }
}
