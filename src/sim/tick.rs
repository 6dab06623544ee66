//! Fixed timestep simulation tick
//!
//! Advances the world one frame in a fixed order: platforms, player,
//! platform reactions, player projectiles, hostile projectiles, foes,
//! power-ups, then the level outcome.

use std::cmp::Ordering;
use std::iter;

use glam::Vec2;

use super::body::PlatformContact;
use super::collision::Contact;
use super::enemy::{Enemy, EnemyCtx, Foe};
use super::player::{MoveIntent, PlayerControls};
use super::projectile::within_blast;
use super::state::{GameEvent, GamePhase, GameState};
use crate::Rgb;
use crate::consts::*;

const HIT_PARTICLES: u32 = 15;
const DEATH_PARTICLES: u32 = 20;
const PLAYER_HIT_PARTICLES: u32 = 10;
const PICKUP_PARTICLES: u32 = 15;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Jump pressed this tick (edge-triggered)
    pub jump_pressed: bool,
    /// Jump button held (wall jumps)
    pub jump_held: bool,
    pub dash: bool,
    /// Fire pressed this tick (edge-triggered)
    pub shoot: bool,
    /// Secondary fire: explosive round
    pub fire_explosive: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

impl TickInput {
    fn intent(&self) -> MoveIntent {
        match (self.move_left, self.move_right) {
            (true, false) => MoveIntent::Left,
            (false, true) => MoveIntent::Right,
            _ => MoveIntent::None,
        }
    }
}

/// A damageable hostile: a top-level foe, or a boss minion by (foe, minion) index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Victim {
    Foe(usize),
    Minion(usize, usize),
}

/// Every live hostile, foes before their minions, in stable order
fn victims(foes: &[Foe]) -> impl Iterator<Item = (Victim, &Enemy)> {
    foes.iter()
        .enumerate()
        .flat_map(|(i, foe)| {
            iter::once((Victim::Foe(i), foe.base())).chain(
                foe.minions()
                    .iter()
                    .enumerate()
                    .map(move |(j, minion)| (Victim::Minion(i, j), minion)),
            )
        })
        .filter(|(_, enemy)| !enemy.is_dead())
}

/// Advance the game state by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    // Only live gameplay advances
    if state.phase != GamePhase::Playing {
        return;
    }

    let dt = dt.clamp(0.0, state.max_frame_dt);

    // Idle/demo mode - AI plays the game
    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }
    let input = &input;

    for platform in &mut state.platforms {
        platform.update(dt);
    }

    if input.jump_pressed {
        state.player.jump();
    }
    let controls = PlayerControls {
        intent: input.intent(),
        jump_held: input.jump_held,
        dash: input.dash,
    };
    let contacts = state.player.update(dt, &controls, &state.platforms);
    react_to_landings(state, &contacts);

    if input.shoot {
        if let Some(bullet) = state.player.shoot(&mut state.ids) {
            state.bullets.push(bullet);
        }
    }
    if input.fire_explosive {
        if let Some(round) = state.player.fire_explosive(&mut state.ids) {
            state.bullets.push(round);
        }
    }

    update_player_projectiles(state, dt);
    prune_foes(state);
    update_enemy_projectiles(state, dt);
    update_foes(state, dt);
    prune_foes(state);
    collect_powerups(state, dt);

    state.time_ticks += 1;
    state.elapsed += dt;

    check_outcome(state);
}

/// Bounce, falling and crumbling platforms react when the player lands on them
fn react_to_landings(state: &mut GameState, contacts: &[PlatformContact]) {
    for landing in contacts.iter().filter(|c| c.contact == Contact::Top) {
        let Some(platform) = state
            .platforms
            .iter_mut()
            .find(|p| p.id == landing.platform_id)
        else {
            continue;
        };
        if let Some(power) = platform.bounce_power() {
            state.player.body.vel.y = power;
            state.player.body.on_ground = false;
        }
        platform.trigger_fall();
        platform.trigger_crumble();
    }
}

fn strike(state: &mut GameState, victim: Victim, amount: i32) {
    match victim {
        Victim::Foe(i) => {
            if let Some(foe) = state.foes.get_mut(i) {
                foe.take_damage(amount);
            }
        }
        Victim::Minion(i, j) => {
            if let Some(minion) = state.foes.get_mut(i).and_then(|f| f.minions_mut().get_mut(j)) {
                minion.take_damage(amount);
            }
        }
    }
}

/// Move player projectiles and resolve their hits.
///
/// Dead hostiles stay in place until `prune_foes`, so indices are stable
/// for the whole pass and nothing is struck after it died.
fn update_player_projectiles(state: &mut GameState, dt: f32) {
    let mut bullets = std::mem::take(&mut state.bullets);
    for bullet in &mut bullets {
        let target = bullet.target().and_then(|t| state.target_position(t));
        bullet.update(dt, target);
        if !bullet.is_live() {
            continue;
        }

        let bbox = bullet.aabb();
        let Some(struck) = victims(&state.foes)
            .find(|(_, enemy)| enemy.aabb().overlaps(&bbox))
            .map(|(victim, _)| victim)
        else {
            continue;
        };

        state.events.push(GameEvent::Explosion {
            pos: bullet.pos,
            color: bullet.color,
            count: HIT_PARTICLES,
        });

        if bullet.explode() {
            let radius = bullet.explosion_radius().unwrap_or(EXPLOSION_RADIUS);
            let (others, points): (Vec<Victim>, Vec<Vec2>) = victims(&state.foes)
                .filter(|(victim, _)| *victim != struck)
                .map(|(victim, enemy)| (victim, enemy.pos()))
                .unzip();
            for i in within_blast(bullet.pos, radius, points) {
                strike(state, others[i], SPLASH_DAMAGE);
            }
        } else {
            bullet.lifespan = 0.0;
        }
        strike(state, struck, BULLET_DAMAGE);
    }
    bullets.retain(|b| !b.is_expired());
    state.bullets = bullets;
}

fn update_enemy_projectiles(state: &mut GameState, dt: f32) {
    let mut shots = std::mem::take(&mut state.enemy_bullets);
    for shot in &mut shots {
        let target = shot.target().and_then(|t| state.target_position(t));
        shot.update(dt, target);
        if !shot.is_live() || !shot.aabb().overlaps(&state.player.body.aabb()) {
            continue;
        }
        if state.player.take_damage() {
            state.events.push(GameEvent::PlayerDamaged {
                health: state.player.health,
            });
            state.events.push(GameEvent::Explosion {
                pos: shot.pos,
                color: Rgb::RED,
                count: PLAYER_HIT_PARTICLES,
            });
            shot.lifespan = 0.0;
        }
    }
    shots.retain(|s| !s.is_expired());
    state.enemy_bullets = shots;
}

fn update_foes(state: &mut GameState, dt: f32) {
    let mut spawned = Vec::new();
    let mut ctx = EnemyCtx {
        player_pos: state.player.pos(),
        platforms: &state.platforms,
        ids: &mut state.ids,
        spawned: &mut spawned,
        rng: &mut state.rng,
        events: &mut state.events,
    };
    for foe in &mut state.foes {
        foe.update(dt, &mut ctx);
    }
    state.enemy_bullets.append(&mut spawned);

    let player_box = state.player.body.aabb();
    let touching = victims(&state.foes).any(|(_, enemy)| enemy.aabb().overlaps(&player_box));
    if touching && state.player.take_damage() {
        state.events.push(GameEvent::PlayerDamaged {
            health: state.player.health,
        });
        state.events.push(GameEvent::Explosion {
            pos: state.player.pos(),
            color: Rgb::RED,
            count: HIT_PARTICLES,
        });
    }
}

fn award_kill(state: &mut GameState, enemy: &Enemy) {
    state.score += u64::from(enemy.points);
    state.events.push(GameEvent::EnemyKilled {
        id: enemy.id,
        kind: enemy.kind,
        points: enemy.points,
    });
    state.events.push(GameEvent::Explosion {
        pos: enemy.pos(),
        color: Rgb::RED,
        count: DEATH_PARTICLES,
    });
    log::debug!("{:?} #{} destroyed (+{})", enemy.kind, enemy.id, enemy.points);
}

/// Compact pass: score and drop the dead, drop foes that fell out of the world
fn prune_foes(state: &mut GameState) {
    let mut reaped: Vec<Enemy> = Vec::new();
    for foe in &mut state.foes {
        reaped.extend(foe.reap_minions());
    }

    let (dead, alive): (Vec<Foe>, Vec<Foe>) = std::mem::take(&mut state.foes)
        .into_iter()
        .partition(|f| f.is_dead());
    state.foes = alive;

    for minion in &reaped {
        award_kill(state, minion);
    }
    for foe in &dead {
        award_kill(state, foe.base());
    }

    state.foes.retain(|foe| {
        let gone = foe.base().fell_out();
        if gone {
            log::debug!("{:?} #{} fell out of the world", foe.kind(), foe.id());
        }
        !gone
    });
}

fn collect_powerups(state: &mut GameState, dt: f32) {
    let player_box = state.player.body.aabb();
    for pickup in &mut state.powerups {
        pickup.update(dt);
        if !pickup.aabb().overlaps(&player_box) {
            continue;
        }
        if let Some(points) = pickup.collect(&mut state.player) {
            state.score += points;
            state.events.push(GameEvent::PowerUpCollected { kind: pickup.kind });
            state.events.push(GameEvent::Explosion {
                pos: pickup.pos,
                color: pickup.kind.color(),
                count: PICKUP_PARTICLES,
            });
        }
    }
    state.powerups.retain(|p| !p.collected);
}

/// Player defeat takes precedence over clearing the level in the same tick
fn check_outcome(state: &mut GameState) {
    if !state.player.is_alive() {
        state.lives = state.lives.saturating_sub(1);
        state.events.push(GameEvent::PlayerDefeated {
            lives_remaining: state.lives,
        });
        if state.lives > 0 {
            log::info!("Player defeated, {} lives left", state.lives);
            state.reset_level();
        } else {
            log::info!("Game over with score {}", state.score);
            state.phase = GamePhase::GameOver;
        }
        return;
    }

    if !state.foes.is_empty() {
        return;
    }
    if state.is_final_level() {
        state.phase = GamePhase::Victory;
        state.events.push(GameEvent::GameCompleted { score: state.score });
        log::info!("Campaign complete with score {}", state.score);
    } else {
        state.phase = GamePhase::LevelCleared;
        state.events.push(GameEvent::LevelCleared {
            level: state.level_index,
        });
        log::info!("Level {} cleared", state.level_index + 1);
    }
}

/// Demo driver: chase the nearest hostile (or a pickup), hop walls, shoot when lined up
fn autopilot(state: &GameState, input: &mut TickInput) {
    let player = &state.player;
    let me = player.pos();

    let quarry = victims(&state.foes)
        .map(|(_, enemy)| enemy.pos())
        .min_by(|a, b| {
            a.distance_squared(me)
                .partial_cmp(&b.distance_squared(me))
                .unwrap_or(Ordering::Equal)
        });
    let Some(goal) = quarry.or_else(|| state.powerups.first().map(|p| p.pos)) else {
        return;
    };

    let dx = goal.x - me.x;
    let dy = goal.y - me.y;
    input.move_left = dx < -20.0;
    input.move_right = dx > 20.0;

    let stuck = player.body.on_ground && player.body.vel.x.abs() < 1.0 && dx.abs() > 20.0;
    input.jump_pressed = player.wall_sliding || stuck || (dy < -80.0 && player.body.on_ground);
    input.jump_held = player.wall_sliding;

    let lined_up = dy.abs() < 40.0 && (dx > 0.0) == player.facing_right;
    input.shoot = quarry.is_some() && lined_up;
    input.fire_explosive = input.shoot && dx.abs() < 300.0;
}
