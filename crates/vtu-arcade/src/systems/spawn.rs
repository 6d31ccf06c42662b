//! Runner spawning: per-step probabilistic draws, the deterministic boss,
//! the meteor-shower window and the weather schedule.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::config::RunnerConfig;
use crate::api::game::SessionContext;
use crate::api::types::{SessionEvent, SoundEvent, Weather};
use crate::components::transient::{BossState, ObstacleKind, PowerUpKind, TransientEntity, TransientKind};
use crate::core::rng::RandomSource;
use crate::core::scene::Scene;

/// Meteor shower timing. Opens at `next_level`, closes after a fixed window
/// regardless of spawn draws, then waits for the next 10-level band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeteorWindow {
    active: bool,
    remaining_ms: f64,
    next_level: u32,
}

impl MeteorWindow {
    pub fn new(first_level: u32) -> Self {
        Self {
            active: false,
            remaining_ms: 0.0,
            next_level: first_level,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns `Some(active)` when the window opens or closes.
    pub fn update(&mut self, level: u32, dt_ms: f64, window_ms: f64) -> Option<bool> {
        if self.active {
            self.remaining_ms -= dt_ms;
            if self.remaining_ms <= 0.0 {
                self.active = false;
                return Some(false);
            }
        } else if level >= self.next_level {
            self.active = true;
            self.remaining_ms = window_ms;
            self.next_level = (level / 10 + 1) * 10;
            return Some(true);
        }
        None
    }
}

/// Boss health for the boss that appears at `level`.
pub fn boss_health(level: u32, interval: u32) -> i32 {
    5 + 3 * (level / interval) as i32 - 3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnController {
    meteor: MeteorWindow,
    last_weather_score: i64,
}

impl SpawnController {
    pub fn new(cfg: &RunnerConfig) -> Self {
        Self {
            meteor: MeteorWindow::new(cfg.meteor_level),
            last_weather_score: 0,
        }
    }

    pub fn meteor_active(&self) -> bool {
        self.meteor.is_active()
    }

    /// Run one step of spawning. New entities enter at the trailing edge.
    pub fn tick(
        &mut self,
        scene: &mut Scene,
        ctx: &mut SessionContext,
        rng: &mut dyn RandomSource,
        cfg: &RunnerConfig,
        level: u32,
    ) {
        let dt_ms = cfg.fixed_dt as f64 * 1000.0;
        if let Some(active) = self.meteor.update(level, dt_ms, cfg.meteor_window_ms) {
            log::info!("meteor shower {}", if active { "started" } else { "ended" });
            if !active {
                scene.retain(|e| e.kind != TransientKind::Meteor);
            }
            ctx.emit_event(SessionEvent::MeteorShower { active });
        }

        let edge = cfg.world_width;
        let ground = cfg.ground_line();

        if rng.chance(cfg.obstacle_chance) {
            let kind = if rng.next_f32() < 0.5 { ObstacleKind::Cactus } else { ObstacleKind::Pine };
            let pos = Vec2::new(edge, ground - kind.size().y);
            self.spawn(scene, ctx, TransientKind::Obstacle(kind), pos);
        }
        if rng.chance(cfg.enemy_chance) {
            self.spawn(scene, ctx, TransientKind::Enemy, Vec2::new(edge, ground - 60.0));
        }
        if rng.chance(cfg.coin_chance) {
            let y = ground - 40.0 - rng.range(0.0, 80.0);
            self.spawn(scene, ctx, TransientKind::Coin, Vec2::new(edge, y));
        }
        if rng.chance(cfg.power_up_chance) {
            let y = ground - 40.0 - rng.range(0.0, 100.0);
            let kind = PowerUpKind::ALL[rng.next_int(PowerUpKind::ALL.len() as u32) as usize];
            self.spawn(scene, ctx, TransientKind::PowerUp(kind), Vec2::new(edge, y));
        }
        if self.meteor.is_active() && rng.chance(cfg.meteor_chance) {
            let x = rng.range(0.0, cfg.world_width);
            let vy = rng.range(60.0, 150.0);
            let id = ctx.next_id();
            scene.spawn(
                TransientEntity::new(id, TransientKind::Meteor, Vec2::new(x, -10.0)).with_vel(Vec2::new(0.0, vy)),
            );
        }

        if level % cfg.boss_level_interval == 0 && scene.boss().is_none() {
            let health = boss_health(level, cfg.boss_level_interval);
            let boss = BossState {
                health,
                max_health: health,
                steps_left: cfg.boss_lifetime_steps,
                bullet_countdown: cfg.boss_bullet_interval_steps,
                flash: 0,
            };
            let pos = Vec2::new(edge, ground - TransientKind::Boss(boss).size().y);
            self.spawn(scene, ctx, TransientKind::Boss(boss), pos);
            log::info!("boss spawned at level {} with {} health", level, health);
            ctx.emit_sound(SoundEvent::BOSS);
            ctx.emit_event(SessionEvent::BossSpawned { health });
        }
    }

    fn spawn(&self, scene: &mut Scene, ctx: &mut SessionContext, kind: TransientKind, pos: Vec2) {
        let id = ctx.next_id();
        log::debug!("spawn {:?} #{} at {:?}", kind, id.0, pos);
        scene.spawn(TransientEntity::new(id, kind, pos));
    }

    /// Pick new weather once `score` has moved a full interval past the
    /// last change. Rain and snow are night, sunny is day, autumn is either.
    pub fn update_weather(
        &mut self,
        score: i64,
        interval: i64,
        rng: &mut dyn RandomSource,
    ) -> Option<(Weather, bool)> {
        if score - self.last_weather_score < interval {
            return None;
        }
        self.last_weather_score = score;
        let weather = Weather::ALL[rng.next_int(Weather::ALL.len() as u32) as usize];
        let night = match weather {
            Weather::Sunny => false,
            Weather::Rainy | Weather::Snow => true,
            Weather::Autumn => rng.next_bool(),
        };
        Some((weather, night))
    }
}
