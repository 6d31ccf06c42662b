//! Side-scrolling runner: hazards raise quizzes, pickups feed the score,
//! and a boss shows up every ten levels.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::config::RunnerConfig;
use crate::api::game::{PendingInterrupt, Session};
use crate::api::types::{
    ActorId, EntityId, GameMode, InterruptSource, Outcome, SessionEvent, SessionPhase, SoundEvent, Weather,
};
use crate::assets::registry::SpriteRegistry;
use crate::bridge::external::{ExternalBridge, Verdict};
use crate::bridge::outbox::ScoreOutbox;
use crate::components::entity::Body;
use crate::components::transient::{PowerUpKind, TransientEntity, TransientKind};
use crate::core::collision::{within_band, Aabb};
use crate::core::physics::{physics_step, Bounds};
use crate::core::scene::Scene;
use crate::core::time::Timeout;
use crate::error::Result;
use crate::input::snapshot::{Action, InputSnapshot};
use crate::renderer::instance::RenderBuffer;
use crate::session::state::{SessionCore, StepFlow};
use crate::systems::ambient::Backdrop;
use crate::systems::render::push_sprite;
use crate::systems::spawn::SpawnController;

const MAGNET_DRIFT: f32 = 60.0;
const MAGNET_PULL: f32 = 0.1;
const SHIELD_FLASH_STEPS: u32 = 10;

/// Consecutive coin pickups. Each pickup within the window is worth three
/// times its position in the streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinCombo {
    count: u32,
    timeout: Timeout,
}

impl CoinCombo {
    /// Count a pickup and return the points it is worth.
    pub fn collect(&mut self, now_ms: f64, window_ms: f64) -> i64 {
        self.expire(now_ms);
        self.count += 1;
        self.timeout.start(now_ms, window_ms);
        3 * self.count as i64
    }

    pub fn expire(&mut self, now_ms: f64) {
        if self.timeout.expired(now_ms) {
            self.count = 0;
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSession {
    cfg: RunnerConfig,
    core: SessionCore,
    runner: Body,
    jumps_used: u32,
    ammo: u32,
    lives: i32,
    score: i64,
    level: u32,
    shield: Timeout,
    magnet: Timeout,
    /// Wrong-answer slowdown on obstacles.
    penalty: Timeout,
    combo: CoinCombo,
    weather: Weather,
    night: bool,
    backdrop: Backdrop,
    spawner: SpawnController,
    scene: Scene,
}

impl RunnerSession {
    pub fn new(cfg: RunnerConfig) -> Result<Self> {
        cfg.validate()?;
        let mut core = SessionCore::new(cfg.fixed_dt, cfg.seed);
        let backdrop = Backdrop::new(cfg.world_width, cfg.ground_line(), cfg.star_count, &mut core.rng);
        let mut runner = Body::new(cfg.runner_size)
            .with_pos(Vec2::new(cfg.runner_x, cfg.ground_line() - cfg.runner_size.y));
        runner.on_ground = true;
        Ok(Self {
            core,
            runner,
            jumps_used: 0,
            ammo: cfg.thunderbolts.min(cfg.max_thunderbolts),
            lives: cfg.lives,
            score: 0,
            level: 1,
            shield: Timeout::default(),
            magnet: Timeout::default(),
            penalty: Timeout::default(),
            combo: CoinCombo::default(),
            weather: Weather::Sunny,
            night: false,
            backdrop,
            spawner: SpawnController::new(&cfg),
            scene: Scene::new(),
            cfg,
        })
    }

    pub fn from_snapshot_json(json: &str) -> Result<Self> {
        let session: Self = serde_json::from_str(json)?;
        session.cfg.validate()?;
        Ok(session)
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.cfg
    }

    pub fn runner(&self) -> &Body {
        &self.runner
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn combo(&self) -> u32 {
        self.combo.count()
    }

    pub fn weather(&self) -> (Weather, bool) {
        (self.weather, self.night)
    }

    pub fn shield_active(&self) -> bool {
        self.shield.is_active()
    }

    pub fn magnet_active(&self) -> bool {
        self.magnet.is_active()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn ground_y(&self) -> f32 {
        self.cfg.ground_line() - self.runner.size.y
    }

    fn obstacle_speed(&self) -> f32 {
        let base = if self.penalty.is_active() {
            self.cfg.slowed_obstacle_speed
        } else {
            self.cfg.obstacle_speed
        };
        base + self.level_bonus()
    }

    fn enemy_speed(&self) -> f32 {
        self.cfg.enemy_speed + self.level_bonus()
    }

    fn level_bonus(&self) -> f32 {
        self.cfg.level_speed_step * (self.level - 1) as f32
    }

    fn add_score(&mut self, points: i64) {
        if points == 0 {
            return;
        }
        self.score += points;
        self.core.ctx.emit_event(SessionEvent::ScoreChanged { score: self.score });
        let level = (self.score / 10 + 1) as u32;
        if level > self.level {
            self.level = level;
            log::info!("level {}", level);
            self.core.ctx.emit_event(SessionEvent::LevelUp { level });
        }
    }

    fn lose_life(&mut self) {
        self.lives -= 1;
        log::debug!("life lost, {} left", self.lives);
        self.core.ctx.emit_sound(SoundEvent::LIFE_LOST);
        self.core.ctx.emit_event(SessionEvent::LifeLost { lives: self.lives });
    }

    /// Damage the boss. A kill removes it and is worth 10.
    fn hurt_boss(&mut self, id: EntityId, amount: i32) {
        let Some(state) = self.scene.get_mut(id).and_then(|e| e.boss_mut()) else {
            return;
        };
        state.health -= amount;
        if state.health <= 0 {
            self.scene.despawn(id);
            log::info!("boss defeated");
            self.core.ctx.emit_sound(SoundEvent::BOSS);
            self.add_score(10);
        }
    }

    fn step(&mut self, input: &InputSnapshot, bridge: &mut dyn ExternalBridge) -> StepFlow {
        let now = self.core.advance_clock();
        let dt = self.core.timestep.dt();

        self.backdrop.advance(dt, &mut self.core.rng);
        for entity in self.scene.iter_mut() {
            if entity.kind.scrolls() {
                entity.body.vel.x = 0.0;
            }
        }

        self.apply_intent(input);

        let ground_y = self.ground_y();
        physics_step(&mut self.runner, dt, ground_y, self.cfg.gravity, Bounds::open());
        if self.runner.on_ground {
            self.jumps_used = 0;
        }
        self.shield.expired(now);
        self.magnet.expired(now);
        self.penalty.expired(now);
        self.combo.expire(now);

        if self.check_triggers(bridge) == StepFlow::Halt {
            return StepFlow::Halt;
        }
        self.resolve_thunderbolts();
        self.collect_pickups(now);
        self.check_hazards();

        self.spawner
            .tick(&mut self.scene, &mut self.core.ctx, &mut self.core.rng, &self.cfg, self.level);
        self.update_weather();

        self.move_transients(dt);
        self.update_boss();
        self.prune();

        if self.lives <= 0 {
            self.core.finish(Outcome::Lose);
            return StepFlow::Halt;
        }
        StepFlow::Continue
    }

    fn apply_intent(&mut self, input: &InputSnapshot) {
        let prev = self.core.prev_input;
        if input.just_pressed(&prev, ActorId::Player, Action::Jump) && self.jumps_used < self.cfg.max_jumps {
            self.runner.vel.y = self.cfg.jump_velocity;
            self.runner.on_ground = false;
            self.jumps_used += 1;
            self.core.ctx.emit_sound(SoundEvent::JUMP);
        }
        if input.just_pressed(&prev, ActorId::Player, Action::Attack) && self.ammo > 0 {
            self.ammo -= 1;
            let id = self.core.ctx.next_id();
            let pos = Vec2::new(self.runner.right(), self.runner.pos.y + 15.0);
            self.scene.spawn(
                TransientEntity::new(id, TransientKind::Thunderbolt, pos)
                    .with_vel(Vec2::new(self.cfg.thunderbolt_speed, 0.0)),
            );
            self.core.ctx.emit_sound(SoundEvent::THUNDER);
        }
    }

    /// Shield contact and quiz triggers for anything reaching the runner.
    fn check_triggers(&mut self, bridge: &mut dyn ExternalBridge) -> StepFlow {
        let front = self.runner.right();
        let tolerance = self.cfg.trigger_tolerance;
        let boss_tolerance = self.cfg.boss_trigger_tolerance;
        let shielded = self.shield.is_active();

        if shielded {
            let smashed: Vec<EntityId> = self
                .scene
                .iter()
                .filter(|e| e.kind == TransientKind::Enemy && within_band(e.body.pos.x, front, tolerance))
                .map(|e| e.id)
                .collect();
            for id in smashed {
                self.scene.despawn(id);
                self.core.ctx.emit_sound(SoundEvent::HIT);
                self.add_score(4);
            }

            let flashed = self.scene.boss_mut().and_then(|boss| {
                if !within_band(boss.body.pos.x, front, boss_tolerance) {
                    return None;
                }
                let id = boss.id;
                let state = boss.boss_mut()?;
                (state.flash == 0).then(|| {
                    state.flash = SHIELD_FLASH_STEPS;
                    id
                })
            });
            if let Some(id) = flashed {
                self.hurt_boss(id, 1);
            }
        }

        if self.runner.pos.y < self.ground_y() - tolerance {
            return StepFlow::Continue;
        }
        let hit = self.scene.iter().find(|e| {
            !e.triggered
                && match e.kind {
                    TransientKind::Obstacle(_) | TransientKind::Enemy => within_band(e.body.pos.x, front, tolerance),
                    TransientKind::Boss(_) => !shielded && within_band(e.body.pos.x, front, boss_tolerance),
                    _ => false,
                }
        });
        let Some((id, source)) = hit.map(|e| {
            let source = match e.kind {
                TransientKind::Obstacle(_) => InterruptSource::Obstacle(e.id),
                TransientKind::Enemy => InterruptSource::Enemy(e.id),
                _ => InterruptSource::Boss(e.id),
            };
            (e.id, source)
        }) else {
            return StepFlow::Continue;
        };

        if let Some(entity) = self.scene.get_mut(id) {
            entity.triggered = true;
        }
        if self.core.open_interrupt(source, bridge) {
            self.runner.vel.x = 0.0;
            return StepFlow::Halt;
        }
        StepFlow::Continue
    }

    fn resolve_thunderbolts(&mut self) {
        let bolts: Vec<(EntityId, Aabb)> = self
            .scene
            .iter()
            .filter(|e| e.kind == TransientKind::Thunderbolt)
            .map(|e| (e.id, e.aabb()))
            .collect();
        for (bolt, aabb) in bolts {
            let target = self
                .scene
                .iter()
                .find(|e| matches!(e.kind, TransientKind::Enemy | TransientKind::Boss(_)) && e.aabb().intersects(&aabb))
                .map(|e| (e.id, e.is_boss()));
            match target {
                Some((enemy, false)) => {
                    self.scene.despawn(bolt);
                    self.scene.despawn(enemy);
                    self.core.ctx.emit_sound(SoundEvent::HIT);
                    self.add_score(4);
                }
                Some((boss, true)) => {
                    self.scene.despawn(bolt);
                    self.core.ctx.emit_sound(SoundEvent::HIT);
                    self.hurt_boss(boss, 5);
                }
                None => {}
            }
        }
    }

    fn collect_pickups(&mut self, now: f64) {
        let reach = Aabb::from_body(&self.runner);
        let picked: Vec<(EntityId, TransientKind)> = self
            .scene
            .iter()
            .filter(|e| matches!(e.kind, TransientKind::Coin | TransientKind::PowerUp(_)) && e.aabb().intersects(&reach))
            .map(|e| (e.id, e.kind))
            .collect();

        for (id, kind) in picked {
            self.scene.despawn(id);
            match kind {
                TransientKind::Coin => {
                    let points = self.combo.collect(now, self.cfg.combo_window_ms);
                    self.core.ctx.emit_sound(SoundEvent::COIN);
                    self.add_score(points);
                }
                TransientKind::PowerUp(power) => {
                    match power {
                        PowerUpKind::Shield => self.shield.start(now, self.cfg.power_up_ms),
                        PowerUpKind::Magnet => self.magnet.start(now, self.cfg.power_up_ms),
                        PowerUpKind::Thunder => self.ammo = (self.ammo + 5).min(self.cfg.max_thunderbolts),
                    }
                    log::debug!("picked up {:?}", power);
                    self.core.ctx.emit_sound(SoundEvent::POWER_UP);
                }
                _ => {}
            }
        }
    }

    /// Meteors and boss bullets cost a life on contact.
    fn check_hazards(&mut self) {
        let body = Aabb::from_body(&self.runner);
        let hits: Vec<EntityId> = self
            .scene
            .iter()
            .filter(|e| matches!(e.kind, TransientKind::Meteor | TransientKind::BossBullet) && e.aabb().intersects(&body))
            .map(|e| e.id)
            .collect();
        for id in hits {
            self.scene.despawn(id);
            self.lose_life();
        }
    }

    fn update_weather(&mut self) {
        let Some((weather, night)) =
            self.spawner
                .update_weather(self.score, self.cfg.weather_interval, &mut self.core.rng)
        else {
            return;
        };
        self.weather = weather;
        self.night = night;
        if weather == Weather::Autumn {
            self.backdrop.scatter_leaves(self.cfg.leaf_count, &mut self.core.rng);
        } else {
            self.backdrop.clear_leaves();
        }
        log::info!("weather {:?} ({})", weather, if night { "night" } else { "day" });
        self.core.ctx.emit_event(SessionEvent::WeatherChanged { weather, night });
    }

    fn move_transients(&mut self, dt: f32) {
        let obstacle = self.obstacle_speed();
        let enemy = self.enemy_speed();
        let pickup = obstacle * self.cfg.pickup_speed_factor;
        let magnet = self.magnet.is_active();
        let runner_y = self.runner.pos.y;
        let front = self.runner.right();

        for entity in self.scene.iter_mut() {
            match entity.kind {
                TransientKind::Obstacle(_) => entity.body.vel.x = -obstacle,
                TransientKind::Enemy => entity.body.vel.x = -enemy,
                TransientKind::PowerUp(_) => entity.body.vel.x = -pickup,
                TransientKind::Coin => {
                    entity.body.vel.x = -pickup;
                    if magnet {
                        entity.body.pos.x -= MAGNET_DRIFT * dt;
                        entity.body.pos.y += (runner_y - entity.body.pos.y) * MAGNET_PULL;
                    }
                }
                // Approach, then hover just ahead of the runner.
                TransientKind::Boss(_) => {
                    entity.body.vel.x = if entity.body.pos.x > front { -enemy } else { 0.0 };
                }
                _ => {}
            }
            entity.advance(dt);
            if entity.is_boss() && entity.body.pos.x < front {
                entity.body.pos.x = front;
            }
        }
    }

    /// Boss timers: lifetime, bullet cadence and shield flash.
    fn update_boss(&mut self) {
        let interval = self.cfg.boss_bullet_interval_steps;
        let Some(boss) = self.scene.boss_mut() else {
            return;
        };
        let id = boss.id;
        let origin = boss.body.pos;
        let Some(state) = boss.boss_mut() else {
            return;
        };
        state.flash = state.flash.saturating_sub(1);
        state.steps_left = state.steps_left.saturating_sub(1);
        state.bullet_countdown = state.bullet_countdown.saturating_sub(1);
        let expired = state.steps_left == 0;
        let fire = state.bullet_countdown == 0;
        if fire {
            state.bullet_countdown = interval;
        }

        if expired {
            log::info!("boss escaped");
            self.scene.despawn(id);
            self.lose_life();
            return;
        }
        if fire {
            let target = self.runner.center();
            for offset in [Vec2::new(10.0, 30.0), Vec2::new(45.0, 30.0)] {
                let from = origin + offset;
                let vel = (target - from).normalize_or_zero() * self.cfg.boss_bullet_speed;
                let id = self.core.ctx.next_id();
                self.scene
                    .spawn(TransientEntity::new(id, TransientKind::BossBullet, from).with_vel(vel));
            }
        }
    }

    /// Drop whatever left the playfield. Obstacles and enemies that scroll
    /// past are worth 1 and 2.
    fn prune(&mut self) {
        let width = self.cfg.world_width;
        let height = self.cfg.world_height;
        let ground = self.cfg.ground_line();
        let mut passed = 0;
        self.scene.retain(|e| {
            let gone = e.body.right() < 0.0;
            match e.kind {
                TransientKind::Obstacle(_) if gone => {
                    passed += 1;
                    false
                }
                TransientKind::Enemy if gone => {
                    passed += 2;
                    false
                }
                TransientKind::Coin | TransientKind::PowerUp(_) => !gone,
                TransientKind::Thunderbolt => e.body.pos.x <= width,
                TransientKind::Meteor => e.body.pos.y <= ground,
                TransientKind::BossBullet => {
                    !gone && e.body.pos.x <= width && e.body.bottom() >= 0.0 && e.body.pos.y <= height
                }
                _ => true,
            }
        });
        self.add_score(passed);
    }
}

impl Session for RunnerSession {
    fn mode(&self) -> GameMode {
        GameMode::Runner
    }

    fn start(&mut self, now_ms: f64) -> Result<()> {
        self.core.start(now_ms)
    }

    fn tick(&mut self, now_ms: f64, input: &InputSnapshot, bridge: &mut dyn ExternalBridge) {
        let frame_dt = self.core.frame_dt(now_ms);
        match self.core.phase() {
            SessionPhase::Running => {}
            SessionPhase::Intro => return,
            SessionPhase::PausedForInterrupt | SessionPhase::GameOver(_) => {
                self.backdrop.advance(frame_dt, &mut self.core.rng);
                self.core.prev_input = *input;
                return;
            }
        }

        let steps = self.core.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            let flow = self.step(input, bridge);
            self.core.prev_input = *input;
            if flow == StepFlow::Halt {
                break;
            }
        }
    }

    fn phase(&self) -> SessionPhase {
        self.core.phase()
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn health(&self, actor: ActorId) -> i32 {
        match actor {
            ActorId::Player => self.lives,
            ActorId::Opponent => 0,
        }
    }

    fn pending_interrupt(&self) -> Option<&PendingInterrupt> {
        self.core.pending()
    }

    fn resolve_interrupt(&mut self, chosen: Option<usize>, bridge: &mut dyn ExternalBridge) -> Result<Verdict> {
        let pending = self.core.take_pending()?;
        let verdict = bridge.resolve_interrupt(&pending.question, chosen);
        let correct = verdict.is_correct();
        self.core.ctx.emit_event(SessionEvent::InterruptResolved { correct });
        log::info!("interrupt {:?} answered {:?}", pending.source, verdict);

        let now = self.core.now_ms();
        match (pending.source, correct) {
            (InterruptSource::Obstacle(id), true) => {
                self.scene.despawn(id);
                self.add_score(2);
            }
            (InterruptSource::Obstacle(_), false) => self.penalty.start(now, self.cfg.penalty_ms),
            (InterruptSource::Enemy(id), true) => {
                self.scene.despawn(id);
                self.add_score(4);
            }
            (InterruptSource::Boss(id), true) => {
                if let Some(boss) = self.scene.get_mut(id) {
                    boss.triggered = false;
                }
                self.add_score(5);
                self.hurt_boss(id, 1);
            }
            (InterruptSource::Enemy(_) | InterruptSource::Boss(_), false) => self.lose_life(),
            (InterruptSource::Fireball(_), _) => {}
        }

        if self.lives <= 0 {
            self.core.finish(Outcome::Lose);
        } else {
            self.core.resume();
        }
        Ok(verdict)
    }

    fn render(&self, buffer: &mut RenderBuffer, sprites: &SpriteRegistry) {
        buffer.clear();
        let world = Vec2::new(self.cfg.world_width, self.cfg.world_height);
        let sky = if self.night { "runner/sky-night" } else { "runner/sky-day" };
        push_sprite(buffer, sprites, sky, 0, Vec2::ZERO, world);
        if self.night {
            for star in &self.backdrop.stars {
                push_sprite(buffer, sprites, "runner/star", 0, star.pos, Vec2::splat(2.0));
            }
        }
        for leaf in &self.backdrop.leaves {
            push_sprite(buffer, sprites, "runner/leaf", 0, leaf.pos, Vec2::splat(8.0));
        }
        let ground = self.cfg.ground_line();
        push_sprite(
            buffer,
            sprites,
            "runner/ground",
            0,
            Vec2::new(0.0, ground),
            Vec2::new(world.x, self.cfg.ground_height),
        );

        let frame = if self.runner.on_ground { 0 } else { 1 };
        push_sprite(buffer, sprites, "runner/player", frame, self.runner.pos, self.runner.size);
        if self.shield.is_active() {
            let pad = Vec2::splat(6.0);
            push_sprite(
                buffer,
                sprites,
                "runner/shield-aura",
                0,
                self.runner.pos - pad,
                self.runner.size + pad * 2.0,
            );
        }
        for entity in self.scene.iter() {
            push_sprite(buffer, sprites, entity.kind.sprite_key(), 0, entity.body.pos, entity.body.size);
        }
    }

    fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.core.ctx.drain_events()
    }

    fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        self.core.ctx.drain_sounds()
    }

    fn request_score_submission(&mut self, name: &str) -> Result<()> {
        let score = self.score;
        self.core
            .submit_score(name, score, &self.cfg.difficulty, GameMode::Runner.label())
    }

    fn outbox_mut(&mut self) -> &mut ScoreOutbox {
        self.core.outbox_mut()
    }

    fn to_snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::external::NoQuestions;
    use crate::components::transient::{BossState, ObstacleKind};
    use crate::error::SessionError;
    use crate::session::tests::QuizBridge;

    /// A runner with random spawning switched off.
    fn quiet() -> RunnerSession {
        let cfg = RunnerConfig {
            obstacle_chance: 0.0,
            enemy_chance: 0.0,
            coin_chance: 0.0,
            power_up_chance: 0.0,
            meteor_chance: 0.0,
            ..Default::default()
        };
        let mut s = RunnerSession::new(cfg).unwrap();
        s.start(0.0).unwrap();
        s
    }

    fn place(s: &mut RunnerSession, kind: TransientKind, pos: Vec2) -> EntityId {
        let id = s.core.ctx.next_id();
        s.scene.spawn(TransientEntity::new(id, kind, pos));
        id
    }

    /// One fixed step, the way the tick loop runs it.
    fn step(s: &mut RunnerSession, input: InputSnapshot, bridge: &mut dyn ExternalBridge) -> StepFlow {
        let flow = s.step(&input, bridge);
        s.core.prev_input = input;
        flow
    }

    fn idle(s: &mut RunnerSession, steps: usize) {
        for _ in 0..steps {
            step(s, InputSnapshot::new(), &mut NoQuestions);
        }
    }

    fn boss(health: i32, steps_left: u32) -> TransientKind {
        TransientKind::Boss(BossState {
            health,
            max_health: health,
            steps_left,
            bullet_countdown: 50,
            flash: 0,
        })
    }

    #[test]
    fn combo_triples_then_resets() {
        let mut combo = CoinCombo::default();
        let streak: i64 = [0.0, 1000.0, 2000.0].iter().map(|t| combo.collect(*t, 3000.0)).sum();
        assert_eq!(streak, 18);
        assert_eq!(combo.collect(5100.0, 3000.0), 3);
    }

    #[test]
    fn coins_on_the_runner_score_the_combo() {
        let mut s = quiet();
        let at = s.runner.pos;
        for _ in 0..3 {
            place(&mut s, TransientKind::Coin, at);
            idle(&mut s, 1);
        }
        assert_eq!(s.score(), 18);
        assert_eq!(s.combo(), 3);
        idle(&mut s, 95);
        assert_eq!(s.combo(), 0);
        place(&mut s, TransientKind::Coin, at);
        idle(&mut s, 1);
        assert_eq!(s.score(), 21);
    }

    #[test]
    fn obstacle_quiz_pauses_everything() {
        let mut s = quiet();
        let front = s.runner.right();
        let id = place(&mut s, TransientKind::Obstacle(ObstacleKind::Pine), Vec2::new(front + 3.0, 500.0));
        let mut bridge = QuizBridge::new(1);
        s.tick(50.0, &InputSnapshot::new(), &mut bridge);
        assert_eq!(s.phase(), SessionPhase::PausedForInterrupt);
        assert_eq!(s.pending_interrupt().map(|p| p.source), Some(InterruptSource::Obstacle(id)));

        let scene = s.scene.clone();
        let runner = s.runner;
        let jump = InputSnapshot::new().with(ActorId::Player, Action::Jump);
        for i in 1..60 {
            s.tick(50.0 + i as f64 * 50.0, &jump, &mut bridge);
        }
        assert_eq!(s.scene, scene);
        assert_eq!(s.runner, runner);

        assert_eq!(s.resolve_interrupt(Some(1), &mut bridge).unwrap(), Verdict::Correct);
        assert_eq!(s.phase(), SessionPhase::Running);
        assert!(s.scene.get(id).is_none());
        assert_eq!(s.score(), 2);
    }

    #[test]
    fn wrong_obstacle_answer_slows_obstacles() {
        let mut s = quiet();
        let front = s.runner.right();
        let id = place(&mut s, TransientKind::Obstacle(ObstacleKind::Cactus), Vec2::new(front, 525.0));
        let mut bridge = QuizBridge::new(0);
        assert_eq!(step(&mut s, InputSnapshot::new(), &mut bridge), StepFlow::Halt);
        s.resolve_interrupt(Some(3), &mut bridge).unwrap();
        assert_eq!(s.obstacle_speed(), 60.0);
        assert!(s.scene.get(id).unwrap().triggered);

        // No second quiz from the same obstacle.
        assert_eq!(step(&mut s, InputSnapshot::new(), &mut bridge), StepFlow::Continue);
        idle(&mut s, 61);
        assert_eq!(s.obstacle_speed(), 120.0);
    }

    #[test]
    fn enemy_answers_reward_or_cost_a_life() {
        let mut s = quiet();
        let front = s.runner.right();
        let mut bridge = QuizBridge::new(2);

        let first = place(&mut s, TransientKind::Enemy, Vec2::new(front, 490.0));
        step(&mut s, InputSnapshot::new(), &mut bridge);
        s.resolve_interrupt(Some(2), &mut bridge).unwrap();
        assert!(s.scene.get(first).is_none());
        assert_eq!(s.score(), 4);

        place(&mut s, TransientKind::Enemy, Vec2::new(front, 490.0));
        step(&mut s, InputSnapshot::new(), &mut bridge);
        s.resolve_interrupt(None, &mut bridge).unwrap();
        assert_eq!(s.lives(), 9);
        assert_eq!(bridge.asked, 2);
    }

    #[test]
    fn no_question_means_no_pause() {
        let mut s = quiet();
        let front = s.runner.right();
        let id = place(&mut s, TransientKind::Enemy, Vec2::new(front, 490.0));
        assert_eq!(step(&mut s, InputSnapshot::new(), &mut NoQuestions), StepFlow::Continue);
        assert_eq!(s.phase(), SessionPhase::Running);
        assert!(s.scene.get(id).unwrap().triggered);
    }

    #[test]
    fn airborne_runner_does_not_trigger() {
        let mut s = quiet();
        let front = s.runner.right();
        s.runner.pos.y = 400.0;
        s.runner.on_ground = false;
        place(&mut s, TransientKind::Enemy, Vec2::new(front, 490.0));
        let mut bridge = QuizBridge::new(0);
        assert_eq!(step(&mut s, InputSnapshot::new(), &mut bridge), StepFlow::Continue);
        assert_eq!(bridge.asked, 0);
    }

    #[test]
    fn shield_smashes_enemies() {
        let mut s = quiet();
        s.shield.start(0.0, 5000.0);
        let front = s.runner.right();
        place(&mut s, TransientKind::Enemy, Vec2::new(front + 2.0, 490.0));
        let mut bridge = QuizBridge::new(0);
        step(&mut s, InputSnapshot::new(), &mut bridge);
        assert_eq!(s.scene.len(), 0);
        assert_eq!(s.score(), 4);
        assert_eq!(bridge.asked, 0);
    }

    #[test]
    fn boss_quiz_chips_health_and_can_retrigger() {
        let mut s = quiet();
        let front = s.runner.right();
        let id = place(&mut s, boss(2, 300), Vec2::new(front, 490.0));
        let mut bridge = QuizBridge::new(1);

        assert_eq!(step(&mut s, InputSnapshot::new(), &mut bridge), StepFlow::Halt);
        s.resolve_interrupt(Some(1), &mut bridge).unwrap();
        assert_eq!(s.score(), 5);
        assert!(!s.scene.get(id).unwrap().triggered);

        assert_eq!(step(&mut s, InputSnapshot::new(), &mut bridge), StepFlow::Halt);
        s.resolve_interrupt(Some(1), &mut bridge).unwrap();
        assert!(s.scene.boss().is_none());
        assert_eq!(s.score(), 20);
    }

    #[test]
    fn boss_escape_costs_a_life() {
        let mut s = quiet();
        place(&mut s, boss(5, 2), Vec2::new(700.0, 490.0));
        idle(&mut s, 2);
        assert!(s.scene.boss().is_none());
        assert_eq!(s.lives(), 9);
    }

    #[test]
    fn boss_hovers_and_fires_pairs() {
        let mut s = quiet();
        place(&mut s, boss(5, 300), Vec2::new(800.0, 490.0));
        idle(&mut s, 50);
        let boss = s.scene.boss().unwrap();
        assert!(boss.body.pos.x >= s.runner.right());
        assert_eq!(s.scene.count_where(|k| *k == TransientKind::BossBullet), 2);
    }

    #[test]
    fn thunderbolt_is_edge_triggered_and_kills_enemies() {
        let mut s = quiet();
        let fire = InputSnapshot::new().with(ActorId::Player, Action::Attack);
        place(&mut s, TransientKind::Enemy, Vec2::new(200.0, 490.0));
        for _ in 0..10 {
            step(&mut s, fire, &mut NoQuestions);
        }
        assert_eq!(s.ammo(), 9);
        assert_eq!(s.scene.count_where(|k| *k == TransientKind::Enemy), 0);
        assert_eq!(s.score(), 4);
    }

    #[test]
    fn double_jump_then_grounded_reset() {
        let mut s = quiet();
        let jump = InputSnapshot::new().with(ActorId::Player, Action::Jump);
        step(&mut s, jump, &mut NoQuestions);
        idle(&mut s, 2);
        step(&mut s, jump, &mut NoQuestions);
        assert_eq!(s.jumps_used, 2);
        let y = s.runner.vel.y;
        idle(&mut s, 1);
        step(&mut s, jump, &mut NoQuestions);
        assert!(s.runner.vel.y > y);
        idle(&mut s, 120);
        assert!(s.runner.on_ground);
        assert_eq!(s.jumps_used, 0);
    }

    #[test]
    fn power_ups_apply() {
        let mut s = quiet();
        let at = s.runner.pos;
        place(&mut s, TransientKind::PowerUp(PowerUpKind::Shield), at);
        place(&mut s, TransientKind::PowerUp(PowerUpKind::Magnet), at);
        for _ in 0..3 {
            place(&mut s, TransientKind::PowerUp(PowerUpKind::Thunder), at);
        }
        idle(&mut s, 1);
        assert!(s.shield_active());
        assert!(s.magnet_active());
        assert_eq!(s.ammo(), 20);
        idle(&mut s, 151);
        assert!(!s.shield_active());
    }

    #[test]
    fn passing_hazards_scores() {
        let mut s = quiet();
        place(&mut s, TransientKind::Obstacle(ObstacleKind::Cactus), Vec2::new(-29.0, 525.0));
        place(&mut s, TransientKind::Enemy, Vec2::new(-39.0, 490.0));
        idle(&mut s, 1);
        assert_eq!(s.score(), 3);
        assert!(s.scene.is_empty());
    }

    #[test]
    fn levels_and_weather_follow_score() {
        let mut s = quiet();
        s.add_score(100);
        assert_eq!(s.level(), 11);
        assert_eq!(s.enemy_speed(), 300.0);
        idle(&mut s, 1);
        let events = s.drain_events();
        assert!(events.contains(&SessionEvent::LevelUp { level: 11 }));
        assert!(events.iter().any(|e| matches!(e, SessionEvent::WeatherChanged { .. })));
    }

    #[test]
    fn last_life_ends_the_run() {
        let mut s = quiet();
        s.lives = 1;
        let at = s.runner.pos;
        place(&mut s, TransientKind::Meteor, at);
        s.tick(50.0, &InputSnapshot::new(), &mut NoQuestions);
        assert_eq!(s.outcome(), Some(Outcome::Lose));

        s.request_score_submission("ada").unwrap();
        let sent = s.outbox_mut().take_pending();
        assert_eq!(sent[0].mode, "Retro");
        assert_eq!(sent[0].difficulty, "");
        assert!(matches!(s.request_score_submission("ada"), Err(SessionError::AlreadySubmitted)));
    }

    #[test]
    fn snapshot_round_trip_replays_identically() {
        let mut a = RunnerSession::new(RunnerConfig {
            seed: 77,
            ..Default::default()
        })
        .unwrap();
        a.start(0.0).unwrap();
        let jump = InputSnapshot::new().with(ActorId::Player, Action::Jump);
        let mut now = 0.0;
        for i in 0..300 {
            now += 33.0;
            let input = if i % 20 < 2 { jump } else { InputSnapshot::new() };
            a.tick(now, &input, &mut NoQuestions);
        }
        let mut b = RunnerSession::from_snapshot_json(&a.to_snapshot_json().unwrap()).unwrap();
        for i in 0..300 {
            now += 33.0;
            let input = if i % 15 == 0 { jump } else { InputSnapshot::new() };
            a.tick(now, &input, &mut NoQuestions);
            b.tick(now, &input, &mut NoQuestions);
        }
        assert_eq!(a.to_snapshot_json().unwrap(), b.to_snapshot_json().unwrap());
    }

    #[test]
    fn malformed_config_is_refused() {
        let cfg = RunnerConfig {
            meteor_chance: -0.1,
            ..Default::default()
        };
        assert!(matches!(RunnerSession::new(cfg), Err(SessionError::MalformedConfig { .. })));
    }

    #[test]
    fn render_draws_runner_and_transients() {
        let mut s = quiet();
        place(&mut s, TransientKind::Coin, Vec2::new(600.0, 450.0));
        let mut buffer = RenderBuffer::new();
        s.render(&mut buffer, &SpriteRegistry::new());
        // sky, ground, runner, coin
        assert_eq!(buffer.instance_count(), 4);
    }
}
