//! Two-fighter duel against a round clock, with the bonus fireball quiz.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::config::FightConfig;
use crate::api::game::{PendingInterrupt, Session};
use crate::api::types::{
    ActorId, BonusChoice, Facing, GameMode, InterruptSource, Outcome, SessionEvent, SessionPhase, SoundEvent,
};
use crate::assets::registry::{sprite_key, SpriteRegistry, SpriteSource};
use crate::bridge::external::{ExternalBridge, Verdict};
use crate::bridge::outbox::ScoreOutbox;
use crate::components::animation::AnimState;
use crate::components::fighter::Fighter;
use crate::components::transient::{TransientEntity, TransientKind};
use crate::core::collision::{resolve_attack, AttackResolution};
use crate::core::physics::{physics_step, try_jump, Bounds};
use crate::core::rng::RandomSource;
use crate::core::scene::Scene;
use crate::core::time::Countdown;
use crate::error::{Result, SessionError};
use crate::input::snapshot::{Action, InputSnapshot};
use crate::renderer::instance::RenderBuffer;
use crate::session::state::{SessionCore, StepFlow};
use crate::systems::ambient::FrameLoop;
use crate::systems::animation::{advance_fighter, settle_fighter};
use crate::systems::render::push_sprite;

const ACTORS: [ActorId; 2] = [ActorId::Player, ActorId::Opponent];

fn slot(actor: ActorId) -> usize {
    match actor {
        ActorId::Player => 0,
        ActorId::Opponent => 1,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FightSession {
    cfg: FightConfig,
    core: SessionCore,
    fighters: [Fighter; 2],
    countdown: Countdown,
    scene: Scene,
    shop: FrameLoop,
    /// Set once a fireball has been caught; no further fireballs spawn.
    bonus_used: bool,
    bonus_offer: Option<ActorId>,
    /// Total damage dealt by the player; this is the session score.
    player_damage: i64,
}

impl FightSession {
    /// Build a match from a validated config. Malformed configs are refused.
    pub fn new(cfg: FightConfig) -> Result<Self> {
        cfg.validate()?;
        let fighters = [
            Self::spawn_fighter(&cfg, ActorId::Player),
            Self::spawn_fighter(&cfg, ActorId::Opponent),
        ];
        Ok(Self {
            core: SessionCore::new(cfg.fixed_dt, cfg.seed),
            countdown: Countdown::new(cfg.round_seconds),
            shop: FrameLoop::new(cfg.shop_frames, cfg.shop_frame_ms),
            scene: Scene::new(),
            fighters,
            bonus_used: false,
            bonus_offer: None,
            player_damage: 0,
            cfg,
        })
    }

    /// Like `new`, with animation strips taken from `sprites` where known.
    pub fn with_sprites(mut cfg: FightConfig, sprites: &dyn SpriteSource) -> Result<Self> {
        cfg.apply_sprites(sprites)?;
        Self::new(cfg)
    }

    pub fn from_snapshot_json(json: &str) -> Result<Self> {
        let session: Self = serde_json::from_str(json)?;
        session.cfg.validate()?;
        Ok(session)
    }

    fn spawn_fighter(cfg: &FightConfig, actor: ActorId) -> Fighter {
        let profile = match actor {
            ActorId::Player => &cfg.player,
            ActorId::Opponent => &cfg.opponent,
        };
        let pos = Vec2::new(profile.start_x, cfg.ground_line - profile.size.y);
        let mut fighter = Fighter::new(profile, pos).with_max_health(cfg.max_health);
        fighter.body.on_ground = true;
        fighter
    }

    pub fn config(&self) -> &FightConfig {
        &self.cfg
    }

    pub fn fighter(&self, actor: ActorId) -> &Fighter {
        &self.fighters[slot(actor)]
    }

    /// Whole seconds left on the match clock.
    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    /// Actor waiting on a `choose_bonus` call, if any.
    pub fn bonus_offer(&self) -> Option<ActorId> {
        self.bonus_offer
    }

    fn pair_mut(&mut self, actor: ActorId) -> (&mut Fighter, &mut Fighter) {
        let [player, opponent] = &mut self.fighters;
        match actor {
            ActorId::Player => (player, opponent),
            ActorId::Opponent => (opponent, player),
        }
    }

    fn step(&mut self, input: &InputSnapshot, bridge: &mut dyn ExternalBridge) -> StepFlow {
        let now = self.core.advance_clock();
        let dt = self.core.timestep.dt();

        self.shop.advance(self.core.step_ms());
        for fighter in &mut self.fighters {
            fighter.body.vel.x = 0.0;
        }

        for actor in ACTORS {
            self.apply_intent(actor, input, now);
        }

        let bounds = Bounds::new(0.0, self.cfg.world_width);
        for fighter in &mut self.fighters {
            if fighter.is_frozen() {
                continue;
            }
            let ground_y = self.cfg.ground_line - fighter.body.size.y;
            physics_step(&mut fighter.body, dt, ground_y, self.cfg.gravity, bounds);
            advance_fighter(fighter, now);
        }

        for actor in ACTORS {
            self.resolve_swing(actor, now);
        }
        if self.catch_fireball(bridge, now) == StepFlow::Halt {
            return StepFlow::Halt;
        }
        for fighter in &mut self.fighters {
            settle_fighter(fighter, now);
        }

        self.spawn_fireball();

        let floor = self.cfg.world_height;
        for ball in self.scene.iter_mut() {
            ball.advance(dt);
        }
        self.scene.retain(|e| e.body.pos.y <= floor);

        self.check_knockout()
    }

    fn apply_intent(&mut self, actor: ActorId, input: &InputSnapshot, now: f64) {
        let move_speed = self.cfg.move_speed;
        let jump_velocity = self.cfg.jump_velocity;
        let debounce = self.cfg.idle_debounce_ms;
        let axis = input.axis(actor);

        let fighter = &mut self.fighters[slot(actor)];
        if fighter.dead {
            return;
        }

        let mut special = false;
        if input.held(actor, Action::Special)
            && fighter.special_charged
            && !fighter.attacking
            && fighter.anim.current() != AnimState::SpecialAttack
        {
            special = fighter.anim.request_state(AnimState::SpecialAttack, now);
        }

        let walking = axis != 0.0 && !fighter.special_charged;
        if walking {
            fighter.body.vel.x = axis * move_speed;
            fighter.facing = Some(if axis < 0.0 { Facing::Left } else { Facing::Right });
        }

        let jumped = input.held(actor, Action::Jump) && try_jump(&mut fighter.body, jump_velocity);

        if input.held(actor, Action::Attack) && fighter.anim.current() != AnimState::SpecialAttack {
            fighter.attack(now);
        }

        if !fighter.is_busy() {
            if fighter.body.on_ground && !jumped {
                if walking {
                    fighter.idle_since_ms = None;
                    fighter.anim.request_state(AnimState::Run, now);
                } else {
                    let since = *fighter.idle_since_ms.get_or_insert(now);
                    if now - since >= debounce {
                        fighter.anim.request_state(AnimState::Idle, now);
                    }
                }
            } else {
                fighter.idle_since_ms = None;
                let airborne = if fighter.body.vel.y < 0.0 { AnimState::Jump } else { AnimState::Fall };
                fighter.anim.request_state(airborne, now);
            }
        }

        if jumped {
            self.core.ctx.emit_sound(SoundEvent::JUMP);
        }
        if special {
            let target = self.fighters[slot(actor.other())].health;
            let damage = (target as f32 * self.cfg.special_fraction).floor() as i32;
            log::debug!("{:?} special attack for {}", actor, damage);
            self.deal_damage(actor, damage, now);
        }
    }

    fn resolve_swing(&mut self, attacker: ActorId, now: f64) {
        let (a, d) = self.pair_mut(attacker);
        match resolve_attack(a, d) {
            AttackResolution::Connect => {
                a.attacking = false;
                let damage = self.cfg.hit_damage;
                self.deal_damage(attacker, damage, now);
            }
            AttackResolution::Cancel => a.attacking = false,
            AttackResolution::Pending | AttackResolution::Discard => {}
        }
    }

    /// Damage the opponent of `attacker`. Player damage counts toward the score.
    fn deal_damage(&mut self, attacker: ActorId, amount: i32, now: f64) {
        let (_, defender) = self.pair_mut(attacker);
        let removed = defender.take_hit(amount, now);
        let health = defender.health;
        let dead = defender.dead;

        log::debug!("{:?} hits for {} ({} left)", attacker, removed, health);
        let ctx = &mut self.core.ctx;
        ctx.emit_sound(SoundEvent::HIT);
        ctx.emit_event(SessionEvent::Damaged {
            actor: attacker.other(),
            amount: removed,
            health,
        });
        if dead {
            ctx.emit_sound(SoundEvent::DEATH);
        }
        if attacker == ActorId::Player && removed > 0 {
            self.player_damage += removed as i64;
            ctx.emit_event(SessionEvent::ScoreChanged {
                score: self.player_damage,
            });
        }
    }

    fn catch_fireball(&mut self, bridge: &mut dyn ExternalBridge, now: f64) -> StepFlow {
        let Some((id, aabb)) = self
            .scene
            .iter()
            .find(|e| e.kind == TransientKind::Fireball)
            .map(|e| (e.id, e.aabb()))
        else {
            return StepFlow::Continue;
        };
        let Some(catcher) = ACTORS.into_iter().find(|actor| {
            let f = &self.fighters[slot(*actor)];
            !f.dead && aabb.intersects(&f.hurt_box())
        }) else {
            return StepFlow::Continue;
        };

        self.scene.despawn(id);
        self.bonus_used = true;
        log::info!("{:?} caught the bonus fireball", catcher);
        if self.core.open_interrupt(InterruptSource::Fireball(catcher), bridge) {
            self.force_idle(now);
            return StepFlow::Halt;
        }
        StepFlow::Continue
    }

    fn spawn_fireball(&mut self) {
        if self.bonus_used || self.scene.count_where(|k| *k == TransientKind::Fireball) > 0 {
            return;
        }
        let threshold = self.cfg.bonus_threshold;
        if self.fighters.iter().all(|f| f.health > threshold) {
            return;
        }
        let size = self.cfg.fireball_size;
        let x = self.core.rng.range(0.0, (self.cfg.world_width - size).max(0.0));
        let id = self.core.ctx.next_id();
        let mut ball = TransientEntity::new(id, TransientKind::Fireball, Vec2::new(x, 0.0))
            .with_vel(Vec2::new(0.0, self.cfg.fireball_speed));
        ball.body.size = Vec2::splat(size);
        log::debug!("bonus fireball spawned at x={:.0}", x);
        self.scene.spawn(ball);
    }

    /// End the match with both fighters standing down.
    fn finish(&mut self, outcome: Outcome) {
        self.core.finish(outcome);
        self.force_idle(self.core.now_ms());
    }

    /// Stop both fighters in place while a quiz is up or once the match is over.
    fn force_idle(&mut self, now: f64) {
        for fighter in &mut self.fighters {
            fighter.body.vel.x = 0.0;
            fighter.attacking = false;
            if !fighter.dead {
                fighter.anim.request_state(AnimState::Idle, now);
            }
        }
    }

    fn check_knockout(&mut self) -> StepFlow {
        let down = |f: &Fighter| f.health <= 0 && f.body.on_ground && f.death_finished;
        let outcome = match (down(&self.fighters[0]), down(&self.fighters[1])) {
            (true, true) => Outcome::Draw,
            (true, false) => Outcome::Lose,
            (false, true) => Outcome::Win,
            (false, false) => return StepFlow::Continue,
        };
        self.finish(outcome);
        StepFlow::Halt
    }

    fn time_up(&mut self) {
        let player = self.fighters[0].health;
        let opponent = self.fighters[1].health;
        let outcome = match player.cmp(&opponent) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Lose,
            std::cmp::Ordering::Equal => Outcome::Draw,
        };
        log::info!("time up at {} - {}", player, opponent);
        self.finish(outcome);
    }
}

impl Session for FightSession {
    fn mode(&self) -> GameMode {
        GameMode::Fighting
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
                self.shop.advance(frame_dt as f64 * 1000.0);
                self.core.prev_input = *input;
                return;
            }
        }

        self.countdown.advance(frame_dt as f64 * 1000.0);
        let steps = self.core.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            let flow = self.step(input, bridge);
            self.core.prev_input = *input;
            if flow == StepFlow::Halt {
                break;
            }
        }

        if self.core.phase() == SessionPhase::Running && self.countdown.is_expired() {
            self.time_up();
        }
    }

    fn phase(&self) -> SessionPhase {
        self.core.phase()
    }

    fn score(&self) -> i64 {
        self.player_damage
    }

    fn health(&self, actor: ActorId) -> i32 {
        self.fighter(actor).health
    }

    fn pending_interrupt(&self) -> Option<&PendingInterrupt> {
        self.core.pending()
    }

    fn resolve_interrupt(&mut self, chosen: Option<usize>, bridge: &mut dyn ExternalBridge) -> Result<Verdict> {
        let pending = self.core.take_pending()?;
        let verdict = bridge.resolve_interrupt(&pending.question, chosen);
        self.core.ctx.emit_event(SessionEvent::InterruptResolved {
            correct: verdict.is_correct(),
        });
        if let InterruptSource::Fireball(actor) = pending.source {
            if verdict.is_correct() {
                self.bonus_offer = Some(actor);
            }
        }
        log::info!("interrupt {:?} answered {:?}", pending.source, verdict);
        self.core.resume();
        Ok(verdict)
    }

    fn choose_bonus(&mut self, choice: BonusChoice) -> Result<()> {
        let actor = self.bonus_offer.ok_or(SessionError::NoBonusPending)?;
        if self.core.phase() != SessionPhase::Running {
            return Err(SessionError::NotRunning);
        }
        self.bonus_offer = None;
        let heal = self.cfg.heal_amount;
        let fighter = &mut self.fighters[slot(actor)];
        match choice {
            BonusChoice::Heal => fighter.heal(heal),
            BonusChoice::SpecialCharge => fighter.special_charged = true,
        }
        self.core.ctx.emit_sound(SoundEvent::POWER_UP);
        self.core.ctx.emit_event(SessionEvent::BonusGranted { actor, choice });
        Ok(())
    }

    fn render(&self, buffer: &mut RenderBuffer, sprites: &SpriteRegistry) {
        buffer.clear();
        let world = Vec2::new(self.cfg.world_width, self.cfg.world_height);
        push_sprite(buffer, sprites, "fight/background", 0, Vec2::ZERO, world);

        let shop_size = Vec2::new(world.x * 0.3, world.y * 0.5 + 76.0);
        let shop_pos = Vec2::new(world.x * 0.6 + 56.0, self.cfg.ground_line - shop_size.y);
        push_sprite(buffer, sprites, "fight/shop", self.shop.frame(), shop_pos, shop_size);

        for (fighter, profile) in self.fighters.iter().zip([&self.cfg.player, &self.cfg.opponent]) {
            let key = sprite_key(&profile.sprite_actor, fighter.anim.current());
            push_sprite(buffer, sprites, &key, fighter.anim.frame(), fighter.body.pos, fighter.body.size);
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
        let score = self.player_damage;
        self.core
            .submit_score(name, score, &self.cfg.difficulty, GameMode::Fighting.label())
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
    use crate::components::animation::SpriteDescriptor;
    use crate::error::AssetError;
    use crate::session::tests::QuizBridge;

    fn started() -> FightSession {
        let mut s = FightSession::new(FightConfig::default()).unwrap();
        s.start(0.0).unwrap();
        s
    }

    /// Tick every `step_ms` of host time from `from` up to `to`.
    fn run(s: &mut FightSession, from: f64, to: f64, step_ms: f64, input: InputSnapshot) -> f64 {
        let mut now = from;
        while now < to {
            now += step_ms;
            s.tick(now, &input, &mut NoQuestions);
        }
        now
    }

    fn face_off(s: &mut FightSession) {
        s.fighters[0].body.pos.x = 100.0;
        s.fighters[0].facing = Some(Facing::Right);
        s.fighters[1].body.pos.x = 150.0;
    }

    #[test]
    fn fighters_start_grounded() {
        let s = started();
        assert_eq!(s.fighter(ActorId::Player).body.pos, Vec2::new(120.0, 330.0));
        assert!(s.fighter(ActorId::Opponent).body.on_ground);
        assert_eq!(s.remaining_seconds(), 60);
    }

    #[test]
    fn equal_health_at_time_up_is_a_draw() {
        let mut s = started();
        let mut now = 0.0;
        for _ in 0..59 {
            now += 1000.0;
            s.tick(now, &InputSnapshot::new(), &mut NoQuestions);
        }
        assert_eq!(s.phase(), SessionPhase::Running);
        s.tick(now + 1000.0, &InputSnapshot::new(), &mut NoQuestions);
        assert_eq!(s.outcome(), Some(Outcome::Draw));
        assert_eq!(s.remaining_seconds(), 0);
    }

    #[test]
    fn time_up_favours_higher_health() {
        let mut s = started();
        s.fighters[1].health = 60;
        run(&mut s, 0.0, 60_000.0, 1000.0, InputSnapshot::new());
        assert_eq!(s.outcome(), Some(Outcome::Win));
    }

    #[test]
    fn fighters_stand_idle_after_time_up() {
        let mut s = started();
        let walk = InputSnapshot::new()
            .with(ActorId::Player, Action::Right)
            .with(ActorId::Opponent, Action::Left);
        let now = run(&mut s, 0.0, 60_000.0, 500.0, walk);
        assert_eq!(s.outcome(), Some(Outcome::Draw));
        s.tick(now + 500.0, &walk, &mut NoQuestions);
        for actor in ACTORS {
            assert_eq!(s.fighter(actor).anim.current(), AnimState::Idle);
            assert_eq!(s.fighter(actor).body.vel.x, 0.0);
        }
    }

    #[test]
    fn attack_connects_on_impact_frame() {
        let mut s = started();
        face_off(&mut s);
        let swing = InputSnapshot::new().with(ActorId::Player, Action::Attack);
        s.tick(50.0, &swing, &mut NoQuestions);
        assert!(s.fighter(ActorId::Player).attacking);
        run(&mut s, 50.0, 1000.0, 50.0, InputSnapshot::new());

        assert_eq!(s.health(ActorId::Opponent), 80);
        assert_eq!(s.score(), 20);
        assert!(!s.fighter(ActorId::Player).attacking);
        let events = s.drain_events();
        assert!(events.contains(&SessionEvent::Damaged {
            actor: ActorId::Opponent,
            amount: 20,
            health: 80,
        }));
    }

    #[test]
    fn attack_facing_away_does_no_damage() {
        let mut s = started();
        face_off(&mut s);
        s.fighters[0].facing = Some(Facing::Left);
        let swing = InputSnapshot::new().with(ActorId::Player, Action::Attack);
        s.tick(50.0, &swing, &mut NoQuestions);
        run(&mut s, 50.0, 1000.0, 50.0, InputSnapshot::new());
        assert_eq!(s.health(ActorId::Opponent), 100);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn airborne_knockout_waits_for_landing() {
        let mut s = started();
        s.fighters[1].body.pos.y = 100.0;
        s.fighters[1].body.on_ground = false;
        s.fighters[1].health = 20;
        s.deal_damage(ActorId::Player, 20, 0.0);
        assert!(s.fighter(ActorId::Opponent).dead);

        let mut now = 0.0;
        let mut landed_at = None;
        while now < 5000.0 && s.outcome().is_none() {
            now += 20.0;
            s.tick(now, &InputSnapshot::new(), &mut NoQuestions);
            let opp = s.fighter(ActorId::Opponent);
            if !opp.body.on_ground {
                assert_eq!(s.phase(), SessionPhase::Running);
            } else if landed_at.is_none() {
                landed_at = Some(now);
            }
        }
        assert!(landed_at.is_some());
        assert_eq!(s.outcome(), Some(Outcome::Win));
        assert!(s.fighter(ActorId::Opponent).death_finished);
    }

    #[test]
    fn walking_sets_facing_and_run_state() {
        let mut s = started();
        let left = InputSnapshot::new().with(ActorId::Opponent, Action::Left);
        run(&mut s, 0.0, 200.0, 50.0, left);
        let opp = s.fighter(ActorId::Opponent);
        assert_eq!(opp.facing, Some(Facing::Left));
        assert_eq!(opp.anim.current(), AnimState::Run);
        assert!(opp.body.pos.x < 850.0);

        run(&mut s, 200.0, 400.0, 50.0, InputSnapshot::new());
        assert_eq!(s.fighter(ActorId::Opponent).anim.current(), AnimState::Idle);
    }

    #[test]
    fn jump_lands_back_on_ground() {
        let mut s = started();
        let jump = InputSnapshot::new().with(ActorId::Player, Action::Jump);
        s.tick(50.0, &jump, &mut NoQuestions);
        assert!(!s.fighter(ActorId::Player).body.on_ground);
        assert_eq!(s.fighter(ActorId::Player).anim.current(), AnimState::Jump);
        run(&mut s, 50.0, 2000.0, 50.0, InputSnapshot::new());
        assert!(s.fighter(ActorId::Player).body.on_ground);
        assert_eq!(s.fighter(ActorId::Player).body.pos.y, 330.0);
    }

    #[test]
    fn special_attack_takes_share_of_health() {
        let mut s = started();
        s.fighters[0].special_charged = true;
        let special = InputSnapshot::new().with(ActorId::Player, Action::Special);
        s.tick(50.0, &special, &mut NoQuestions);
        assert_eq!(s.health(ActorId::Opponent), 60);
        assert_eq!(s.fighter(ActorId::Opponent).anim.current(), AnimState::TakeHit);

        // Charged fighters cannot walk.
        let walk = special.with(ActorId::Player, Action::Right);
        s.tick(100.0, &walk, &mut NoQuestions);
        assert_eq!(s.fighter(ActorId::Player).body.pos.x, 120.0);

        run(&mut s, 100.0, 1500.0, 50.0, InputSnapshot::new());
        assert!(!s.fighter(ActorId::Player).special_charged);
        assert_eq!(s.health(ActorId::Opponent), 60);
    }

    fn drop_fireball_on_player(s: &mut FightSession) {
        s.fighters[0].health = 20;
        let id = s.core.ctx.next_id();
        let x = s.fighters[0].body.pos.x;
        s.scene.spawn(TransientEntity::new(id, TransientKind::Fireball, Vec2::new(x, 300.0)));
    }

    #[test]
    fn caught_fireball_pauses_and_grants_bonus() {
        let mut s = started();
        drop_fireball_on_player(&mut s);
        let mut bridge = QuizBridge::new(2);
        s.tick(50.0, &InputSnapshot::new(), &mut bridge);
        assert_eq!(s.phase(), SessionPhase::PausedForInterrupt);
        assert_eq!(
            s.pending_interrupt().map(|p| p.source),
            Some(InterruptSource::Fireball(ActorId::Player))
        );

        let frozen = s.to_snapshot_json().unwrap();
        let hold = InputSnapshot::new().with(ActorId::Player, Action::Right);
        s.tick(1050.0, &hold, &mut bridge);
        s.tick(2050.0, &hold, &mut bridge);
        assert_eq!(s.fighters, FightSession::from_snapshot_json(&frozen).unwrap().fighters);
        assert_eq!(s.remaining_seconds(), 60);

        assert!(matches!(s.choose_bonus(BonusChoice::Heal), Err(SessionError::NoBonusPending)));
        assert_eq!(s.resolve_interrupt(Some(2), &mut bridge).unwrap(), Verdict::Correct);
        assert_eq!(s.phase(), SessionPhase::Running);
        assert_eq!(s.bonus_offer(), Some(ActorId::Player));
        s.choose_bonus(BonusChoice::Heal).unwrap();
        assert_eq!(s.health(ActorId::Player), 60);
        assert!(s.bonus_offer().is_none());

        // Only one fireball per session.
        s.fighters[0].health = 10;
        run(&mut s, 2050.0, 4000.0, 50.0, InputSnapshot::new());
        assert_eq!(s.scene.len(), 0);
    }

    #[test]
    fn wrong_bonus_answer_grants_nothing() {
        let mut s = started();
        drop_fireball_on_player(&mut s);
        let mut bridge = QuizBridge::new(2);
        s.tick(50.0, &InputSnapshot::new(), &mut bridge);
        assert_eq!(s.resolve_interrupt(None, &mut bridge).unwrap(), Verdict::Incorrect);
        assert!(s.bonus_offer().is_none());
        assert!(matches!(
            s.resolve_interrupt(Some(2), &mut bridge),
            Err(SessionError::NoPendingInterrupt)
        ));
    }

    #[test]
    fn bonus_cannot_be_taken_after_the_match() {
        let mut s = started();
        s.bonus_offer = Some(ActorId::Opponent);
        s.core.finish(Outcome::Draw);
        assert!(matches!(s.choose_bonus(BonusChoice::Heal), Err(SessionError::NotRunning)));
    }

    #[test]
    fn fireball_without_questions_is_skipped() {
        let mut s = started();
        drop_fireball_on_player(&mut s);
        s.tick(50.0, &InputSnapshot::new(), &mut NoQuestions);
        assert_eq!(s.phase(), SessionPhase::Running);
        assert!(s.bonus_used);
    }

    #[test]
    fn snapshot_round_trip_replays_identically() {
        let mut a = started();
        face_off(&mut a);
        a.fighters[1].health = 30;
        let script = [
            InputSnapshot::new().with(ActorId::Player, Action::Attack),
            InputSnapshot::new().with(ActorId::Opponent, Action::Jump),
            InputSnapshot::new().with(ActorId::Opponent, Action::Left),
            InputSnapshot::new(),
        ];
        let mut now = 0.0;
        for input in &script {
            now += 100.0;
            a.tick(now, input, &mut NoQuestions);
        }
        let mut b = FightSession::from_snapshot_json(&a.to_snapshot_json().unwrap()).unwrap();
        for i in 0..40 {
            now += 50.0;
            let input = script[i % script.len()];
            a.tick(now, &input, &mut NoQuestions);
            b.tick(now, &input, &mut NoQuestions);
        }
        assert_eq!(a.to_snapshot_json().unwrap(), b.to_snapshot_json().unwrap());
    }

    #[test]
    fn score_submission_after_game_over() {
        let mut s = started();
        assert!(matches!(s.request_score_submission("ada"), Err(SessionError::NotFinished)));
        run(&mut s, 0.0, 60_000.0, 1000.0, InputSnapshot::new());
        s.request_score_submission("ada").unwrap();
        let pending = s.outbox_mut().take_pending();
        assert_eq!(pending[0].mode, "Fighting");
        assert_eq!(pending[0].difficulty, "Pro");
        assert!(matches!(s.request_score_submission("ada"), Err(SessionError::AlreadySubmitted)));
    }

    #[test]
    fn malformed_config_is_refused() {
        let mut cfg = FightConfig::default();
        cfg.player.animations.set(AnimState::Attack, SpriteDescriptor::new(0, 100.0));
        assert!(matches!(FightSession::new(cfg), Err(SessionError::MalformedConfig { .. })));
    }

    struct Strips;

    impl SpriteSource for Strips {
        fn load_sprite_descriptor(&self, actor: &str, state: AnimState) -> std::result::Result<SpriteDescriptor, AssetError> {
            match (actor, state) {
                ("kenji", AnimState::Death) => Ok(SpriteDescriptor::new(9, 80.0)),
                _ => Err(AssetError::Missing(sprite_key(actor, state))),
            }
        }
    }

    #[test]
    fn sprite_source_overrides_strips() {
        let s = FightSession::with_sprites(FightConfig::default(), &Strips).unwrap();
        let death = s.fighter(ActorId::Opponent).anim.set().get(AnimState::Death);
        assert_eq!(death.frame_count, 9);
        let idle = s.fighter(ActorId::Player).anim.set().get(AnimState::Idle);
        assert_eq!(idle.frame_count, 8);
    }

    #[test]
    fn render_uses_placeholders_for_missing_sprites() {
        let s = started();
        let mut buffer = RenderBuffer::new();
        s.render(&mut buffer, &SpriteRegistry::new());
        assert_eq!(buffer.instance_count(), 4);
        assert_eq!(buffer.placeholder_count(), 4);
    }
}
