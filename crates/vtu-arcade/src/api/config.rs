//! Session configuration. Defaults carry the tuned game constants; any field
//! can be overridden from JSON. Speeds are in world units per second.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::registry::SpriteSource;
use crate::components::animation::{AnimState, AnimationSet};
use crate::components::fighter::DEFAULT_MAX_HEALTH;
use crate::error::{AssetError, Result, SessionError};

/// Per-fighter geometry and animation strips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterProfile {
    /// Actor prefix for sprite keys, e.g. `"samurai"` -> `"samurai/idle"`.
    pub sprite_actor: String,
    /// Hurt box size.
    pub size: Vec2,
    pub start_x: f32,
    /// Attack box position relative to the fighter's top-left corner.
    pub attack_offset: Vec2,
    pub attack_size: Vec2,
    /// Attack frame on which the hit is resolved.
    pub impact_frame: u32,
    pub animations: AnimationSet,
}

impl FighterProfile {
    pub fn player() -> Self {
        Self {
            sprite_actor: "samurai".into(),
            size: Vec2::new(50.0, 150.0),
            start_x: 120.0,
            attack_offset: Vec2::new(20.0, 50.0),
            attack_size: Vec2::new(40.0, 50.0),
            impact_frame: 4,
            animations: AnimationSet::from_counts([8, 8, 2, 2, 6, 4, 6, 6], 100.0),
        }
    }

    pub fn opponent() -> Self {
        Self {
            sprite_actor: "kenji".into(),
            size: Vec2::new(50.0, 150.0),
            start_x: 850.0,
            attack_offset: Vec2::new(-10.0, 50.0),
            attack_size: Vec2::new(10.0, 50.0),
            impact_frame: 2,
            animations: AnimationSet::from_counts([4, 8, 2, 2, 4, 3, 7, 4], 100.0),
        }
    }

    fn validate(&self, field: &'static str) -> Result<()> {
        if let Some(state) = self.animations.first_invalid() {
            return Err(SessionError::malformed(
                field,
                format!("animation `{}` needs a positive frame count and duration", state.name()),
            ));
        }
        let attack_frames = self.animations.get(AnimState::Attack).frame_count;
        if self.impact_frame >= attack_frames {
            return Err(SessionError::malformed(
                field,
                format!("impact frame {} is outside the {}-frame attack", self.impact_frame, attack_frames),
            ));
        }
        if self.size.x <= 0.0 || self.size.y <= 0.0 || self.attack_size.x <= 0.0 || self.attack_size.y <= 0.0 {
            return Err(SessionError::malformed(field, "boxes must have positive size"));
        }
        Ok(())
    }

    /// Replace strips with whatever the sprite source knows about.
    /// Missing sprites keep the configured strip; invalid ones are fatal.
    fn apply_sprites(&mut self, field: &'static str, source: &dyn SpriteSource) -> Result<()> {
        for state in AnimState::ALL {
            match source.load_sprite_descriptor(&self.sprite_actor, state) {
                Ok(desc) => self.animations.set(state, desc),
                Err(AssetError::Missing(_)) => {}
                Err(e) => return Err(SessionError::malformed(field, e.to_string())),
            }
        }
        Ok(())
    }
}

impl Default for FighterProfile {
    fn default() -> Self {
        Self::player()
    }
}

/// Configuration for a fighting match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FightConfig {
    pub fixed_dt: f32,
    pub world_width: f32,
    pub world_height: f32,
    /// Y of the floor line; fighters rest with their bottom edge on it.
    pub ground_line: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub move_speed: f32,
    pub round_seconds: u32,
    pub max_health: i32,
    pub hit_damage: i32,
    /// Share of the opponent's current health removed by a special attack.
    pub special_fraction: f32,
    /// Health at or below which the bonus fireball appears.
    pub bonus_threshold: i32,
    pub heal_amount: i32,
    pub fireball_size: f32,
    pub fireball_speed: f32,
    /// Continuous no-input time before a grounded fighter settles to idle.
    pub idle_debounce_ms: f64,
    pub shop_frames: u32,
    pub shop_frame_ms: f64,
    pub difficulty: String,
    pub seed: u64,
    pub player: FighterProfile,
    pub opponent: FighterProfile,
}

impl Default for FightConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 1024.0,
            world_height: 576.0,
            ground_line: 480.0,
            gravity: 2520.0,
            jump_velocity: -1200.0,
            move_speed: 300.0,
            round_seconds: 60,
            max_health: DEFAULT_MAX_HEALTH,
            hit_damage: 20,
            special_fraction: 0.4,
            bonus_threshold: 20,
            heal_amount: 40,
            fireball_size: 50.0,
            fireball_speed: 300.0,
            idle_debounce_ms: 50.0,
            shop_frames: 6,
            shop_frame_ms: 150.0,
            difficulty: "Pro".into(),
            seed: 0x5EED_F16,
            player: FighterProfile::player(),
            opponent: FighterProfile::opponent(),
        }
    }
}

impl FightConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(SessionError::ConfigParse)
    }

    pub fn validate(&self) -> Result<()> {
        check_world(self.fixed_dt, self.world_width, self.world_height)?;
        if self.ground_line <= 0.0 || self.ground_line > self.world_height {
            return Err(SessionError::malformed("ground_line", "must lie inside the world"));
        }
        if self.round_seconds == 0 {
            return Err(SessionError::malformed("round_seconds", "must be positive"));
        }
        if self.max_health <= 0 {
            return Err(SessionError::malformed("max_health", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.special_fraction) {
            return Err(SessionError::malformed("special_fraction", "must be within [0, 1]"));
        }
        if self.shop_frames == 0 || self.shop_frame_ms <= 0.0 {
            return Err(SessionError::malformed("shop_frames", "needs a positive frame count and duration"));
        }
        self.player.validate("player")?;
        self.opponent.validate("opponent")?;
        Ok(())
    }

    /// Override animation strips from a loaded sprite manifest.
    pub fn apply_sprites(&mut self, source: &dyn SpriteSource) -> Result<()> {
        self.player.apply_sprites("player", source)?;
        self.opponent.apply_sprites("opponent", source)
    }
}

/// Configuration for a runner session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub fixed_dt: f32,
    pub world_width: f32,
    pub world_height: f32,
    pub ground_height: f32,
    pub runner_size: Vec2,
    pub runner_x: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub max_jumps: u32,
    pub lives: i32,
    pub obstacle_speed: f32,
    pub enemy_speed: f32,
    /// Obstacle base speed while the wrong-answer penalty is active.
    pub slowed_obstacle_speed: f32,
    /// Added to obstacle and enemy speed per level above 1.
    pub level_speed_step: f32,
    /// Coins and power-ups scroll at this fraction of obstacle speed.
    pub pickup_speed_factor: f32,
    pub obstacle_chance: f32,
    pub enemy_chance: f32,
    pub coin_chance: f32,
    pub power_up_chance: f32,
    pub meteor_chance: f32,
    pub meteor_level: u32,
    pub meteor_window_ms: f64,
    pub boss_level_interval: u32,
    pub boss_lifetime_steps: u32,
    pub boss_bullet_interval_steps: u32,
    pub boss_bullet_speed: f32,
    pub thunderbolt_speed: f32,
    pub thunderbolts: u32,
    pub max_thunderbolts: u32,
    pub power_up_ms: f64,
    pub penalty_ms: f64,
    pub combo_window_ms: f64,
    /// Score points between weather changes.
    pub weather_interval: i64,
    pub trigger_tolerance: f32,
    pub boss_trigger_tolerance: f32,
    pub star_count: usize,
    pub leaf_count: usize,
    pub difficulty: String,
    pub seed: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 30.0,
            world_width: 800.0,
            world_height: 600.0,
            ground_height: 50.0,
            runner_size: Vec2::new(40.0, 50.0),
            runner_x: 100.0,
            gravity: 450.0,
            jump_velocity: -300.0,
            max_jumps: 2,
            lives: 10,
            obstacle_speed: 120.0,
            enemy_speed: 150.0,
            slowed_obstacle_speed: 60.0,
            level_speed_step: 15.0,
            pickup_speed_factor: 0.8,
            obstacle_chance: 0.02,
            enemy_chance: 0.01,
            coin_chance: 0.015,
            power_up_chance: 0.005,
            meteor_chance: 0.02,
            meteor_level: 20,
            meteor_window_ms: 10_000.0,
            boss_level_interval: 10,
            boss_lifetime_steps: 300,
            boss_bullet_interval_steps: 50,
            boss_bullet_speed: 120.0,
            thunderbolt_speed: 300.0,
            thunderbolts: 10,
            max_thunderbolts: 20,
            power_up_ms: 5000.0,
            penalty_ms: 2000.0,
            combo_window_ms: 3000.0,
            weather_interval: 100,
            trigger_tolerance: 5.0,
            boss_trigger_tolerance: 10.0,
            star_count: 70,
            leaf_count: 20,
            difficulty: String::new(),
            seed: 0x5EED_2E7,
        }
    }
}

impl RunnerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(SessionError::ConfigParse)
    }

    /// Y of the floor line.
    pub fn ground_line(&self) -> f32 {
        self.world_height - self.ground_height
    }

    pub fn validate(&self) -> Result<()> {
        check_world(self.fixed_dt, self.world_width, self.world_height)?;
        if self.ground_height < 0.0 || self.ground_height >= self.world_height {
            return Err(SessionError::malformed("ground_height", "must leave room above the floor"));
        }
        if self.runner_size.x <= 0.0 || self.runner_size.y <= 0.0 {
            return Err(SessionError::malformed("runner_size", "must be positive"));
        }
        if self.lives <= 0 {
            return Err(SessionError::malformed("lives", "must be positive"));
        }
        if self.max_jumps == 0 {
            return Err(SessionError::malformed("max_jumps", "must allow at least one jump"));
        }
        for (field, p) in [
            ("obstacle_chance", self.obstacle_chance),
            ("enemy_chance", self.enemy_chance),
            ("coin_chance", self.coin_chance),
            ("power_up_chance", self.power_up_chance),
            ("meteor_chance", self.meteor_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SessionError::malformed(field, format!("probability {} is outside [0, 1]", p)));
            }
        }
        if self.boss_level_interval == 0 {
            return Err(SessionError::malformed("boss_level_interval", "must be positive"));
        }
        if self.boss_bullet_interval_steps == 0 || self.boss_lifetime_steps == 0 {
            return Err(SessionError::malformed("boss_lifetime_steps", "boss timers must be positive"));
        }
        if self.weather_interval <= 0 {
            return Err(SessionError::malformed("weather_interval", "must be positive"));
        }
        Ok(())
    }
}

fn check_world(fixed_dt: f32, width: f32, height: f32) -> Result<()> {
    if !(fixed_dt > 0.0) {
        return Err(SessionError::malformed("fixed_dt", "must be positive"));
    }
    if width <= 0.0 || height <= 0.0 {
        return Err(SessionError::malformed("world_width", "world dimensions must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::animation::SpriteDescriptor;

    #[test]
    fn defaults_are_valid() {
        FightConfig::default().validate().unwrap();
        RunnerConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = RunnerConfig::from_json(r#"{ "lives": 3, "seed": 9 }"#).unwrap();
        assert_eq!(cfg.lives, 3);
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.obstacle_chance, 0.02);
        assert_eq!(cfg.ground_line(), 550.0);
    }

    #[test]
    fn zero_frame_strip_is_malformed() {
        let mut cfg = FightConfig::default();
        cfg.opponent.animations.set(AnimState::Death, SpriteDescriptor::new(0, 100.0));
        match cfg.validate() {
            Err(SessionError::MalformedConfig { field, .. }) => assert_eq!(field, "opponent"),
            other => panic!("expected malformed config, got {:?}", other),
        }
    }

    #[test]
    fn impact_frame_must_fit_attack() {
        let mut cfg = FightConfig::default();
        cfg.player.impact_frame = 6;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn probability_out_of_range_is_malformed() {
        let cfg = RunnerConfig {
            coin_chance: 1.5,
            ..Default::default()
        };
        match cfg.validate() {
            Err(SessionError::MalformedConfig { field, .. }) => assert_eq!(field, "coin_chance"),
            other => panic!("expected malformed config, got {:?}", other),
        }
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        assert!(matches!(
            FightConfig::from_json("{ nope"),
            Err(SessionError::ConfigParse(_))
        ));
    }
}
