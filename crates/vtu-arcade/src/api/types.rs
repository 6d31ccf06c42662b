use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Unique identifier for a transient entity in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// A sound cue emitted by the simulation.
/// The numeric value maps to a clip in the host's audio manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

impl SoundEvent {
    pub const HIT: Self = Self(1);
    pub const JUMP: Self = Self(2);
    pub const COIN: Self = Self(3);
    pub const DEATH: Self = Self(4);
    pub const POWER_UP: Self = Self(5);
    pub const LIFE_LOST: Self = Self(6);
    pub const THUNDER: Self = Self(7);
    pub const BOSS: Self = Self(8);
    pub const QUESTION: Self = Self(9);
}

/// A flat event record handed to the host.
/// `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;
}

/// Which game a session plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Fighting,
    Runner,
}

impl GameMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "fighting" | "fight" => Some(Self::Fighting),
            "runner" | "retro" => Some(Self::Runner),
            _ => None,
        }
    }

    /// Mode label used in score submissions.
    pub fn label(self) -> &'static str {
        match self {
            Self::Fighting => "Fighting",
            Self::Runner => "Retro",
        }
    }
}

/// The two controllable actors. The runner only has a `Player`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorId {
    Player,
    Opponent,
}

impl ActorId {
    pub fn other(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

/// Terminal result, always from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Lose,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Intro,
    Running,
    PausedForInterrupt,
    GameOver(Outcome),
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver(_))
    }
}

/// What opened a quiz interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptSource {
    Obstacle(EntityId),
    Enemy(EntityId),
    Boss(EntityId),
    /// The bonus fireball, caught by the given actor.
    Fireball(ActorId),
}

/// Reward picked after a correct bonus answer in the fighting game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusChoice {
    Heal,
    SpecialCharge,
}

/// Runner background variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    Sunny,
    Rainy,
    Snow,
    Autumn,
}

impl Weather {
    pub const ALL: [Self; 4] = [Self::Sunny, Self::Rainy, Self::Snow, Self::Autumn];
}

/// High-level events produced by a session tick, drained by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    PhaseChanged(SessionPhase),
    Damaged { actor: ActorId, amount: i32, health: i32 },
    ScoreChanged { score: i64 },
    LifeLost { lives: i32 },
    LevelUp { level: u32 },
    WeatherChanged { weather: Weather, night: bool },
    InterruptOpened(InterruptSource),
    InterruptResolved { correct: bool },
    BonusGranted { actor: ActorId, choice: BonusChoice },
    MeteorShower { active: bool },
    BossSpawned { health: i32 },
}

impl SessionEvent {
    /// Flatten into the fixed four-float wire record.
    pub fn to_wire(&self) -> GameEvent {
        let actor = |a: ActorId| match a {
            ActorId::Player => 0.0,
            ActorId::Opponent => 1.0,
        };
        match *self {
            Self::PhaseChanged(phase) => {
                let (code, outcome) = match phase {
                    SessionPhase::Intro => (0.0, 0.0),
                    SessionPhase::Running => (1.0, 0.0),
                    SessionPhase::PausedForInterrupt => (2.0, 0.0),
                    SessionPhase::GameOver(Outcome::Win) => (3.0, 1.0),
                    SessionPhase::GameOver(Outcome::Lose) => (3.0, 2.0),
                    SessionPhase::GameOver(Outcome::Draw) => (3.0, 3.0),
                };
                GameEvent { kind: 1.0, a: code, b: outcome, c: 0.0 }
            }
            Self::Damaged { actor: who, amount, health } => GameEvent {
                kind: 2.0,
                a: actor(who),
                b: amount as f32,
                c: health as f32,
            },
            Self::ScoreChanged { score } => GameEvent { kind: 3.0, a: score as f32, ..Default::default() },
            Self::LifeLost { lives } => GameEvent { kind: 4.0, a: lives as f32, ..Default::default() },
            Self::LevelUp { level } => GameEvent { kind: 5.0, a: level as f32, ..Default::default() },
            Self::WeatherChanged { weather, night } => GameEvent {
                kind: 6.0,
                a: weather as u8 as f32,
                b: if night { 1.0 } else { 0.0 },
                c: 0.0,
            },
            Self::InterruptOpened(source) => {
                let (code, id) = match source {
                    InterruptSource::Obstacle(id) => (0.0, id.0 as f32),
                    InterruptSource::Enemy(id) => (1.0, id.0 as f32),
                    InterruptSource::Boss(id) => (2.0, id.0 as f32),
                    InterruptSource::Fireball(who) => (3.0, actor(who)),
                };
                GameEvent { kind: 7.0, a: code, b: id, c: 0.0 }
            }
            Self::InterruptResolved { correct } => GameEvent {
                kind: 8.0,
                a: if correct { 1.0 } else { 0.0 },
                ..Default::default()
            },
            Self::BonusGranted { actor: who, choice } => GameEvent {
                kind: 9.0,
                a: actor(who),
                b: match choice {
                    BonusChoice::Heal => 0.0,
                    BonusChoice::SpecialCharge => 1.0,
                },
                c: 0.0,
            },
            Self::MeteorShower { active } => GameEvent {
                kind: 10.0,
                a: if active { 1.0 } else { 0.0 },
                ..Default::default()
            },
            Self::BossSpawned { health } => GameEvent { kind: 11.0, a: health as f32, ..Default::default() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_event_is_4_floats() {
        assert_eq!(std::mem::size_of::<GameEvent>(), 16);
        assert_eq!(GameEvent::FLOATS, 4);
    }

    #[test]
    fn game_over_wire_carries_outcome() {
        let wire = SessionEvent::PhaseChanged(SessionPhase::GameOver(Outcome::Draw)).to_wire();
        assert_eq!(wire.kind, 1.0);
        assert_eq!(wire.a, 3.0);
        assert_eq!(wire.b, 3.0);
    }

    #[test]
    fn mode_names() {
        assert_eq!(GameMode::from_name("Fighting"), Some(GameMode::Fighting));
        assert_eq!(GameMode::from_name("retro"), Some(GameMode::Runner));
        assert_eq!(GameMode::from_name("chess"), None);
        assert_eq!(GameMode::Runner.label(), "Retro");
    }
}
