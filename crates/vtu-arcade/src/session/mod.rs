pub mod fighting;
pub mod runner;
pub mod state;

pub use fighting::FightSession;
pub use runner::{CoinCombo, RunnerSession};

use crate::api::config::{FightConfig, RunnerConfig};
use crate::api::game::Session;
use crate::api::types::GameMode;
use crate::assets::registry::SpriteSource;
use crate::error::Result;

/// Build a session for `mode` from a JSON config. An empty string uses the
/// defaults. Fighting strips are overridden from `sprites` when given.
pub fn new_session(mode: GameMode, config_json: &str, sprites: Option<&dyn SpriteSource>) -> Result<Box<dyn Session>> {
    let json = if config_json.trim().is_empty() { "{}" } else { config_json };
    match mode {
        GameMode::Fighting => {
            let cfg = FightConfig::from_json(json)?;
            let session = match sprites {
                Some(source) => FightSession::with_sprites(cfg, source)?,
                None => FightSession::new(cfg)?,
            };
            Ok(Box::new(session))
        }
        GameMode::Runner => Ok(Box::new(RunnerSession::new(RunnerConfig::from_json(json)?)?)),
    }
}

/// Restore a session of `mode` from `Session::to_snapshot_json` output.
pub fn restore_session(mode: GameMode, snapshot_json: &str) -> Result<Box<dyn Session>> {
    let session: Box<dyn Session> = match mode {
        GameMode::Fighting => Box::new(FightSession::from_snapshot_json(snapshot_json)?),
        GameMode::Runner => Box::new(RunnerSession::from_snapshot_json(snapshot_json)?),
    };
    Ok(session)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::types::SessionPhase;
    use crate::bridge::external::{ExternalBridge, Question};
    use crate::error::SessionError;

    /// Always has a question whose answer is `correct`. Counts how often it was asked.
    pub(crate) struct QuizBridge {
        correct: usize,
        pub(crate) asked: usize,
    }

    impl QuizBridge {
        pub(crate) fn new(correct: usize) -> Self {
            Self { correct, asked: 0 }
        }
    }

    impl ExternalBridge for QuizBridge {
        fn random_question(&mut self) -> Option<Question> {
            self.asked += 1;
            Some(Question::new("Which one?", ["a", "b", "c", "d"], self.correct))
        }
    }

    #[test]
    fn builds_either_mode_from_json() {
        let fight = new_session(GameMode::Fighting, "", None).unwrap();
        assert_eq!(fight.mode(), GameMode::Fighting);
        assert_eq!(fight.phase(), SessionPhase::Intro);

        let runner = new_session(GameMode::Runner, r#"{ "lives": 3 }"#, None).unwrap();
        assert_eq!(runner.health(crate::api::types::ActorId::Player), 3);
    }

    #[test]
    fn bad_config_json_is_rejected() {
        assert!(matches!(
            new_session(GameMode::Runner, r#"{ "lives": "many" }"#, None),
            Err(SessionError::ConfigParse(_))
        ));
        assert!(matches!(
            new_session(GameMode::Runner, r#"{ "lives": 0 }"#, None),
            Err(SessionError::MalformedConfig { field: "lives", .. })
        ));
    }

    #[test]
    fn restores_from_snapshot() {
        let mut session = new_session(GameMode::Runner, "", None).unwrap();
        session.start(0.0).unwrap();
        let json = session.to_snapshot_json().unwrap();
        let back = restore_session(GameMode::Runner, &json).unwrap();
        assert_eq!(back.phase(), SessionPhase::Running);
        assert!(matches!(restore_session(GameMode::Fighting, &json), Err(SessionError::Snapshot(_))));
    }
}
