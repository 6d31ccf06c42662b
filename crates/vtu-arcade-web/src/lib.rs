pub mod runner;

pub use runner::{RunnerError, SessionRunner};

use std::cell::RefCell;
use std::fmt::Display;

use js_sys::{Function, Object, Reflect};
use vtu_arcade::{ActorId, BonusChoice, GameMode, InputEvent, ScoreSubmission};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<SessionRunner>> = RefCell::new(None);
    static SCORE_CALLBACK: RefCell<Option<Function>> = RefCell::new(None);
}

fn js_err(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Run `f` against the live runner, or report that `game_init` was never called.
fn with_runner<R>(f: impl FnOnce(&mut SessionRunner) -> R) -> Result<R, JsValue> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Ok(f(runner)),
            None => Err(JsValue::from_str("game not initialized; call game_init() first")),
        }
    })
}

/// Accessor variant: falls back to `default` before initialization.
fn read_runner<R>(default: R, f: impl FnOnce(&SessionRunner) -> R) -> R {
    RUNNER.with(|cell| cell.borrow().as_ref().map_or(default, f))
}

fn submission_object(submission: &ScoreSubmission) -> Result<Object, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &"name".into(), &submission.name.as_str().into())?;
    Reflect::set(&obj, &"score".into(), &JsValue::from_f64(submission.score as f64))?;
    Reflect::set(&obj, &"difficulty".into(), &submission.difficulty.as_str().into())?;
    Reflect::set(&obj, &"mode".into(), &submission.mode.as_str().into())?;
    Ok(obj)
}

fn actor_from(code: u32) -> ActorId {
    if code == 0 {
        ActorId::Player
    } else {
        ActorId::Opponent
    }
}

/// Create a session. `mode` is `"fighting"` or `"runner"`; `config_json`
/// may be empty for the defaults.
#[wasm_bindgen]
pub fn game_init(mode: &str, config_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let mode = GameMode::from_name(mode).ok_or_else(|| js_err(format!("unknown game mode `{mode}`")))?;
    let runner = SessionRunner::new(mode, config_json).map_err(js_err)?;
    RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
    log::info!("vtu-arcade: {} session initialized", mode.label());
    Ok(())
}

#[wasm_bindgen]
pub fn game_start(now_ms: f64) -> Result<(), JsValue> {
    with_runner(|r| r.start(now_ms))?.map_err(js_err)
}

#[wasm_bindgen]
pub fn game_tick(now_ms: f64) -> Result<(), JsValue> {
    with_runner(|r| r.tick(now_ms))
}

#[wasm_bindgen]
pub fn game_key_down(key_code: u32) -> Result<(), JsValue> {
    with_runner(|r| r.push_input(InputEvent::KeyDown { key_code }))
}

#[wasm_bindgen]
pub fn game_key_up(key_code: u32) -> Result<(), JsValue> {
    with_runner(|r| r.push_input(InputEvent::KeyUp { key_code }))
}

/// Call on window blur so no key stays stuck down.
#[wasm_bindgen]
pub fn game_release_all() -> Result<(), JsValue> {
    with_runner(|r| r.push_input(InputEvent::ReleaseAll))
}

#[wasm_bindgen]
pub fn game_load_manifest(json: &str) -> Result<u32, JsValue> {
    let count = with_runner(|r| r.load_manifest(json))?.map_err(js_err)?;
    Ok(count as u32)
}

/// Load the question bank. The pick order is seeded from the clock.
#[wasm_bindgen]
pub fn game_load_questions(json: &str) -> Result<u32, JsValue> {
    let seed = js_sys::Date::now() as u64;
    let count = with_runner(|r| r.load_questions(json, seed))?.map_err(js_err)?;
    Ok(count as u32)
}

/// Answer the pending quiz. A negative index means the player timed out.
/// Returns whether the answer was correct.
#[wasm_bindgen]
pub fn game_resolve_interrupt(chosen: i32) -> Result<bool, JsValue> {
    let chosen = usize::try_from(chosen).ok();
    let verdict = with_runner(|r| r.resolve_interrupt(chosen))?.map_err(js_err)?;
    Ok(verdict.is_correct())
}

/// 0 heals, anything else charges the special move.
#[wasm_bindgen]
pub fn game_choose_bonus(choice: u32) -> Result<(), JsValue> {
    let choice = if choice == 0 { BonusChoice::Heal } else { BonusChoice::SpecialCharge };
    with_runner(|r| r.choose_bonus(choice))?.map_err(js_err)
}

/// Receives `{ name, score, difficulty, mode }` for each submitted score.
#[wasm_bindgen]
pub fn set_score_callback(callback: Function) {
    SCORE_CALLBACK.with(|cell| *cell.borrow_mut() = Some(callback));
}

#[wasm_bindgen]
pub fn game_submit_score(name: &str) -> Result<(), JsValue> {
    let submissions = with_runner(|r| r.submit_score(name))?.map_err(js_err)?;
    SCORE_CALLBACK.with(|cell| -> Result<(), JsValue> {
        let borrow = cell.borrow();
        let Some(callback) = borrow.as_ref() else {
            log::warn!("no score callback set; dropping {} submission(s)", submissions.len());
            return Ok(());
        };
        for submission in &submissions {
            let obj = submission_object(submission)?;
            if let Err(err) = callback.call1(&JsValue::NULL, &obj) {
                web_sys::console::warn_1(&err);
            }
        }
        Ok(())
    })
}

#[wasm_bindgen]
pub fn game_snapshot() -> Result<String, JsValue> {
    with_runner(|r| r.snapshot())?.map_err(js_err)
}

#[wasm_bindgen]
pub fn game_restore(snapshot_json: &str) -> Result<(), JsValue> {
    with_runner(|r| r.restore(snapshot_json))?.map_err(js_err)
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_phase() -> u32 {
    read_runner(0, |r| r.phase_code())
}

/// 0 while undecided, then 1 win, 2 lose, 3 draw.
#[wasm_bindgen]
pub fn get_outcome() -> u32 {
    read_runner(0, |r| match r.session().outcome() {
        None => 0,
        Some(vtu_arcade::Outcome::Win) => 1,
        Some(vtu_arcade::Outcome::Lose) => 2,
        Some(vtu_arcade::Outcome::Draw) => 3,
    })
}

#[wasm_bindgen]
pub fn get_score() -> f64 {
    read_runner(0.0, |r| r.score() as f64)
}

/// Fighter health in the fighting game, lives in the runner.
#[wasm_bindgen]
pub fn get_health(actor: u32) -> i32 {
    read_runner(0, |r| r.health(actor_from(actor)))
}

#[wasm_bindgen]
pub fn get_question_text() -> Option<String> {
    read_runner(None, |r| r.pending_question().map(|q| q.text.clone()))
}

#[wasm_bindgen]
pub fn get_question_choice(index: u32) -> Option<String> {
    read_runner(None, |r| {
        r.pending_question()
            .and_then(|q| q.choices.get(index as usize).cloned())
    })
}

#[wasm_bindgen]
pub fn get_question_hint() -> Option<String> {
    read_runner(None, |r| r.pending_question().and_then(|q| q.hint.clone()))
}

#[wasm_bindgen]
pub fn get_instances_ptr() -> *const f32 {
    read_runner(std::ptr::null(), |r| r.instances_ptr())
}

#[wasm_bindgen]
pub fn get_instance_count() -> u32 {
    read_runner(0, |r| r.instance_count())
}

#[wasm_bindgen]
pub fn get_sound_events_ptr() -> *const u8 {
    read_runner(std::ptr::null(), |r| r.sound_events_ptr())
}

#[wasm_bindgen]
pub fn get_sound_events_len() -> u32 {
    read_runner(0, |r| r.sound_events_len())
}

#[wasm_bindgen]
pub fn get_game_events_ptr() -> *const f32 {
    read_runner(std::ptr::null(), |r| r.game_events_ptr())
}

#[wasm_bindgen]
pub fn get_game_events_len() -> u32 {
    read_runner(0, |r| r.game_events_len())
}
