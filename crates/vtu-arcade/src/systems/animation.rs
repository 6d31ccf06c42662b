//! Animation policy: what happens when a strip reaches its last frame.

use crate::components::animation::AnimState;
use crate::components::fighter::Fighter;

/// Advance the fighter's frame counter. Frozen fighters do not animate.
pub fn advance_fighter(fighter: &mut Fighter, now_ms: f64) {
    if fighter.is_frozen() {
        return;
    }
    fighter.anim.advance_frame(now_ms);
}

/// Apply last-frame transitions. Call after hits for this step are resolved.
pub fn settle_fighter(fighter: &mut Fighter, now_ms: f64) {
    if fighter.is_frozen() || !fighter.anim.is_last_frame() {
        return;
    }
    match fighter.anim.current() {
        AnimState::Death => {
            if fighter.dead && fighter.body.on_ground {
                fighter.death_finished = true;
            }
        }
        AnimState::Attack => {
            fighter.attacking = false;
            fighter.anim.request_state(AnimState::Idle, now_ms);
        }
        AnimState::TakeHit => {
            let next = if fighter.dead { AnimState::Death } else { AnimState::Idle };
            fighter.anim.request_state(next, now_ms);
        }
        AnimState::SpecialAttack => {
            fighter.special_charged = false;
            fighter.anim.request_state(AnimState::Idle, now_ms);
        }
        _ => {}
    }
}
