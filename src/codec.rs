// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::fsrs::FsrsCard;
use crate::types::state::CardState;
use crate::types::state::MemoryState;
use crate::types::state::Stage;
use crate::types::timestamp::Timestamp;

/// Difficulty assumed for graded cards whose stored record lost it.
const FALLBACK_DIFFICULTY: f64 = 5.0;

/// The single repair step for stored states. Records written before the
/// coherence invariants were enforced, and records carrying a review
/// timestamp from a skewed clock, are coerced to a fresh new card here.
/// Feeding such history to the forgetting-curve model is undefined, so the
/// history is dropped instead of trusted.
pub fn repair(state: &CardState, now: Timestamp) -> CardState {
    let future_review = state
        .last_reviewed
        .is_some_and(|last_reviewed| last_reviewed > now);
    if state.is_coherent() && !future_review {
        return state.clone();
    }
    log::warn!("repairing incoherent card state; review history dropped");
    // A sentinel due time on a card no longer marked suspended would hide
    // it from every queue, so fall back to now.
    let due = if state.due.is_far_future() {
        now
    } else {
        state.due
    };
    CardState::fresh(due)
}

/// Reconstruct the internal card the forgetting-curve model expects.
/// Suspended cards decode as their pre-suspension memory state; the model
/// has no suspended concept.
pub fn decode(state: &CardState, now: Timestamp) -> FsrsCard {
    let state = repair(state, now);

    // Legacy records predate the memory-state tag; infer a best-effort one.
    let tag = state.fsrs_state.unwrap_or(match state.stage {
        Stage::New => MemoryState::New,
        Stage::Review => MemoryState::Review,
        _ => {
            if state.lapses > 0 {
                MemoryState::Relearning
            } else {
                MemoryState::Learning
            }
        }
    });

    // Non-finite stored parameters count as absent.
    let stored_stability = state
        .stability_days
        .filter(|stability| stability.is_finite() && *stability >= 0.0);
    let stability = match (tag, stored_stability) {
        (MemoryState::New, _) => 0.0,
        (_, Some(stability)) => stability,
        (MemoryState::Review, None) => {
            // A graded review card with no stored stability: approximate it
            // from the last scheduled interval.
            if state.scheduled_days > 0 {
                f64::max(0.1, state.scheduled_days as f64)
            } else {
                0.0
            }
        }
        _ => 0.0,
    };

    let stored_difficulty = state
        .difficulty
        .filter(|difficulty| difficulty.is_finite() && *difficulty > 0.0);
    let difficulty = match (tag, stored_difficulty) {
        (MemoryState::New, _) => 0.0,
        (_, Some(difficulty)) => difficulty,
        _ => FALLBACK_DIFFICULTY,
    };

    let elapsed_days = match state.last_reviewed {
        Some(last_reviewed) => now.whole_days_since(last_reviewed),
        None => 0,
    };

    FsrsCard {
        due: state.due,
        stability,
        difficulty,
        elapsed_days,
        scheduled_days: state.scheduled_days as i64,
        reps: state.reps,
        lapses: state.lapses,
        state: tag,
        learning_step: state.learning_step_index,
        last_review: state.last_reviewed,
    }
}

/// Translate the model's output card back into a persisted state. If the
/// previous state is suspended the engine output is refused and the
/// previous state returned unchanged: only the explicit unsuspend
/// operation lifts a suspension.
pub fn encode(previous: &CardState, card: &FsrsCard) -> CardState {
    if previous.stage == Stage::Suspended {
        return previous.clone();
    }
    // A new card carries no memory parameters and no history; anything
    // else would leave the encoded state incoherent.
    let (stability_days, difficulty, last_reviewed) = if card.state == MemoryState::New {
        (None, None, None)
    } else {
        (
            finite_or(card.stability, previous.stability_days),
            finite_or(card.difficulty, previous.difficulty),
            card.last_review.or(previous.last_reviewed),
        )
    };
    CardState {
        stage: card.state.stage(),
        due: card.due,
        suspended_due: None,
        stability_days,
        difficulty,
        scheduled_days: card.scheduled_days.max(0) as u32,
        reps: card.reps,
        lapses: card.lapses,
        learning_step_index: card.learning_step,
        last_reviewed,
        fsrs_state: Some(card.state),
    }
}

fn finite_or(value: f64, fallback: Option<f64>) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> Timestamp {
        Timestamp::from_millis(1_700_000_000_000)
    }

    fn reviewed_state(stage: Stage) -> CardState {
        let mut state = CardState::fresh(t0());
        state.stage = stage;
        state.last_reviewed = Some(t0().add_days(-5));
        state.stability_days = Some(12.0);
        state.difficulty = Some(6.0);
        state.scheduled_days = 12;
        state.reps = 4;
        state
    }

    #[test]
    fn test_decode_new_card() {
        let state = CardState::fresh(t0());
        let card = decode(&state, t0());
        assert_eq!(card.state, MemoryState::New);
        assert_eq!(card.stability, 0.0);
        assert!(card.last_review.is_none());
        assert_eq!(card.elapsed_days, 0);
    }

    #[test]
    fn test_decode_uses_stored_tag() {
        let mut state = reviewed_state(Stage::Learning);
        state.fsrs_state = Some(MemoryState::Relearning);
        let card = decode(&state, t0());
        assert_eq!(card.state, MemoryState::Relearning);
    }

    #[test]
    fn test_decode_infers_tag_for_legacy_records() {
        let state = reviewed_state(Stage::Review);
        assert_eq!(decode(&state, t0()).state, MemoryState::Review);

        let state = reviewed_state(Stage::Learning);
        assert_eq!(decode(&state, t0()).state, MemoryState::Learning);

        let mut state = reviewed_state(Stage::Learning);
        state.lapses = 2;
        assert_eq!(decode(&state, t0()).state, MemoryState::Relearning);
    }

    #[test]
    fn test_decode_defaults_missing_review_stability() {
        let mut state = reviewed_state(Stage::Review);
        state.stability_days = None;
        let card = decode(&state, t0());
        assert_eq!(card.stability, 12.0);

        state.scheduled_days = 0;
        let card = decode(&state, t0());
        assert_eq!(card.stability, 0.0);
    }

    #[test]
    fn test_decode_elapsed_days() {
        let state = reviewed_state(Stage::Review);
        let card = decode(&state, t0());
        assert_eq!(card.elapsed_days, 5);
    }

    #[test]
    fn test_future_review_timestamp_resets_to_new() {
        let mut state = reviewed_state(Stage::Review);
        state.last_reviewed = Some(t0().add_days(2));
        let card = decode(&state, t0());
        assert_eq!(card.state, MemoryState::New);
        assert!(card.last_review.is_none());
        assert_eq!(card.stability, 0.0);
    }

    #[test]
    fn test_decode_suspended_as_pre_suspension_state() {
        let mut state = reviewed_state(Stage::Suspended);
        state.fsrs_state = Some(MemoryState::Review);
        state.suspended_due = Some(t0());
        state.due = Timestamp::far_future();
        let card = decode(&state, t0());
        assert_eq!(card.state, MemoryState::Review);
    }

    #[test]
    fn test_repair_of_incoherent_suspension() {
        // Suspended stage without a restoration due time.
        let mut state = reviewed_state(Stage::Suspended);
        state.due = Timestamp::far_future();
        let repaired = repair(&state, t0());
        assert_eq!(repaired.stage, Stage::New);
        assert!(repaired.last_reviewed.is_none());
        // The sentinel due must not leak onto a card that is no longer
        // suspended.
        assert_eq!(repaired.due, t0());
    }

    #[test]
    fn test_encode_refuses_to_lift_suspension() {
        let mut state = reviewed_state(Stage::Suspended);
        state.fsrs_state = Some(MemoryState::Review);
        state.suspended_due = Some(t0());
        state.due = Timestamp::far_future();
        let card = decode(&state, t0()).advance(
            crate::fsrs::Rating::Good,
            t0(),
            &crate::types::settings::SchedulerSettings::default(),
        );
        let encoded = encode(&state, &card);
        assert_eq!(encoded, state);
    }

    #[test]
    fn test_encode_translates_tag_to_stage() {
        let state = reviewed_state(Stage::Review);
        let mut card = decode(&state, t0());
        card.state = MemoryState::Relearning;
        let encoded = encode(&state, &card);
        assert_eq!(encoded.stage, Stage::Relearning);
        assert_eq!(encoded.fsrs_state, Some(MemoryState::Relearning));
        assert!(encoded.suspended_due.is_none());
    }

    #[test]
    fn test_encode_falls_back_to_previous_parameters() {
        let state = reviewed_state(Stage::Review);
        let mut card = decode(&state, t0());
        card.stability = f64::NAN;
        card.difficulty = f64::INFINITY;
        let encoded = encode(&state, &card);
        assert_eq!(encoded.stability_days, Some(12.0));
        assert_eq!(encoded.difficulty, Some(6.0));
    }

    #[test]
    fn test_new_card_round_trips_without_history() {
        let state = CardState::fresh(t0());
        let encoded = encode(&state, &decode(&state, t0()));
        assert_eq!(encoded.stage, Stage::New);
        assert!(encoded.last_reviewed.is_none());
        assert!(encoded.stability_days.is_none());
        assert!(encoded.is_coherent());
    }

    #[test]
    fn test_incoherent_state_round_trips_to_coherent_new() {
        let mut state = CardState::fresh(t0());
        state.last_reviewed = Some(t0().add_days(-1));
        let encoded = encode(&state, &decode(&state, t0()));
        assert_eq!(encoded.stage, Stage::New);
        assert!(encoded.is_coherent());
    }
}
