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

use crate::codec::decode;
use crate::codec::encode;
use crate::fsrs::Rating;
use crate::fsrs::retrievability;
use crate::types::settings::SchedulerSettings;
use crate::types::state::CardState;
use crate::types::state::MemoryState;
use crate::types::state::Stage;
use crate::types::timestamp::Timestamp;

/// The outcome of one grading call: the state to persist plus a metrics
/// bundle for logging and analytics. Never persisted itself.
#[derive(Clone, Debug)]
pub struct GradeResult {
    pub next_state: CardState,
    pub previous_due: Timestamp,
    pub next_due: Timestamp,
    /// Whole days since the last review. None when the card had no history.
    pub elapsed_days: Option<i64>,
    /// Estimated recall probability at grading time. None for cards with
    /// no history or no stability.
    pub retrievability_before: Option<f64>,
    /// Estimated recall probability at the newly scheduled due time.
    pub retrievability_after: Option<f64>,
    pub stability: Option<f64>,
    pub difficulty: Option<f64>,
    pub state_before: MemoryState,
    pub state_after: MemoryState,
}

/// Grade a card. Suspended cards are a no-op: grading never silently lifts
/// a suspension.
pub fn grade(
    state: &CardState,
    rating: Rating,
    now: Timestamp,
    settings: &SchedulerSettings,
) -> GradeResult {
    if state.stage == Stage::Suspended {
        let tag = decode(state, now).state;
        return GradeResult {
            next_state: state.clone(),
            previous_due: state.due,
            next_due: state.due,
            elapsed_days: None,
            retrievability_before: None,
            retrievability_after: None,
            stability: state.stability_days,
            difficulty: state.difficulty,
            state_before: tag,
            state_after: tag,
        };
    }

    let card = decode(state, now);
    let has_history = card.last_review.is_some();
    let retrievability_before = if has_history && card.stability > 0.0 {
        Some(retrievability(card.elapsed_days as f64, card.stability))
    } else {
        None
    };

    let next = card.advance(rating, now, settings);

    let days_until_due = next.due.whole_days_since(now);
    let retrievability_after = if next.stability > 0.0 {
        Some(retrievability(days_until_due as f64, next.stability))
    } else {
        None
    };

    log::debug!(
        "graded {}: {:?} -> {:?}, S={:.2}d D={:.2}, due in {}d",
        rating.as_str(),
        card.state,
        next.state,
        next.stability,
        next.difficulty,
        days_until_due,
    );

    let next_state = encode(state, &next);
    GradeResult {
        next_due: next_state.due,
        next_state,
        previous_due: state.due,
        elapsed_days: has_history.then_some(card.elapsed_days),
        retrievability_before,
        retrievability_after,
        stability: Some(next.stability),
        difficulty: Some(next.difficulty),
        state_before: card.state,
        state_after: next.state,
    }
}

/// Collapse a binary pass/fail outcome into a rating, for surfaces that
/// only offer two buttons.
pub fn pass_rating(passed: bool, easy_on_pass: bool) -> Rating {
    match (passed, easy_on_pass) {
        (true, true) => Rating::Easy,
        (true, false) => Rating::Good,
        (false, _) => Rating::Again,
    }
}
