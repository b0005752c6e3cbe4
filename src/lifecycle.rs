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
use crate::types::settings::SchedulerSettings;
use crate::types::state::CardState;
use crate::types::state::MemoryState;
use crate::types::state::Stage;
use crate::types::timestamp::Timestamp;

/// Postpone a card to no earlier than the next calendar day. Memory
/// parameters, counters and stage are untouched; burying an already-buried
/// card can only push the due time further out.
pub fn bury(state: &CardState, now: Timestamp) -> CardState {
    let mut next = state.clone();
    next.due = state.due.max(now.next_day_start());
    next
}

/// Remove a card from due-based scheduling until explicitly unsuspended.
/// The current due time is captured for restoration and the stored due
/// forced to the far-future sentinel. Suspending an already-suspended card
/// is a no-op: overwriting the captured due time with the sentinel would
/// lose the real one.
pub fn suspend(state: &CardState, now: Timestamp) -> CardState {
    if state.stage == Stage::Suspended {
        return state.clone();
    }
    let mut next = state.clone();
    next.suspended_due = Some(if state.due.is_far_future() {
        now
    } else {
        state.due
    });
    next.stage = Stage::Suspended;
    next.due = Timestamp::far_future();
    next
}

/// Restore a suspended card to its pre-suspension stage and due time.
/// A no-op on cards that are not suspended.
pub fn unsuspend(state: &CardState, now: Timestamp) -> CardState {
    if state.stage != Stage::Suspended {
        return state.clone();
    }
    let mut next = state.clone();
    next.due = state.suspended_due.unwrap_or(now);
    next.suspended_due = None;
    next.stage = match state.fsrs_state {
        Some(MemoryState::Review) => Stage::Review,
        Some(MemoryState::Relearning) => Stage::Relearning,
        Some(MemoryState::Learning) => Stage::Learning,
        _ => Stage::New,
    };
    next
}

/// Discard the card's review history entirely, returning a fresh new-stage
/// state. `settings` is accepted for interface symmetry with the other
/// scheduling operations; a reset card has no parameters to configure.
pub fn reset(state: &CardState, now: Timestamp, _settings: &SchedulerSettings) -> CardState {
    log::debug!("resetting card with {} reps", state.reps);
    CardState::fresh(FsrsCard::init(now).due)
}
