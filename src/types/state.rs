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

use serde::Deserialize;
use serde::Serialize;

use crate::types::timestamp::Timestamp;

/// The persisted lifecycle stage of a card.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    New,
    Learning,
    Review,
    Relearning,
    Suspended,
}

/// The memory-state tag of the forgetting-curve model. Deliberately has no
/// suspended variant: suspension is a scheduling concept, not a memory one.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryState {
    New,
    Learning,
    Review,
    Relearning,
}

impl MemoryState {
    pub fn stage(self) -> Stage {
        match self {
            MemoryState::New => Stage::New,
            MemoryState::Learning => Stage::Learning,
            MemoryState::Review => Stage::Review,
            MemoryState::Relearning => Stage::Relearning,
        }
    }
}

/// The persisted scheduling record of one card.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    pub stage: Stage,
    /// When the card should next be shown. Forced to the far-future
    /// sentinel while suspended.
    pub due: Timestamp,
    /// The due time to restore on unsuspend. Present iff suspended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended_due: Option<Timestamp>,
    /// Expected days until recall probability decays to the target
    /// retention. Absent for new cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability_days: Option<f64>,
    /// How quickly stability collapses on a lapse. Absent for new cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    /// The last computed review interval, in days. Zero for new cards and
    /// for sub-day learning steps.
    #[serde(default)]
    pub scheduled_days: u32,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub lapses: u32,
    /// Position within the configured learning or relearning steps.
    #[serde(default)]
    pub learning_step_index: u32,
    /// When the card was last graded. Absent for new cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<Timestamp>,
    /// The memory-state tag last reported by the model. While suspended,
    /// records the state to restore on unsuspend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fsrs_state: Option<MemoryState>,
}

impl CardState {
    /// A brand-new card, due at the given time, with no review history.
    pub fn fresh(due: Timestamp) -> Self {
        Self {
            stage: Stage::New,
            due,
            suspended_due: None,
            stability_days: None,
            difficulty: None,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            learning_step_index: 0,
            last_reviewed: None,
            fsrs_state: None,
        }
    }

    /// A state is coherent iff being new coincides with having no review
    /// history, and being suspended coincides with carrying a restoration
    /// due time under the far-future sentinel. Incoherent states come from
    /// storage written before these invariants were enforced.
    pub fn is_coherent(&self) -> bool {
        let new_coherent = (self.stage == Stage::New) == self.last_reviewed.is_none();
        let suspended = self.suspended_due.is_some() && self.due.is_far_future();
        let suspended_coherent = (self.stage == Stage::Suspended) == suspended;
        new_coherent && suspended_coherent
    }
}
