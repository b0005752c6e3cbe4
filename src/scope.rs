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

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::types::card::CardId;
use crate::types::card::CardRecord;
use crate::types::state::CardState;
use crate::types::state::Stage;
use crate::types::timestamp::Timestamp;

/// What part of the vault a study session draws cards from.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "lowercase")]
pub enum Scope {
    /// Everything.
    Vault,
    /// Cards from notes under a folder.
    Folder(String),
    /// Cards from a single note.
    Note(String),
    /// Cards belonging to a group, at any depth at or below the key.
    Group(String),
}

impl Scope {
    pub fn matches(&self, record: &CardRecord) -> bool {
        match self {
            Scope::Vault => true,
            Scope::Note(path) => record.source_path == *path,
            Scope::Folder(folder) => {
                record.source_path == *folder
                    || record
                        .source_path
                        .strip_prefix(folder.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            Scope::Group(key) => record.groups.iter().any(|group| group_matches(group, key)),
        }
    }
}

fn group_matches(group: &str, key: &str) -> bool {
    let group = group.to_lowercase();
    let key = key.to_lowercase();
    group == key
        || group
            .strip_prefix(key.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Which cards a session serves.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StudyMode {
    /// The ordinary review queue: cards due at or before now.
    Due,
    /// Ahead-of-schedule practice: only cards that are not yet due.
    Practice,
}

/// Select the cards eligible for a study session. Composite wrapper cards,
/// excluded ids, out-of-scope cards and suspended cards never qualify; the
/// mode decides which side of "now" the due time must fall on. The result
/// is sorted ascending by due time, tie-broken by source path and then
/// card id, so equal inputs give equal queues.
pub fn eligible<'a>(
    cards: &'a [(CardRecord, CardState)],
    scope: &Scope,
    exclude: &HashSet<CardId>,
    now: Timestamp,
    mode: StudyMode,
) -> Vec<&'a (CardRecord, CardState)> {
    let mut selected: Vec<&(CardRecord, CardState)> = cards
        .iter()
        .filter(|(record, state)| {
            record.kind.is_schedulable()
                && !exclude.contains(&record.id)
                && scope.matches(record)
                && state.stage != Stage::Suspended
                && match mode {
                    StudyMode::Due => state.due <= now,
                    StudyMode::Practice => state.due > now,
                }
        })
        .collect();
    selected.sort_by(|(record_a, state_a), (record_b, state_b)| {
        state_a
            .due
            .cmp(&state_b.due)
            .then_with(|| record_a.source_path.cmp(&record_b.source_path))
            .then_with(|| record_a.id.cmp(&record_b.id))
    });
    selected
}
