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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

/// Identifies a card across the vault.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardKind {
    Basic,
    /// A single cloze deletion generated from a cloze parent.
    Cloze,
    /// The note-side wrapper a cloze card is generated from. Not itself
    /// schedulable.
    ClozeParent,
    /// A single masked region of an image occlusion.
    Occlusion,
    /// The wrapper holding the occluded image. Not itself schedulable.
    OcclusionParent,
    /// A named group of masked regions revealed together. Not itself
    /// schedulable.
    OcclusionGroup,
}

impl CardKind {
    /// Composite wrapper kinds exist only as templates for generated child
    /// cards and never enter a study queue.
    pub fn is_schedulable(self) -> bool {
        !matches!(
            self,
            CardKind::ClozeParent | CardKind::OcclusionParent | CardKind::OcclusionGroup
        )
    }
}

/// The scheduling-relevant identity of a card. Content (question text,
/// cloze ranges, image data) stays with the storage collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: CardId,
    pub kind: CardKind,
    /// Vault-relative path of the note the card was parsed from.
    pub source_path: String,
    /// Hierarchical group paths the card belongs to, e.g. "biology/cells".
    #[serde(default)]
    pub groups: Vec<String>,
    /// For generated sub-cards, the id of the wrapper they came from.
    #[serde(default)]
    pub parent: Option<CardId>,
}

impl CardRecord {
    pub fn new(id: CardId, kind: CardKind, source_path: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            source_path: source_path.into(),
            groups: Vec::new(),
            parent: None,
        }
    }
}
