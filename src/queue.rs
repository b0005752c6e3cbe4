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

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::types::card::CardId;
use crate::types::card::CardRecord;
use crate::types::state::CardState;

/// The default time window within which cards are considered to be due
/// together: thirty minutes.
pub const DEFAULT_WINDOW_MS: i64 = 30 * 60 * 1000;

/// What the queue needs to know about a card: when it is due and which
/// wrapper, if any, generated it.
pub trait QueueCard {
    fn due_millis(&self) -> Option<i64>;
    fn parent(&self) -> Option<&CardId>;
}

impl QueueCard for (CardRecord, CardState) {
    fn due_millis(&self) -> Option<i64> {
        Some(self.1.due.millis())
    }

    fn parent(&self) -> Option<&CardId> {
        self.0.parent.as_ref()
    }
}

impl<T: QueueCard> QueueCard for &T {
    fn due_millis(&self) -> Option<i64> {
        (**self).due_millis()
    }

    fn parent(&self) -> Option<&CardId> {
        (**self).parent()
    }
}

/// Order cards for presentation: ascending by due time, with cards due
/// within the same window shuffled so that sibling sub-cards of one parent
/// never cluster. Always a permutation of the input, never a filter.
pub fn order<T: QueueCard>(cards: Vec<T>, window_ms: i64) -> Vec<T> {
    order_with(cards, window_ms, &mut rand::thread_rng())
}

/// `order` with an injected random source, so callers and tests can make
/// the shuffle deterministic.
pub fn order_with<T: QueueCard, R: Rng>(cards: Vec<T>, window_ms: i64, rng: &mut R) -> Vec<T> {
    if cards.len() <= 1 {
        return cards;
    }
    let mut cards = cards;
    cards.sort_by_key(|card| card.due_millis().unwrap_or(i64::MAX));

    // Partition into contiguous windows. A new window starts whenever a
    // card's due time exceeds the window start by more than the window
    // size; windows are concatenated in time order, so ordering is only
    // ever randomized within one.
    let mut out = Vec::with_capacity(cards.len());
    let mut window: Vec<T> = Vec::new();
    let mut window_start = i64::MIN;
    for card in cards {
        let due = card.due_millis().unwrap_or(i64::MAX);
        if window.is_empty() || due.saturating_sub(window_start) <= window_ms {
            if window.is_empty() {
                window_start = due;
            }
            window.push(card);
        } else {
            interleave_window(window, rng, &mut out);
            window_start = due;
            window = vec![card];
        }
    }
    interleave_window(window, rng, &mut out);
    out
}

/// Shuffle one window. Members are grouped by parent (parentless cards
/// form one collective group), each group is shuffled independently, and
/// the groups are interleaved round-robin so siblings end up maximally
/// separated. A window holding a single group degrades to a plain shuffle.
fn interleave_window<T: QueueCard, R: Rng>(window: Vec<T>, rng: &mut R, out: &mut Vec<T>) {
    let mut positions: HashMap<Option<CardId>, usize> = HashMap::new();
    let mut groups: Vec<Vec<T>> = Vec::new();
    for card in window {
        let key = card.parent().cloned();
        match positions.get(&key) {
            Some(&index) => groups[index].push(card),
            None => {
                positions.insert(key, groups.len());
                groups.push(vec![card]);
            }
        }
    }
    for group in &mut groups {
        group.shuffle(rng);
    }
    let mut remaining: Vec<std::vec::IntoIter<T>> =
        groups.into_iter().map(Vec::into_iter).collect();
    loop {
        let mut exhausted = true;
        for iter in &mut remaining {
            if let Some(card) = iter.next() {
                out.push(card);
                exhausted = false;
            }
        }
        if exhausted {
            break;
        }
    }
}
